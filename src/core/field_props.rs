use crate::core::FieldId;
use crate::core::form_engine::FormEngine;
use crate::core::value::Value;

/// Event handlers bound to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    id: FieldId,
}

impl FieldBinding {
    pub fn new(id: impl Into<FieldId>) -> Self {
        Self { id: id.into() }
    }

    pub fn on_change(&self, engine: &mut FormEngine, value: impl Into<Value>) {
        engine.handle_change(self.id.clone(), value);
    }

    pub fn on_blur(&self, engine: &mut FormEngine) {
        engine.handle_blur(self.id.clone());
    }
}

/// Read-only projection of a field for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProps {
    pub id: FieldId,
    pub value: Value,
    pub error: Option<String>,
    pub touched: bool,
    pub dirty: bool,
    pub binding: FieldBinding,
}

impl FieldProps {
    /// The error once the field has been touched; untouched fields render clean.
    pub fn visible_error(&self) -> Option<&str> {
        if self.touched {
            self.error.as_deref()
        } else {
            None
        }
    }

    pub fn on_change(&self, engine: &mut FormEngine, value: impl Into<Value>) {
        self.binding.on_change(engine, value);
    }

    pub fn on_blur(&self, engine: &mut FormEngine) {
        self.binding.on_blur(engine);
    }
}

#[cfg(test)]
mod tests {
    use crate::core::form_engine::FormEngine;
    use crate::core::validation::ValidationSchema;
    use crate::core::validators::required;
    use crate::core::value::Value;

    #[test]
    fn props_project_current_state_and_bind_handlers() {
        let mut engine = FormEngine::new([("name", Value::text(""))])
            .with_schema(ValidationSchema::new().rule("name", required()));

        let props = engine.field_props("name");
        assert_eq!(props.value, Value::text(""));
        assert_eq!(props.error, None);

        props.on_blur(&mut engine);
        let props = engine.field_props("name");
        assert!(props.touched);
        assert_eq!(props.visible_error(), Some("This field is required"));

        props.on_change(&mut engine, "Ada");
        let props = engine.field_props("name");
        assert_eq!(props.value, Value::text("Ada"));
        assert!(props.dirty);
        assert_eq!(props.error, None);
    }

    #[test]
    fn errors_stay_hidden_until_touched() {
        let mut engine = FormEngine::new([("name", Value::text(""))])
            .with_schema(ValidationSchema::new().rule("name", required()));
        engine.validate_field("name");

        let props = engine.field_props("name");
        assert_eq!(props.error.as_deref(), Some("This field is required"));
        assert_eq!(props.visible_error(), None);
    }
}
