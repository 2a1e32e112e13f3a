//! Declarative form definitions loaded from YAML or JSON.
//!
//! ```yaml
//! validate_on_blur: true
//! fields:
//!   email:
//!     initial: ""
//!     rules:
//!       - rule: required
//!       - rule: email
//!         message: "Use your work address"
//! ```

use crate::core::FieldId;
use crate::core::error::ConfigError;
use crate::core::form_engine::FormEngine;
use crate::core::validation::{Rule, ValidationSchema};
use crate::core::validators;
use crate::core::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const DEFAULT_MATCH_MESSAGE: &str = "Values must match";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSpec {
    #[serde(default = "default_true")]
    pub validate_on_change: bool,
    #[serde(default = "default_true")]
    pub validate_on_blur: bool,
    #[serde(default)]
    pub fields: IndexMap<FieldId, FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default)]
    pub initial: Value,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleSpec {
    Required {
        #[serde(default)]
        message: Option<String>,
    },
    MinLength {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    MaxLength {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    Min {
        value: f64,
        #[serde(default)]
        message: Option<String>,
    },
    Max {
        value: f64,
        #[serde(default)]
        message: Option<String>,
    },
    Pattern {
        value: String,
        #[serde(default)]
        message: Option<String>,
    },
    Matches {
        field: FieldId,
        #[serde(default)]
        message: Option<String>,
    },
    Email {
        #[serde(default)]
        message: Option<String>,
    },
    Url {
        #[serde(default)]
        message: Option<String>,
    },
    Phone {
        #[serde(default)]
        message: Option<String>,
    },
}

impl RuleSpec {
    pub fn build(&self, field: &FieldId) -> Result<Rule, ConfigError> {
        let (rule, message) = match self {
            Self::Required { message } => (validators::required(), message),
            Self::MinLength { value, message } => (validators::min_length(*value), message),
            Self::MaxLength { value, message } => (validators::max_length(*value), message),
            Self::Min { value, message } => (validators::min(*value), message),
            Self::Max { value, message } => (validators::max(*value), message),
            Self::Pattern { value, message } => {
                let rule = validators::try_pattern(value).map_err(|source| {
                    ConfigError::InvalidPattern {
                        field: field.to_string(),
                        source,
                    }
                })?;
                (rule, message)
            }
            Self::Matches { field: other, message } => {
                let message = message.as_deref().unwrap_or(DEFAULT_MATCH_MESSAGE);
                return Ok(validators::matches(other.clone(), message));
            }
            Self::Email { message } => (validators::email(), message),
            Self::Url { message } => (validators::url(), message),
            Self::Phone { message } => (validators::phone(), message),
        };

        Ok(match message {
            Some(message) => rule.with_message(message.clone()),
            None => rule,
        })
    }
}

impl FormSpec {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn schema(&self) -> Result<ValidationSchema, ConfigError> {
        let mut schema = ValidationSchema::new();
        for (id, field) in &self.fields {
            if field.rules.is_empty() {
                continue;
            }
            let rules = field
                .rules
                .iter()
                .map(|spec| spec.build(id))
                .collect::<Result<Vec<_>, _>>()?;
            schema.insert(id.clone(), rules);
        }
        Ok(schema)
    }

    /// Compiles the definition into an engine. Attach a submit handler with
    /// [`FormEngine::with_submit`].
    pub fn build(&self) -> Result<FormEngine, ConfigError> {
        let schema = self.schema()?;
        let initial = self
            .fields
            .iter()
            .map(|(id, field)| (id.clone(), field.initial.clone()));

        log::debug!(
            "built form with {} field(s), {} validated",
            self.fields.len(),
            schema.len()
        );

        Ok(FormEngine::new(initial)
            .with_schema(schema)
            .validate_on_change(self.validate_on_change)
            .validate_on_blur(self.validate_on_blur))
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::{FormSpec, RuleSpec};
    use crate::core::error::ConfigError;
    use crate::core::value::Value;

    const SIGNUP: &str = r#"
fields:
  email:
    initial: ""
    rules:
      - rule: required
      - rule: email
        message: "Use your work address"
  password:
    rules:
      - rule: min_length
        value: 8
  confirm:
    rules:
      - rule: matches
        field: password
        message: "Passwords must match"
  age:
    initial: 30
    rules:
      - rule: min
        value: 18
  newsletter:
    initial: false
"#;

    #[test]
    fn yaml_definition_builds_engine() {
        let spec = FormSpec::from_yaml(SIGNUP).expect("yaml");
        assert!(spec.validate_on_change);
        assert!(spec.validate_on_blur);
        assert_eq!(
            spec.fields["password"].rules,
            vec![RuleSpec::MinLength {
                value: 8,
                message: None,
            }]
        );

        let mut engine = spec.build().expect("engine");
        let keys: Vec<&str> = engine.values().keys().map(|id| id.as_str()).collect();
        assert_eq!(keys, vec!["email", "password", "confirm", "age", "newsletter"]);
        assert_eq!(engine.value("age"), Some(&Value::Number(30.0)));
        assert_eq!(engine.value("password"), Some(&Value::None));

        engine.set_value("email", "nope");
        engine.set_value("password", "hunter22");
        engine.set_value("confirm", "hunter2");
        assert!(!engine.validate_form());
        assert_eq!(engine.error("email"), Some("Use your work address"));
        assert_eq!(engine.error("confirm"), Some("Passwords must match"));
        assert_eq!(engine.error("password"), None);
        assert!(engine.validate_field("newsletter"));
    }

    #[test]
    fn json_definition_respects_validation_modes() {
        let spec = FormSpec::from_json(
            r#"{
                "validate_on_blur": false,
                "fields": { "name": { "rules": [{ "rule": "required" }] } }
            }"#,
        )
        .expect("json");

        let mut engine = spec.build().expect("engine");
        engine.handle_blur("name");
        assert_eq!(engine.error("name"), None);
        assert!(!engine.validate_field("name"));
    }

    #[test]
    fn bad_pattern_names_the_field() {
        let spec = FormSpec::from_yaml(
            r#"
fields:
  code:
    rules:
      - rule: pattern
        value: "("
"#,
        )
        .expect("yaml");

        match spec.build() {
            Err(ConfigError::InvalidPattern { field, .. }) => assert_eq!(field, "code"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("pattern should not compile"),
        }
    }

    #[test]
    fn unknown_rule_is_rejected() {
        let err = FormSpec::from_yaml("fields:\n  a:\n    rules:\n      - rule: telepathy\n")
            .expect_err("unknown rule");
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
