use crate::core::FieldId;
use crate::core::value::{FieldValues, Value};
use indexmap::IndexMap;
use std::fmt;

pub type ValidationError = String;
pub type RuleFn = dyn Fn(&Value, &FieldValues) -> Result<(), ValidationError> + Send + Sync;

/// A pure check over one field's normalized value, with the whole form as context.
///
/// An `Err` carrying an empty message counts as a pass.
pub struct Rule {
    check: Box<RuleFn>,
    message: Option<String>,
}

impl Rule {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Value, &FieldValues) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self {
            check: Box::new(check),
            message: None,
        }
    }

    /// A rule that ignores the rest of the form.
    pub fn for_value<F>(check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self::new(move |value, _| check(value))
    }

    /// Replaces whatever message the rule would report on failure.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn check(&self, value: &Value, values: &FieldValues) -> Result<(), ValidationError> {
        match (self.check)(value, values) {
            Ok(()) => Ok(()),
            Err(err) if err.is_empty() => Ok(()),
            Err(err) => Err(self.message.clone().unwrap_or(err)),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Field name to ordered rule list. A single rule is a list of one.
#[derive(Debug, Default)]
pub struct ValidationSchema {
    rules: IndexMap<FieldId, Vec<Rule>>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, id: impl Into<FieldId>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.insert(id, rules);
        self
    }

    pub fn rule(self, id: impl Into<FieldId>, rule: Rule) -> Self {
        self.field(id, [rule])
    }

    /// Appends to the field's existing rules, keeping declared order.
    pub fn insert(&mut self, id: impl Into<FieldId>, rules: impl IntoIterator<Item = Rule>) {
        self.rules.entry(id.into()).or_default().extend(rules);
    }

    pub fn rules_for(&self, id: &str) -> Option<&[Rule]> {
        self.rules.get(id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Run rules in declared order, returning the first error.
pub fn run_rules(rules: &[Rule], value: &Value, values: &FieldValues) -> Result<(), ValidationError> {
    for rule in rules {
        rule.check(value, values)?;
    }
    Ok(())
}
