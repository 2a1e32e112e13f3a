pub mod core;

pub use crate::core::FieldId;
pub use crate::core::config;
pub use crate::core::error;
pub use crate::core::field_props;
pub use crate::core::field_ref;
pub use crate::core::form_engine;
pub use crate::core::form_event;
pub use crate::core::scheduler;
pub use crate::core::validation;
pub use crate::core::validators;
pub use crate::core::value;

pub use crate::core::config::FormSpec;
pub use crate::core::error::ConfigError;
pub use crate::core::form_engine::{FormEngine, FormSnapshot, SubmitEvent, SubmitOutcome};
pub use crate::core::validation::{Rule, ValidationSchema};
pub use crate::core::value::{FieldValues, Value};
