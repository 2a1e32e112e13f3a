use crate::core::FieldId;
use crate::core::validation::Rule;
use crate::core::value::Value;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ().-]{5,18}[0-9]$").expect("phone pattern"));

pub fn required() -> Rule {
    Rule::for_value(|value: &Value| {
        let missing = match value {
            Value::None => true,
            Value::Text(v) => v.trim().is_empty(),
            Value::Bool(checked) => !checked,
            Value::List(items) => items.is_empty(),
            Value::Number(_) => false,
        };
        if missing {
            Err("This field is required".to_string())
        } else {
            Ok(())
        }
    })
}

pub fn min_length(min: usize) -> Rule {
    Rule::for_value(move |value: &Value| match value.len() {
        Some(len) if len > 0 && len < min => Err(format!("Must be at least {min} characters")),
        _ => Ok(()),
    })
}

pub fn max_length(max: usize) -> Rule {
    Rule::for_value(move |value: &Value| match value.len() {
        Some(len) if len > max => Err(format!("Must be at most {max} characters")),
        _ => Ok(()),
    })
}

pub fn min(min: f64) -> Rule {
    Rule::for_value(move |value: &Value| match number_or_skip(value)? {
        Some(n) if n < min => Err(format!("Must be at least {min}")),
        _ => Ok(()),
    })
}

pub fn max(max: f64) -> Rule {
    Rule::for_value(move |value: &Value| match number_or_skip(value)? {
        Some(n) if n > max => Err(format!("Must be at most {max}")),
        _ => Ok(()),
    })
}

pub fn pattern(re: Regex) -> Rule {
    Rule::for_value(move |value: &Value| {
        if value.is_empty() || re.is_match(&value.to_text()) {
            Ok(())
        } else {
            Err("Invalid format".to_string())
        }
    })
}

pub fn try_pattern(source: &str) -> Result<Rule, regex::Error> {
    Regex::new(source).map(pattern)
}

/// Passes when the value equals the current value of `other`.
pub fn matches(other: impl Into<FieldId>, message: impl Into<String>) -> Rule {
    let other = other.into();
    let message = message.into();
    Rule::new(move |value, values| {
        if *value == Value::normalized(values.get(other.as_str())) {
            Ok(())
        } else {
            Err(message.clone())
        }
    })
}

pub fn email() -> Rule {
    shape(&EMAIL, "Enter a valid email address")
}

pub fn url() -> Rule {
    shape(&URL, "Enter a valid URL")
}

pub fn phone() -> Rule {
    shape(&PHONE, "Enter a valid phone number")
}

pub fn custom<F>(f: F, message: impl Into<String>) -> Rule
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    let msg = message.into();
    Rule::for_value(move |value: &Value| if f(value) { Ok(()) } else { Err(msg.clone()) })
}

fn shape(re: &'static LazyLock<Regex>, message: &'static str) -> Rule {
    Rule::for_value(move |value: &Value| {
        let text = value.to_text();
        if text.is_empty() || re.is_match(text.trim()) {
            Ok(())
        } else {
            Err(message.to_string())
        }
    })
}

// Empty values are left to `required`.
fn number_or_skip(value: &Value) -> Result<Option<f64>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .as_number()
        .map(Some)
        .ok_or_else(|| "Enter a valid number".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::FieldValues;

    fn check(rule: &Rule, value: impl Into<Value>) -> Result<(), String> {
        rule.check(&value.into(), &FieldValues::new())
    }

    #[test]
    fn required_rejects_blank_values() {
        let rule = required();
        assert_eq!(check(&rule, ""), Err("This field is required".to_string()));
        assert!(check(&rule, "   ").is_err());
        assert!(check(&rule, Value::None).is_err());
        assert!(check(&rule, false).is_err());
        assert!(check(&rule, Vec::<String>::new()).is_err());
        assert!(check(&rule, "x").is_ok());
        assert!(check(&rule, 0).is_ok());
    }

    #[test]
    fn length_bounds_count_chars_and_skip_empty() {
        assert!(check(&min_length(3), "").is_ok());
        assert_eq!(
            check(&min_length(3), "ab"),
            Err("Must be at least 3 characters".to_string())
        );
        assert!(check(&min_length(3), "äöü").is_ok());
        assert_eq!(
            check(&max_length(2), "abc"),
            Err("Must be at most 2 characters".to_string())
        );
        assert!(check(&max_length(2), "ab").is_ok());
    }

    #[test]
    fn numeric_bounds_accept_numeric_text() {
        assert!(check(&min(18.0), "21").is_ok());
        assert_eq!(check(&min(18.0), 12), Err("Must be at least 18".to_string()));
        assert_eq!(check(&max(10.0), "10.5"), Err("Must be at most 10".to_string()));
        assert_eq!(check(&max(10.0), "ten"), Err("Enter a valid number".to_string()));
        assert!(check(&min(1.0), "").is_ok());
    }

    #[test]
    fn pattern_reports_invalid_format() {
        let rule = try_pattern(r"^[A-Z]{3}$").expect("pattern");
        assert!(check(&rule, "ABC").is_ok());
        assert_eq!(check(&rule, "abc"), Err("Invalid format".to_string()));
        assert!(try_pattern("(").is_err());
    }

    #[test]
    fn matches_compares_against_other_field() {
        let rule = matches("password", "Passwords must match");
        let mut values = FieldValues::new();
        values.insert("password".into(), Value::text("secret1"));

        assert!(rule.check(&Value::text("secret1"), &values).is_ok());
        assert_eq!(
            rule.check(&Value::text("secret2"), &values),
            Err("Passwords must match".to_string())
        );
        assert!(rule.check(&Value::text(""), &FieldValues::new()).is_ok());
    }

    #[test]
    fn shape_checks() {
        assert!(check(&email(), "a@b.com").is_ok());
        assert_eq!(
            check(&email(), "not-an-email"),
            Err("Enter a valid email address".to_string())
        );
        assert!(check(&url(), "https://example.com/path").is_ok());
        assert!(check(&url(), "example.com").is_err());
        assert!(check(&phone(), "+1 (555) 123-4567").is_ok());
        assert!(check(&phone(), "12ab").is_err());
        assert!(check(&email(), "").is_ok());
    }

    #[test]
    fn custom_uses_given_message() {
        let rule = custom(|v| v.as_text() == Some("yes"), "Say yes");
        assert!(check(&rule, "yes").is_ok());
        assert_eq!(check(&rule, "no"), Err("Say yes".to_string()));
    }
}
