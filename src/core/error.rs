use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML form definition: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON form definition: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid pattern for field `{field}`: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}
