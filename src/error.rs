use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Character not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration for '{attribute}': {message}")]
    Configuration { attribute: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A character named '{0}' already exists")]
    DuplicateName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ForgeError {
    pub fn configuration(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        ForgeError::Configuration {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ForgeError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
