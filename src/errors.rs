use std::fmt;

#[derive(Debug, Clone)]
pub enum ShortgateError {
    Config(String),
    Validation(String),
    NotFound(String),
    StorageOperation(String),
    Serialization(String),
    Session(String),
    OAuth(String),
    Notify(String),
}

impl ShortgateError {
    pub fn code(&self) -> &'static str {
        match self {
            ShortgateError::Config(_) => "E001",
            ShortgateError::Validation(_) => "E002",
            ShortgateError::NotFound(_) => "E003",
            ShortgateError::StorageOperation(_) => "E004",
            ShortgateError::Serialization(_) => "E005",
            ShortgateError::Session(_) => "E006",
            ShortgateError::OAuth(_) => "E007",
            ShortgateError::Notify(_) => "E008",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ShortgateError::Config(_) => "Configuration Error",
            ShortgateError::Validation(_) => "Validation Error",
            ShortgateError::NotFound(_) => "Resource Not Found",
            ShortgateError::StorageOperation(_) => "Storage Operation Error",
            ShortgateError::Serialization(_) => "Serialization Error",
            ShortgateError::Session(_) => "Session Error",
            ShortgateError::OAuth(_) => "OAuth Error",
            ShortgateError::Notify(_) => "Notification Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ShortgateError::Config(msg) => msg,
            ShortgateError::Validation(msg) => msg,
            ShortgateError::NotFound(msg) => msg,
            ShortgateError::StorageOperation(msg) => msg,
            ShortgateError::Serialization(msg) => msg,
            ShortgateError::Session(msg) => msg,
            ShortgateError::OAuth(msg) => msg,
            ShortgateError::Notify(msg) => msg,
        }
    }
}

impl fmt::Display for ShortgateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for ShortgateError {}

impl ShortgateError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        ShortgateError::Config(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortgateError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortgateError::NotFound(msg.into())
    }

    pub fn storage_operation<T: Into<String>>(msg: T) -> Self {
        ShortgateError::StorageOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortgateError::Serialization(msg.into())
    }

    pub fn session<T: Into<String>>(msg: T) -> Self {
        ShortgateError::Session(msg.into())
    }

    pub fn oauth<T: Into<String>>(msg: T) -> Self {
        ShortgateError::OAuth(msg.into())
    }

    pub fn notify<T: Into<String>>(msg: T) -> Self {
        ShortgateError::Notify(msg.into())
    }
}

impl From<std::io::Error> for ShortgateError {
    fn from(err: std::io::Error) -> Self {
        ShortgateError::StorageOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShortgateError {
    fn from(err: serde_json::Error) -> Self {
        ShortgateError::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for ShortgateError {
    fn from(err: rusqlite::Error) -> Self {
        ShortgateError::StorageOperation(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ShortgateError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ShortgateError::Session(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortgateError>;
