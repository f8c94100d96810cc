use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// TOML parse / deserialization error for the supplier registry.
    ConfigParse(String),
    /// Registry validation error (blank owner, nameless supplier, etc.).
    ConfigValidation(String),
    /// Product lookup failure surfaced through the persistence seam.
    Lookup(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Lookup(msg) => write!(f, "product lookup error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
