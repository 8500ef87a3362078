use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown key: {0}")]
pub struct KeyParseError(pub String);
