use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),
    #[error("field `{0}` is required and must not be empty")]
    MissingField(&'static str),
}
