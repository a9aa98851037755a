use crate::db::store::StoreError;
use crate::services::validation::Violation;
use core::fmt;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    NotFound(String),
    InvalidInput(String),
    Storage(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::NotFound(msg) => write!(f, "not found: {}", msg),
            ServiceError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            ServiceError::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServiceError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Storage(e)
    }
}

impl From<Violation> for ServiceError {
    fn from(v: Violation) -> Self {
        ServiceError::InvalidInput(v.message().to_string())
    }
}
