//! Error types for blob stores

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Io(Box<std::io::Error>),
    InvalidKey(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "Store IO error: {}", err),
            StoreError::InvalidKey(key) => write!(f, "Invalid store key: {:?}", key),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err.as_ref()),
            StoreError::InvalidKey(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
