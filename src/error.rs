use thiserror::Error;

/// Errors returned by fallible map accessors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested key is not present in the map.
    #[error("key not found")]
    KeyNotFound,
}
