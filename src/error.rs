//! Error types for the Tessera library.
//!
//! This module provides error handling for all Tessera operations. All errors
//! are represented by the [`TesseraError`] enum.
//!
//! # Examples
//!
//! ```
//! use tessera::error::{Result, TesseraError};
//!
//! fn example_operation() -> Result<()> {
//!     // Return an error
//!     Err(TesseraError::config("round cap must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for Tessera operations.
///
/// This enum represents all possible errors that can occur in the Tessera
/// library. It uses the `thiserror` crate for automatic `Error` trait
/// implementation and provides convenient constructor methods for creating
/// specific error types.
#[derive(Error, Debug)]
pub enum TesseraError {
    /// Tokenizer pattern errors (invalid joinable pattern)
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Configuration errors (rejected balance settings)
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with TesseraError.
pub type Result<T> = std::result::Result<T, TesseraError>;

impl TesseraError {
    /// Create a new pattern error.
    pub fn pattern<S: Into<String>>(msg: S) -> Self {
        TesseraError::Pattern(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        TesseraError::Config(msg.into())
    }
}
