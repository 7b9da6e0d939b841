//! Error types for the tendex-core library.
//!
//! Extraction itself is best-effort: a pattern that fails to match yields no
//! candidate, a value that cannot be coerced leaves its field null, and
//! segmentation disagreements become warnings in the quality report. None of
//! those are errors. The variants here cover the few genuinely caller-visible
//! failures: bad configuration, an unreadable corpus, I/O.

use thiserror::Error;

/// Main error type for the tendex library.
#[derive(Error, Debug)]
pub enum TendexError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The historical corpus could not be read or decoded.
    #[error("corpus error: {0}")]
    Corpus(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the tendex library.
pub type Result<T> = std::result::Result<T, TendexError>;
