//! Error types for the mining engine.
//!
//! All fallible operations in this crate return `Result<T, MinerError>`. The
//! CLI driver converts any error variant into a diagnostic-stream message and
//! a process exit code of 1.

/// The four failure classes the engine can report.
#[derive(Debug, thiserror::Error)]
pub enum MinerError {
    /// The input stream was not well-formed JSON, or did not match the
    /// expected transaction shape.
    #[error("parse error near {locator:?}: {message}")]
    ParseError { message: String, locator: String },

    /// Partitions disagreed on tuple count, or a target/attribute index was
    /// out of range.
    #[error("data shape error: {0}")]
    DataShape(String),

    /// A user-supplied threshold or parameter was outside its valid range.
    #[error("threshold error: {0}")]
    Threshold(String),

    /// Arena growth failed. Kept for contract completeness; unreachable in
    /// practice since `Vec` growth failure aborts rather than returning.
    #[error("allocation error: {0}")]
    Allocation(String),
}

pub type Result<T> = std::result::Result<T, MinerError>;

impl MinerError {
    /// Build a `ParseError`, truncating `context` to a fixed-width locator
    /// so error output stays short even on huge inputs.
    pub fn parse(message: impl Into<String>, context: &str) -> Self {
        const LOCATOR_WIDTH: usize = 20;
        let locator: String = context.chars().take(LOCATOR_WIDTH).collect();
        MinerError::ParseError { message: message.into(), locator }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_locator_is_bounded() {
        let long = "x".repeat(500);
        let err = MinerError::parse("bad token", &long);
        match err {
            MinerError::ParseError { locator, .. } => assert_eq!(locator.len(), 20),
            _ => panic!("expected ParseError"),
        }
    }
}
