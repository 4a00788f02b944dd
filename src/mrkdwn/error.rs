use thiserror::Error;

/// Grammar errors raised while building a markup tree.
///
/// These are fatal for the one message being parsed; the file adapter logs them
/// and carries that message through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// Markup nested deeper than the parser allows
    #[error("markup nested deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
}

/// Result type for markup operations
pub type MarkupResult<T> = Result<T, MarkupError>;
