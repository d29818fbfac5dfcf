use thiserror::Error;

/// Errors produced while parsing a chord string such as `"Win+Shift+F"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input was empty or only whitespace.
    #[error("empty key binding")]
    Empty,
    /// A segment before the trigger key is not a known modifier.
    #[error("unknown modifier: '{0}'")]
    UnknownModifier(String),
    /// The trailing segment is not a known key name.
    #[error("unknown key: '{0}'")]
    UnknownKey(String),
}
