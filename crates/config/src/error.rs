//! Configuration load failures.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde_json::error::Category;
use thiserror::Error;

/// Broad class of a rejected document, from `serde_json`'s error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseKind {
    /// Not well-formed JSON.
    Syntax,
    /// Well-formed JSON that does not match the config schema.
    Data,
    /// The document ends early.
    Eof,
}

impl From<Category> for ParseKind {
    fn from(c: Category) -> Self {
        match c {
            Category::Data => Self::Data,
            Category::Eof => Self::Eof,
            Category::Syntax | Category::Io => Self::Syntax,
        }
    }
}

impl fmt::Display for ParseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Syntax => "malformed JSON",
            Self::Data => "invalid setting",
            Self::Eof => "unexpected end of file",
        })
    }
}

/// Errors produced while loading a configuration.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// The file exists but could not be read.
    #[error("cannot read {}: {message}", .path.display())]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// I/O error text.
        message: String,
    },
    /// The document was rejected by the JSON parser.
    #[error("{kind} at line {line}, column {col}: {message}")]
    Parse {
        /// Source file, when loaded from disk.
        path: Option<PathBuf>,
        /// What went wrong.
        kind: ParseKind,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        col: usize,
        /// Parser message without its location suffix.
        message: String,
        /// The offending source line.
        snippet: String,
    },
}

impl Error {
    /// Classify a `serde_json` failure on `source`.
    pub(crate) fn parse(source: &str, path: Option<&Path>, e: &serde_json::Error) -> Self {
        let (line, col) = (e.line().max(1), e.column().max(1));
        let full = e.to_string();
        let message = match full.rsplit_once(" at line ") {
            Some((head, _)) => head.to_string(),
            None => full,
        };
        Self::Parse {
            path: path.map(Path::to_path_buf),
            kind: e.classify().into(),
            line,
            col,
            message,
            snippet: source.lines().nth(line - 1).unwrap_or_default().to_string(),
        }
    }

    /// Multi-line rendering for logs and the CLI: location, message, and the
    /// offending line with a caret under the column.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { .. } => self.to_string(),
            Self::Parse {
                path,
                kind,
                line,
                col,
                message,
                snippet,
            } => {
                let at = match path {
                    Some(p) => format!("{}:{line}:{col}", p.display()),
                    None => format!("<config>:{line}:{col}"),
                };
                let caret = " ".repeat(col.saturating_sub(1));
                format!("{at}: {kind}: {message}\n  | {snippet}\n  | {caret}^")
            }
        }
    }

    /// The file this error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } => Some(path),
            Self::Parse { path, .. } => path.as_deref(),
        }
    }
}
