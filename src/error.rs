//! Error type shared by the ordering, parsing and expansion stages.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// An `#include` names a file that is not part of the intake set.
    #[error("unknown include file `{include}` (included from {file})")]
    UnknownInclude { file: String, include: String },

    /// The include graph has no valid order for these files.
    #[error("cyclic #include dependency among: {}", .files.join(", "))]
    CyclicDependency { files: Vec<String> },

    /// Macro expansion kept producing new invocations past the pass limit.
    #[error("macro expansion of `{name}` did not settle after {limit} passes")]
    MacroExpansionLoop { name: String, limit: usize },

    /// A construct that spans several lines ran off the end of its file.
    #[error("unexpected end of input in {file} after line {line}")]
    UnexpectedEof { file: String, line: usize },

    #[error("i/o error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_files() {
        let err = Error::CyclicDependency {
            files: vec!["a.h".to_string(), "b.h".to_string()],
        };
        assert_eq!(err.to_string(), "cyclic #include dependency among: a.h, b.h");
    }

    #[test]
    fn unknown_include_message() {
        let err = Error::UnknownInclude {
            file: "thing.t".to_string(),
            include: "missing.h".to_string(),
        };
        assert!(err.to_string().contains("`missing.h`"));
    }
}
