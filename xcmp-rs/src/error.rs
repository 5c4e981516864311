//! Error types for xcmp.

use thiserror::Error;

/// Result type alias for xcmp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, comparing, merging or saving trees.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed document text.
    #[error("{0}")]
    Parse(String),

    /// XML error from quick-xml.
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// Schema flattening did not produce exactly one top-level named node.
    #[error("schema must resolve to exactly one named top-level element, found {found}")]
    SchemaShape {
        /// Number of top-level named nodes produced.
        found: usize,
    },

    /// An operation was requested before the trees it needs were loaded.
    #[error("{0}")]
    Precondition(String),

    /// A graft whose path root does not match the reference root.
    #[error("cannot graft under '{found}': reference root is '{expected}'")]
    RootMismatch {
        /// Header of the reference root.
        expected: String,
        /// Header of the first path step of the node being grafted.
        found: String,
    },

    /// File extension is neither `xml` nor `xsd`.
    #[error("unsupported file type '{0}', expected .xml or .xsd")]
    UnknownSourceKind(String),

    /// I/O error.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short category name, suitable as the title of a user notification.
    pub fn title(&self) -> &'static str {
        match self {
            Error::Parse(_) | Error::Xml(_) => "ParseError",
            Error::SchemaShape { .. } => "SchemaShapeError",
            Error::Precondition(_) | Error::RootMismatch { .. } => "PreconditionNotMet",
            Error::UnknownSourceKind(_) => "UnknownSourceKind",
            Error::Io(_) => "IoError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles() {
        assert_eq!(Error::Parse("bad".into()).title(), "ParseError");
        assert_eq!(Error::SchemaShape { found: 2 }.title(), "SchemaShapeError");
        assert_eq!(
            Error::RootMismatch {
                expected: "a".into(),
                found: "b".into()
            }
            .title(),
            "PreconditionNotMet"
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(Error::from(io).title(), "IoError");
    }

    #[test]
    fn test_message_is_underlying_cause() {
        let err = Error::Parse("unexpected end of input".into());
        assert_eq!(err.to_string(), "unexpected end of input");

        let err = Error::SchemaShape { found: 0 };
        assert!(err.to_string().contains("found 0"));
    }
}
