use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure that abandons one field. The batch moves on to the next one.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("image {path} or its gzip-compressed copy not found")]
    ImageNotFound { path: PathBuf },

    #[error("catalog {path} not found")]
    CatalogNotFound { path: PathBuf },

    #[error("failed to decompress {path}")]
    Decompress {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed frame header {path}: {reason}")]
    MalformedHeader { path: PathBuf, reason: String },

    #[error("malformed image {path}: {reason}")]
    MalformedImage { path: PathBuf, reason: String },

    #[error("malformed catalog {path}: {reason}")]
    MalformedCatalog { path: PathBuf, reason: String },

    #[error("field processing panicked: {message}")]
    Panicked { message: String },
}

impl FieldError {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldError::ImageNotFound { .. } => "ImageNotFound",
            FieldError::CatalogNotFound { .. } => "CatalogNotFound",
            FieldError::Decompress { .. } => "Decompress",
            FieldError::Io { .. } => "Io",
            FieldError::MalformedHeader { .. } => "MalformedHeader",
            FieldError::MalformedImage { .. } => "MalformedImage",
            FieldError::MalformedCatalog { .. } => "MalformedCatalog",
            FieldError::Panicked { .. } => "Panicked",
        }
    }

    /// Error kind followed by the chain of underlying causes, one per line.
    pub fn context(&self) -> String {
        let mut lines = vec![format!("FieldError::{}", self.kind())];
        let mut source = self.source();
        while let Some(err) = source {
            lines.push(format!("  caused by: {err}"));
            source = err.source();
        }
        lines.join("\n")
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FieldError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_lists_the_cause_chain() {
        let err = FieldError::Decompress {
            path: PathBuf::from("frame.f32.gz"),
            source: io::Error::new(io::ErrorKind::InvalidData, "corrupt deflate stream"),
        };
        assert_eq!(
            err.context(),
            "FieldError::Decompress\n  caused by: corrupt deflate stream"
        );
        assert_eq!(err.to_string(), "failed to decompress frame.f32.gz");
    }

    #[test]
    fn context_without_cause_is_the_kind() {
        let err = FieldError::Panicked {
            message: "boom".to_string(),
        };
        assert_eq!(err.context(), "FieldError::Panicked");
    }
}
