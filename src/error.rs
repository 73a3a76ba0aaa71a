use std::path::{Path, PathBuf};

/// Errors raised while converting a VOC dataset. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("class '{class}' in {} is not in the label map", path.display())]
    Lookup { class: String, path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image has a zero dimension ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },

    #[error("failed to render {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    pub fn parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        ConvertError::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
