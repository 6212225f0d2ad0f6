use thiserror::Error;

/// VK error code for a rejected or expired access token.
const VK_AUTH_FAILED: i64 = 5;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("VK error {code}: {message}")]
    Vk { code: i64, message: String },

    #[error("malformed API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Vk { code, .. } if *code == VK_AUTH_FAILED)
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid vertex map: {0}")]
    Json(#[from] serde_json::Error),

    #[error("edge line {line}: expected 4 whitespace-separated tokens, found {found}: {text:?}")]
    MalformedEdge {
        line: usize,
        found: usize,
        text: String,
    },

    #[error("attribute line {line}: {text:?} is not a non-negative integer")]
    BadAttribute { line: usize, text: String },

    #[error("{edges} edges but {attributes} attributes")]
    LengthMismatch { edges: usize, attributes: usize },

    #[error("edge ({0:?}, {1:?}) names a vertex missing from the vertex map: {2:?}")]
    UnknownVertex(String, String, String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Authentication(ApiError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, Error>;
