use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Malformed request document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Request task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Category of a recorded request fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    MalformedDataError,
    UnknownFormatError,
    DisallowedOperationError,
    BothOrNeitherError,
    UnresolvedBindingError,
    InvocationFault,
    MissingReturnFormatError,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FaultKind::MalformedDataError => "MalformedDataError",
            FaultKind::UnknownFormatError => "UnknownFormatError",
            FaultKind::DisallowedOperationError => "DisallowedOperationError",
            FaultKind::BothOrNeitherError => "BothOrNeitherError",
            FaultKind::UnresolvedBindingError => "UnresolvedBindingError",
            FaultKind::InvocationFault => "InvocationFault",
            FaultKind::MissingReturnFormatError => "MissingReturnFormatError",
        };
        f.write_str(name)
    }
}

/// A non-fatal fault recorded while processing one request.
///
/// The `Display` text is exactly what the caller sees in `errorList`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestFault {
    #[error("{0}")]
    MalformedData(String),

    #[error("{0}")]
    UnknownFormat(String),

    #[error("{0}")]
    DisallowedOperation(String),

    #[error("{0}")]
    BothOrNeither(String),

    #[error("{0}")]
    UnresolvedBinding(String),

    #[error("{0}")]
    Invocation(String),

    #[error("{0}")]
    MissingReturnFormat(String),
}

impl RequestFault {
    pub fn kind(&self) -> FaultKind {
        match self {
            RequestFault::MalformedData(_) => FaultKind::MalformedDataError,
            RequestFault::UnknownFormat(_) => FaultKind::UnknownFormatError,
            RequestFault::DisallowedOperation(_) => FaultKind::DisallowedOperationError,
            RequestFault::BothOrNeither(_) => FaultKind::BothOrNeitherError,
            RequestFault::UnresolvedBinding(_) => FaultKind::UnresolvedBindingError,
            RequestFault::Invocation(_) => FaultKind::InvocationFault,
            RequestFault::MissingReturnFormat(_) => FaultKind::MissingReturnFormatError,
        }
    }
}
