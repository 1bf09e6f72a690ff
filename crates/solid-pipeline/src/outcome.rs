use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use solid_core::PathError;
use solid_kernel::KernelError;
use thiserror::Error;

pub const GENERATED_MESSAGE: &str = "generated";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("empty prompt")]
    EmptyPrompt,
    #[error("{0}")]
    KernelUnavailable(KernelError),
    #[error("shape not recognized")]
    UnrecognizedPrompt,
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("{0}")]
    Kernel(KernelError),
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::EmptyPrompt => FailureKind::EmptyPrompt,
            PipelineError::KernelUnavailable(_) => FailureKind::KernelUnavailable,
            PipelineError::UnrecognizedPrompt => FailureKind::UnrecognizedPrompt,
            PipelineError::Path(_) => FailureKind::Path,
            PipelineError::Kernel(_) => FailureKind::KernelCall,
        }
    }
}

/// Stage at which a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    EmptyPrompt,
    KernelUnavailable,
    UnrecognizedPrompt,
    Path,
    KernelCall,
}

impl FailureKind {
    /// Whether the user can fix the failure without restarting: rephrase the
    /// prompt or pick another output directory. A kernel that failed to load
    /// stays unavailable; a failed call may succeed on the next prompt but
    /// usually points at the module itself.
    pub fn is_recoverable(self) -> bool {
        match self {
            FailureKind::EmptyPrompt | FailureKind::UnrecognizedPrompt | FailureKind::Path => true,
            FailureKind::KernelUnavailable | FailureKind::KernelCall => false,
        }
    }
}

/// Terminal result of one pipeline run, handed to the presentation shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub succeeded: bool,
    pub path: Option<PathBuf>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl Outcome {
    pub fn generated(path: PathBuf) -> Self {
        Self {
            succeeded: true,
            path: Some(path),
            message: GENERATED_MESSAGE.to_string(),
            failure: None,
        }
    }

    pub fn failed(error: &PipelineError) -> Self {
        Self {
            succeeded: false,
            path: None,
            message: error.to_string(),
            failure: Some(error.kind()),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.failure.is_some_and(FailureKind::is_recoverable)
    }
}
