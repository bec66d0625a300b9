use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use k_nn::KnnError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::evaluation::RaggedMatrix;
use crate::loader::LoadError;

/// Result type alias for decision system runs.
pub type Result<T> = std::result::Result<T, DsrError>;

/// Which of the two systems of a run an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemRole {
    Training,
    Test,
}

impl Display for SystemRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SystemRole::Training => f.write_str("training"),
            SystemRole::Test => f.write_str("test"),
        }
    }
}

/// Errors of a full classification run.
#[derive(Debug, Error)]
pub enum DsrError {
    #[error("failed to load the {role} system from {}", .path.display())]
    Load {
        role: SystemRole,
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("training objects have {training} descriptors but test objects have {test}")]
    DimensionMismatch { training: usize, test: usize },
    #[error("classification failed")]
    Classification(#[from] KnnError),
    #[error("cannot reshape the comparison table")]
    Table(#[from] RaggedMatrix),
}
