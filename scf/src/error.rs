use pwbasis::BasisError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScfError {
    #[error(transparent)]
    Basis(#[from] BasisError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No GTH pseudopotential for \"{symbol}\" in {}", .dir.display())]
    MissingPseudopotential { symbol: String, dir: PathBuf },

    #[error("Malformed GTH pseudopotential {}: {reason}", .path.display())]
    Pseudopotential { path: PathBuf, reason: String },

    #[error("No GTH projector defined for l={l}, iprj={iprj}")]
    ProjectorChannel { l: usize, iprj: usize },

    #[error("No minimizer found for \"{0}\"")]
    UnknownMinimizer(String),

    #[error("No potential found for \"{0}\"")]
    UnknownPotential(String),

    #[error("No guess found for \"{0}\"")]
    UnknownGuess(String),

    #[error("No functional found for \"{0}\"")]
    UnknownFunctional(String),

    #[error("Exchange-correlation evaluation failed: {0}")]
    Functional(String),

    #[error("Unable to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScfError>;
