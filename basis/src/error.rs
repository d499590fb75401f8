use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BasisError {
    #[error("Sampling must be positive along every axis, got {0:?}")]
    InvalidSampling([usize; 3]),

    #[error("Sampling {sampling:?} is odd along axis {axis}; every grid dimension has to be even")]
    OddSampling { sampling: [usize; 3], axis: usize },

    #[error("Lattice vectors are linearly dependent (cell volume {0:e})")]
    SingularLattice(f64),

    #[error("Cutoff energy must be positive, got {0}")]
    InvalidCutoff(f64),
}
