// Plane-wave basis: grid descriptor, 3-D transforms and the operator algebra

pub mod cell;
pub mod error;
pub mod fft;
pub mod helper;
pub mod operators;

pub use cell::Cell;
pub use error::BasisError;
pub use fft::Fft3d;
