//! Plane-wave density functional theory
//!
//! Direct minimization of the Kohn-Sham total energy in a plane-wave basis, following
//! the DFT++ formulation: operators live in `pwbasis`, this crate adds pseudopotentials,
//! functionals, energies, minimizers and the SCF driver.

pub mod app;
pub mod config;
pub mod dft;
pub mod energies;
pub mod error;
pub mod gth;
pub mod io;
pub mod optim_impl;
pub mod potentials;
pub mod scf_impl;
pub mod system;
pub mod tools;
pub mod units;
pub mod xc;

pub use energies::Energy;
pub use error::{Result, ScfError};
pub use scf_impl::{Scf, ScfSettings, Stage};
pub use system::System;
