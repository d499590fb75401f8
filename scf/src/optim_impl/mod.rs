//! Direct minimizers of the total energy with respect to the expansion coefficients
//!
//! Every minimizer works on the coefficients stored in [`Scf`], spin channel by spin
//! channel, and records the total energy after each iteration:
//! - steepest descent with a fixed step
//! - line minimization, optionally preconditioned
//! - preconditioned conjugate gradient (Fletcher-Reeves, Polak-Ribiere, Hestenes-Stiefel)

mod cg;
mod line_search;
mod steepest_descent;

pub use cg::{pccg, CgForm};
pub use line_search::{lm, pclm};
pub use steepest_descent::sd;

use crate::error::{Result, ScfError};
use crate::scf_impl::Scf;
use nalgebra::DMatrix;
use num_complex::Complex64;
use pwbasis::helper::dotprod;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Minimizer {
    SteepestDescent,
    LineMinimization,
    PreconditionedLineMinimization,
    PreconditionedConjugateGradient,
}

impl FromStr for Minimizer {
    type Err = ScfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sd" => Ok(Self::SteepestDescent),
            "lm" => Ok(Self::LineMinimization),
            "pclm" => Ok(Self::PreconditionedLineMinimization),
            "pccg" => Ok(Self::PreconditionedConjugateGradient),
            _ => Err(ScfError::UnknownMinimizer(s.to_string())),
        }
    }
}

impl fmt::Display for Minimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SteepestDescent => "sd",
            Self::LineMinimization => "lm",
            Self::PreconditionedLineMinimization => "pclm",
            Self::PreconditionedConjugateGradient => "pccg",
        };
        write!(f, "{}", name)
    }
}

impl Minimizer {
    /// Run at most `nit` iterations on the coefficients of `scf`.
    pub fn run(&self, scf: &mut Scf, nit: usize) -> Result<MinimizerTrace> {
        match self {
            Self::SteepestDescent => sd(scf, nit),
            Self::LineMinimization => lm(scf, nit),
            Self::PreconditionedLineMinimization => pclm(scf, nit),
            Self::PreconditionedConjugateGradient => {
                let cgform = scf.cgform;
                pccg(scf, nit, cgform)
            }
        }
    }
}

/// Total energies of one minimizer run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinimizerTrace {
    pub energies: Vec<f64>,
    /// Indices into `energies` where the energy went up
    pub increases: Vec<usize>,
    pub converged: bool,
}

impl MinimizerTrace {
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.energies.last().copied()
    }

    /// Append the trace of a following run, shifting its increase indices.
    pub fn extend(&mut self, other: &MinimizerTrace) {
        let offset = self.energies.len();
        self.energies.extend_from_slice(&other.energies);
        self.increases
            .extend(other.increases.iter().map(|i| i + offset));
        self.converged = other.converged;
    }
}

/// Record `etot` and test for convergence.
///
/// An energy increase is logged and stored in the trace but does not stop the run.
pub fn check_energies(trace: &mut MinimizerTrace, etot: f64, etol: f64) -> bool {
    trace.energies.push(etot);
    let n = trace.energies.len();
    if n < 2 {
        return false;
    }
    let (previous, current) = (trace.energies[n - 2], trace.energies[n - 1]);
    if current > previous {
        warn!(
            "Total energy is not decreasing: {:+.9} -> {:+.9} Eh",
            previous, current
        );
        trace.increases.push(n - 1);
    }
    trace.converged = (previous - current).abs() < etol;
    trace.converged
}

fn log_iteration(name: &str, iteration: usize, etot: f64) {
    info!("{:>5} {:>4}: Etot = {:+.9} Eh", name, iteration, etot);
}

/// Angle between the new gradient and the previous direction, zero after an exact line search.
fn linmin_test(g: &DMatrix<Complex64>, dold: &DMatrix<Complex64>) {
    let value = dotprod(g, dold) / (dotprod(g, g) * dotprod(dold, dold)).sqrt();
    debug!("linmin test: {:+.6e}", value);
}

/// Conjugation of successive preconditioned gradients.
fn cg_test(
    g: &DMatrix<Complex64>,
    kg: &DMatrix<Complex64>,
    gold: &DMatrix<Complex64>,
    kgold: &DMatrix<Complex64>,
) {
    let value = dotprod(g, kgold) / (dotprod(g, kg) * dotprod(gold, kgold)).sqrt();
    debug!("cg test: {:+.6e}", value);
}
