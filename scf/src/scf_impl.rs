//! Self-consistent field driver for plane-wave DFT
//!
//! [`Scf`] holds everything that stays fixed during a calculation (system, functional,
//! potentials, projectors, Ewald energy) together with the current expansion coefficients
//! and runs the configured sequence of minimizers on them.

use crate::dft::{get_epsilon, get_psi, precompute, Guess, Precomputed};
use crate::energies::{get_eewald, get_energies, get_esic, Energy};
use crate::error::{Result, ScfError};
use crate::gth::{load_table, GthTable, NonLocal};
use crate::optim_impl::{CgForm, Minimizer, MinimizerTrace};
use crate::potentials::LocalPotential;
use crate::system::System;
use crate::xc::{UnknownXcPolicy, Xc};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// One minimizer run of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub minimizer: Minimizer,
    pub steps: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScfSettings {
    /// `"exchange,correlation"`
    pub xc: String,
    pub unknown_xc: UnknownXcPolicy,
    pub pot: LocalPotential,
    pub guess: Guess,
    /// Convergence threshold on the total energy difference
    pub etol: f64,
    pub cgform: CgForm,
    pub stages: Vec<Stage>,
    /// Evaluate the self-interaction correction after convergence
    pub sic: bool,
    /// Step of steepest descent and trial step of the line searches
    pub step_size: f64,
    /// Directory with `<symbol>-q<charge>.gth` files
    pub gth_path: Option<PathBuf>,
}

impl Default for ScfSettings {
    fn default() -> Self {
        ScfSettings {
            xc: "lda,vwn".to_string(),
            unknown_xc: UnknownXcPolicy::default(),
            pot: LocalPotential::default(),
            guess: Guess::default(),
            etol: 1e-7,
            cgform: CgForm::default(),
            stages: vec![
                Stage {
                    minimizer: Minimizer::SteepestDescent,
                    steps: 25,
                },
                Stage {
                    minimizer: Minimizer::PreconditionedConjugateGradient,
                    steps: 250,
                },
            ],
            sic: false,
            step_size: 3e-5,
            gth_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scf {
    pub system: System,
    pub xc: Xc,
    pub pot: LocalPotential,
    pub guess: Guess,
    pub etol: f64,
    pub cgform: CgForm,
    pub stages: Vec<Stage>,
    pub sic: bool,
    pub step_size: f64,
    pub gth: Option<GthTable>,
    /// Local potential on the real-space grid
    pub vloc: DVector<Complex64>,
    pub nonlocal: NonLocal,
    /// Unconstrained expansion coefficients per spin channel, `Nactive x Ns`
    pub w: Vec<DMatrix<Complex64>>,
    pub energies: Energy,
    /// Total energies of all stages run so far
    pub trace: MinimizerTrace,
    pub converged: bool,
}

impl Scf {
    /// Set up potentials, projectors and the Ewald energy, then build the initial guess.
    pub fn new(system: System, settings: ScfSettings) -> Result<Scf> {
        let xc = Xc::parse(&settings.xc, settings.unknown_xc)?;
        if xc.is_mock() {
            warn!("Both exchange and correlation are mock functionals");
        }

        let gth = match settings.pot {
            LocalPotential::Gth => {
                let dir = settings.gth_path.as_ref().ok_or_else(|| {
                    ScfError::Config("pot: gth needs a gth_path with pseudopotential files".into())
                })?;
                Some(load_table(&system, dir)?)
            }
            _ => None,
        };
        let vloc = settings.pot.init(&system, gth.as_ref())?;
        let nonlocal = match &gth {
            Some(table) => NonLocal::build(&system, table)?,
            None => NonLocal::empty(&system),
        };
        let energies = Energy {
            eewald: get_eewald(&system.cell, &system.z),
            ..Default::default()
        };

        let mut scf = Scf {
            system,
            xc,
            pot: settings.pot,
            guess: settings.guess,
            etol: settings.etol,
            cgform: settings.cgform,
            stages: settings.stages,
            sic: settings.sic,
            step_size: settings.step_size,
            gth,
            vloc,
            nonlocal,
            w: Vec::new(),
            energies,
            trace: MinimizerTrace::default(),
            converged: false,
        };
        scf.w = scf.guess.init(&scf)?;
        info!(
            "SCF setup: xc={}, pot={}, guess={}, Nactive={}, Eewald={:+.9} Eh",
            scf.xc,
            scf.pot,
            scf.guess,
            scf.system.cell.n_active(),
            scf.energies.eewald
        );
        Ok(scf)
    }

    /// Energy evaluation at the current coefficients; the returned data feeds the next gradient.
    pub fn scf_step(&mut self) -> Result<Precomputed> {
        let pre = precompute(self, &self.w)?;
        self.energies = get_energies(self, &pre, false)?;
        Ok(pre)
    }

    /// Run all stages and return the total energy.
    ///
    /// The run stops early once the last two recorded energies differ by less than `etol`.
    /// An unconverged calculation is reported with a warning, not an error.
    pub fn run(&mut self) -> Result<f64> {
        let start = Instant::now();
        self.trace = MinimizerTrace::default();
        self.converged = false;
        self.scf_step()?;
        info!("Initial total energy: {:+.9} Eh", self.energies.etot());

        let stages = self.stages.clone();
        for stage in &stages {
            let stage_start = Instant::now();
            info!("Start {} minimization ({} steps)", stage.minimizer, stage.steps);
            let trace = stage.minimizer.run(self, stage.steps)?;
            self.trace.extend(&trace);
            info!(
                "{} finished after {} iteration(s) in {:.3} s",
                stage.minimizer,
                trace.len(),
                stage_start.elapsed().as_secs_f64()
            );
            if self.trace_converged() {
                self.converged = true;
                break;
            }
        }

        if self.converged {
            info!("SCF converged after {} iteration(s)", self.trace.len());
        } else {
            warn!("SCF not converged!");
        }
        if !self.trace.increases.is_empty() {
            warn!(
                "Total energy increased in {} iteration(s)",
                self.trace.increases.len()
            );
        }

        if self.sic {
            let pre = precompute(self, &self.w)?;
            self.energies.esic = get_esic(&self.system.cell, &self.xc, &self.system.f, &pre.y)?;
        }
        info!("Total SCF time: {:.3} s", start.elapsed().as_secs_f64());
        info!("Energies:\n{}", self.energies);
        Ok(self.energies.etot())
    }

    fn trace_converged(&self) -> bool {
        let e = &self.trace.energies;
        e.len() > 1 && (e[e.len() - 2] - e[e.len() - 1]).abs() < self.etol
    }

    /// Kohn-Sham eigenvalues per spin channel at the current coefficients.
    pub fn epsilon(&self) -> Result<Vec<DVector<f64>>> {
        get_epsilon(self, &self.w, None)
    }

    /// Kohn-Sham orbitals per spin channel at the current coefficients.
    pub fn psi(&self) -> Result<Vec<DMatrix<Complex64>>> {
        get_psi(self, &self.w, None)
    }
}

#[cfg(test)]
mod tests;
