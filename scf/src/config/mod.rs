//! Configuration management for plane-wave calculations
//!
//! This module handles the YAML input, its defaults and the translation into
//! [`ScfSettings`].

mod args;

pub use args::Args;

use crate::dft::Guess;
use crate::error::{Result, ScfError};
use crate::optim_impl::{CgForm, Minimizer};
use crate::potentials::LocalPotential;
use crate::scf_impl::{ScfSettings, Stage};
use crate::xc::UnknownXcPolicy;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub cell: CellConfig,
    pub atoms: Vec<Atom>,
    pub scf: Option<ScfParams>,
}

/// Simulation cell and real-space grid
#[derive(Debug, Deserialize, Serialize)]
pub struct CellConfig {
    /// Cubic lattice constant, ignored when `lattice` is given
    pub a: Option<f64>,
    /// Lattice vectors as rows
    pub lattice: Option<[[f64; 3]; 3]>,
    pub sampling: Sampling,
    pub ecut: f64,
}

/// Grid points per axis, one value for all axes or one per axis.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Sampling {
    Uniform(usize),
    PerAxis([usize; 3]),
}

impl Sampling {
    pub fn per_axis(&self) -> [usize; 3] {
        match *self {
            Sampling::Uniform(s) => [s; 3],
            Sampling::PerAxis(s) => s,
        }
    }
}

/// Atom position in Bohr
#[derive(Debug, Deserialize, Serialize)]
pub struct Atom {
    pub element: String,
    pub position: [f64; 3],
    /// Valence charge, defaults to the pseudopotential charge or the atomic number
    pub charge: Option<f64>,
}

/// One minimizer stage, e.g. `{method: sd, steps: 25}`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StageParams {
    pub method: String,
    pub steps: usize,
}

/// SCF-specific parameters
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScfParams {
    pub xc: Option<String>,
    pub unknown_xc: Option<String>,
    pub pot: Option<String>,
    pub guess: Option<String>,
    pub etol: Option<f64>,
    pub cgform: Option<u8>,
    pub min: Option<Vec<StageParams>>,
    pub sic: Option<bool>,
    pub nspin: Option<usize>,
    pub step_size: Option<f64>,
    /// Directory with GTH files, relative to the configuration file
    pub gth_path: Option<String>,
}

impl Default for ScfParams {
    fn default() -> Self {
        ScfParams {
            xc: Some("lda,vwn".to_string()),
            unknown_xc: Some("warn".to_string()),
            pot: Some("gth".to_string()),
            guess: Some("gaussian".to_string()),
            etol: Some(1e-7),
            cgform: Some(1),
            min: Some(vec![
                StageParams {
                    method: "sd".to_string(),
                    steps: 25,
                },
                StageParams {
                    method: "pccg".to_string(),
                    steps: 250,
                },
            ]),
            sic: Some(false),
            nspin: Some(1),
            step_size: Some(3e-5),
            gth_path: None,
        }
    }
}

impl ScfParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.xc.is_none() {
            self.xc = defaults.xc;
        }
        if self.unknown_xc.is_none() {
            self.unknown_xc = defaults.unknown_xc;
        }
        if self.pot.is_none() {
            self.pot = defaults.pot;
        }
        if self.guess.is_none() {
            self.guess = defaults.guess;
        }
        if self.etol.is_none() {
            self.etol = defaults.etol;
        }
        if self.cgform.is_none() {
            self.cgform = defaults.cgform;
        }
        if self.min.is_none() {
            self.min = defaults.min;
        }
        if self.sic.is_none() {
            self.sic = defaults.sic;
        }
        if self.nspin.is_none() {
            self.nspin = defaults.nspin;
        }
        if self.step_size.is_none() {
            self.step_size = defaults.step_size;
        }
        self
    }

    /// Validate names and build the settings of the SCF driver.
    ///
    /// Unknown minimizers, potentials and guesses fail here, before any computation.
    pub fn to_settings(&self, base_dir: &Path) -> Result<ScfSettings> {
        let defaults = ScfSettings::default();
        let stages = match &self.min {
            Some(min) => min
                .iter()
                .map(|stage| {
                    Ok(Stage {
                        minimizer: stage.method.parse::<Minimizer>()?,
                        steps: stage.steps,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            None => defaults.stages,
        };
        let etol = self.etol.unwrap_or(defaults.etol);
        if etol <= 0.0 {
            return Err(ScfError::Config(format!("etol has to be positive, got {}", etol)));
        }
        Ok(ScfSettings {
            xc: self.xc.clone().unwrap_or(defaults.xc),
            unknown_xc: match &self.unknown_xc {
                Some(policy) => policy.parse::<UnknownXcPolicy>()?,
                None => defaults.unknown_xc,
            },
            pot: match &self.pot {
                Some(pot) => pot.parse::<LocalPotential>()?,
                None => defaults.pot,
            },
            guess: match &self.guess {
                Some(guess) => guess.parse::<Guess>()?,
                None => defaults.guess,
            },
            etol,
            cgform: match self.cgform {
                Some(form) => CgForm::try_from(form)?,
                None => defaults.cgform,
            },
            stages,
            sic: self.sic.unwrap_or(defaults.sic),
            step_size: self.step_size.unwrap_or(defaults.step_size),
            gth_path: self.gth_path.as_ref().map(|p| base_dir.join(p)),
        })
    }
}

impl Config {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        self.scf = Some(self.scf.unwrap_or_default().with_defaults());
        self
    }

    /// Command-line values take precedence over the file.
    pub fn apply_args(&mut self, args: &Args) {
        let scf = self.scf.get_or_insert_with(ScfParams::default);
        if let Some(etol) = args.etol {
            scf.etol = Some(etol);
        }
        if let Some(cgform) = args.cgform {
            scf.cgform = Some(cgform);
        }
        if let Some(xc) = &args.xc {
            scf.xc = Some(xc.clone());
        }
        if let Some(pot) = &args.pot {
            scf.pot = Some(pot.clone());
        }
        if let Some(guess) = &args.guess {
            scf.guess = Some(guess.clone());
        }
        if let Some(nspin) = args.nspin {
            scf.nspin = Some(nspin);
        }
    }

    pub fn scf_params(&self) -> ScfParams {
        self.scf.clone().unwrap_or_default().with_defaults()
    }

    /// Lattice vectors as rows.
    pub fn lattice(&self) -> Result<Matrix3<f64>> {
        match (&self.cell.lattice, self.cell.a) {
            (Some(rows), _) => Ok(Matrix3::from_fn(|i, j| rows[i][j])),
            (None, Some(a)) => Ok(Matrix3::identity() * a),
            (None, None) => Err(ScfError::Config(
                "cell needs either a lattice constant a or lattice vectors".into(),
            )),
        }
    }
}
