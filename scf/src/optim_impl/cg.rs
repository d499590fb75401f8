//! Preconditioned conjugate gradient

use super::line_search::secant_step;
use super::{cg_test, check_energies, linmin_test, log_iteration, MinimizerTrace};
use crate::dft::{get_grad, precompute};
use crate::error::{Result, ScfError};
use crate::scf_impl::Scf;
use nalgebra::DMatrix;
use num_complex::Complex64;
use pwbasis::helper::dotprod;
use pwbasis::operators::K;
use std::fmt;

/// Formula for the conjugation coefficient `beta`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CgForm {
    #[default]
    FletcherReeves,
    PolakRibiere,
    HestenesStiefel,
}

impl TryFrom<u8> for CgForm {
    type Error = ScfError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::FletcherReeves),
            2 => Ok(Self::PolakRibiere),
            3 => Ok(Self::HestenesStiefel),
            _ => Err(ScfError::Config(format!(
                "cgform has to be 1, 2 or 3, got {}",
                value
            ))),
        }
    }
}

impl fmt::Display for CgForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FletcherReeves => "Fletcher-Reeves",
            Self::PolakRibiere => "Polak-Ribiere",
            Self::HestenesStiefel => "Hestenes-Stiefel",
        };
        write!(f, "{}", name)
    }
}

impl CgForm {
    fn beta(
        &self,
        g: &DMatrix<Complex64>,
        kg: &DMatrix<Complex64>,
        gold: &DMatrix<Complex64>,
        kgold: &DMatrix<Complex64>,
        dold: &DMatrix<Complex64>,
    ) -> f64 {
        match self {
            Self::FletcherReeves => dotprod(g, kg) / dotprod(gold, kgold),
            Self::PolakRibiere => dotprod(&(g - gold), kg) / dotprod(gold, kgold),
            Self::HestenesStiefel => {
                let dg = g - gold;
                dotprod(&dg, kg) / dotprod(&dg, dold)
            }
        }
    }
}

/// `d = -K(g) + beta dold`, the first iteration uses `d = -K(g)`.
pub fn pccg(scf: &mut Scf, nit: usize, cgform: CgForm) -> Result<MinimizerTrace> {
    let mut trace = MinimizerTrace::default();
    let mut pre = precompute(scf, &scf.w)?;
    // (gold, dold) per spin channel
    let mut history: Vec<Option<(DMatrix<Complex64>, DMatrix<Complex64>)>> =
        vec![None; scf.system.nspin];

    for iteration in 1..=nit {
        let w0 = scf.w.clone();
        let mut updated = w0.clone();
        for spin in 0..scf.system.nspin {
            let cell = &scf.system.cell;
            let g = get_grad(scf, spin, &w0, &pre);
            let kg = K(cell, &g);
            let d = match &history[spin] {
                None => -&kg,
                Some((gold, dold)) => {
                    let kgold = K(cell, gold);
                    linmin_test(&g, dold);
                    cg_test(&g, &kg, gold, &kgold);
                    let beta = cgform.beta(&g, &kg, gold, &kgold, dold);
                    -&kg + dold * Complex64::from(beta)
                }
            };
            updated[spin] = secant_step(scf, spin, &w0, &g, &d)?;
            history[spin] = Some((g, d));
        }
        scf.w = updated;

        pre = scf.scf_step()?;
        let etot = scf.energies.etot();
        log_iteration("pccg", iteration, etot);
        if check_energies(&mut trace, etot, scf.etol) {
            break;
        }
    }
    Ok(trace)
}
