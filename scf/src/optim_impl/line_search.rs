//! Line minimization along the (preconditioned) steepest descent direction

use super::{check_energies, linmin_test, log_iteration, MinimizerTrace};
use crate::dft::{get_grad, precompute};
use crate::error::Result;
use crate::scf_impl::Scf;
use nalgebra::DMatrix;
use num_complex::Complex64;
use pwbasis::helper::dotprod;
use pwbasis::operators::K;

pub fn lm(scf: &mut Scf, nit: usize) -> Result<MinimizerTrace> {
    line_minimization(scf, nit, false)
}

pub fn pclm(scf: &mut Scf, nit: usize) -> Result<MinimizerTrace> {
    line_minimization(scf, nit, true)
}

fn line_minimization(scf: &mut Scf, nit: usize, precondition: bool) -> Result<MinimizerTrace> {
    let name = if precondition { "pclm" } else { "lm" };
    let mut trace = MinimizerTrace::default();
    let mut pre = precompute(scf, &scf.w)?;
    let mut dold: Vec<Option<DMatrix<Complex64>>> = vec![None; scf.system.nspin];

    for iteration in 1..=nit {
        let w0 = scf.w.clone();
        let mut updated = w0.clone();
        for spin in 0..scf.system.nspin {
            let g = get_grad(scf, spin, &w0, &pre);
            if let Some(d) = &dold[spin] {
                linmin_test(&g, d);
            }
            let d = if precondition {
                -K(&scf.system.cell, &g)
            } else {
                -g.clone()
            };
            updated[spin] = secant_step(scf, spin, &w0, &g, &d)?;
            dold[spin] = Some(d);
        }
        scf.w = updated;

        pre = scf.scf_step()?;
        let etot = scf.energies.etot();
        log_iteration(name, iteration, etot);
        if check_energies(&mut trace, etot, scf.etol) {
            break;
        }
    }
    Ok(trace)
}

/// Step along `d` to the zero of the directional derivative, estimated from the gradient at
/// a trial point `w + step d`. Only channel `spin` is moved.
pub(super) fn secant_step(
    scf: &Scf,
    spin: usize,
    w: &[DMatrix<Complex64>],
    g: &DMatrix<Complex64>,
    d: &DMatrix<Complex64>,
) -> Result<DMatrix<Complex64>> {
    let alphat = scf.step_size;
    let mut trial = w.to_vec();
    trial[spin] = &w[spin] + d * Complex64::from(alphat);
    let pre = precompute(scf, &trial)?;
    let gt = get_grad(scf, spin, &trial, &pre);
    let alpha = alphat * dotprod(g, d) / dotprod(&(g - &gt), d);
    Ok(&w[spin] + d * Complex64::from(alpha))
}
