//! Steepest descent with a fixed step size

use super::{check_energies, log_iteration, MinimizerTrace};
use crate::dft::{get_grad, precompute};
use crate::error::Result;
use crate::scf_impl::Scf;
use nalgebra::DMatrix;
use num_complex::Complex64;

/// `W <- W - step g` for every spin channel, all gradients taken at the same `W`.
pub fn sd(scf: &mut Scf, nit: usize) -> Result<MinimizerTrace> {
    let mut trace = MinimizerTrace::default();
    let alpha = Complex64::from(scf.step_size);
    let mut pre = precompute(scf, &scf.w)?;

    for iteration in 1..=nit {
        let mut grads: Vec<DMatrix<Complex64>> = Vec::with_capacity(scf.system.nspin);
        for spin in 0..scf.system.nspin {
            grads.push(get_grad(scf, spin, &scf.w, &pre));
        }
        for (w, g) in scf.w.iter_mut().zip(grads.iter()) {
            *w -= g * alpha;
        }

        pre = scf.scf_step()?;
        let etot = scf.energies.etot();
        log_iteration("sd", iteration, etot);
        if check_energies(&mut trace, etot, scf.etol) {
            break;
        }
    }
    Ok(trace)
}
