//! Physical properties and sanity checks evaluated on a finished calculation.

use crate::dft::{get_epsilon, get_n_total, orth_all};
use crate::error::Result;
use crate::scf_impl::Scf;
use crate::system::System;
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use num_complex::Complex64;
use pwbasis::Cell;
use std::f64::consts::PI;
use tracing::{debug, info, warn};

/// Real-space grid spacing in bohr resolving plane waves up to the cutoff `ecut` (Hartree).
///
/// Phys. Rev. B 54, 14362.
pub fn cutoff2gridspacing(ecut: f64) -> f64 {
    PI / (2.0 * ecut).sqrt()
}

/// Inverse of [`cutoff2gridspacing`].
pub fn gridspacing2cutoff(h: f64) -> f64 {
    0.5 * (PI / h).powi(2)
}

/// Weighted mean of `coords`, unit weights when `masses` is `None`.
pub fn center_of_mass(coords: &[Vector3<f64>], masses: Option<&[f64]>) -> Vector3<f64> {
    let ones = vec![1.0; coords.len()];
    let masses = masses.unwrap_or(&ones);
    let total: f64 = masses.iter().sum();
    coords
        .iter()
        .zip(masses.iter())
        .fold(Vector3::zeros(), |acc, (x, m)| acc + x * *m)
        / total
}

/// Inertia tensor of point masses, unit weights when `masses` is `None`.
pub fn inertia_tensor(coords: &[Vector3<f64>], masses: Option<&[f64]>) -> Matrix3<f64> {
    let ones = vec![1.0; coords.len()];
    let masses = masses.unwrap_or(&ones);
    coords
        .iter()
        .zip(masses.iter())
        .fold(Matrix3::zeros(), |acc, (x, m)| {
            acc + (Matrix3::identity() * x.norm_squared() - x * x.transpose()) * *m
        })
}

/// Electric dipole moment `sum_a Z_a X_a - int n(r) r dr` in e bohr.
///
/// The density is not unfolded across cell boundaries, so off-centre molecules give
/// meaningless values.
pub fn get_dipole(system: &System, n: &DVector<f64>) -> Vector3<f64> {
    let cell = &system.cell;
    let dv = cell.omega / cell.n_points() as f64;
    let nuclei = cell
        .x
        .iter()
        .zip(system.z.iter())
        .fold(Vector3::zeros(), |acc, (x, z)| acc + x * *z);
    let electrons = cell
        .r
        .iter()
        .zip(n.iter())
        .fold(Vector3::zeros(), |acc, (r, ni)| acc + r * *ni);
    nuclei - electrons * dv
}

/// Highest eigenvalue of an occupied state over all spin channels.
pub fn homo(epsilon: &[DVector<f64>], f: &[DVector<f64>]) -> Option<f64> {
    epsilon
        .iter()
        .zip(f.iter())
        .flat_map(|(eps, occ)| {
            eps.iter()
                .zip(occ.iter())
                .filter(|&(_, &fi)| fi > 0.0)
                .map(|(&e, _)| e)
        })
        .reduce(f64::max)
}

/// Ionization potential from Koopmans' theorem, `-eps_HOMO`.
pub fn get_ip(scf: &Scf) -> Result<f64> {
    let epsilon = get_epsilon(scf, &scf.w, None)?;
    Ok(homo(&epsilon, &scf.system.f).map_or(0.0, |e| -e))
}

/// Electron density of the current coefficients.
pub fn get_density(scf: &Scf) -> DVector<f64> {
    let cell = &scf.system.cell;
    get_n_total(cell, &scf.system.f, &orth_all(cell, &scf.w))
}

/// `int conj(func_i) func_j dr` over the cell for columns `i, j` of real-space functions.
fn overlap(cell: &Cell, func: &DMatrix<Complex64>, i: usize, j: usize) -> Complex64 {
    let dv = cell.omega / cell.n_points() as f64;
    func.column(i).dotc(&func.column(j)) * dv
}

/// Pairwise orthogonality of the columns of `func`, sampled on the real-space grid.
pub fn check_ortho(cell: &Cell, func: &DMatrix<Complex64>, eps: f64) -> bool {
    if func.ncols() < 2 {
        warn!("Need at least two functions to check their orthogonality");
        return true;
    }
    let mut ortho = true;
    for i in 0..func.ncols() {
        for j in i + 1..func.ncols() {
            let value = overlap(cell, func, i, j);
            let ok = value.norm() < eps;
            debug!("Functions {} and {}: {:.7} orthogonal: {}", i, j, value, ok);
            ortho &= ok;
        }
    }
    info!("Orthogonal: {}", ortho);
    ortho
}

/// Unit norm of every column of `func`, sampled on the real-space grid.
pub fn check_norm(cell: &Cell, func: &DMatrix<Complex64>, eps: f64) -> bool {
    let mut norm = true;
    for i in 0..func.ncols() {
        let value = overlap(cell, func, i, i);
        let ok = (1.0 - value).norm() < eps;
        debug!("Function {}: {:.7} normalized: {}", i, value, ok);
        norm &= ok;
    }
    info!("Normalized: {}", norm);
    norm
}

pub fn check_orthonorm(cell: &Cell, func: &DMatrix<Complex64>) -> bool {
    let ortho = check_ortho(cell, func, 1e-9);
    let norm = check_norm(cell, func, 1e-9);
    info!("Orthonormal: {}", ortho && norm);
    ortho && norm
}

#[cfg(test)]
mod tests;
