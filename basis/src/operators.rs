//! Operator algebra of the plane-wave basis in DFT++ notation.
//!
//! Every operator maps a coefficient matrix (rows = basis functions or grid points,
//! columns = states) to a new matrix. Matrices with as many rows as active G-vectors are
//! treated as active-set data, matrices with one row per grid point as full-grid data.
//!
//! Normalization follows the Arias convention:
//! - `I`    = unnormalized inverse FFT (reciprocal -> real space)
//! - `J`    = forward FFT / N (real -> reciprocal space)
//! - `Idag` = unnormalized forward FFT, restricted to the active set
//! - `Jdag` = inverse FFT / N
#![allow(non_snake_case)]

use crate::cell::Cell;
use crate::helper::{diagprod, diagprod_c};
use nalgebra::{DMatrix, DVector, Vector3};
use num_complex::Complex64;
use rayon::prelude::*;

/// Overlap operator, `Omega W`.
pub fn O(cell: &Cell, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    W.map(|w| w * cell.omega)
}

/// Laplacian, `-Omega |G|^2 W`.
pub fn L(cell: &Cell, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let g2 = g2_for(cell, W.nrows());
    let scale = g2.map(|g| -cell.omega * g);
    diagprod(&scale, W)
}

/// Inverse Laplacian on the full grid. The G = 0 row is set to zero.
pub fn Linv(cell: &Cell, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    assert_eq!(
        W.nrows(),
        cell.n_points(),
        "Linv acts on full-grid data, got {} rows",
        W.nrows()
    );
    let mut out = W.clone();
    for (i, mut row) in out.row_iter_mut().enumerate() {
        if i == 0 {
            row.fill(Complex64::new(0.0, 0.0));
        } else {
            row /= Complex64::new(-cell.omega * cell.g2[i], 0.0);
        }
    }
    out
}

/// Preconditioner, `W / (1 + |G|^2)`.
pub fn K(cell: &Cell, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let g2 = g2_for(cell, W.nrows());
    let scale = g2.map(|g| 1.0 / (1.0 + g));
    diagprod(&scale, W)
}

/// Backward transform from reciprocal to real space.
///
/// Active-set input is embedded into a zero full grid first.
pub fn I(cell: &Cell, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let full = embed(cell, W);
    transform_columns(cell, full, Direction::Inverse)
}

/// Forward transform from real to reciprocal space, scaled by `1/N`.
///
/// With `full = false` only the active G-vectors are returned.
pub fn J(cell: &Cell, W: &DMatrix<Complex64>, full: bool) -> DMatrix<Complex64> {
    assert_eq!(
        W.nrows(),
        cell.n_points(),
        "J acts on real-space data, got {} rows",
        W.nrows()
    );
    let n = cell.n_points() as f64;
    let mut out = transform_columns(cell, W.clone(), Direction::Forward);
    out.iter_mut().for_each(|z| *z /= n);
    if full {
        out
    } else {
        out.select_rows(cell.active.iter())
    }
}

/// Conjugated backward transform, restricted to the active set.
pub fn Idag(cell: &Cell, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    assert_eq!(
        W.nrows(),
        cell.n_points(),
        "Idag acts on real-space data, got {} rows",
        W.nrows()
    );
    let out = transform_columns(cell, W.clone(), Direction::Forward);
    out.select_rows(cell.active.iter())
}

/// Conjugated forward transform, inverse FFT scaled by `1/N`.
pub fn Jdag(cell: &Cell, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let n = cell.n_points() as f64;
    let full = embed(cell, W);
    let mut out = transform_columns(cell, full, Direction::Inverse);
    out.iter_mut().for_each(|z| *z /= n);
    out
}

/// Translation by `dr`, multiplies every active row by `exp(-i G.dr)`.
pub fn T(cell: &Cell, W: &DMatrix<Complex64>, dr: &Vector3<f64>) -> DMatrix<Complex64> {
    assert_eq!(W.nrows(), cell.n_active());
    let phase = DVector::from_iterator(
        cell.n_active(),
        cell.gc.iter().map(|g| Complex64::new(0.0, -g.dot(dr)).exp()),
    );
    diagprod_c(&phase, W)
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Inverse,
}

fn g2_for(cell: &Cell, rows: usize) -> &DVector<f64> {
    if rows == cell.n_active() {
        &cell.g2c
    } else {
        assert_eq!(
            rows,
            cell.n_points(),
            "Operand has {} rows, expected {} (active) or {} (full)",
            rows,
            cell.n_active(),
            cell.n_points()
        );
        &cell.g2
    }
}

fn embed(cell: &Cell, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    if W.nrows() == cell.n_points() {
        return W.clone();
    }
    assert_eq!(
        W.nrows(),
        cell.n_active(),
        "Operand has {} rows, expected {} (active) or {} (full)",
        W.nrows(),
        cell.n_active(),
        cell.n_points()
    );
    let mut full = DMatrix::zeros(cell.n_points(), W.ncols());
    for (row, &idx) in cell.active.iter().enumerate() {
        full.row_mut(idx).copy_from(&W.row(row));
    }
    full
}

// Columns are contiguous in nalgebra storage, each one is an independent 3-D transform.
fn transform_columns(
    cell: &Cell,
    mut data: DMatrix<Complex64>,
    direction: Direction,
) -> DMatrix<Complex64> {
    let rows = data.nrows();
    if rows == 0 || data.ncols() == 0 {
        return data;
    }
    let fft = cell.fft();
    data.as_mut_slice()
        .par_chunks_mut(rows)
        .for_each(|column| match direction {
            Direction::Forward => fft.forward(column),
            Direction::Inverse => fft.inverse(column),
        });
    data
}

#[cfg(test)]
mod tests;
