//! Read-only descriptor of the real-space grid and the plane-wave basis.

extern crate nalgebra as na;

use crate::error::BasisError;
use crate::fft::Fft3d;
use itertools::iproduct;
use na::{DVector, Matrix3, Vector3};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Grid and basis of a periodic cell.
///
/// `lattice` holds the lattice vectors as rows. Grid points and G-vectors are stored in
/// row-major flat order (`m2` fastest). The active set contains the flat indices of all
/// G-vectors with `|G|^2 <= 2 ecut`, in ascending order.
#[derive(Debug, Clone)]
pub struct Cell {
    pub lattice: Matrix3<f64>,
    pub s: [usize; 3],
    pub ecut: f64,
    pub omega: f64,
    pub r: Vec<Vector3<f64>>,
    pub g: Vec<Vector3<f64>>,
    pub g2: DVector<f64>,
    pub active: Vec<usize>,
    pub gc: Vec<Vector3<f64>>,
    pub g2c: DVector<f64>,
    /// Atom positions in bohr
    pub x: Vec<Vector3<f64>>,
    /// Structure factors `exp(i G.X_ia)` over the full grid, one per atom
    pub sf: Vec<DVector<Complex64>>,
    recip: Matrix3<f64>,
    fft: Fft3d,
}

impl Cell {
    pub fn new(
        lattice: Matrix3<f64>,
        s: [usize; 3],
        ecut: f64,
        x: Vec<Vector3<f64>>,
    ) -> Result<Cell, BasisError> {
        if s.iter().any(|&n| n == 0) {
            return Err(BasisError::InvalidSampling(s));
        }
        if let Some(axis) = s.iter().position(|&n| n % 2 != 0) {
            return Err(BasisError::OddSampling { sampling: s, axis });
        }
        if !(ecut > 0.0) {
            return Err(BasisError::InvalidCutoff(ecut));
        }
        let omega = lattice.determinant().abs();
        let inv = match lattice.try_inverse() {
            Some(inv) if omega > 1e-12 => inv,
            _ => return Err(BasisError::SingularLattice(omega)),
        };
        // columns are the reciprocal lattice vectors, b_j . R_k = 2 pi delta_jk
        let recip = inv * (2.0 * PI);

        let n_points: usize = s.iter().product();
        let mut r = Vec::with_capacity(n_points);
        let mut g = Vec::with_capacity(n_points);
        for (m0, m1, m2) in iproduct!(0..s[0], 0..s[1], 0..s[2]) {
            let m = [m0, m1, m2];
            let frac = Vector3::from_fn(|k, _| m[k] as f64 / s[k] as f64);
            r.push(lattice.transpose() * frac);
            let n = Vector3::from_fn(|k, _| wrap_index(m[k], s[k]) as f64);
            g.push(recip * n);
        }
        let g2 = DVector::from_iterator(n_points, g.iter().map(|gv| gv.norm_squared()));

        let active: Vec<usize> = (0..n_points).filter(|&i| g2[i] <= 2.0 * ecut).collect();
        let gc = active.iter().map(|&i| g[i]).collect();
        let g2c = DVector::from_iterator(active.len(), active.iter().map(|&i| g2[i]));

        let sf = x
            .iter()
            .map(|xa| {
                DVector::from_iterator(
                    n_points,
                    g.iter().map(|gv| Complex64::new(0.0, gv.dot(xa)).exp()),
                )
            })
            .collect();

        Ok(Cell {
            lattice,
            s,
            ecut,
            omega,
            r,
            g,
            g2,
            active,
            gc,
            g2c,
            x,
            sf,
            recip,
            fft: Fft3d::new(s),
        })
    }

    /// Cubic cell with edge length `a`.
    pub fn cubic(
        a: f64,
        s: [usize; 3],
        ecut: f64,
        x: Vec<Vector3<f64>>,
    ) -> Result<Cell, BasisError> {
        Cell::new(Matrix3::from_diagonal_element(a), s, ecut, x)
    }

    pub fn n_points(&self) -> usize {
        self.g2.len()
    }

    pub fn n_active(&self) -> usize {
        self.active.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.x.len()
    }

    pub fn fft(&self) -> &Fft3d {
        &self.fft
    }

    /// Reciprocal lattice vectors as columns.
    pub fn reciprocal(&self) -> Matrix3<f64> {
        self.recip
    }

    /// Geometric centre of the cell, half the sum of the lattice vectors.
    pub fn center(&self) -> Vector3<f64> {
        self.lattice.row_sum().transpose() * 0.5
    }
}

/// Map a grid index onto the symmetric integer range: `m - s` when `m > s/2`.
fn wrap_index(m: usize, s: usize) -> i64 {
    if 2 * m > s {
        m as i64 - s as i64
    } else {
        m as i64
    }
}
