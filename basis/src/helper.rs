#![allow(non_snake_case)]
use nalgebra::{DMatrix, DVector, Vector3};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Smallest magnitude `dotprod` returns, it ends up in minimizer denominators.
pub const DOTPROD_FLOOR: f64 = 1e-15;

/// `Re(tr(a^H b))`, floored to `DOTPROD_FLOOR` when the result is vanishingly small.
pub fn dotprod(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>) -> f64 {
    let res = a.dotc(b).re;
    if res.abs() < DOTPROD_FLOOR {
        DOTPROD_FLOOR
    } else {
        res
    }
}

/// `diag(a) B`: scale row `i` of `B` by `a[i]`.
pub fn diagprod(a: &DVector<f64>, B: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    assert_eq!(a.len(), B.nrows());
    let mut out = B.clone();
    for (i, mut row) in out.row_iter_mut().enumerate() {
        row *= Complex64::new(a[i], 0.0);
    }
    out
}

/// Same as `diagprod` for a complex diagonal.
pub fn diagprod_c(a: &DVector<Complex64>, B: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    assert_eq!(a.len(), B.nrows());
    let mut out = B.clone();
    for (i, mut row) in out.row_iter_mut().enumerate() {
        row *= a[i];
    }
    out
}

/// Lift a real grid field into a one-column complex matrix.
pub fn field(v: &DVector<f64>) -> DMatrix<Complex64> {
    DMatrix::from_iterator(v.len(), 1, v.iter().map(|&x| Complex64::new(x, 0.0)))
}

/// Lift a complex vector into a one-column matrix.
pub fn field_c(v: &DVector<Complex64>) -> DMatrix<Complex64> {
    DMatrix::from_column_slice(v.len(), 1, v.as_slice())
}

// sign(0) == 0, unlike f64::signum
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Real spherical harmonic `Y_lm` evaluated in the direction of `g`, for `l <= 3`.
///
/// Returns `None` for an undefined `(l, m)` pair.
pub fn ylm_real(l: usize, m: i32, g: &Vector3<f64>) -> Option<f64> {
    let eps = 1e-9;
    if l == 0 {
        return (m == 0).then(|| 0.5 * (1.0 / PI).sqrt());
    }

    let gm = g.norm();
    let cos_theta = if gm < eps { 0.0 } else { g.z / gm };
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = if g.x.abs() < eps {
        PI / 2.0 * sign(g.y)
    } else {
        g.y.atan2(g.x)
    };

    let (c, s) = (cos_theta, sin_theta);
    let value = match (l, m) {
        (1, -1) => 0.5 * (3.0 / PI).sqrt() * s * phi.sin(),
        (1, 0) => 0.5 * (3.0 / PI).sqrt() * c,
        (1, 1) => 0.5 * (3.0 / PI).sqrt() * s * phi.cos(),
        (2, -2) => (15.0 / 16.0 / PI).sqrt() * s.powi(2) * (2.0 * phi).sin(),
        (2, -1) => (15.0 / 4.0 / PI).sqrt() * c * s * phi.sin(),
        (2, 0) => 0.25 * (5.0 / PI).sqrt() * (3.0 * c * c - 1.0),
        (2, 1) => (15.0 / 4.0 / PI).sqrt() * c * s * phi.cos(),
        (2, 2) => (15.0 / 16.0 / PI).sqrt() * s.powi(2) * (2.0 * phi).cos(),
        (3, -3) => 0.25 * (35.0 / 2.0 / PI).sqrt() * s.powi(3) * (3.0 * phi).sin(),
        (3, -2) => 0.25 * (105.0 / PI).sqrt() * s.powi(2) * c * (2.0 * phi).sin(),
        (3, -1) => 0.25 * (21.0 / 2.0 / PI).sqrt() * s * (5.0 * c * c - 1.0) * phi.sin(),
        (3, 0) => 0.25 * (7.0 / PI).sqrt() * (5.0 * c.powi(3) - 3.0 * c),
        (3, 1) => 0.25 * (21.0 / 2.0 / PI).sqrt() * s * (5.0 * c * c - 1.0) * phi.cos(),
        (3, 2) => 0.25 * (105.0 / PI).sqrt() * s.powi(2) * c * (2.0 * phi).cos(),
        (3, 3) => 0.25 * (35.0 / 2.0 / PI).sqrt() * s.powi(3) * (3.0 * phi).cos(),
        _ => return None,
    };
    Some(value)
}

/// MINSTD Lehmer sequence, reproducible across platforms.
///
/// Produces `nspin` matrices of shape `rows x cols`, filled spin first, then row, then
/// column. Values are real and lie in `[0, 1)`. Seeds are reduced modulo `2^31 - 1`.
pub fn pseudo_uniform(nspin: usize, rows: usize, cols: usize, seed: u64) -> Vec<DMatrix<Complex64>> {
    const MULT: u64 = 48271;
    const MODULUS: u64 = (1 << 31) - 1;
    let mut x = ((seed % MODULUS) * MULT + 1) % MODULUS;
    (0..nspin)
        .map(|_| {
            let mut w = DMatrix::<Complex64>::zeros(rows, cols);
            for i in 0..rows {
                for j in 0..cols {
                    x = (x * MULT + 1) % MODULUS;
                    w[(i, j)] = Complex64::new(x as f64 / MODULUS as f64, 0.0);
                }
            }
            w
        })
        .collect()
}
