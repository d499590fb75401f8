use super::*;
use crate::helper::dotprod;
use nalgebra::Matrix3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn small_cell() -> Cell {
    let lattice = Matrix3::new(5.0, 0.0, 0.0, 0.7, 6.0, 0.0, 0.0, 0.4, 4.0);
    Cell::new(lattice, [4, 6, 8], 8.0, vec![Vector3::new(1.0, 2.0, 0.5)]).unwrap()
}

fn random_matrix(rows: usize, cols: usize, seed: u64) -> DMatrix<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    DMatrix::from_fn(rows, cols, |_, _| {
        Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    })
}

fn max_diff(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>) -> f64 {
    assert_eq!(a.shape(), b.shape());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

#[test]
fn test_transform_round_trips() {
    let cell = small_cell();
    let x = random_matrix(cell.n_points(), 3, 1);
    let back = I(&cell, &J(&cell, &x, true));
    assert!(max_diff(&x, &back) < 1e-12);

    let w = random_matrix(cell.n_active(), 2, 2);
    let back = J(&cell, &I(&cell, &w), false);
    assert!(max_diff(&w, &back) < 1e-12);
}

#[test]
fn test_idag_matches_direct_sum() {
    let cell = small_cell();
    let x = random_matrix(cell.n_points(), 1, 3);
    let fast = Idag(&cell, &x);
    for (j, g) in cell.gc.iter().enumerate().step_by(5) {
        let direct: Complex64 = cell
            .r
            .iter()
            .enumerate()
            .map(|(i, r)| x[(i, 0)] * Complex64::new(0.0, -g.dot(r)).exp())
            .sum();
        assert!((fast[(j, 0)] - direct).norm() < 1e-9, "row {}", j);
    }
}

#[test]
fn test_adjoint_pairs() {
    let cell = small_cell();
    let a = random_matrix(cell.n_points(), 1, 4);
    let b = random_matrix(cell.n_points(), 1, 5);
    // <a, J b> == <Jdag a, b>
    let lhs = a.dotc(&J(&cell, &b, true));
    let rhs = Jdag(&cell, &a).dotc(&b);
    assert!((lhs - rhs).norm() < 1e-10);

    // <a, I w> == <Idag a, w>
    let w = random_matrix(cell.n_active(), 1, 6);
    let lhs = a.dotc(&I(&cell, &w));
    let rhs = Idag(&cell, &a).dotc(&w);
    assert!((lhs - rhs).norm() < 1e-9);
}

#[test]
fn test_overlap_and_laplacian_commute() {
    let cell = small_cell();
    let w = random_matrix(cell.n_active(), 4, 7);
    let ol = O(&cell, &L(&cell, &w));
    let lo = L(&cell, &O(&cell, &w));
    assert!(max_diff(&ol, &lo) < 1e-9);

    let full = random_matrix(cell.n_points(), 1, 8);
    let ol = O(&cell, &L(&cell, &full));
    let lo = L(&cell, &O(&cell, &full));
    assert!(max_diff(&ol, &lo) < 1e-9);
}

#[test]
fn test_inverse_laplacian() {
    let cell = small_cell();
    let w = random_matrix(cell.n_points(), 2, 9);
    let back = Linv(&cell, &L(&cell, &w));
    for col in 0..2 {
        assert_eq!(back[(0, col)], Complex64::new(0.0, 0.0));
    }
    let mut expected = w.clone();
    expected.row_mut(0).fill(Complex64::new(0.0, 0.0));
    assert!(max_diff(&back, &expected) < 1e-12);
}

#[test]
fn test_laplacian_shape_selection() {
    let cell = small_cell();
    let w = DMatrix::from_element(cell.n_active(), 1, Complex64::new(1.0, 0.0));
    let lw = L(&cell, &w);
    let kw = K(&cell, &w);
    for j in 0..cell.n_active() {
        assert!((lw[(j, 0)].re + cell.omega * cell.g2c[j]).abs() < 1e-10);
        assert!((kw[(j, 0)].re - 1.0 / (1.0 + cell.g2c[j])).abs() < 1e-14);
    }
}

#[test]
fn test_translation_shifts_real_space() {
    let cell = small_cell();
    let w = random_matrix(cell.n_active(), 1, 10);
    // one grid step along the first lattice vector
    let dr = cell.lattice.row(0).transpose() / cell.s[0] as f64;
    let shifted = I(&cell, &T(&cell, &w, &dr));
    let original = I(&cell, &w);
    let [s0, s1, s2] = cell.s;
    for m1 in 0..s1 {
        for m2 in 0..s2 {
            let from = (0 * s1 + m1) * s2 + m2;
            let to = (1 * s1 + m1) * s2 + m2;
            assert!((shifted[(to, 0)] - original[(from, 0)]).norm() < 1e-10);
        }
    }
    assert_eq!(s0, 4);

    let phase_only = T(&cell, &w, &Vector3::new(0.3, -1.2, 2.0));
    for j in 0..cell.n_active() {
        assert!((phase_only[(j, 0)].norm() - w[(j, 0)].norm()).abs() < 1e-14);
    }
}

#[test]
fn test_plane_wave_density_is_uniform() {
    let cell = small_cell();
    let mut w = DMatrix::zeros(cell.n_active(), 1);
    w[(3, 0)] = Complex64::new(1.0 / cell.omega.sqrt(), 0.0);
    let psi = I(&cell, &w);
    let expected = 1.0 / cell.omega;
    assert!(psi.iter().all(|z| (z.norm_sqr() - expected).abs() < 1e-14));
    // O(W)^H W == 1 for a normalized plane wave
    assert!((dotprod(&O(&cell, &w), &w) - 1.0).abs() < 1e-14);
}
