use super::*;
use crate::dft::{orth, Guess};
use crate::potentials::LocalPotential;
use crate::scf_impl::ScfSettings;
use pwbasis::operators::I;

fn harmonic_scf(z: f64, guess: Guess) -> Scf {
    let cell = Cell::cubic(6.0, [10, 10, 10], 3.0, vec![Vector3::new(3.0, 3.0, 3.0)]).unwrap();
    let system = System::new(cell, vec!["X".into()], vec![z], 1).unwrap();
    let settings = ScfSettings {
        pot: LocalPotential::Harmonic,
        guess,
        ..Default::default()
    };
    Scf::new(system, settings).unwrap()
}

#[test]
fn test_cutoff_and_grid_spacing() {
    assert!((cutoff2gridspacing(PI * PI / 2.0) - 1.0).abs() < 1e-14);
    assert!((gridspacing2cutoff(1.0) - PI * PI / 2.0).abs() < 1e-14);
    assert!((gridspacing2cutoff(cutoff2gridspacing(12.5)) - 12.5).abs() < 1e-12);
}

#[test]
fn test_center_of_mass_and_inertia() {
    let coords = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 0.0, 0.0)];
    assert_eq!(center_of_mass(&coords, None), Vector3::new(2.0, 0.0, 0.0));
    assert_eq!(
        center_of_mass(&coords, Some(&[1.0, 3.0][..])),
        Vector3::new(3.0, 0.0, 0.0)
    );

    let pair = vec![Vector3::new(-1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)];
    let inertia = inertia_tensor(&pair, None);
    assert_eq!(inertia, Matrix3::from_diagonal(&Vector3::new(0.0, 2.0, 2.0)));
}

#[test]
fn test_dipole_of_uniform_density() {
    let scf = harmonic_scf(1.0, Guess::Pseudo);
    let cell = &scf.system.cell;
    let n = DVector::from_element(cell.n_points(), 1.0 / cell.omega);
    // grid points average to 2.7 per axis, the nucleus sits at 3.0
    let dipole = get_dipole(&scf.system, &n);
    for k in 0..3 {
        assert!((dipole[k] - 0.3).abs() < 1e-12, "{}", dipole);
    }
}

#[test]
fn test_dipole_of_centred_density_vanishes() {
    let scf = harmonic_scf(2.0, Guess::Pseudo);
    let cell = &scf.system.cell;
    let centre = Vector3::new(3.0, 3.0, 3.0);
    let mut n = DVector::from_iterator(
        cell.n_points(),
        cell.r.iter().map(|r| (-(r - centre).norm_squared() / 0.5).exp()),
    );
    let dv = cell.omega / cell.n_points() as f64;
    n *= 2.0 / (n.sum() * dv);
    assert!(get_dipole(&scf.system, &n).norm() < 1e-6);

    // one of two electrons removed: charge +1 left at the centre
    let cation = get_dipole(&scf.system, &(n * 0.5));
    assert!((cation - centre).norm() < 1e-6);
}

#[test]
fn test_homo_skips_empty_states() {
    let eps = vec![DVector::from_vec(vec![-0.5, 0.2])];
    let f = vec![DVector::from_vec(vec![2.0, 0.0])];
    assert_eq!(homo(&eps, &f), Some(-0.5));

    let eps = vec![
        DVector::from_vec(vec![-0.4, -0.1]),
        DVector::from_vec(vec![-0.3, 0.5]),
    ];
    let f = vec![
        DVector::from_vec(vec![1.0, 1.0]),
        DVector::from_vec(vec![1.0, 0.0]),
    ];
    assert_eq!(homo(&eps, &f), Some(-0.1));
    assert_eq!(homo(&[], &[]), None);
}

#[test]
fn test_ionization_potential_is_negative_homo() {
    let scf = harmonic_scf(3.0, Guess::Gaussian);
    let eps = scf.epsilon().unwrap();
    let ip = get_ip(&scf).unwrap();
    assert_eq!(ip, -eps[0][1]);
}

#[test]
fn test_orthonormality_checks() {
    let scf = harmonic_scf(4.0, Guess::Random);
    let cell = &scf.system.cell;
    let psi = I(cell, &orth(cell, &scf.w[0]));
    assert!(check_ortho(cell, &psi, 1e-9));
    assert!(check_norm(cell, &psi, 1e-9));
    assert!(check_orthonorm(cell, &psi));

    let mut skewed = scf.w[0].clone();
    let first = skewed.column(0).into_owned();
    skewed.column_mut(1).axpy(Complex64::new(0.5, 0.0), &first, Complex64::new(1.0, 0.0));
    let psi = I(cell, &skewed);
    assert!(!check_ortho(cell, &psi, 1e-9));
    assert!(!check_orthonorm(cell, &psi));

    let stretched = I(cell, &scf.w[0].map(|z| z * 1.1));
    assert!(check_ortho(cell, &stretched, 1e-9));
    assert!(!check_norm(cell, &stretched, 1e-9));
}
