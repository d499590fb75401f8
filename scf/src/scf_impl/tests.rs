//! Tests for the SCF driver

use super::*;
use crate::xc::{CorrelationFunctional, ExchangeFunctional};
use nalgebra::Vector3;
use pwbasis::Cell;

fn hydrogen_system() -> System {
    let cell = Cell::cubic(6.0, [10, 10, 10], 3.0, vec![Vector3::new(3.0, 3.0, 3.0)]).unwrap();
    System::new(cell, vec!["H".into()], vec![1.0], 1).unwrap()
}

fn harmonic_settings(cgform: CgForm) -> ScfSettings {
    ScfSettings {
        pot: LocalPotential::Harmonic,
        guess: Guess::Pseudo,
        etol: 1e-8,
        cgform,
        stages: vec![
            Stage {
                minimizer: Minimizer::SteepestDescent,
                steps: 25,
            },
            Stage {
                minimizer: Minimizer::PreconditionedConjugateGradient,
                steps: 100,
            },
        ],
        ..Default::default()
    }
}

#[test]
fn test_default_settings() {
    let settings = ScfSettings::default();
    assert_eq!(settings.xc, "lda,vwn");
    assert_eq!(settings.etol, 1e-7);
    assert_eq!(settings.step_size, 3e-5);
    assert_eq!(settings.pot, LocalPotential::Gth);
    assert_eq!(settings.guess, Guess::Gaussian);
    assert_eq!(
        settings.stages,
        vec![
            Stage {
                minimizer: Minimizer::SteepestDescent,
                steps: 25
            },
            Stage {
                minimizer: Minimizer::PreconditionedConjugateGradient,
                steps: 250
            },
        ]
    );
}

#[test]
fn test_setup_of_harmonic_hydrogen() {
    let scf = Scf::new(hydrogen_system(), harmonic_settings(CgForm::FletcherReeves)).unwrap();
    assert_eq!(scf.system.cell.n_active(), 57);
    assert_eq!(scf.nonlocal.nbeta, 0);
    assert!(scf.gth.is_none());
    assert_eq!(scf.xc.exchange, ExchangeFunctional::Slater);
    assert_eq!(scf.xc.correlation, CorrelationFunctional::Vwn);
    assert!((scf.energies.eewald - (-0.2364414566233853)).abs() < 1e-10);
    assert_eq!(scf.w[0].shape(), (57, 1));
}

#[test]
fn test_gth_without_path_is_rejected() {
    let settings = ScfSettings {
        pot: LocalPotential::Gth,
        gth_path: None,
        ..Default::default()
    };
    assert!(matches!(
        Scf::new(hydrogen_system(), settings),
        Err(ScfError::Config(_))
    ));
}

#[test]
fn test_unknown_functional_policy() {
    let mut settings = harmonic_settings(CgForm::FletcherReeves);
    settings.xc = "pbe,pbe".to_string();
    let scf = Scf::new(hydrogen_system(), settings.clone()).unwrap();
    assert!(scf.xc.is_mock());

    settings.unknown_xc = UnknownXcPolicy::Fatal;
    assert!(matches!(
        Scf::new(hydrogen_system(), settings),
        Err(ScfError::UnknownFunctional(_))
    ));
}

#[test]
fn test_cg_forms_converge_to_same_energy() {
    let mut totals = Vec::new();
    for (cgform, pccg_steps) in [
        (CgForm::FletcherReeves, 25),
        (CgForm::PolakRibiere, 25),
        (CgForm::HestenesStiefel, 22),
    ] {
        let mut scf = Scf::new(hydrogen_system(), harmonic_settings(cgform)).unwrap();
        let etot = scf.run().unwrap();
        assert!(scf.converged, "{} did not converge", cgform);
        // iteration count at the etol threshold, allow for round-off
        assert!(scf.trace.len().abs_diff(25 + pccg_steps) <= 1, "{}", cgform);
        assert!((etot - 3.43625614).abs() < 1e-5, "{}: {}", cgform, etot);
        totals.push(etot);
    }
    let etol = harmonic_settings(CgForm::FletcherReeves).etol;
    for pair in totals.windows(2) {
        assert!((pair[0] - pair[1]).abs() < etol, "{:?}", totals);
    }
}

#[test]
fn test_run_without_convergence_returns_energy() {
    let mut settings = harmonic_settings(CgForm::FletcherReeves);
    settings.stages = vec![Stage {
        minimizer: Minimizer::SteepestDescent,
        steps: 3,
    }];
    let mut scf = Scf::new(hydrogen_system(), settings).unwrap();
    let etot = scf.run().unwrap();
    assert!(!scf.converged);
    assert_eq!(scf.trace.len(), 3);
    assert_eq!(etot, scf.trace.last().unwrap());
}

#[test]
fn test_sic_and_eigenvalues_after_run() {
    let mut settings = harmonic_settings(CgForm::PolakRibiere);
    settings.sic = true;
    let mut scf = Scf::new(hydrogen_system(), settings).unwrap();
    scf.run().unwrap();
    assert!(scf.energies.esic.is_finite());
    assert!(scf.energies.esic != 0.0);

    let eps = scf.epsilon().unwrap();
    assert_eq!(eps.len(), 1);
    assert_eq!(eps[0].len(), 1);
    let psi = scf.psi().unwrap();
    assert_eq!(psi[0].shape(), (57, 1));
}
