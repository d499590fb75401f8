use super::*;
use nalgebra::Vector3;

fn cell(natoms: usize) -> Cell {
    let x = (0..natoms)
        .map(|i| Vector3::new(1.0 + i as f64, 3.0, 3.0))
        .collect();
    Cell::cubic(6.0, [8, 8, 8], 2.0, x).unwrap()
}

#[test]
fn test_unpolarized_occupations() {
    let system = System::new(cell(1), vec!["Si".into()], vec![4.0], 1).unwrap();
    assert_eq!(system.ns, 2);
    assert_eq!(system.f[0].as_slice(), &[2.0, 2.0]);

    let system = System::new(cell(1), vec!["N".into()], vec![5.0], 1).unwrap();
    assert_eq!(system.ns, 3);
    assert_eq!(system.f[0].as_slice(), &[2.0, 2.0, 1.0]);
}

#[test]
fn test_polarized_occupations() {
    let system = System::new(cell(1), vec!["N".into()], vec![5.0], 2).unwrap();
    assert_eq!(system.ns, 3);
    assert_eq!(system.f[0].as_slice(), &[1.0, 1.0, 1.0]);
    assert_eq!(system.f[1].as_slice(), &[1.0, 1.0, 0.0]);

    let system = System::new(cell(1), vec!["H".into()], vec![1.0], 2).unwrap();
    assert_eq!(system.ns, 1);
    assert_eq!(system.f[0].as_slice(), &[1.0]);
    assert_eq!(system.f[1].as_slice(), &[0.0]);
}

#[test]
fn test_species_order() {
    let system = System::new(
        cell(3),
        vec!["O".into(), "H".into(), "O".into()],
        vec![6.0, 1.0, 6.0],
        1,
    )
    .unwrap();
    assert_eq!(system.species(), vec!["O".to_string(), "H".to_string()]);
    assert_eq!(system.n_electrons(), 13.0);
}

#[test]
fn test_invalid_systems() {
    assert!(System::new(cell(1), vec!["H".into()], vec![1.0], 3).is_err());
    assert!(System::new(cell(1), vec!["H".into()], vec![1.5], 1).is_err());
    assert!(System::new(cell(2), vec!["H".into()], vec![1.0], 1).is_err());
}
