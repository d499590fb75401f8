//! Hartree atomic units and conversions to common units.

/// Hartree in eV
pub const ELECTRONVOLT: f64 = 27.211386245988;
/// Hartree in kcal/mol
pub const KCALMOL: f64 = 627.5094740631;
/// Bohr radius in Angstrom
pub const ANGSTROM: f64 = 0.529177210903;
/// e bohr in Debye
pub const DEBYE: f64 = 2.541746473;

pub fn ha2ev(e: f64) -> f64 {
    e * ELECTRONVOLT
}

pub fn ev2ha(e: f64) -> f64 {
    e / ELECTRONVOLT
}

pub fn ha2kcalmol(e: f64) -> f64 {
    e * KCALMOL
}

pub fn kcalmol2ha(e: f64) -> f64 {
    e / KCALMOL
}

pub fn ev2kcalmol(e: f64) -> f64 {
    ha2kcalmol(ev2ha(e))
}

pub fn kcalmol2ev(e: f64) -> f64 {
    ha2ev(kcalmol2ha(e))
}

pub fn ha2ry(e: f64) -> f64 {
    2.0 * e
}

pub fn ry2ha(e: f64) -> f64 {
    e / 2.0
}

pub fn ang2bohr(r: f64) -> f64 {
    r / ANGSTROM
}

pub fn bohr2ang(r: f64) -> f64 {
    r * ANGSTROM
}

/// Dipole moment from e bohr to Debye
pub fn ebohr2d(p: f64) -> f64 {
    p * DEBYE
}

pub fn d2ebohr(p: f64) -> f64 {
    p / DEBYE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_conversions() {
        assert_eq!(ha2ev(1.0), 27.211386245988);
        assert!((ev2ha(ha2ev(-0.5)) + 0.5).abs() < 1e-15);
        assert!((ha2kcalmol(1.0) - 627.5094740631).abs() < 1e-12);
        // 1 eV is about 23.06 kcal/mol
        assert!((ev2kcalmol(1.0) - 23.0605).abs() < 1e-4);
        assert!((kcalmol2ev(ev2kcalmol(3.0)) - 3.0).abs() < 1e-12);
        assert!((kcalmol2ha(ha2kcalmol(2.0)) - 2.0).abs() < 1e-12);
        assert_eq!(ha2ry(0.5), 1.0);
        assert_eq!(ry2ha(1.0), 0.5);
    }

    #[test]
    fn test_length_and_dipole_conversions() {
        assert!((ang2bohr(0.529177210903) - 1.0).abs() < 1e-15);
        assert!((bohr2ang(ang2bohr(1.4)) - 1.4).abs() < 1e-14);
        assert!((ebohr2d(1.0) - 2.541746473).abs() < 1e-15);
        assert!((d2ebohr(ebohr2d(0.7)) - 0.7).abs() < 1e-15);
    }
}
