//! Total energy and its contributions.
#![allow(non_snake_case)]

use crate::dft::{get_n_single, solve_poisson, Precomputed};
use crate::error::Result;
use crate::scf_impl::Scf;
use crate::xc::Xc;
use itertools::iproduct;
use nalgebra::{DMatrix, DVector, Vector3};
use num_complex::Complex64;
use pwbasis::helper::field;
use pwbasis::operators::{Jdag, J, L, O};
use pwbasis::Cell;
use std::f64::consts::PI;
use std::fmt;
use tracing::warn;

/// Energy contributions in Hartree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Energy {
    pub ekin: f64,
    pub ecoul: f64,
    pub exc: f64,
    pub eloc: f64,
    pub enonloc: f64,
    pub eewald: f64,
    pub esic: f64,
}

impl Energy {
    pub fn etot(&self) -> f64 {
        self.ekin + self.ecoul + self.exc + self.eloc + self.enonloc + self.eewald + self.esic
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = [
            ("Ekin", self.ekin),
            ("Ecoul", self.ecoul),
            ("Exc", self.exc),
            ("Eloc", self.eloc),
            ("Enonloc", self.enonloc),
            ("Eewald", self.eewald),
            ("Esic", self.esic),
        ];
        for (name, value) in terms.iter().filter(|(_, v)| *v != 0.0) {
            writeln!(f, "{:<8}: {:+.9} Eh", name, value)?;
        }
        write!(f, "{}\n{:<8}: {:+.9} Eh", "-".repeat(25), "Etot", self.etot())
    }
}

/// Real part of an energy that must be real; a large imaginary part is reported.
pub(crate) fn real_checked(z: Complex64, what: &str) -> f64 {
    let tol = 1e-6 * z.re.abs().max(1.0);
    if z.im.abs() > tol {
        warn!("{} has an imaginary part of {:e}", what, z.im);
        debug_assert!(z.im.abs() <= tol, "{} is not real: {}", what, z);
    }
    z.re
}

fn grid_dot(a: &DVector<f64>, b: &DMatrix<Complex64>) -> Complex64 {
    a.iter()
        .zip(b.column(0).iter())
        .map(|(&x, &y)| y * x)
        .sum()
}

/// Kinetic energy `-1/2 sum f_i Y_i^H L(Y_i)`.
pub fn get_ekin(cell: &Cell, f: &[DVector<f64>], Y: &[DMatrix<Complex64>]) -> f64 {
    let mut ekin = Complex64::new(0.0, 0.0);
    for (fs, ys) in f.iter().zip(Y.iter()) {
        let ly = L(cell, ys);
        for (i, occ) in fs.iter().enumerate() {
            ekin += ys.column(i).dotc(&ly.column(i)) * *occ;
        }
    }
    real_checked(ekin * -0.5, "Ekin")
}

/// Hartree energy `1/2 n^T Jdag(O(phi))`.
pub fn get_ecoul(cell: &Cell, n: &DVector<f64>, phi: &DMatrix<Complex64>) -> f64 {
    let ecoul = grid_dot(n, &Jdag(cell, &O(cell, phi))) * 0.5;
    real_checked(ecoul, "Ecoul")
}

/// Exchange-correlation energy `n^T Jdag(O(J(exc)))`.
pub fn get_exc(cell: &Cell, n: &DVector<f64>, exc: &DVector<f64>) -> f64 {
    let e = grid_dot(n, &Jdag(cell, &O(cell, &J(cell, &field(exc), true))));
    real_checked(e, "Exc")
}

/// Local pseudopotential energy `Re(Vloc^H n)`.
pub fn get_eloc(vloc: &DVector<Complex64>, n: &DVector<f64>) -> f64 {
    vloc.iter().zip(n.iter()).map(|(v, &x)| v.re * x).sum()
}

/// Ion-ion interaction by Ewald summation.
///
/// `gcut` and `gamma` fix the splitting `nu = sqrt(gcut^2 / (-ln gamma)) / 2` and the number of
/// real and reciprocal images.
pub fn get_eewald(cell: &Cell, z: &[f64]) -> f64 {
    ewald_sum(cell, z, 2.0, 1e-8)
}

fn index_vectors(s: [i64; 3]) -> Vec<Vector3<f64>> {
    iproduct!(-s[0]..=s[0], -s[1]..=s[1], -s[2]..=s[2])
        .filter(|&m| m != (0, 0, 0))
        .map(|(a, b, c)| Vector3::new(a as f64, b as f64, c as f64))
        .collect()
}

fn ewald_sum(cell: &Cell, z: &[f64], gcut: f64, gamma: f64) -> f64 {
    let gexp = -gamma.ln();
    let nu = 0.5 * (gcut * gcut / gexp).sqrt();
    let ztot: f64 = z.iter().sum();

    let mut eewald = -nu / PI.sqrt() * z.iter().map(|zi| zi * zi).sum::<f64>();
    eewald += -PI * ztot * ztot / (2.0 * nu * nu * cell.omega);

    // real-space images
    let tmax = (0.5 * gexp).sqrt() / nu;
    let s_real = [0, 1, 2].map(|k| (tmax / cell.lattice.row(k).norm() + 1.5).round_ties_even() as i64);
    let translations: Vec<Vector3<f64>> = index_vectors(s_real)
        .iter()
        .map(|m| cell.lattice.transpose() * m)
        .collect();

    // reciprocal images, reciprocal vectors are the columns
    let recip = cell.reciprocal();
    let s_recip = [0, 1, 2].map(|k| (gcut / recip.column(k).norm() + 1.5).round_ties_even() as i64);
    let gvecs: Vec<Vector3<f64>> = index_vectors(s_recip).iter().map(|m| recip * m).collect();

    for (ia, ja) in iproduct!(0..cell.n_atoms(), 0..cell.n_atoms()) {
        let dx = cell.x[ia] - cell.x[ja];
        let zz = z[ia] * z[ja];
        for t in &translations {
            let rmag = (dx - t).norm();
            eewald += 0.5 * zz * libm::erfc(rmag * nu) / rmag;
        }
        // the T = 0 image is missing from the translations
        if ia != ja {
            let rmag = dx.norm();
            eewald += 0.5 * zz * libm::erfc(rmag * nu) / rmag;
        }
        for g in &gvecs {
            let g2 = g.norm_squared();
            eewald += 2.0 * PI / cell.omega * zz * (-g2 / (4.0 * nu * nu)).exp() / g2 * g.dot(&dx).cos();
        }
    }
    eewald
}

/// Perdew-Zunger self-interaction correction of the occupied orbitals.
pub fn get_esic(cell: &Cell, xc: &Xc, f: &[DVector<f64>], Y: &[DMatrix<Complex64>]) -> Result<f64> {
    let n_single = get_n_single(cell, f, Y);
    let zeros = DVector::zeros(cell.n_points());
    let mut esic = 0.0;
    for (fs, ns) in f.iter().zip(n_single.iter()) {
        for (i, &occ) in fs.iter().enumerate() {
            if occ <= 0.0 {
                continue;
            }
            let ni: DVector<f64> = ns.column(i).map(|v| v / occ);
            let coul = get_ecoul(cell, &ni, &solve_poisson(cell, &ni));
            let (exc, _) = xc.get_xc(&[ni.clone(), zeros.clone()])?;
            let exc = get_exc(cell, &ni, &exc);
            esic += (coul + exc) * occ;
        }
    }
    Ok(esic)
}

/// All energy contributions at the point described by `pre`.
///
/// The Ewald energy is carried over from `scf.energies`. With `sic` the self-interaction
/// correction is evaluated too.
pub fn get_energies(scf: &Scf, pre: &Precomputed, sic: bool) -> Result<Energy> {
    let cell = &scf.system.cell;
    let f = &scf.system.f;
    let esic = if sic {
        get_esic(cell, &scf.xc, f, &pre.y)?
    } else {
        0.0
    };
    Ok(Energy {
        ekin: get_ekin(cell, f, &pre.y),
        ecoul: get_ecoul(cell, &pre.n, &pre.phi),
        exc: get_exc(cell, &pre.n, &pre.exc),
        eloc: get_eloc(&scf.vloc, &pre.n),
        enonloc: scf.nonlocal.energy(cell.omega, f, &pre.y),
        eewald: scf.energies.eewald,
        esic,
    })
}
