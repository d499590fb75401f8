//! Local potentials on the real-space grid (dual representation).

use crate::error::{Result, ScfError};
use crate::gth::{init_gth_loc, GthTable};
use crate::system::System;
use nalgebra::DVector;
use num_complex::Complex64;
use pwbasis::helper::{field, field_c};
use pwbasis::operators::{Jdag, J, O};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LocalPotential {
    /// GTH pseudopotentials, local part
    #[default]
    Gth,
    /// Quantum-dot harmonic well centred in the cell
    Harmonic,
    /// All-electron Coulomb potential
    Coulomb,
    /// Starkloff-Joannopoulos pseudopotential for germanium
    Ge,
}

impl FromStr for LocalPotential {
    type Err = ScfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gth" => Ok(Self::Gth),
            "harmonic" => Ok(Self::Harmonic),
            "coulomb" => Ok(Self::Coulomb),
            "ge" => Ok(Self::Ge),
            _ => Err(ScfError::UnknownPotential(s.to_string())),
        }
    }
}

impl fmt::Display for LocalPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gth => "gth",
            Self::Harmonic => "harmonic",
            Self::Coulomb => "coulomb",
            Self::Ge => "ge",
        };
        write!(f, "{}", name)
    }
}

impl LocalPotential {
    /// Local potential on the real-space grid. `gth` is required for `LocalPotential::Gth`.
    ///
    /// Only the GTH potential is projected onto its real part, the others stay complex.
    pub fn init(&self, system: &System, gth: Option<&GthTable>) -> Result<DVector<Complex64>> {
        match self {
            Self::Gth => {
                let table = gth.ok_or_else(|| {
                    ScfError::Config("GTH potential requested without pseudopotentials".into())
                })?;
                Ok(init_gth_loc(system, table)?.map(|v| Complex64::new(v, 0.0)))
            }
            Self::Harmonic => Ok(harmonic(system)),
            Self::Coulomb => Ok(coulomb(system)),
            Self::Ge => Ok(ge(system)),
        }
    }
}

/// Harmonic potential `1/2 w^2 |r - c|^2` with `w = 2`, `c` the cell centre.
pub fn harmonic(system: &System) -> DVector<Complex64> {
    let cell = &system.cell;
    let freq = 2.0;
    let center = cell.center();
    let vharm = DVector::from_iterator(
        cell.n_points(),
        cell.r
            .iter()
            .map(|r| 0.5 * freq * freq * (r - center).norm_squared()),
    );
    Jdag(cell, &O(cell, &J(cell, &field(&vharm), true))).column(0).into_owned()
}

/// All-electron Coulomb potential `-4 pi Z / G^2`, the G = 0 term is dropped.
///
/// Uses the charge of the first atom for every atom.
pub fn coulomb(system: &System) -> DVector<Complex64> {
    let cell = &system.cell;
    let z = system.z.first().copied().unwrap_or(0.0);
    let mut vcoul = cell.g2.map(|g2| -4.0 * PI * z / g2);
    vcoul[0] = 0.0;
    reciprocal_to_dual(system, &vcoul)
}

/// Starkloff-Joannopoulos local pseudopotential for germanium, Phys. Rev. B 16, 5212.
pub fn ge(system: &System) -> DVector<Complex64> {
    let cell = &system.cell;
    let z = 4.0;
    let lamda = 18.5;
    let rc = 1.052;
    let mut vps = cell.g2.map(|g2| {
        let gm = g2.sqrt();
        let mut v = -2.0 * PI * (-PI * gm / lamda).exp() * (rc * gm).cos() * (gm / lamda)
            / (1.0 - (-2.0 * PI * gm / lamda).exp());
        for n in 0..5 {
            let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
            v += sign * (-lamda * rc * n as f64).exp() / (1.0 + (n as f64 * lamda / gm).powi(2));
        }
        v * 4.0 * PI * z / g2 * (1.0 + (-lamda * rc).exp()) - 4.0 * PI * z / g2
    });
    let series: f64 = (1..5)
        .map(|n| {
            let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
            sign * (-lamda * rc * n as f64).exp() / (n * n) as f64
        })
        .sum();
    vps[0] = 4.0
        * PI
        * z
        * (1.0 + (-lamda * rc).exp())
        * (rc * rc / 2.0 + 1.0 / (lamda * lamda) * (PI * PI / 6.0 + series));
    reciprocal_to_dual(system, &vps)
}

fn reciprocal_to_dual(system: &System, v: &DVector<f64>) -> DVector<Complex64> {
    let cell = &system.cell;
    let mut sf = DVector::<Complex64>::zeros(cell.n_points());
    for sfa in &cell.sf {
        sf += sfa;
    }
    let vsf = DVector::from_iterator(
        cell.n_points(),
        v.iter().zip(sf.iter()).map(|(&vg, &s)| s * vg),
    );
    J(cell, &field_c(&vsf), true).column(0).into_owned()
}

/// Largest imaginary part on the grid.
pub fn imaginary_residue(v: &DVector<Complex64>) -> f64 {
    v.iter().map(|z| z.im.abs()).fold(0.0, f64::max)
}

/// Real part of a grid field, warning when the dropped imaginary part is not round-off.
///
/// Off-centre atoms leave an imaginary residue from the unpaired Nyquist planes of even grids.
pub(crate) fn real_field_checked(v: &DVector<Complex64>, what: &str) -> DVector<f64> {
    let residue = imaginary_residue(v);
    let scale = v.iter().map(|z| z.re.abs()).fold(1.0, f64::max);
    if residue > 1e-6 * scale {
        warn!("{} drops an imaginary part of up to {:e}", what, residue);
    }
    v.map(|z| z.re)
}
