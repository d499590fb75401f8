//! Local-density exchange-correlation functionals on the real-space grid.
//!
//! Functionals return the energy per particle `exc` and the full potential
//! `vxc = d(n exc)/dn` per spin channel:
//! - Slater exchange (LDA)
//! - Vosko-Wilk-Nusair correlation (VWN5), Can. J. Phys. 58, 1200
//! - a mock functional that returns zeros

use crate::error::{Result, ScfError};
use nalgebra::DVector;
use rayon::prelude::*;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Densities below this value do not contribute.
const DENSITY_THRESHOLD: f64 = 1e-30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeFunctional {
    /// Local-density approximation exchange (Slater exchange)
    Slater,
    Mock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrelationFunctional {
    /// Vosko-Wilk-Nusair parametrization of the uniform electron gas
    Vwn,
    Mock,
}

/// What to do with a functional name that is not implemented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnknownXcPolicy {
    /// Log a warning and use the mock functional for that part
    #[default]
    Warn,
    Fatal,
}

impl FromStr for UnknownXcPolicy {
    type Err = ScfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "warn" | "mock" => Ok(Self::Warn),
            "fatal" | "error" => Ok(Self::Fatal),
            _ => Err(ScfError::Config(format!(
                "Unknown functional policy \"{}\", use warn or fatal",
                s
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Xc {
    pub exchange: ExchangeFunctional,
    pub correlation: CorrelationFunctional,
}

impl Default for Xc {
    fn default() -> Self {
        Xc {
            exchange: ExchangeFunctional::Slater,
            correlation: CorrelationFunctional::Vwn,
        }
    }
}

impl fmt::Display for Xc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self.exchange {
            ExchangeFunctional::Slater => "lda",
            ExchangeFunctional::Mock => "mock",
        };
        let c = match self.correlation {
            CorrelationFunctional::Vwn => "vwn",
            CorrelationFunctional::Mock => "mock",
        };
        write!(f, "{},{}", x, c)
    }
}

impl Xc {
    /// Parse an `"exchange,correlation"` string such as `"lda,vwn"`.
    ///
    /// Empty parts and `mock` select the mock functional.
    pub fn parse(name: &str, policy: UnknownXcPolicy) -> Result<Xc> {
        let lower = name.to_lowercase();
        let mut parts = lower.splitn(2, ',').map(str::trim);
        let exch = parts.next().unwrap_or("");
        let corr = parts.next().unwrap_or("");

        let exchange = match exch {
            "lda" | "slater" | "lda_x" | "s" => ExchangeFunctional::Slater,
            "" | "mock" => ExchangeFunctional::Mock,
            other => {
                unknown(other, "exchange", policy)?;
                ExchangeFunctional::Mock
            }
        };
        let correlation = match corr {
            "vwn" | "vwn5" | "lda_c_vwn" => CorrelationFunctional::Vwn,
            "" | "mock" => CorrelationFunctional::Mock,
            other => {
                unknown(other, "correlation", policy)?;
                CorrelationFunctional::Mock
            }
        };
        Ok(Xc {
            exchange,
            correlation,
        })
    }

    pub fn is_mock(&self) -> bool {
        self.exchange == ExchangeFunctional::Mock && self.correlation == CorrelationFunctional::Mock
    }

    /// Evaluate the functional for one (unpolarized) or two (polarized) spin densities.
    ///
    /// Returns the energy per particle on the grid and one potential per spin channel.
    pub fn get_xc(&self, n_spin: &[DVector<f64>]) -> Result<(DVector<f64>, Vec<DVector<f64>>)> {
        if n_spin.is_empty() || n_spin.len() > 2 {
            return Err(ScfError::Functional(format!(
                "expected 1 or 2 spin densities, got {}",
                n_spin.len()
            )));
        }
        let npts = n_spin[0].len();
        if n_spin.iter().any(|n| n.len() != npts) {
            return Err(ScfError::Functional("spin densities differ in length".into()));
        }
        if let Some(bad) = n_spin.iter().flat_map(|n| n.iter()).find(|v| !v.is_finite()) {
            return Err(ScfError::Functional(format!(
                "non-finite density value {}",
                bad
            )));
        }

        if n_spin.len() == 1 {
            let n = &n_spin[0];
            let values: Vec<(f64, f64)> = (0..npts)
                .into_par_iter()
                .map(|i| self.point_unpolarized(n[i]))
                .collect();
            let exc = DVector::from_iterator(npts, values.iter().map(|v| v.0));
            let vxc = DVector::from_iterator(npts, values.iter().map(|v| v.1));
            Ok((exc, vec![vxc]))
        } else {
            let (up, dn) = (&n_spin[0], &n_spin[1]);
            let values: Vec<(f64, f64, f64)> = (0..npts)
                .into_par_iter()
                .map(|i| self.point_polarized(up[i], dn[i]))
                .collect();
            let exc = DVector::from_iterator(npts, values.iter().map(|v| v.0));
            let vup = DVector::from_iterator(npts, values.iter().map(|v| v.1));
            let vdn = DVector::from_iterator(npts, values.iter().map(|v| v.2));
            Ok((exc, vec![vup, vdn]))
        }
    }

    fn point_unpolarized(&self, n: f64) -> (f64, f64) {
        if n < DENSITY_THRESHOLD {
            return (0.0, 0.0);
        }
        let (ex, vx) = match self.exchange {
            ExchangeFunctional::Slater => slater_x(n),
            ExchangeFunctional::Mock => (0.0, 0.0),
        };
        let (ec, vc) = match self.correlation {
            CorrelationFunctional::Vwn => vwn_c(n),
            CorrelationFunctional::Mock => (0.0, 0.0),
        };
        (ex + ec, vx + vc)
    }

    fn point_polarized(&self, up: f64, dn: f64) -> (f64, f64, f64) {
        let (up, dn) = (up.max(0.0), dn.max(0.0));
        if up + dn < DENSITY_THRESHOLD {
            return (0.0, 0.0, 0.0);
        }
        let (ex, vxu, vxd) = match self.exchange {
            ExchangeFunctional::Slater => slater_x_spin(up, dn),
            ExchangeFunctional::Mock => (0.0, 0.0, 0.0),
        };
        let (ec, vcu, vcd) = match self.correlation {
            CorrelationFunctional::Vwn => vwn_c_spin(up, dn),
            CorrelationFunctional::Mock => (0.0, 0.0, 0.0),
        };
        (ex + ec, vxu + vcu, vxd + vcd)
    }
}

fn unknown(name: &str, part: &str, policy: UnknownXcPolicy) -> Result<()> {
    match policy {
        UnknownXcPolicy::Warn => {
            warn!(
                "No {} functional found for \"{}\". Use a mock functional for the {} part.",
                part, name, part
            );
            Ok(())
        }
        UnknownXcPolicy::Fatal => Err(ScfError::UnknownFunctional(name.to_string())),
    }
}

/// Slater exchange, unpolarized.
///
/// Energy per particle:  e_x(n) = -(3/4) (3/pi)^(1/3) n^(1/3)
/// Potential:            v_x(n) = (4/3) e_x(n)
pub(crate) fn slater_x(n: f64) -> (f64, f64) {
    let ex = -0.75 * (3.0 / PI).powf(1.0 / 3.0) * n.powf(1.0 / 3.0);
    (ex, 4.0 / 3.0 * ex)
}

/// Slater exchange, spin-polarized. `v_s = -(6 n_s / pi)^(1/3)`.
pub(crate) fn slater_x_spin(up: f64, dn: f64) -> (f64, f64, f64) {
    let vup = -(6.0 * up / PI).powf(1.0 / 3.0);
    let vdn = -(6.0 * dn / PI).powf(1.0 / 3.0);
    let ex = 0.75 * (vup * up + vdn * dn) / (up + dn);
    (ex, vup, vdn)
}

/// VWN interpolation parameters `(A, b, c, x0)`.
struct VwnParams(f64, f64, f64, f64);

const PARAMAGNETIC: VwnParams = VwnParams(0.0310907, 3.72744, 12.9352, -0.10498);
const FERROMAGNETIC: VwnParams = VwnParams(0.01554535, 7.06042, 18.0578, -0.32500);
const STIFFNESS: VwnParams = VwnParams(-1.0 / (6.0 * PI * PI), 1.13107, 13.0045, -0.0047584);

/// VWN interpolation formula G(x) with x = sqrt(rs), and dG/dx.
fn vwn_g(x: f64, p: &VwnParams) -> (f64, f64) {
    let VwnParams(a, b, c, x0) = *p;
    let xx = x * x + b * x + c;
    let xx0 = x0 * x0 + b * x0 + c;
    let q = (4.0 * c - b * b).sqrt();
    let at = (q / (2.0 * x + b)).atan();
    let g = a
        * ((x * x / xx).ln() + 2.0 * b / q * at
            - b * x0 / xx0 * (((x - x0) * (x - x0) / xx).ln() + 2.0 * (b + 2.0 * x0) / q * at));
    let dg = a
        * (2.0 / x - (2.0 * x + b) / xx - b / xx
            - b * x0 / xx0 * (2.0 / (x - x0) - (2.0 * x + b) / xx - (b + 2.0 * x0) / xx));
    (g, dg)
}

fn wigner_seitz(n: f64) -> f64 {
    (3.0 / (4.0 * PI * n)).powf(1.0 / 3.0)
}

/// VWN correlation, unpolarized. `v_c = e_c - (x/6) de_c/dx`.
pub(crate) fn vwn_c(n: f64) -> (f64, f64) {
    let x = wigner_seitz(n).sqrt();
    let (ec, dec) = vwn_g(x, &PARAMAGNETIC);
    (ec, ec - x / 6.0 * dec)
}

/// VWN correlation, spin-polarized.
pub(crate) fn vwn_c_spin(up: f64, dn: f64) -> (f64, f64, f64) {
    let n = up + dn;
    let rs = wigner_seitz(n);
    let x = rs.sqrt();
    let zeta = ((up - dn) / n).clamp(-1.0, 1.0);

    let (ec_p, dec_p) = vwn_g(x, &PARAMAGNETIC);
    let (ec_f, dec_f) = vwn_g(x, &FERROMAGNETIC);
    let (ac, dac) = vwn_g(x, &STIFFNESS);

    let denom = 2f64.powf(4.0 / 3.0) - 2.0;
    let fz = ((1.0 + zeta).powf(4.0 / 3.0) + (1.0 - zeta).powf(4.0 / 3.0) - 2.0) / denom;
    let dfz = 4.0 / 3.0 * ((1.0 + zeta).powf(1.0 / 3.0) - (1.0 - zeta).powf(1.0 / 3.0)) / denom;
    let fpp = 4.0 / (9.0 * (2f64.powf(1.0 / 3.0) - 1.0));
    let z3 = zeta.powi(3);
    let z4 = zeta.powi(4);

    let ec = ec_p + ac * fz * (1.0 - z4) / fpp + (ec_f - ec_p) * fz * z4;

    // d/drs = 1/(2x) d/dx
    let dx = |d: f64| d / (2.0 * x);
    let dec_drs = dx(dec_p)
        + dx(dac) * fz * (1.0 - z4) / fpp
        + (dx(dec_f) - dx(dec_p)) * fz * z4;
    let dec_dz = ac / fpp * (dfz * (1.0 - z4) - 4.0 * z3 * fz)
        + (ec_f - ec_p) * (dfz * z4 + 4.0 * z3 * fz);

    let common = ec - rs / 3.0 * dec_drs;
    (ec, common + (1.0 - zeta) * dec_dz, common - (1.0 + zeta) * dec_dz)
}

#[cfg(test)]
mod tests;
