//! Atoms, valence charges and electronic occupations of a calculation.

use crate::error::{Result, ScfError};
use nalgebra::DVector;
use pwbasis::Cell;
use tracing::info;

/// Immutable description of the system: grid, atoms and occupation numbers.
#[derive(Debug, Clone)]
pub struct System {
    pub cell: Cell,
    /// Element symbol per atom
    pub atom: Vec<String>,
    /// Valence charge per atom
    pub z: Vec<f64>,
    pub nspin: usize,
    /// Number of states per spin channel
    pub ns: usize,
    /// Occupation numbers per spin channel, each of length `ns`
    pub f: Vec<DVector<f64>>,
}

impl System {
    pub fn new(cell: Cell, atom: Vec<String>, z: Vec<f64>, nspin: usize) -> Result<System> {
        if atom.len() != cell.n_atoms() || z.len() != cell.n_atoms() {
            return Err(ScfError::Config(format!(
                "{} atom positions but {} symbols and {} charges",
                cell.n_atoms(),
                atom.len(),
                z.len()
            )));
        }
        if nspin != 1 && nspin != 2 {
            return Err(ScfError::Config(format!(
                "nspin has to be 1 or 2, got {}",
                nspin
            )));
        }
        let (ns, f) = occupations(z.iter().sum(), nspin)?;
        info!(
            "System with {} atom(s), {} electron(s), {} state(s) per spin channel",
            atom.len(),
            z.iter().sum::<f64>(),
            ns
        );
        Ok(System {
            cell,
            atom,
            z,
            nspin,
            ns,
            f,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.atom.len()
    }

    /// Distinct element symbols in order of first appearance.
    pub fn species(&self) -> Vec<String> {
        let mut species: Vec<String> = Vec::new();
        for symbol in &self.atom {
            if !species.contains(symbol) {
                species.push(symbol.clone());
            }
        }
        species
    }

    pub fn n_electrons(&self) -> f64 {
        self.z.iter().sum()
    }
}

/// Fill states with the lowest possible number of orbitals.
///
/// Unpolarized: doubly occupied states, the last one singly occupied for an odd count.
/// Polarized: `ceil(Z/2)` states per channel, spin up takes the extra electron.
fn occupations(ztot: f64, nspin: usize) -> Result<(usize, Vec<DVector<f64>>)> {
    let nel = ztot.round();
    if nel < 1.0 || (ztot - nel).abs() > 1e-8 {
        return Err(ScfError::Config(format!(
            "Total valence charge has to be a positive integer, got {}",
            ztot
        )));
    }
    let nel = nel as usize;
    let ns = nel.div_ceil(2);
    let f = if nspin == 1 {
        let mut f = DVector::from_element(ns, 2.0);
        if nel % 2 == 1 {
            f[ns - 1] = 1.0;
        }
        vec![f]
    } else {
        let up = DVector::from_element(ns, 1.0);
        let down = DVector::from_fn(ns, |i, _| if i < nel / 2 { 1.0 } else { 0.0 });
        vec![up, down]
    };
    Ok((ns, f))
}

#[cfg(test)]
mod tests;
