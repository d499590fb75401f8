#![allow(non_snake_case)]

use super::{GthParams, GthTable, MAX_CHANNELS, MAX_PROJECTORS};
use crate::error::{Result, ScfError};
use crate::system::System;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use pwbasis::helper::{field_c, ylm_real};
use pwbasis::operators::{Idag, J};
use std::f64::consts::PI;
use tracing::debug;

const M_SLOTS: usize = 2 * MAX_CHANNELS - 1;

/// Column of the projector table for every (projector, atom, l, m) slot.
///
/// Unused slots hold `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectorMap {
    natoms: usize,
    slots: Vec<Option<usize>>,
}

impl ProjectorMap {
    fn new(natoms: usize) -> ProjectorMap {
        ProjectorMap {
            natoms,
            slots: vec![None; MAX_PROJECTORS * natoms * MAX_CHANNELS * M_SLOTS],
        }
    }

    fn index(&self, iprj: usize, ia: usize, l: usize, m: i32) -> Option<usize> {
        let m_slot = m + MAX_CHANNELS as i32 - 1;
        if iprj >= MAX_PROJECTORS
            || ia >= self.natoms
            || l >= MAX_CHANNELS
            || m_slot < 0
            || m_slot as usize >= M_SLOTS
        {
            return None;
        }
        Some(((iprj * self.natoms + ia) * MAX_CHANNELS + l) * M_SLOTS + m_slot as usize)
    }

    /// Column of projector `iprj` (0-based) on atom `ia` for channel `(l, m)`.
    pub fn get(&self, iprj: usize, ia: usize, l: usize, m: i32) -> Option<usize> {
        self.index(iprj, ia, l, m).and_then(|i| self.slots[i])
    }

    fn set(&mut self, iprj: usize, ia: usize, l: usize, m: i32, column: usize) {
        if let Some(i) = self.index(iprj, ia, l, m) {
            self.slots[i] = Some(column);
        }
    }
}

/// Non-local projector table of a calculation.
#[derive(Debug, Clone)]
pub struct NonLocal {
    pub nbeta: usize,
    pub prj2beta: ProjectorMap,
    /// Projectors on the active G-vectors, one column per projector
    pub beta: DMatrix<Complex64>,
    /// Block-diagonal coupling `h_l,ij` in projector column order
    pub hmat: DMatrix<Complex64>,
}

impl NonLocal {
    /// Table without projectors, used for potentials without a non-local part.
    pub fn empty(system: &System) -> NonLocal {
        NonLocal {
            nbeta: 0,
            prj2beta: ProjectorMap::new(system.n_atoms()),
            beta: DMatrix::zeros(system.cell.n_active(), 0),
            hmat: DMatrix::zeros(0, 0),
        }
    }

    pub fn build(system: &System, table: &GthTable) -> Result<NonLocal> {
        let cell = &system.cell;
        let mut prj2beta = ProjectorMap::new(system.n_atoms());

        let mut nbeta = 0;
        for ia in 0..system.n_atoms() {
            let psp = lookup(table, &system.atom[ia])?;
            for l in 0..psp.lmax {
                for m in -(l as i32)..=(l as i32) {
                    for iprj in 0..psp.nproj[l] {
                        prj2beta.set(iprj, ia, l, m, nbeta);
                        nbeta += 1;
                    }
                }
            }
        }

        let gm: Vec<f64> = cell.g2c.iter().map(|g2| g2.sqrt()).collect();
        let mut beta = DMatrix::<Complex64>::zeros(cell.n_active(), nbeta);
        let mut hmat = DMatrix::<Complex64>::zeros(nbeta, nbeta);
        let mut ibeta = 0;
        for ia in 0..system.n_atoms() {
            // Structure factor carried over into the active-set normalization
            let sf = Idag(cell, &J(cell, &field_c(&cell.sf[ia]), true));
            let psp = lookup(table, &system.atom[ia])?;
            for l in 0..psp.lmax {
                let phase = Complex64::new(0.0, -1.0).powu(l as u32);
                for m in -(l as i32)..=(l as i32) {
                    for iprj in 0..psp.nproj[l] {
                        for (k, g) in cell.gc.iter().enumerate() {
                            let ylm = ylm_real(l, m, g)
                                .ok_or(ScfError::ProjectorChannel { l, iprj: iprj + 1 })?;
                            let radial = radial_projector(psp, l, iprj + 1, gm[k], cell.omega)?;
                            beta[(k, ibeta)] = phase * ylm * radial * sf[(k, 0)];
                        }
                        for jprj in 0..psp.nproj[l] {
                            if let Some(jbeta) = prj2beta.get(jprj, ia, l, m) {
                                hmat[(ibeta, jbeta)] = Complex64::new(psp.h[l][iprj][jprj], 0.0);
                            }
                        }
                        ibeta += 1;
                    }
                }
            }
        }
        debug!("Built {} non-local projectors", nbeta);

        Ok(NonLocal {
            nbeta,
            prj2beta,
            beta,
            hmat,
        })
    }

    /// Non-local potential applied on `W`, `Omega beta h (beta^H W)`.
    pub fn apply(&self, omega: f64, W: &DMatrix<Complex64>) -> DMatrix<Complex64> {
        if self.nbeta == 0 {
            return DMatrix::zeros(W.nrows(), W.ncols());
        }
        let projections = self.beta.adjoint() * W;
        (&self.beta * (&self.hmat * projections)).map(|z| z * omega)
    }

    /// Non-local energy of the orthogonal wave functions `Y` with occupations `f`.
    pub fn energy(&self, omega: f64, f: &[DVector<f64>], Y: &[DMatrix<Complex64>]) -> f64 {
        if self.nbeta == 0 {
            return 0.0;
        }
        let mut enonloc = 0.0;
        for (fs, ys) in f.iter().zip(Y.iter()) {
            let projections = self.beta.adjoint() * ys;
            for (ist, occ) in fs.iter().enumerate() {
                let b = projections.column(ist);
                enonloc += occ * (b.adjoint() * &self.hmat * b)[(0, 0)].re;
            }
        }
        enonloc * omega
    }
}

fn lookup<'a>(table: &'a GthTable, symbol: &str) -> Result<&'a GthParams> {
    table
        .get(symbol)
        .ok_or_else(|| ScfError::Config(format!("No GTH parameters loaded for \"{}\"", symbol)))
}

/// GTH projector `iprj` (1-based) of channel `l` at `|G| = gm`.
pub fn radial_projector(psp: &GthParams, l: usize, iprj: usize, gm: f64, omega: f64) -> Result<f64> {
    let rrl = psp.rp.get(l).copied().unwrap_or(0.0);
    let gr2 = (gm * rrl).powi(2);
    let gauss = (-0.5 * gr2).exp();

    let vprj = match (l, iprj) {
        (0, 1) => gauss,
        (0, 2) => 2.0 / 15f64.sqrt() * gauss * (3.0 - gr2),
        (0, 3) => (4.0 / 3.0) / 105f64.sqrt() * gauss * (15.0 - 10.0 * gr2 + gr2 * gr2),
        (1, 1) => (1.0 / 3f64.sqrt()) * gauss * gm,
        (1, 2) => (2.0 / 105f64.sqrt()) * gauss * gm * (5.0 - gr2),
        (1, 3) => (4.0 / 3.0) / 1155f64.sqrt() * gauss * gm * (35.0 - 14.0 * gr2 + gr2 * gr2),
        (2, 1) => (1.0 / 15f64.sqrt()) * gauss * gm * gm,
        (2, 2) => (2.0 / 3.0) / 105f64.sqrt() * gauss * gm * gm * (7.0 - gr2),
        (3, 1) => gm.powi(3) * gauss / 105f64.sqrt(),
        _ => return Err(ScfError::ProjectorChannel { l, iprj }),
    };

    let pre = 4.0
        * PI.powf(5.0 / 4.0)
        * (2f64.powi(l as i32 + 1) * rrl.powi(2 * l as i32 + 3) / omega).sqrt();
    Ok(pre * vprj)
}
