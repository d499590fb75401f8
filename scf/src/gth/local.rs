use super::GthTable;
use crate::error::{Result, ScfError};
use crate::system::System;
use nalgebra::DVector;
use num_complex::Complex64;
use crate::potentials::real_field_checked;
use pwbasis::helper::field_c;
use pwbasis::operators::J;
use std::f64::consts::PI;

/// Local part of the GTH pseudopotentials on the real-space grid.
///
/// The species potentials are evaluated in reciprocal space without the usual `1/Omega`
/// factor, which the dual notation absorbs. Only the real part is kept, a non-negligible
/// imaginary residue is logged.
pub fn init_gth_loc(system: &System, table: &GthTable) -> Result<DVector<f64>> {
    let cell = &system.cell;
    let mut vloc = DVector::<Complex64>::zeros(cell.n_points());
    for symbol in system.species() {
        let psp = table.get(&symbol).ok_or_else(|| {
            ScfError::Config(format!("No GTH parameters loaded for \"{}\"", symbol))
        })?;
        let (rloc, zion) = (psp.rloc, psp.zion);
        let [c1, c2, c3, c4] = psp.cloc;

        let mut vsp = cell.g2.map(|g2| {
            let x = g2 * rloc * rloc;
            let gauss = (-0.5 * x).exp();
            -4.0 * PI * zion * gauss / g2
                + (2.0 * PI).powf(1.5)
                    * rloc.powi(3)
                    * gauss
                    * (c1
                        + c2 * (3.0 - x)
                        + c3 * (15.0 - 10.0 * x + x * x)
                        + c4 * (105.0 - 105.0 * x + 21.0 * x * x - x.powi(3)))
        });
        vsp[0] = 2.0 * PI * zion * rloc * rloc
            + (2.0 * PI).powf(1.5) * rloc.powi(3) * (c1 + 3.0 * c2 + 15.0 * c3 + 105.0 * c4);

        let mut sf = DVector::<Complex64>::zeros(cell.n_points());
        for (ia, atom) in system.atom.iter().enumerate() {
            if *atom == symbol {
                sf += &cell.sf[ia];
            }
        }
        let v = DVector::from_iterator(
            cell.n_points(),
            vsp.iter().zip(sf.iter()).map(|(&v, &s)| s * v),
        );
        vloc += J(cell, &field_c(&v), true).column(0);
    }
    Ok(real_field_checked(&vloc, "GTH local potential"))
}
