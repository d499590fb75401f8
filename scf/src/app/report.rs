use crate::io::print_summary;
use crate::scf_impl::Scf;
use crate::tools::{check_norm, check_orthonorm, get_density, get_dipole, homo};
use crate::units::{ebohr2d, ha2ev};
use color_eyre::eyre::{Result, WrapErr};
use pwbasis::operators::I;
use tracing::info;

pub fn report_summary(scf: &Scf) -> Result<()> {
    info!("SCF calculation finished.");
    let epsilon = scf.epsilon()?;
    for (spin, eps) in epsilon.iter().enumerate() {
        info!("Kohn-Sham eigenvalues (spin {}): {:?}", spin + 1, eps.as_slice());
    }
    if let Some(e) = homo(&epsilon, &scf.system.f) {
        info!("Ionization potential: {:.6} Eh = {:.4} eV", -e, ha2ev(-e));
    }

    let dipole = get_dipole(&scf.system, &get_density(scf));
    info!(
        "Dipole moment: [{:.6}, {:.6}, {:.6}] e bohr, |mu| = {:.4} D",
        dipole.x,
        dipole.y,
        dipole.z,
        ebohr2d(dipole.norm())
    );

    let cell = &scf.system.cell;
    for psi in scf.psi()? {
        let orbitals = I(cell, &psi);
        if orbitals.ncols() > 1 {
            check_orthonorm(cell, &orbitals);
        } else {
            check_norm(cell, &orbitals, 1e-9);
        }
    }

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    print_summary(
        &mut handle,
        &scf.energies,
        &epsilon,
        &scf.system.f,
        scf.converged,
    )
    .wrap_err("Unable to write the summary")
}
