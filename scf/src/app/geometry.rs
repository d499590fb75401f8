use crate::config::Config;
use crate::gth::read_gth;
use crate::potentials::LocalPotential;
use crate::scf_impl::ScfSettings;
use crate::system::System;
use color_eyre::eyre::{eyre, Result, WrapErr};
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use pwbasis::Cell;
use tracing::info;

/// Build the cell, atoms and occupations defined in the YAML configuration.
pub fn build_system(config: &Config, settings: &ScfSettings) -> Result<System> {
    info!("Preparing system...");

    let mut symbols = Vec::with_capacity(config.atoms.len());
    let mut positions = Vec::with_capacity(config.atoms.len());
    let mut charges = Vec::with_capacity(config.atoms.len());

    for atom in &config.atoms {
        let element = Element::from_symbol(&atom.element)
            .ok_or_else(|| eyre!("Invalid element symbol: {}", atom.element))?;
        let charge = valence_charge(&element, atom.charge, settings)?;
        info!(
            "  {:>2} at [{:.6}, {:.6}, {:.6}] with Z = {}",
            element.get_symbol(),
            atom.position[0],
            atom.position[1],
            atom.position[2],
            charge
        );
        symbols.push(element.get_symbol().to_string());
        positions.push(Vector3::from(atom.position));
        charges.push(charge);
    }

    let lattice = config.lattice()?;
    let cell = Cell::new(
        lattice,
        config.cell.sampling.per_axis(),
        config.cell.ecut,
        positions,
    )
    .wrap_err("Invalid cell")?;
    let nspin = config.scf_params().nspin.unwrap_or(1);
    Ok(System::new(cell, symbols, charges, nspin)?)
}

/// Explicit charge, else the GTH valence charge for `pot: gth`, else the atomic number.
pub fn valence_charge(element: &Element, charge: Option<f64>, settings: &ScfSettings) -> Result<f64> {
    if let Some(charge) = charge {
        return Ok(charge);
    }
    if settings.pot == LocalPotential::Gth {
        let dir = settings
            .gth_path
            .as_ref()
            .ok_or_else(|| eyre!("pot: gth needs gth_path to determine valence charges"))?;
        let psp = read_gth(dir, element.get_symbol(), None)?;
        return Ok(psp.zion);
    }
    Ok(element.get_atomic_number() as f64)
}
