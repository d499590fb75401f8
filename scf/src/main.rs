//! Plane-wave DFT Command-Line Interface
//!
//! This is the main entry point for running plane-wave calculations with YAML configuration.

use color_eyre::eyre::Result;
use pwscf::app::ScfApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    ScfApplication::from_cli()?.run()
}
