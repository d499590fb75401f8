//! Command-line argument parsing for plane-wave calculations

use clap::Parser;

/// Plane-wave DFT calculation with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the total energy convergence threshold
    #[arg(long)]
    pub etol: Option<f64>,

    /// Override the conjugate gradient form (1, 2 or 3)
    #[arg(long)]
    pub cgform: Option<u8>,

    /// Override the exchange-correlation functional, e.g. "lda,vwn"
    #[arg(long)]
    pub xc: Option<String>,

    /// Override the local potential (gth, harmonic, coulomb, ge)
    #[arg(long)]
    pub pot: Option<String>,

    /// Override the initial guess (gaussian, random, pseudo)
    #[arg(long)]
    pub guess: Option<String>,

    /// Override the number of spin channels (1 or 2)
    #[arg(long)]
    pub nspin: Option<usize>,
}
