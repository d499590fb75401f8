mod geometry;
mod report;

pub use geometry::{build_system, valence_charge};
pub use report::report_summary;

use crate::config::{Args, Config};
use crate::io::setup_output;
use crate::scf_impl::Scf;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ScfApplication {
    args: Args,
    config: Config,
    /// Directory of the configuration file, relative paths in it start here
    base_dir: PathBuf,
}

impl ScfApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let mut config = load_config(&args.config_file)?;
        config.apply_args(&args);
        let base_dir = Path::new(&args.config_file)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self {
            args,
            config,
            base_dir,
        })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Reading configuration from: {}", self.args.config_file);

        let params = self.config.scf_params();
        let settings = params
            .to_settings(&self.base_dir)
            .wrap_err("Invalid SCF parameters")?;
        let system = build_system(&self.config, &settings)?;

        let mut scf = Scf::new(system, settings).wrap_err("Failed to set up the calculation")?;
        let etot = scf.run().wrap_err("SCF failed")?;
        report_summary(&scf)?;
        info!("Total energy: {:.10} Eh", etot);
        Ok(())
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", path))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
