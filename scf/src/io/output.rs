//! Output formatting and logging utilities

use crate::energies::Energy;
use nalgebra::DVector;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Wall-clock time of day with second precision
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let seconds = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        write!(
            w,
            "{:02}:{:02}:{:02}",
            (seconds / 3600) % 24,
            (seconds / 60) % 60,
            seconds % 60
        )
    }
}

/// Route the log to `output_path`, or to stdout when no path is given.
pub fn setup_output(output_path: Option<&String>) {
    match output_path.map(|path| (path, File::create(path))) {
        Some((path, Ok(log))) => {
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false);
            Registry::default().with(file_layer).init();
            info!("Log written to: {}", path);
        }
        Some((path, Err(err))) => {
            eprintln!("Could not create output file {}: {}", path, err);
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
        }
    }
}

/// Write energy contributions and Kohn-Sham eigenvalues with their occupations.
pub fn print_summary<W: Write>(
    writer: &mut W,
    energies: &Energy,
    epsilon: &[DVector<f64>],
    f: &[DVector<f64>],
    converged: bool,
) -> std::io::Result<()> {
    writeln!(writer, "{}", energies)?;
    for (spin, (eps, occ)) in epsilon.iter().zip(f.iter()).enumerate() {
        if epsilon.len() > 1 {
            writeln!(writer, "Spin channel {}:", spin + 1)?;
        }
        for (i, (e, fi)) in eps.iter().zip(occ.iter()).enumerate() {
            writeln!(writer, "  State {:>3}: {:+.9} Eh  f = {:.2}", i + 1, e, fi)?;
        }
    }
    if !converged {
        writeln!(writer, "Warning: SCF not converged")?;
    }
    Ok(())
}
