//! Goedecker-Teter-Hutter (GTH) pseudopotentials
//!
//! Reads GTH parameter files and builds the local potential and the non-local projector
//! table. Reference: Phys. Rev. B 54, 1703.

mod local;
mod nonlocal;

pub use local::init_gth_loc;
pub use nonlocal::{radial_projector, NonLocal, ProjectorMap};

use crate::error::{Result, ScfError};
use crate::system::System;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Largest angular momentum channel count and projectors per channel supported.
pub const MAX_CHANNELS: usize = 4;
pub const MAX_PROJECTORS: usize = 3;

/// Parameters of one GTH pseudopotential.
#[derive(Debug, Clone, PartialEq)]
pub struct GthParams {
    pub symbol: String,
    /// Ionic (valence) charge, the sum of the electron counts per shell
    pub zion: f64,
    /// Range of the local Gaussian charge distribution
    pub rloc: f64,
    pub cloc: [f64; 4],
    /// Number of non-local angular momentum channels
    pub lmax: usize,
    pub rp: [f64; MAX_CHANNELS],
    pub nproj: [usize; MAX_CHANNELS],
    /// Symmetric projector coupling per channel
    pub h: [[[f64; MAX_PROJECTORS]; MAX_PROJECTORS]; MAX_CHANNELS],
}

/// Pseudopotentials keyed by element symbol.
pub type GthTable = HashMap<String, GthParams>;

impl GthParams {
    /// Parse a GTH file in the CP2K layout.
    ///
    /// The first coupling row of a channel may either follow the radius and projector
    /// count on the same line or start on the next line. Local coefficients may likewise
    /// continue on the line after `rloc nc`.
    pub fn parse(text: &str, path: &Path) -> Result<GthParams> {
        let malformed = |reason: String| ScfError::Pseudopotential {
            path: path.to_path_buf(),
            reason,
        };
        let mut lines = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty());
        let mut next_line = |what: &str| {
            lines
                .next()
                .map(|line| line.split_whitespace().collect::<Vec<_>>())
                .ok_or_else(|| malformed(format!("unexpected end of file, expected {}", what)))
        };

        let header = next_line("element symbol")?;
        let symbol = header[0].to_string();

        let counts = next_line("electron counts")?;
        let zion: usize = counts
            .iter()
            .take(4)
            .map(|t| parse_token::<usize>(t, path))
            .sum::<Result<usize>>()?;

        let local = next_line("local part")?;
        if local.len() < 2 {
            return Err(malformed("local line needs rloc and the coefficient count".into()));
        }
        let rloc = parse_token::<f64>(local[0], path)?;
        let nc = parse_token::<usize>(local[1], path)?;
        if nc > 4 {
            return Err(malformed(format!("{} local coefficients, at most 4 supported", nc)));
        }
        let mut coeffs: Vec<f64> = local[2..]
            .iter()
            .map(|t| parse_token::<f64>(t, path))
            .collect::<Result<_>>()?;
        while coeffs.len() < nc {
            for t in next_line("local coefficients")? {
                coeffs.push(parse_token::<f64>(t, path)?);
            }
        }
        let mut cloc = [0.0; 4];
        for (c, value) in cloc.iter_mut().zip(coeffs.iter().take(nc)) {
            *c = *value;
        }

        let lmax = parse_token::<usize>(next_line("lmax")?[0], path)?;
        if lmax > MAX_CHANNELS {
            return Err(malformed(format!("lmax={} exceeds {}", lmax, MAX_CHANNELS)));
        }

        let mut rp = [0.0; MAX_CHANNELS];
        let mut nproj = [0; MAX_CHANNELS];
        let mut h = [[[0.0; MAX_PROJECTORS]; MAX_PROJECTORS]; MAX_CHANNELS];
        for l in 0..lmax {
            let channel = next_line("projector channel")?;
            if channel.len() < 2 {
                return Err(malformed(format!("channel l={} needs radius and count", l)));
            }
            rp[l] = parse_token::<f64>(channel[0], path)?;
            nproj[l] = parse_token::<usize>(channel[1], path)?;
            if nproj[l] > MAX_PROJECTORS {
                return Err(malformed(format!(
                    "{} projectors in channel l={}, at most {} supported",
                    nproj[l], l, MAX_PROJECTORS
                )));
            }
            for i in 0..nproj[l] {
                let row = if i == 0 && channel.len() > 2 {
                    channel[2..].to_vec()
                } else {
                    next_line("coupling row")?
                };
                let width = nproj[l] - i;
                if row.len() < width {
                    return Err(malformed(format!(
                        "coupling row {} of channel l={} has {} values, expected {}",
                        i,
                        l,
                        row.len(),
                        width
                    )));
                }
                for (k, t) in row.iter().take(width).enumerate() {
                    h[l][i][i + k] = parse_token::<f64>(t, path)?;
                }
            }
            for i in 0..MAX_PROJECTORS {
                for j in (i + 1)..MAX_PROJECTORS {
                    h[l][j][i] = h[l][i][j];
                }
            }
        }

        Ok(GthParams {
            symbol,
            zion: zion as f64,
            rloc,
            cloc,
            lmax,
            rp,
            nproj,
            h,
        })
    }
}

fn parse_token<T: std::str::FromStr>(token: &str, path: &Path) -> Result<T> {
    token.parse::<T>().map_err(|_| ScfError::Pseudopotential {
        path: path.to_path_buf(),
        reason: format!("cannot parse \"{}\"", token),
    })
}

/// Locate and read the GTH file of `symbol`.
///
/// With a charge the file is `<dir>/<symbol>-q<charge>.gth`, otherwise the first
/// `<symbol>-q*` file in lexicographic order is used.
pub fn read_gth(dir: &Path, symbol: &str, charge: Option<u32>) -> Result<GthParams> {
    let missing = || ScfError::MissingPseudopotential {
        symbol: symbol.to_string(),
        dir: dir.to_path_buf(),
    };
    let path: PathBuf = match charge {
        Some(q) => dir.join(format!("{}-q{}.gth", symbol, q)),
        None => {
            let prefix = format!("{}-q", symbol);
            let mut files: Vec<PathBuf> = fs::read_dir(dir)
                .map_err(|_| missing())?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
                })
                .collect();
            files.sort();
            if files.len() > 1 {
                info!(
                    "Multiple pseudopotentials found for \"{}\". Continue with \"{}\".",
                    symbol,
                    files[0].display()
                );
            }
            files.into_iter().next().ok_or_else(missing)?
        }
    };
    if !path.exists() {
        return Err(missing());
    }
    let text = fs::read_to_string(&path).map_err(|source| ScfError::Io {
        path: path.clone(),
        source,
    })?;
    GthParams::parse(&text, &path)
}

/// Read the pseudopotential of every species, using the valence charge of its first atom.
pub fn load_table(system: &System, dir: &Path) -> Result<GthTable> {
    let mut table = GthTable::new();
    for symbol in system.species() {
        let charge = system
            .atom
            .iter()
            .position(|a| *a == symbol)
            .map(|ia| system.z[ia].round() as u32);
        let psp = read_gth(dir, &symbol, charge)?;
        info!(
            "GTH pseudopotential for {}: Zion={}, rloc={}, lmax={}",
            symbol, psp.zion, psp.rloc, psp.lmax
        );
        table.insert(symbol, psp);
    }
    Ok(table)
}
