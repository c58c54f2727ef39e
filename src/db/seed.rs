//! Vaccine catalog seed file parsing.
//!
//! The seed file is a plain CSV with one `name,num_doses,obs` row per line.
//! The observation column is free text and may itself contain commas, so the
//! line is split at most twice.

use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaccineSeed {
    pub name: String,
    pub num_doses: i64,
    pub obs: Option<String>,
}

/// Read and parse a seed file. Malformed lines are skipped with a warning;
/// only I/O failures are errors.
pub fn load_seed_file(path: &Path) -> io::Result<Vec<VaccineSeed>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_seed(&contents))
}

fn parse_seed(contents: &str) -> Vec<VaccineSeed> {
    let mut seeds = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, ',');
        let name = fields.next().unwrap_or_default().trim();
        let doses = fields.next().unwrap_or_default().trim();
        let obs = fields.next().map(|s| s.trim().to_string());

        let num_doses = match doses.parse::<i64>() {
            Ok(n) if n > 0 => n,
            _ => {
                warn!(line = lineno + 1, "skipping seed row with bad dose count");
                continue;
            }
        };
        if name.is_empty() {
            warn!(line = lineno + 1, "skipping seed row with empty name");
            continue;
        }

        seeds.push(VaccineSeed {
            name: name.to_string(),
            num_doses,
            obs: obs.filter(|s| !s.is_empty()),
        });
    }
    seeds
}
