//! Timestamped result files.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::metrics::BenchmarkAccumulator;

/// `benchmark_results_<YYYYMMDD_HHMMSS>.json` for the given local time
pub fn results_file_name(timestamp: &DateTime<Local>) -> String {
    format!(
        "benchmark_results_{}.json",
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Write the accumulator as pretty JSON into `dir`.
///
/// Files are created exclusively. If a run in the same second already wrote
/// the timestamped name, `_1`, `_2`, ... is appended before the extension.
pub fn save_results(
    acc: &BenchmarkAccumulator,
    dir: &Path,
    timestamp: &DateTime<Local>,
) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(acc).context("Failed to serialize results")?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let base = results_file_name(timestamp);
    let stem = base.trim_end_matches(".json");

    for attempt in 0u32.. {
        let name = if attempt == 0 {
            base.clone()
        } else {
            format!("{}_{}.json", stem, attempt)
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::debug!(path = %path.display(), "Results written");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()));
            }
        }
    }

    anyhow::bail!("No free results file name in {}", dir.display())
}

/// Read a results file written by [`save_results`]
pub fn load_results(path: &Path) -> Result<BenchmarkAccumulator> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse results file {}", path.display()))
}
