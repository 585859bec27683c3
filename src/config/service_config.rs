//! Service runtime configuration: worker pool size and data location.

use super::{Lookup, parse_or};
use anyhow::Result;
use std::path::PathBuf;
use std::thread;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEnvConfig {
    pub workers: usize,
    pub data_dir: PathBuf,
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for ServiceEnvConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ServiceEnvConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        let workers: usize = parse_or(lookup, "ANALYSIS_WORKERS", defaults.workers)?;
        if workers == 0 {
            anyhow::bail!("ANALYSIS_WORKERS must be at least 1");
        }
        Ok(Self {
            workers,
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        })
    }
}
