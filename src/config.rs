// ⚙️ Run configuration - where the three tables live, which tier to rank

use crate::entities::MetalLevel;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the default data directory
pub const DATA_DIR_ENV: &str = "SLCSP_DATA_DIR";

pub const DEFAULT_DATA_DIR: &str = "data";

pub const PLANS_FILE: &str = "plans.csv";
pub const ZIPS_FILE: &str = "zips.csv";
pub const SLCSP_FILE: &str = "slcsp.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub plans_path: PathBuf,
    pub zips_path: PathBuf,
    /// Read for target ZIPs, then overwritten with rates
    pub slcsp_path: PathBuf,
    pub metal_level: MetalLevel,
}

impl Config {
    pub fn new(plans_path: PathBuf, zips_path: PathBuf, slcsp_path: PathBuf) -> Self {
        Config {
            plans_path,
            zips_path,
            slcsp_path,
            metal_level: MetalLevel::Silver,
        }
    }

    /// plans.csv, zips.csv and slcsp.csv under one directory
    pub fn from_data_dir(dir: &Path) -> Self {
        Config::new(dir.join(PLANS_FILE), dir.join(ZIPS_FILE), dir.join(SLCSP_FILE))
    }

    /// `$SLCSP_DATA_DIR`, falling back to `./data`
    pub fn default_data_dir() -> PathBuf {
        env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::from_data_dir(&Config::default_data_dir())
    }
}
