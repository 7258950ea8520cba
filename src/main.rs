use anyhow::Result;
use clap::Parser;
use slcsp::{run_with_config, write_report, Config, MetalLevel, VERSION};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "slcsp")]
#[command(about = "Fill slcsp.csv with the second lowest cost silver plan rate per ZIP")]
struct Args {
    /// Directory holding plans.csv, zips.csv and slcsp.csv
    /// (defaults to $SLCSP_DATA_DIR, then ./data)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Plan catalog (overrides <data-dir>/plans.csv)
    #[arg(long)]
    plans: Option<PathBuf>,

    /// ZIP to rate area table (overrides <data-dir>/zips.csv)
    #[arg(long)]
    zips: Option<PathBuf>,

    /// Target ZIP list, rewritten in place (overrides <data-dir>/slcsp.csv)
    #[arg(long)]
    slcsp: Option<PathBuf>,

    /// Metal tier to rank (bronze, silver, platinum, catastrophic)
    #[arg(long, default_value = "silver")]
    metal_level: MetalLevel,

    /// Also write a JSON report of every ZIP's outcome
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Config {
        let data_dir = self.data_dir.clone().unwrap_or_else(Config::default_data_dir);
        let mut config = Config::from_data_dir(&data_dir);

        if let Some(plans) = &self.plans {
            config.plans_path = plans.clone();
        }
        if let Some(zips) = &self.zips {
            config.zips_path = zips.clone();
        }
        if let Some(slcsp) = &self.slcsp {
            config.slcsp_path = slcsp.clone();
        }
        config.metal_level = self.metal_level;
        config
    }
}

/// RUST_LOG wins when set and valid; otherwise --verbose picks the level
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    FmtSubscriber::builder()
        .with_env_filter(log_filter(args.verbose, rust_log.as_deref()))
        .with_target(false)
        .compact()
        .init();

    let config = args.config();
    info!("slcsp {} starting", VERSION);
    info!(
        "plans={} zips={} slcsp={}",
        config.plans_path.display(),
        config.zips_path.display(),
        config.slcsp_path.display()
    );

    let report = run_with_config(&config)?;
    info!("Wrote {} rows to {}", report.rows.len(), config.slcsp_path.display());

    if let Some(path) = &args.report {
        write_report(path, &report)?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}
