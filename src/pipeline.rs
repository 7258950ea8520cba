// 🔁 Pipeline - zips → plans → resolve → rewrite slcsp.csv
//
// Sequential and all-or-nothing: the target file is only rewritten after
// every input has loaded and every ZIP has resolved.

use crate::catalog::{CatalogStats, PlanCatalogLoader};
use crate::config::Config;
use crate::records::{
    load_plan_records, load_zip_records, read_target_table, write_target_table,
};
use crate::registry::RateAreaRegistry;
use crate::resolver::{OutputRow, ResolutionSummary, SlcspResolver};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Everything a run produced, for logging or a JSON report
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub zip_rows: usize,
    pub rate_areas: usize,
    pub ambiguous_zips: usize,
    pub catalog: CatalogStats,
    pub summary: ResolutionSummary,
    pub rows: Vec<OutputRow>,
}

/// Full pipeline on three paths; overwrites `slcsp_path`
pub fn run(plans_path: &Path, zips_path: &Path, slcsp_path: &Path) -> Result<()> {
    let config = Config::new(
        plans_path.to_path_buf(),
        zips_path.to_path_buf(),
        slcsp_path.to_path_buf(),
    );
    run_with_config(&config)?;
    Ok(())
}

pub fn run_with_config(config: &Config) -> Result<RunReport> {
    let mut registry = RateAreaRegistry::new();

    // 1. Rate areas from zips.csv
    let zip_records = load_zip_records(&config.zips_path)?;
    let zip_rows = registry
        .load_zip_records(zip_records)
        .with_context(|| format!("Invalid row in {}", config.zips_path.display()))?;
    info!(
        "Loaded {} zip rows: {} rate areas, {} zipcodes ({} ambiguous)",
        zip_rows,
        registry.rate_area_count(),
        registry.zip_count(),
        registry.ambiguous_zip_count()
    );

    // 2. Plans of the target tier from plans.csv
    let plan_records = load_plan_records(&config.plans_path)?;
    let catalog = PlanCatalogLoader::new(config.metal_level)
        .load(&mut registry, plan_records)
        .with_context(|| format!("Invalid row in {}", config.plans_path.display()))?;
    info!("{} ({})", catalog.summary(), config.metal_level);

    // 3. Resolve target ZIPs in file order
    let table = read_target_table(&config.slcsp_path)?;
    let rows = SlcspResolver::new(&mut registry)
        .resolve_all(table.zipcodes())
        .with_context(|| format!("Invalid row in {}", config.slcsp_path.display()))?;

    // 4. Rewrite the target table in place
    let output = table.with_rates(rows.iter().map(|row| row.rate_string()));
    write_target_table(&config.slcsp_path, &table.headers, &output)?;

    let summary = ResolutionSummary::from_rows(&rows);
    info!("{}", summary.summary());

    Ok(RunReport {
        zip_rows,
        rate_areas: registry.rate_area_count(),
        ambiguous_zips: registry.ambiguous_zip_count(),
        catalog,
        summary,
        rows,
    })
}

/// Write a run report as pretty JSON
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlcspError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const ZIPS: &str = "zipcode,state,county_code,name,rate_area\n\
        90210,CA,06037,Los Angeles,50\n\
        60647,IL,17031,Cook,12\n\
        32032,IL,17097,Lake,11\n\
        32032,IL,17031,Cook,12\n\
        55555,PR,72127,San Juan,42\n\
        10001,NY,36061,New York,3\n";

    const PLANS: &str = "plan_id,state,metal_level,rate,rate_area\n\
        CA1,CA,Silver,258.33,50\n\
        CA2,CA,Silver,258.33,50\n\
        CA3,CA,Silver,303.13,50\n\
        CA4,CA,Silver,303.13,50\n\
        CA5,CA,Gold,410.00,50\n\
        IL1,IL,Silver,100.00,12\n\
        IL2,IL,Silver,100.00,12\n\
        IL3,IL,Silver,150.00,12\n\
        IL4,IL,Silver,90.00,11\n\
        PR1,PR,Silver,101.11,42\n\
        NY1,NY,Bronze,99.00,3\n";

    const SLCSP: &str = "zipcode,rate\n\
        60647,\n\
        90210,\n\
        55555,\n\
        32032,\n\
        10001,\n\
        07030,\n";

    fn setup(zips: &str, plans: &str, slcsp: &str) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("zips.csv"), zips).unwrap();
        fs::write(dir.path().join("plans.csv"), plans).unwrap();
        fs::write(dir.path().join("slcsp.csv"), slcsp).unwrap();
        let config = Config::from_data_dir(dir.path());
        (dir, config)
    }

    #[test]
    fn test_run_rewrites_target_file() {
        let (_dir, config) = setup(ZIPS, PLANS, SLCSP);

        run(&config.plans_path, &config.zips_path, &config.slcsp_path).unwrap();

        let contents = fs::read_to_string(&config.slcsp_path).unwrap();
        assert_eq!(
            contents,
            "zipcode,rate\n\
             60647,150.00\n\
             90210,303.13\n\
             55555,101.11\n\
             32032,\n\
             10001,\n\
             07030,\n"
        );
    }

    #[test]
    fn test_run_report_counts() {
        let (_dir, config) = setup(ZIPS, PLANS, SLCSP);

        let report = run_with_config(&config).unwrap();

        assert_eq!(report.zip_rows, 6);
        assert_eq!(report.rate_areas, 5);
        assert_eq!(report.ambiguous_zips, 1);
        assert_eq!(report.catalog.plans_attached, 9);
        assert_eq!(report.catalog.skipped_other_tier, 2);
        assert_eq!(report.summary.total, 6);
        assert_eq!(report.summary.resolved, 3);
        assert_eq!(report.rows.len(), 6);
    }

    #[test]
    fn test_extra_columns_pass_through() {
        let (_dir, config) = setup(ZIPS, PLANS, "rate,zipcode,note\n,90210,beverly hills\n");

        run_with_config(&config).unwrap();

        let contents = fs::read_to_string(&config.slcsp_path).unwrap();
        assert_eq!(contents, "rate,zipcode,note\n303.13,90210,beverly hills\n");
    }

    #[test]
    fn test_unmodelled_tier_rows_do_not_abort() {
        let plans = format!("{}EB1,CA,Expanded Bronze,1.00,50\n", PLANS);
        let (_dir, config) = setup(ZIPS, &plans, SLCSP);

        let report = run_with_config(&config).unwrap();
        assert_eq!(report.catalog.skipped_other_tier, 3);
        assert_eq!(report.summary.resolved, 3);
    }

    #[test]
    fn test_invalid_premium_leaves_target_untouched() {
        let plans = format!("{}BAD,CA,Silver,free,50\n", PLANS);
        let (_dir, config) = setup(ZIPS, &plans, SLCSP);

        let err = run_with_config(&config).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SlcspError>(),
            Some(&SlcspError::InvalidPremium {
                plan_id: "BAD".to_string(),
                value: "free".to_string(),
            })
        );
        assert_eq!(fs::read_to_string(&config.slcsp_path).unwrap(), SLCSP);
    }

    #[test]
    fn test_zipcode_cells_written_as_read() {
        let (_dir, config) = setup(ZIPS, PLANS, "zipcode,rate\n7030,\n07030,\n90210,\n");

        run_with_config(&config).unwrap();

        let contents = fs::read_to_string(&config.slcsp_path).unwrap();
        assert_eq!(contents, "zipcode,rate\n7030,\n07030,\n90210,303.13\n");
    }

    #[test]
    fn test_missing_reference_file_is_error() {
        let (dir, mut config) = setup(ZIPS, PLANS, SLCSP);
        config.zips_path = dir.path().join("missing.csv");

        assert!(run_with_config(&config).is_err());
        assert_eq!(fs::read_to_string(&config.slcsp_path).unwrap(), SLCSP);
    }

    #[test]
    fn test_write_report() {
        let (dir, config) = setup(ZIPS, PLANS, SLCSP);
        let report = run_with_config(&config).unwrap();

        let report_path: PathBuf = dir.path().join("report.json");
        write_report(&report_path, &report).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(json["summary"]["ambiguous"], 1);
        assert_eq!(json["rows"][3]["resolution"]["status"], "ambiguous");
        assert_eq!(json["rows"][0]["rate"], 150.0);
    }
}
