//! Example producer-price pipeline.
//!
//! Demonstrates the three-step layout every project pipeline follows:
//! collect raw data, process it into a tidy table, analyze it into a
//! session directory. The raw data is a generated sample so the example
//! runs offline.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use labbench_core::{TaskContext, TaskError};

pub const RAW_FILE: &str = "pc.data.sample.csv";
pub const RAW_SUBDIR: &str = "pc";
pub const PROCESSED_FILE: &str = "three_digit_ppi.csv";
pub const SESSION_NAME: &str = "ppi_increase_analysis";

const BASELINE_YEAR: i32 = 2015;
const TOP_N: usize = 5;

/// One row of the raw PPI extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub series_id: String,
    pub year: i32,
    pub period: String,
    pub value: Option<f64>,
}

/// One row of the processed table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpiObservation {
    /// `YYYY-MM`
    pub time: String,
    #[serde(rename = "NAICS")]
    pub naics: String,
    pub value: f64,
}

/// Change in PPI between the first baseline-year month and the latest month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PpiIncrease {
    pub naics: String,
    pub baseline_value: f64,
    pub latest_value: f64,
    pub latest_time: String,
    pub increase_pct: f64,
}

// ============================================================
// Step 1: collect
// ============================================================

/// Sector codes and monthly growth used for the generated sample
const SAMPLE_SECTORS: &[(&str, f64)] = &[
    ("211", 0.0065),
    ("221", 0.0031),
    ("311", 0.0042),
    ("325", 0.0027),
    ("331", 0.0058),
    ("484", 0.0036),
    ("562", 0.0049),
];

pub fn sample_observations() -> Vec<RawObservation> {
    let mut rows = Vec::new();

    for (i, (code, growth)) in SAMPLE_SECTORS.iter().enumerate() {
        let series_id = format!("PCU{code}---{code}---");
        let base = 100.0 + i as f64 * 7.5;

        // One pre-baseline year that processing must drop
        rows.push(RawObservation {
            series_id: series_id.clone(),
            year: BASELINE_YEAR - 1,
            period: "M12".to_string(),
            value: Some(base * 0.98),
        });

        for (year_offset, year) in (BASELINE_YEAR..=2024).enumerate() {
            for month in 1..=12 {
                let step = (year_offset * 12 + month - 1) as f64;
                let value = (base * (1.0 + growth).powf(step) * 10.0).round() / 10.0;
                rows.push(RawObservation {
                    series_id: series_id.clone(),
                    year,
                    period: format!("M{:02}", month),
                    value: Some(value),
                });
            }
            // Annual average row
            rows.push(RawObservation {
                series_id: series_id.clone(),
                year,
                period: "M13".to_string(),
                value: Some(base),
            });
        }
    }

    // Detailed industry series and a gap, both dropped by processing
    rows.push(RawObservation {
        series_id: "PCU3111--3111--".to_string(),
        year: 2020,
        period: "M01".to_string(),
        value: Some(150.0),
    });
    rows.push(RawObservation {
        series_id: "PCU311---311---".to_string(),
        year: 2025,
        period: "M01".to_string(),
        value: None,
    });

    rows
}

pub fn collect(ctx: &TaskContext) -> Result<(), TaskError> {
    let dir = ctx.paths.raw_data.join(RAW_SUBDIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(RAW_FILE);

    let rows = sample_observations();
    write_csv(&path, &rows)?;

    ctx.logger
        .info(format!("Wrote {} raw PPI rows to {}", rows.len(), path.display()));
    Ok(())
}

// ============================================================
// Step 2: process
// ============================================================

/// Three-digit sector code of a `PCU###---###---` series, if it is one
pub fn three_digit_code(series_id: &str) -> Option<&str> {
    let rest = series_id.strip_prefix("PCU")?;
    if rest.len() != 12 || !rest.is_ascii() {
        return None;
    }
    let (code, tail) = rest.split_at(3);
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    (tail == format!("---{code}---")).then_some(code)
}

/// Keep monthly three-digit observations from the baseline year onward.
pub fn process_observations(raw: &[RawObservation]) -> Vec<PpiObservation> {
    raw.iter()
        .filter(|row| row.year >= BASELINE_YEAR)
        .filter_map(|row| {
            let naics = three_digit_code(&row.series_id)?;
            let month: u32 = row.period.strip_prefix('M')?.parse().ok()?;
            if !(1..=12).contains(&month) {
                return None;
            }
            Some(PpiObservation {
                time: format!("{}-{:02}", row.year, month),
                naics: naics.to_string(),
                value: row.value?,
            })
        })
        .collect()
}

pub fn process(ctx: &TaskContext) -> Result<(), TaskError> {
    let input = ctx.paths.raw_data.join(RAW_SUBDIR).join(RAW_FILE);
    if !input.exists() {
        return Err(TaskError::MissingInput(input));
    }

    let raw: Vec<RawObservation> = read_csv(&input)?;
    ctx.logger
        .info(format!("Loaded {} raw rows from {}", raw.len(), input.display()));

    let processed = process_observations(&raw);
    ctx.logger.info(format!(
        "Kept {} monthly three-digit rows (dropped {})",
        processed.len(),
        raw.len() - processed.len()
    ));

    fs::create_dir_all(&ctx.paths.processed_data)?;
    let output = ctx.paths.processed(PROCESSED_FILE);
    write_csv(&output, &processed)?;
    ctx.logger.info(format!("Saved {}", output.display()));
    Ok(())
}

// ============================================================
// Step 3: analyze
// ============================================================

/// Percentage change per sector from its first baseline-year month to its
/// latest month, largest increase first.
pub fn rank_increases(rows: &[PpiObservation]) -> Vec<PpiIncrease> {
    let mut by_sector: BTreeMap<&str, Vec<&PpiObservation>> = BTreeMap::new();
    for row in rows {
        by_sector.entry(row.naics.as_str()).or_default().push(row);
    }

    let baseline_prefix = format!("{}-", BASELINE_YEAR);
    let mut increases: Vec<PpiIncrease> = by_sector
        .into_iter()
        .filter_map(|(naics, mut series)| {
            series.sort_by(|a, b| a.time.cmp(&b.time));
            let baseline = series
                .iter()
                .find(|r| r.time.starts_with(&baseline_prefix))?;
            let latest = series.last()?;
            if baseline.value == 0.0 {
                return None;
            }
            Some(PpiIncrease {
                naics: naics.to_string(),
                baseline_value: baseline.value,
                latest_value: latest.value,
                latest_time: latest.time.clone(),
                increase_pct: (latest.value - baseline.value) / baseline.value * 100.0,
            })
        })
        .collect();

    increases.sort_by(|a, b| {
        b.increase_pct
            .total_cmp(&a.increase_pct)
            .then_with(|| a.naics.cmp(&b.naics))
    });
    increases
}

#[derive(Debug, Serialize)]
struct AnalysisSummary<'a> {
    sectors: usize,
    baseline_year: i32,
    top: &'a [PpiIncrease],
}

pub fn analyze(ctx: &TaskContext) -> Result<(), TaskError> {
    let input = ctx.paths.processed(PROCESSED_FILE);
    if !input.exists() {
        return Err(TaskError::MissingInput(input));
    }

    let rows: Vec<PpiObservation> = read_csv(&input)?;
    ctx.logger.info(format!("Loaded {} PPI records", rows.len()));

    let ranked = rank_increases(&rows);
    let top = &ranked[..ranked.len().min(TOP_N)];

    let session = ctx.create_session(SESSION_NAME)?;

    write_csv(&session.path("top5_ppi_increases.csv"), top)?;
    session.save_json(
        "summary.json",
        &AnalysisSummary {
            sectors: ranked.len(),
            baseline_year: BASELINE_YEAR,
            top,
        },
    )?;

    let mut text = format!(
        "Largest PPI increases since {} ({} sectors compared)\n",
        BASELINE_YEAR,
        ranked.len()
    );
    for (rank, inc) in top.iter().enumerate() {
        ctx.logger
            .info(format!("  NAICS {}: +{:.1}%", inc.naics, inc.increase_pct));
        text.push_str(&format!(
            "{}. NAICS {}: {:.1} -> {:.1} ({}) +{:.1}%\n",
            rank + 1,
            inc.naics,
            inc.baseline_value,
            inc.latest_value,
            inc.latest_time,
            inc.increase_pct
        ));
    }
    session.save("summary.txt", text)?;
    session.finish();
    Ok(())
}

// ============================================================
// CSV helpers
// ============================================================

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), TaskError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_csv<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, TaskError> {
    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_error)
}

fn csv_error(e: csv::Error) -> TaskError {
    TaskError::failed(format!("CSV error: {}", e))
}
