//! Calibration, profiling, and interference readouts

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use console_lib::{DataSyncStore, SlotKey, SlotView};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{
    color_score, format_value, print_info, print_table, print_warning, score_bar, OutputFormat,
};

/// Row for the calibration curve table
#[derive(Tabled, Serialize)]
struct CalibrationRow {
    #[tabled(rename = "Load intensity")]
    load_intensity: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
}

/// Row for a profiling sample series
#[derive(Tabled, Serialize)]
struct ProfilingRow {
    #[tabled(rename = "Intensity")]
    intensity: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "p10")]
    p10: String,
    #[tabled(rename = "p90")]
    p90: String,
}

/// Row for the interference score readout
#[derive(Tabled, Serialize)]
struct ScoreRow {
    #[tabled(rename = "Benchmark")]
    benchmark: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "")]
    bar: String,
}

/// Show the calibration curve for an app
pub async fn show_calibration(
    store: &DataSyncStore,
    app_id: &str,
    refresh: bool,
    format: OutputFormat,
) -> Result<()> {
    let slot = SlotKey::calibration(app_id);
    if refresh {
        store.invalidate(&slot);
    }

    let result = store
        .calibration(app_id)
        .await
        .with_context(|| format!("failed to load calibration for {}", app_id))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            let rows: Vec<CalibrationRow> = result
                .test_result
                .iter()
                .map(|s| CalibrationRow {
                    load_intensity: format_value(s.load_intensity),
                    mean: format_value(s.mean),
                    min: format_value(s.min),
                    max: format_value(s.max),
                })
                .collect();
            print_table(&rows, format);
            print_info(&format!(
                "Final intensity: {}",
                format_value(result.final_intensity).bold()
            ));
            if let SlotView::Loaded { fetched_at, .. } = store.get(&slot) {
                println!(
                    "{}",
                    format!(
                        "fetched {}",
                        fetched_at.with_timezone(&Local).format("%H:%M:%S")
                    )
                    .dimmed()
                );
            }
        }
    }

    Ok(())
}

/// Show the profiling curves for one service of an app
pub async fn show_profiling(
    store: &DataSyncStore,
    app_id: &str,
    service: &str,
    refresh: bool,
    format: OutputFormat,
) -> Result<()> {
    if refresh {
        store.invalidate(&SlotKey::profiling(app_id, service));
    }

    let result = store
        .profiling(app_id, service)
        .await
        .with_context(|| format!("failed to load profiling for {}/{}", app_id, service))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            print_info(&format!("SLO metric: {}", result.slo_metric.bold()));
            if result.test_result.is_empty() {
                print_warning("No profiling series recorded");
            }
            for (benchmark, samples) in &result.test_result {
                println!("\n{}", benchmark.bold());
                let rows: Vec<ProfilingRow> = samples
                    .iter()
                    .map(|s| ProfilingRow {
                        intensity: format_value(s.intensity),
                        mean: format_value(s.mean),
                        p10: format_value(s.percentile_10),
                        p90: format_value(s.percentile_90),
                    })
                    .collect();
                print_table(&rows, format);
            }
        }
    }

    Ok(())
}

/// Show the interference scores for one service of an app
pub async fn show_interference(
    store: &DataSyncStore,
    app_id: &str,
    service: &str,
    refresh: bool,
    format: OutputFormat,
) -> Result<()> {
    if refresh {
        store.invalidate(&SlotKey::interference(app_id, service));
    }

    let result = store
        .interference(app_id, service)
        .await
        .with_context(|| format!("failed to load interference for {}/{}", app_id, service))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            if result.benchmark.len() != result.score.len() {
                print_warning("benchmark and score series differ in length; extra entries ignored");
            }
            let rows: Vec<ScoreRow> = result
                .benchmark
                .iter()
                .zip(&result.score)
                .map(|(benchmark, score)| ScoreRow {
                    benchmark: benchmark.clone(),
                    score: color_score(*score),
                    bar: score_bar(*score),
                })
                .collect();
            print_table(&rows, format);
        }
    }

    Ok(())
}
