use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;

use crate::calibration::{GridSearchReport, TrialResult};

pub const RESULT_COLUMNS: [&str; 8] = [
    "tactical_weight",
    "elo_weight",
    "home_advantage",
    "rmse",
    "mae",
    "max_error",
    "correct_winners",
    "accuracy_%",
];

#[derive(Debug, Serialize)]
struct ResultRow {
    tactical_weight: f64,
    elo_weight: f64,
    home_advantage: f64,
    rmse: f64,
    mae: f64,
    max_error: f64,
    correct_winners: usize,
    #[serde(rename = "accuracy_%")]
    accuracy: f64,
}

impl From<&TrialResult> for ResultRow {
    fn from(t: &TrialResult) -> Self {
        Self {
            tactical_weight: t.tactical_weight,
            elo_weight: t.elo_weight,
            home_advantage: t.home_advantage,
            rmse: t.metrics.rmse,
            mae: t.metrics.mae,
            max_error: t.metrics.max_error,
            correct_winners: t.metrics.correct_winners,
            accuracy: t.metrics.accuracy,
        }
    }
}

/// Writes the ranked table, best first.
pub fn write_results_csv(path: &Path, report: &GridSearchReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create results file {}", path.display()))?;
    for trial in &report.ranked {
        writer
            .serialize(ResultRow::from(trial))
            .context("write results row")?;
    }
    writer.flush().context("flush results file")?;
    Ok(())
}

/// Same table as [`write_results_csv`] on a `Results` sheet, with the
/// baseline comparison on a `Summary` sheet.
pub fn write_results_xlsx(path: &Path, report: &GridSearchReport) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Results")?;
        write_header(sheet, &RESULT_COLUMNS)?;
        for (idx, trial) in report.ranked.iter().enumerate() {
            let row = ResultRow::from(trial);
            let values = [
                row.tactical_weight,
                row.elo_weight,
                row.home_advantage,
                row.rmse,
                row.mae,
                row.max_error,
                row.correct_winners as f64,
                row.accuracy,
            ];
            write_numbers(sheet, idx as u32 + 1, &values)?;
        }
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        let best = report.best();
        let mut rows: Vec<(&str, String)> = vec![
            ("generated_at", chrono::Utc::now().to_rfc3339()),
            ("combinations", report.combinations.to_string()),
            ("discarded", report.discarded.to_string()),
            ("best_tactical_weight", format!("{:.2}", best.tactical_weight)),
            ("best_home_advantage", format!("{:.1}", best.home_advantage)),
            ("best_rmse", format!("{:.4}", best.metrics.rmse)),
        ];
        if let Some(baseline) = report.baseline {
            rows.push(("baseline_rmse", format!("{:.4}", baseline.rmse)));
        }
        if let Some(pct) = report.improvement_pct() {
            rows.push(("rmse_improvement_%", format!("{pct:+.1}")));
        }
        for (idx, (key, value)) in rows.iter().enumerate() {
            sheet
                .write_string(idx as u32, 0, *key)
                .with_context(|| format!("write summary key {key}"))?;
            sheet
                .write_string(idx as u32, 1, value)
                .with_context(|| format!("write summary value {key}"))?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

/// Picks the writer from the file extension.
pub fn write_results(path: &Path, report: &GridSearchReport) -> Result<()> {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        write_results_xlsx(path, report)
    } else {
        write_results_csv(path, report)
    }
}

fn write_header(worksheet: &mut Worksheet, columns: &[&str]) -> Result<()> {
    for (col_idx, name) in columns.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, *name)
            .with_context(|| format!("write header {name}"))?;
    }
    Ok(())
}

fn write_numbers(worksheet: &mut Worksheet, row_idx: u32, values: &[f64]) -> Result<()> {
    for (col_idx, value) in values.iter().enumerate() {
        worksheet
            .write_number(row_idx, col_idx as u16, *value)
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
    }
    Ok(())
}
