//! Report aggregation and delimited-file output.
//!
//! Each backend gets a per-case file `eval_{backend}.csv`; a single
//! `comparison.csv` carries mean/std/min/max per backend and metric.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::runner::BackendReport;

/// Aggregate statistics for one metric over a report's cases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Minimum observed value.
    pub min: f64,
    /// Maximum observed value.
    pub max: f64,
}

impl Stats {
    /// Compute stats over a slice of values. Empty input yields all zeros.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { mean: 0.0, std: 0.0, min: 0.0, max: 0.0 };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Self { mean, std: variance.sqrt(), min, max }
    }
}

/// Per-metric statistics for one backend.
#[derive(Debug, Clone)]
pub struct MetricSummary {
    /// The backend name.
    pub backend: String,
    /// Stats for context recall.
    pub context_recall: Stats,
    /// Stats for context precision.
    pub context_precision: Stats,
    /// Stats for faithfulness.
    pub faithfulness: Stats,
    /// Stats for answer relevancy.
    pub answer_relevancy: Stats,
}

/// Summarize one backend's report.
pub fn summarize(report: &BackendReport) -> MetricSummary {
    let collect = |f: fn(&crate::metrics::MetricScores) -> f64| {
        report.outcomes.iter().map(|o| f(&o.scores)).collect::<Vec<_>>()
    };
    MetricSummary {
        backend: report.backend.clone(),
        context_recall: Stats::of(&collect(|s| s.context_recall)),
        context_precision: Stats::of(&collect(|s| s.context_precision)),
        faithfulness: Stats::of(&collect(|s| s.faithfulness)),
        answer_relevancy: Stats::of(&collect(|s| s.answer_relevancy)),
    }
}

/// Quote a field for CSV output when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Backend names may contain characters unfit for filenames.
fn file_stem(backend: &str) -> String {
    backend
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Write per-backend case files and the comparison file into `dir`.
///
/// Produces `eval_{backend}.csv` per report plus one `comparison.csv`.
pub fn write_reports(dir: &Path, reports: &[BackendReport]) -> Result<()> {
    fs::create_dir_all(dir)?;

    for report in reports {
        let path = dir.join(format!("eval_{}.csv", file_stem(&report.backend)));
        let mut file = fs::File::create(path)?;
        writeln!(
            file,
            "question,context_recall,context_precision,faithfulness,answer_relevancy"
        )?;
        for outcome in &report.outcomes {
            writeln!(
                file,
                "{},{:.4},{:.4},{:.4},{:.4}",
                csv_field(&outcome.question),
                outcome.scores.context_recall,
                outcome.scores.context_precision,
                outcome.scores.faithfulness,
                outcome.scores.answer_relevancy,
            )?;
        }
    }

    let mut comparison = fs::File::create(dir.join("comparison.csv"))?;
    writeln!(comparison, "backend,metric,mean,std,min,max")?;
    for report in reports {
        let summary = summarize(report);
        let rows = [
            ("context_recall", summary.context_recall),
            ("context_precision", summary.context_precision),
            ("faithfulness", summary.faithfulness),
            ("answer_relevancy", summary.answer_relevancy),
        ];
        for (metric, stats) in rows {
            writeln!(
                comparison,
                "{},{},{:.4},{:.4},{:.4},{:.4}",
                csv_field(&summary.backend),
                metric,
                stats.mean,
                stats.std,
                stats.min,
                stats.max,
            )?;
        }
    }
    Ok(())
}
