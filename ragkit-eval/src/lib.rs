//! # ragkit-eval
//!
//! Offline evaluation of retrieval quality across interchangeable backends.
//! A dataset of questions with reference contexts and answers is driven
//! through each backend; four metrics in [0, 1] score every case, and the
//! results are aggregated into per-backend and comparison reports written as
//! delimited files.
//!
//! Scoring is deterministic: the lexical metrics work on unicode token
//! overlap and answer relevancy on embedding similarity, so a run needs no
//! judge model.

pub mod dataset;
pub mod error;
pub mod metrics;
pub mod report;
pub mod runner;

pub use dataset::{EvalCase, EvalDataset};
pub use error::{EvalError, Result};
pub use metrics::{
    answer_relevancy, context_precision, context_recall, faithfulness, MetricScores,
};
pub use report::{summarize, write_reports, MetricSummary, Stats};
pub use runner::{BackendReport, CaseOutcome, EvalRunner};
