//! trainedml: dataset loading, model benchmarking and exploratory plots for tabular data.
//!
//! This crate wraps `smartcore` estimators behind a single [`Model`](models::Model)
//! trait, loads well-known or remote CSV datasets through a download cache,
//! scores models with classification or regression metric sets, compares
//! several models in a (optionally parallel) benchmark, and renders `plotly`
//! figures and HTML reports for exploratory analysis.
//!
//! The [`Trainer`](trainer::Trainer) ties loading, splitting, fitting and
//! evaluation together; the [`Visualizer`](visualizer::Visualizer) does the same
//! for plots and summaries over one table.
pub mod analysis;
pub mod benchmark;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod report;
pub mod trainer;
pub mod visualizer;

pub use error::{Result, TrainedMlError};
