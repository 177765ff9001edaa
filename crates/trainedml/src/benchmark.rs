//! Fit and score several models on the same split, sequentially or on a rayon pool.
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use ndarray::Array2;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tqdm::tqdm;

use crate::data::split::Split;
use crate::data::table::Series;
use crate::error::{Result, TrainedMlError};
use crate::evaluation::{score, Scores};
use crate::models::model_trait::{Model, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkOptions {
    pub mode: ExecutionMode,
    /// Worker count for parallel mode; the global rayon pool is used when unset.
    pub n_jobs: Option<usize>,
    pub show_progress: bool,
}

impl BenchmarkOptions {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn parallel(n_jobs: Option<usize>) -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            n_jobs,
            show_progress: false,
        }
    }
}

/// Scores and wall-clock timings (seconds) of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRun {
    pub scores: Scores,
    pub fit_time: f64,
    pub predict_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResults {
    pub runs: BTreeMap<String, ModelRun>,
    /// Error message of every model that failed to fit, predict or score.
    pub failures: BTreeMap<String, String>,
}

impl BenchmarkResults {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Successful runs ordered by their primary metric, best first.
    pub fn ranking(&self) -> Vec<(&str, &ModelRun)> {
        let mut ranked: Vec<(&str, &ModelRun)> =
            self.runs.iter().map(|(name, run)| (name.as_str(), run)).collect();
        ranked.sort_by(|a, b| {
            b.1.scores
                .primary()
                .1
                .partial_cmp(&a.1.scores.primary().1)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    pub fn best(&self) -> Option<(&str, f64)> {
        self.ranking()
            .first()
            .map(|(name, run)| (*name, run.scores.primary().1))
    }
}

/// Inputs shared read-only by every benchmarked model.
struct SplitMatrices<'a> {
    x_train: Array2<f64>,
    x_test: Array2<f64>,
    y_train: &'a Series,
    y_test: &'a Series,
}

pub struct Benchmark {
    models: Vec<(String, Box<dyn Model>)>,
    results: BenchmarkResults,
}

impl Benchmark {
    pub fn new(models: Vec<(String, Box<dyn Model>)>) -> Self {
        Self {
            models,
            results: BenchmarkResults::default(),
        }
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Fit every model on the train side and score it on the test side.
    ///
    /// Results from a previous call are replaced. A model that fails is recorded
    /// under `failures` and the others still run.
    pub fn run(&mut self, split: &Split, options: &BenchmarkOptions) -> Result<&BenchmarkResults> {
        if self.models.is_empty() {
            return Err(TrainedMlError::invalid("models", "nothing to benchmark"));
        }
        let inputs = SplitMatrices {
            x_train: split.x_train.to_matrix()?,
            x_test: split.x_test.to_matrix()?,
            y_train: &split.y_train,
            y_test: &split.y_test,
        };

        log::info!(
            "[trainedml::benchmark] Running {} models ({:?}, train={}, test={})",
            self.models.len(),
            options.mode,
            inputs.x_train.nrows(),
            inputs.x_test.nrows()
        );

        let outcomes = match options.mode {
            ExecutionMode::Sequential => run_sequential(&mut self.models, &inputs, options.show_progress),
            ExecutionMode::Parallel => match options.n_jobs {
                Some(0) => return Err(TrainedMlError::invalid("n_jobs", "must be at least 1")),
                Some(n_jobs) => {
                    let pool = ThreadPoolBuilder::new()
                        .num_threads(n_jobs)
                        .build()
                        .map_err(|e| TrainedMlError::invalid("n_jobs", e.to_string()))?;
                    pool.install(|| run_parallel(&mut self.models, &inputs, options.show_progress))
                }
                None => run_parallel(&mut self.models, &inputs, options.show_progress),
            },
        };

        let mut results = BenchmarkResults::default();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(run) => {
                    results.runs.insert(name, run);
                }
                Err(e) => {
                    log::warn!("[trainedml::benchmark] {} failed: {}", name, e);
                    results.failures.insert(name, e.to_string());
                }
            }
        }
        self.results = results;
        Ok(&self.results)
    }

    pub fn results(&self) -> &BenchmarkResults {
        &self.results
    }

    pub fn best(&self) -> Option<(&str, f64)> {
        self.results.best()
    }

    /// Ranking table naming the best model; `None` before a successful run.
    pub fn summary(&self) -> Option<String> {
        let ranking = self.results.ranking();
        let (best_name, best_run) = ranking.first()?;
        let (metric, best_value) = best_run.scores.primary();

        let mut out = String::new();
        let _ = writeln!(out, "Benchmark ranking (by {}):", metric);
        for (rank, (name, run)) in ranking.iter().enumerate() {
            let metrics = run
                .scores
                .entries()
                .iter()
                .map(|(k, v)| format!("{}={:.4}", k, v))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(
                out,
                "  {}. {:<24} {}  fit={:.4}s predict={:.4}s",
                rank + 1,
                name,
                metrics,
                run.fit_time,
                run.predict_time
            );
        }
        let _ = writeln!(out, "Best model: {} ({} = {:.4})", best_name, metric, best_value);
        if !self.results.failures.is_empty() {
            let _ = writeln!(out, "Failed models:");
            for (name, message) in &self.results.failures {
                let _ = writeln!(out, "  - {}: {}", name, message);
            }
        }
        Some(out)
    }
}

fn run_sequential(
    models: &mut [(String, Box<dyn Model>)],
    inputs: &SplitMatrices<'_>,
    show_progress: bool,
) -> Vec<(String, Result<ModelRun>)> {
    if show_progress {
        tqdm(models.iter_mut())
            .desc(Some("Benchmark"))
            .map(|(name, model)| (name.clone(), run_one(model.as_mut(), inputs)))
            .collect()
    } else {
        models
            .iter_mut()
            .map(|(name, model)| (name.clone(), run_one(model.as_mut(), inputs)))
            .collect()
    }
}

/// Progress is reported as one log line per finished model.
fn run_parallel(
    models: &mut [(String, Box<dyn Model>)],
    inputs: &SplitMatrices<'_>,
    show_progress: bool,
) -> Vec<(String, Result<ModelRun>)> {
    let total = models.len();
    let finished = AtomicUsize::new(0);
    models
        .par_iter_mut()
        .map(|(name, model)| {
            let outcome = run_one(model.as_mut(), inputs);
            if show_progress {
                let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                log::info!("[trainedml::benchmark] {}/{} finished: {}", done, total, name);
            }
            (name.clone(), outcome)
        })
        .collect()
}

fn run_one(model: &mut dyn Model, inputs: &SplitMatrices<'_>) -> Result<ModelRun> {
    let y_train = Target::from_series(inputs.y_train, model.task())?;
    let y_test = Target::from_series(inputs.y_test, model.task())?;

    let start = Instant::now();
    model.fit(&inputs.x_train, &y_train)?;
    let fit_time = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let predictions = model.predict(&inputs.x_test)?;
    let predict_time = start.elapsed().as_secs_f64();

    log::debug!(
        "[trainedml::benchmark] {} fit in {:.4}s, predicted in {:.4}s",
        model.name(),
        fit_time,
        predict_time
    );

    Ok(ModelRun {
        scores: score(&y_test, &predictions)?,
        fit_time,
        predict_time,
    })
}
