use anyhow::{Context, Result};
use std::path::PathBuf;

use trainedml::analysis::CorrelationMethod;
use trainedml::benchmark::{Benchmark, BenchmarkOptions, BenchmarkResults};
use trainedml::config::Task;
use trainedml::data::cache::{default_cache_dir, init_global};
use trainedml::data::loader::{Dataset, DatasetLoader};
use trainedml::data::split::train_test_split;
use trainedml::data::task::detect_task;
use trainedml::evaluation::Scores;
use trainedml::models::factory::models_for_task;
use trainedml::report::html::{benchmark_report, save_report};
use trainedml::report::Figure;
use trainedml::trainer::{Trainer, TrainerConfig};
use trainedml::visualizer::Visualizer;

use super::input::RunConfig;
use crate::util::write_json;

const HISTOGRAM_BINS: usize = 20;

/// What a run produced, for callers that want more than the console output.
#[derive(Debug)]
pub struct RunOutcome {
    pub task: Task,
    pub scores: Option<Scores>,
    pub benchmark: Option<BenchmarkResults>,
    pub figure: Option<PathBuf>,
}

/// Full pipeline against the process-wide download cache.
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    let cache_dir = config.cache_dir.clone().unwrap_or_else(default_cache_dir);
    init_global(&cache_dir)
        .with_context(|| format!("Failed to open cache directory {}", cache_dir.display()))?;
    log::trace!("Using cache directory {}", cache_dir.display());
    run_with_loader(config, DatasetLoader::from_global()?)
}

pub fn run_with_loader(config: &RunConfig, loader: DatasetLoader) -> Result<RunOutcome> {
    let source = config.source()?;
    println!("Loading dataset {} ...", source.location());

    let (dataset, task, scores, benchmark) = if config.benchmark {
        let dataset = loader
            .load_dataset(&source)
            .with_context(|| format!("Failed to load {}", source.location()))?;
        let task = detect_task(&dataset.target);
        println!("Detected task: {}", task);
        let results = run_benchmark(config, &dataset, task)?;
        (dataset, task, None, Some(results))
    } else {
        let mut trainer = Trainer::new(TrainerConfig {
            source,
            model: config.model_config()?,
            test_size: config.test_size,
            seed: config.seed,
        })?
        .with_loader(loader);
        trainer.load_data()?;
        let task = trainer.task().context("Task unknown after loading data")?;
        println!("Detected task: {}", task);
        if let Some(split) = trainer.split() {
            println!(
                "Train rows: {}, test rows: {} (seed={})",
                split.x_train.nrows(),
                split.x_test.nrows(),
                config.seed
            );
        }

        println!("Training {} ...", trainer.model().name());
        trainer.fit()?;
        let scores = trainer.evaluate()?;
        println!("Evaluation:");
        for (metric, value) in scores.entries() {
            println!("{}: {:.3}", metric, value);
        }
        let dataset = trainer.dataset().cloned().context("Dataset missing after fit")?;
        (dataset, task, Some(scores), None)
    };

    let figure = visualize(config, &dataset)?;
    Ok(RunOutcome {
        task,
        scores,
        benchmark,
        figure,
    })
}

fn run_benchmark(config: &RunConfig, dataset: &Dataset, task: Task) -> Result<BenchmarkResults> {
    let split = train_test_split(dataset, config.test_size, config.seed)?;
    println!(
        "Train rows: {}, test rows: {} (seed={})",
        split.x_train.nrows(),
        split.x_test.nrows(),
        config.seed
    );

    let mut bench = Benchmark::new(models_for_task(task)?);
    println!("\n--- BENCHMARK ---");
    println!("Using {} models: {}", task, bench.model_names().join(", "));

    let mode = if config.parallel {
        BenchmarkOptions::parallel(config.jobs)
    } else {
        BenchmarkOptions::sequential()
    };
    let options = BenchmarkOptions {
        show_progress: true,
        ..mode
    };
    let results = bench.run(&split, &options)?.clone();

    for (name, run) in &results.runs {
        println!("\nModel: {}", name);
        for (metric, value) in run.scores.entries() {
            println!("  {}: {:.3}", metric, value);
        }
        println!("  fit_time: {:.4} s", run.fit_time);
        println!("  predict_time: {:.4} s", run.predict_time);
    }
    match bench.summary() {
        Some(summary) => println!("\n{}", summary),
        None => log::warn!("Every model failed; no ranking available"),
    }

    if let Some(output) = &config.output {
        write_json(output, &results)
            .with_context(|| format!("Failed to write benchmark results to {}", output.display()))?;
        log::info!("Benchmark results written to {}", output.display());
    }
    if let Some(report) = &config.report {
        let title = format!("trainedml benchmark ({} task)", task);
        save_report(&benchmark_report(&results, &title), report)
            .with_context(|| format!("Failed to write report to {}", report.display()))?;
    }
    Ok(results)
}

/// One figure: the requested line plot, else a histogram, else a correlation heatmap.
fn visualize(config: &RunConfig, dataset: &Dataset) -> Result<Option<PathBuf>> {
    let viz = Visualizer::new(dataset.to_table()?).with_backend(config.backend);

    let (kind, figure): (&str, Figure) = if let Some((x, y)) = &config.line {
        println!("Plotting {} against {} ...", y, x);
        ("line plot", viz.line(x, y)?)
    } else if config.histogram {
        println!("Plotting histograms of the numeric columns ...");
        ("histogram", viz.histogram(None, true, HISTOGRAM_BINS)?)
    } else {
        println!("Plotting the correlation heatmap ...");
        ("heatmap", viz.heatmap(None, CorrelationMethod::Pearson, true)?)
    };

    let saved = match &config.save {
        Some(path) => Some(
            figure
                .save(path)
                .with_context(|| format!("Failed to save {} to {}", kind, path.display()))?,
        ),
        None => None,
    };
    if config.show {
        figure.show();
    } else if saved.is_none() {
        println!("Use --show to display the {} or --save to write it.", kind);
    }
    Ok(saved)
}
