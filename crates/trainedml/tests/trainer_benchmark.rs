//! End-to-end tests: local and cached CSV sources through the trainer and the benchmark.

use std::fs;
use std::path::{Path, PathBuf};

use trainedml::benchmark::{Benchmark, BenchmarkOptions};
use trainedml::config::{ModelConfig, Task};
use trainedml::data::cache::FetchCache;
use trainedml::data::loader::{DataSource, DatasetLoader, IRIS_URL};
use trainedml::evaluation::Scores;
use trainedml::models::factory::models_for_task;
use trainedml::report::html::{benchmark_report, save_report};
use trainedml::trainer::{Trainer, TrainerConfig};
use trainedml::visualizer::Visualizer;
use trainedml::TrainedMlError;

/// Three well separated classes laid out like the iris file.
fn iris_like_csv() -> String {
    let mut csv = String::from("sepal_length,sepal_width,petal_length,petal_width,species\n");
    let classes = [("setosa", 5.0, 3.4, 1.5, 0.2), ("versicolor", 6.0, 2.8, 4.3, 1.3), ("virginica", 6.6, 3.0, 5.6, 2.0)];
    for (k, (name, a, b, c, d)) in classes.iter().enumerate() {
        for i in 0..20 {
            let jitter = ((i * 7 + k * 3) % 10) as f64 * 0.02;
            csv.push_str(&format!(
                "{:.2},{:.2},{:.2},{:.2},{}\n",
                a + jitter,
                b - jitter,
                c + jitter,
                d + jitter / 2.0,
                name
            ));
        }
    }
    csv
}

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn local_loader(dir: &Path) -> DatasetLoader {
    DatasetLoader::new(FetchCache::new(dir.join("cache")).unwrap())
}

// ---------------------------------------------------------------------------
// Trainer
// ---------------------------------------------------------------------------

#[test]
fn trainer_classifies_local_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "iris.csv", &iris_like_csv());

    let mut trainer = Trainer::new(TrainerConfig {
        source: DataSource::Path {
            path,
            target: "species".to_string(),
            separator: None,
        },
        model: "knn".parse().unwrap(),
        test_size: 0.3,
        seed: 42,
    })
    .unwrap()
    .with_loader(local_loader(dir.path()));

    trainer.fit().unwrap();
    assert_eq!(trainer.task(), Some(Task::Classification));
    let split = trainer.split().unwrap();
    assert_eq!(split.x_train.nrows(), 42);
    assert_eq!(split.x_test.nrows(), 18);

    match trainer.evaluate().unwrap() {
        Scores::Classification(s) => assert!(s.accuracy >= 0.9, "accuracy = {}", s.accuracy),
        other => panic!("expected classification scores, got {:?}", other),
    }

    // The full table still carries the target; prediction only uses the features.
    let table = trainer.dataset().unwrap().to_table().unwrap();
    assert_eq!(trainer.predict(&table).unwrap().len(), 60);
}

#[test]
fn trainer_regresses_with_semicolon_separator() {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = String::from("x1;x2;y\n");
    for i in 0..40 {
        let x1 = i as f64 * 0.37;
        let x2 = ((i * 5) % 9) as f64 * 0.5;
        csv.push_str(&format!("{};{};{}\n", x1, x2, 2.0 * x1 - 0.5 * x2 + 0.1));
    }
    let path = write_csv(dir.path(), "linear.csv", &csv);

    let mut trainer = Trainer::new(TrainerConfig {
        source: DataSource::Path {
            path,
            target: "y".to_string(),
            separator: Some(';'),
        },
        model: "linear".parse().unwrap(),
        ..TrainerConfig::default()
    })
    .unwrap()
    .with_loader(local_loader(dir.path()));

    trainer.fit().unwrap();
    assert_eq!(trainer.task(), Some(Task::Regression));
    match trainer.evaluate().unwrap() {
        Scores::Regression(s) => {
            assert!(s.r2 > 0.999, "r2 = {}", s.r2);
            assert!(s.rmse < 1e-6);
        }
        other => panic!("expected regression scores, got {:?}", other),
    }
}

#[test]
fn trainer_rejects_regressor_for_class_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "iris.csv", &iris_like_csv());
    let mut trainer = Trainer::new(TrainerConfig {
        source: DataSource::Path {
            path,
            target: "species".to_string(),
            separator: None,
        },
        model: ModelConfig::Ridge(Default::default()),
        ..TrainerConfig::default()
    })
    .unwrap()
    .with_loader(local_loader(dir.path()));

    let err = trainer.load_data().unwrap_err();
    assert!(matches!(err, TrainedMlError::TaskMismatch { .. }));
    assert!(err.is_config_error());
}

#[test]
fn trainer_reads_named_dataset_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let loader = local_loader(dir.path());
    fs::write(loader.cache().cached_path(IRIS_URL), iris_like_csv()).unwrap();

    let mut trainer = Trainer::new(TrainerConfig::default())
        .unwrap()
        .with_loader(loader);
    trainer.fit().unwrap();
    assert!(trainer.model().is_fitted());
    assert_eq!(trainer.dataset().unwrap().target.name, "species");
}

// ---------------------------------------------------------------------------
// Benchmark
// ---------------------------------------------------------------------------

#[test]
fn benchmark_ranks_classifiers_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let loader = local_loader(dir.path());
    fs::write(loader.cache().cached_path(IRIS_URL), iris_like_csv()).unwrap();

    let mut trainer = Trainer::new(TrainerConfig {
        test_size: 0.3,
        ..TrainerConfig::default()
    })
    .unwrap()
    .with_loader(loader);
    trainer.load_data().unwrap();
    let split = trainer.split().unwrap();

    let mut bench = Benchmark::new(models_for_task(Task::Classification).unwrap());
    let results = bench.run(split, &BenchmarkOptions::parallel(Some(2))).unwrap().clone();
    assert_eq!(results.runs.len(), 3);
    assert!(results.failures.is_empty());
    for run in results.runs.values() {
        assert!(run.fit_time >= 0.0 && run.predict_time >= 0.0);
    }

    let summary = bench.summary().unwrap();
    let (best, _) = bench.best().unwrap();
    assert!(summary.contains(&format!("Best model: {}", best)));

    let report = dir.path().join("reports").join("benchmark.html");
    save_report(&benchmark_report(&results, "Benchmark"), &report).unwrap();
    assert!(fs::read_to_string(&report).unwrap().contains("random_forest"));

    let json = serde_json::to_string(&results).unwrap();
    assert!(json.contains("accuracy"));
}

// ---------------------------------------------------------------------------
// Visualizer
// ---------------------------------------------------------------------------

#[test]
fn visualizer_over_loaded_table() {
    let dir = tempfile::tempdir().unwrap();
    let loader = local_loader(dir.path());
    let path = write_csv(dir.path(), "iris.csv", &iris_like_csv());
    let table = loader
        .load_table(&DataSource::Path {
            path,
            target: "species".to_string(),
            separator: None,
        })
        .unwrap();

    let viz = Visualizer::new(table);
    assert_eq!(viz.features().len(), 5);
    assert_eq!(viz.correlation(None, Default::default()).unwrap().columns.len(), 4);
    assert!(viz.heatmap(None, Default::default(), true).is_ok());
    assert!(viz.boxplot(None, Some("species")).is_ok());
    assert!(viz.target_plot("species").is_ok());
    assert_eq!(viz.profiling().ncols, 5);

    let saved = viz
        .histogram(None, true, 10)
        .unwrap()
        .save(dir.path().join("figs").join("hist.html"))
        .unwrap();
    assert!(saved.exists());
}
