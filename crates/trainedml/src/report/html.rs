//! Standalone HTML pages for benchmark results and table profiles.
use std::fs;
use std::path::Path;

use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::analysis::Profile;
use crate::benchmark::BenchmarkResults;
use crate::error::Result;
use crate::report::plots::benchmark_plot;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2em; color: #222; }
table { border-collapse: collapse; margin-bottom: 2em; }
th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
th { background: #f0f0f0; }
td.name { text-align: left; font-weight: bold; }
.failure { color: #a00; }
.meta { color: #666; font-size: 0.9em; }
"#;

fn page(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
                script src=(PLOTLY_CDN) {}
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { (title) }
                p.meta { "Generated " (Local::now().format("%Y-%m-%d %H:%M:%S").to_string()) }
                (body)
            }
        }
    }
}

fn fmt_value(value: f64) -> String {
    if value.is_finite() {
        format!("{:.4}", value)
    } else {
        value.to_string()
    }
}

/// Ranking table, failures and a grouped bar chart of every metric.
pub fn benchmark_report(results: &BenchmarkResults, title: &str) -> Markup {
    let ranking = results.ranking();
    let metrics: Vec<&'static str> = ranking
        .first()
        .map(|(_, run)| run.scores.entries().into_iter().map(|(k, _)| k).collect())
        .unwrap_or_default();
    let chart = benchmark_plot(results).plot().to_inline_html(Some("benchmark-plot"));

    page(
        title,
        html! {
            h2 { "Ranking" }
            table {
                tr {
                    th { "#" }
                    th { "Model" }
                    @for metric in &metrics { th { (metric) } }
                    th { "Fit (s)" }
                    th { "Predict (s)" }
                }
                @for (rank, (name, run)) in ranking.iter().enumerate() {
                    tr {
                        td { (rank + 1) }
                        td.name { (name) }
                        @for (_, value) in run.scores.entries() { td { (fmt_value(value)) } }
                        td { (fmt_value(run.fit_time)) }
                        td { (fmt_value(run.predict_time)) }
                    }
                }
            }
            @if let Some((best, value)) = results.best() {
                p { "Best model: " strong { (best) } " (" (fmt_value(value)) ")" }
            }
            @if !results.failures.is_empty() {
                h2 { "Failures" }
                ul {
                    @for (name, message) in &results.failures {
                        li.failure { strong { (name) } ": " (message) }
                    }
                }
            }
            h2 { "Scores" }
            (PreEscaped(chart))
        },
    )
}

fn optional(value: Option<f64>) -> String {
    value.map(fmt_value).unwrap_or_default()
}

pub fn profile_report(profile: &Profile) -> Markup {
    page(
        "Data profile",
        html! {
            p { (profile.nrows) " rows, " (profile.ncols) " columns" }
            table {
                tr {
                    th { "Column" } th { "Type" } th { "Count" } th { "Missing" } th { "Unique" }
                    th { "Top" } th { "Freq" } th { "Mean" } th { "Std" } th { "Min" } th { "Max" }
                }
                @for column in &profile.columns {
                    tr {
                        td.name { (column.name) }
                        td { (column.dtype) }
                        td { (column.count) }
                        td { (column.missing) }
                        td { (column.unique) }
                        td { (column.top.as_deref().unwrap_or("")) }
                        td { (column.freq.map(|f| f.to_string()).unwrap_or_default()) }
                        td { (optional(column.mean)) }
                        td { (optional(column.std)) }
                        td { (optional(column.min)) }
                        td { (optional(column.max)) }
                    }
                }
            }
        },
    )
}

/// Write a rendered page, creating missing parent directories.
pub fn save_report<P: AsRef<Path>>(markup: &Markup, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, markup.clone().into_string())?;
    log::info!("[trainedml::report] Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::ModelRun;
    use crate::evaluation::{ClassificationScores, Scores};

    #[test]
    fn test_benchmark_report_lists_models_and_failures() {
        let mut results = BenchmarkResults::default();
        results.runs.insert(
            "knn".to_string(),
            ModelRun {
                scores: Scores::Classification(ClassificationScores {
                    accuracy: 0.9,
                    precision: 0.91,
                    recall: 0.9,
                    f1: 0.9,
                }),
                fit_time: 0.01,
                predict_time: 0.002,
            },
        );
        results
            .failures
            .insert("lasso".to_string(), "target is text".to_string());

        let html = benchmark_report(&results, "Benchmark <iris>").into_string();
        assert!(html.contains("knn"));
        assert!(html.contains("0.9000"));
        assert!(html.contains("lasso"));
        assert!(html.contains("Benchmark &lt;iris&gt;"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");
        save_report(&benchmark_report(&results, "Benchmark"), &path).unwrap();
        assert!(path.exists());
    }
}
