use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

use trainedml::config::ModelKind;

/// Argument definitions of the `trainedml` binary.
pub fn build_cli() -> Command {
    let model_names: Vec<&'static str> = ModelKind::all().map(|k| k.name()).collect();

    Command::new("trainedml")
        .version(clap::crate_version!())
        .about("\u{1F4CA} trainedml - load a dataset, train or benchmark models, plot the data")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a JSON run configuration. Flags override its values.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .help("Model to train [default: random_forest]")
                .value_parser(model_names),
        )
        .arg(
            Arg::new("dataset")
                .short('d')
                .long("dataset")
                .help("Known dataset name (iris, wine) [default: iris]")
                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .help("URL of a remote CSV file; requires --target")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .value_hint(ValueHint::Url)
                .conflicts_with("csv"),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Path to a local CSV file; requires --target")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .help("Name of the target column for --url or --csv")
                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("sep")
                .long("sep")
                .help("Field separator of the CSV file, e.g. ';' or 'tab'")
                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed of the train/test shuffle [default: 42]")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("test_size")
                .long("test-size")
                .help("Fraction of rows held out for testing [default: 0.3]")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("show")
                .long("show")
                .help("Display the figure after the run")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("histogram")
                .long("histogram")
                .help("Plot histograms of the numeric columns")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("benchmark")
                .short('b')
                .long("benchmark")
                .help("Compare every model suited to the detected task")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("parallel")
                .short('p')
                .long("parallel")
                .help("Fit benchmarked models concurrently")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Worker threads for --parallel; all cores when omitted")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("line")
                .long("line")
                .help("Plot column Y against column X")
                .num_args(2)
                .value_names(["X", "Y"]),
        )
        .arg(
            Arg::new("save")
                .short('s')
                .long("save")
                .help("Write the figure to this path")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .help("Figure format [default: html]")
                .value_parser(["html", "json"]),
        )
        .arg(
            Arg::new("report")
                .short('r')
                .long("report")
                .help("Write an HTML benchmark report to this path")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write benchmark results as JSON to this path")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("cache_dir")
                .long("cache-dir")
                .help("Directory for downloaded datasets")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
