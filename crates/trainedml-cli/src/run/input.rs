use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use trainedml::config::{ModelConfig, ModelKind};
use trainedml::data::loader::DataSource;
use trainedml::report::Backend;

use crate::util::{parse_separator, validate_csv_file};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RunConfig {
    pub version: String,
    pub model: String,
    /// Hyperparameters of `model`; unset fields keep their defaults.
    pub params: Option<serde_json::Value>,
    pub dataset: String,
    pub url: Option<String>,
    pub csv: Option<PathBuf>,
    pub target: Option<String>,
    pub sep: Option<char>,
    pub seed: u64,
    pub test_size: f64,
    pub show: bool,
    pub histogram: bool,
    pub benchmark: bool,
    pub parallel: bool,
    pub jobs: Option<usize>,
    pub line: Option<(String, String)>,
    pub save: Option<PathBuf>,
    pub backend: Backend,
    pub report: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            version: clap::crate_version!().to_string(),
            model: String::from("random_forest"),
            params: None,
            dataset: String::from("iris"),
            url: None,
            csv: None,
            target: None,
            sep: None,
            seed: 42,
            test_size: 0.3,
            show: false,
            histogram: false,
            benchmark: false,
            parallel: false,
            jobs: None,
            line: None,
            save: None,
            backend: Backend::Html,
            report: None,
            output: None,
            cache_dir: None,
        }
    }
}

impl RunConfig {
    /// Defaults, then the JSON file at `config_path` when given, then CLI flags.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = RunConfig::default();

        if let Some(config_path) = config_path {
            let config_json = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let partial: serde_json::Value = serde_json::from_str(&config_json)
                .with_context(|| format!("Config file is not valid JSON: {:?}", config_path))?;

            macro_rules! load_or_default {
                ($field:ident) => {
                    if let Some(val) = partial.get(stringify!($field)) {
                        if let Ok(parsed) = serde_json::from_value(val.clone()) {
                            config.$field = parsed;
                        } else {
                            log::warn!(
                                "Config Invalid value for '{}', using default: {:?}",
                                stringify!($field),
                                config.$field
                            );
                        }
                    } else {
                        log::debug!(
                            "Config Missing field '{}', using default: {:?}",
                            stringify!($field),
                            config.$field
                        );
                    }
                };
            }

            load_or_default!(model);
            load_or_default!(params);
            load_or_default!(dataset);
            load_or_default!(url);
            load_or_default!(csv);
            load_or_default!(target);
            load_or_default!(sep);
            load_or_default!(seed);
            load_or_default!(test_size);
            load_or_default!(show);
            load_or_default!(histogram);
            load_or_default!(benchmark);
            load_or_default!(parallel);
            load_or_default!(jobs);
            load_or_default!(line);
            load_or_default!(save);
            load_or_default!(backend);
            load_or_default!(report);
            load_or_default!(output);
            load_or_default!(cache_dir);
        }

        // Apply CLI overrides
        if let Some(model) = matches.get_one::<String>("model") {
            config.model = model.clone();
        }
        if let Some(dataset) = matches.get_one::<String>("dataset") {
            config.dataset = dataset.clone();
        }
        if let Some(url) = matches.get_one::<String>("url") {
            config.url = Some(url.clone());
        }
        if let Some(csv) = matches.get_one::<PathBuf>("csv") {
            config.csv = Some(csv.clone());
        }
        if let Some(target) = matches.get_one::<String>("target") {
            config.target = Some(target.clone());
        }
        if let Some(sep) = matches.get_one::<String>("sep") {
            config.sep = Some(parse_separator(sep)?);
        }
        if let Some(seed) = matches.get_one::<u64>("seed") {
            config.seed = *seed;
        }
        if let Some(test_size) = matches.get_one::<f64>("test_size") {
            config.test_size = *test_size;
        }
        if let Some(jobs) = matches.get_one::<usize>("jobs") {
            config.jobs = Some(*jobs);
        }
        if let Some(mut line) = matches.get_many::<String>("line") {
            if let (Some(x), Some(y)) = (line.next(), line.next()) {
                config.line = Some((x.clone(), y.clone()));
            }
        }
        if let Some(save) = matches.get_one::<PathBuf>("save") {
            config.save = Some(save.clone());
        }
        if let Some(backend) = matches.get_one::<String>("backend") {
            config.backend = Backend::from_str(backend)?;
        }
        if let Some(report) = matches.get_one::<PathBuf>("report") {
            config.report = Some(report.clone());
        }
        if let Some(output) = matches.get_one::<PathBuf>("output") {
            config.output = Some(output.clone());
        }
        if let Some(cache_dir) = matches.get_one::<PathBuf>("cache_dir") {
            config.cache_dir = Some(cache_dir.clone());
        }
        if matches.get_flag("show") {
            config.show = true;
        }
        if matches.get_flag("histogram") {
            config.histogram = true;
        }
        if matches.get_flag("benchmark") {
            config.benchmark = true;
        }
        if matches.get_flag("parallel") {
            config.parallel = true;
        }

        if let Some(csv) = &config.csv {
            validate_csv_file(csv)?;
        }

        Ok(config)
    }

    /// A local csv wins over a url, which wins over a named dataset.
    pub fn source(&self) -> Result<DataSource> {
        if let Some(path) = &self.csv {
            let target = self
                .target
                .clone()
                .with_context(|| format!("--target is required with --csv {}", path.display()))?;
            return Ok(DataSource::Path {
                path: path.clone(),
                target,
                separator: self.sep,
            });
        }
        let mut source =
            DataSource::resolve(Some(&self.dataset), self.url.as_deref(), self.target.as_deref())?;
        if let DataSource::Url { separator, .. } = &mut source {
            *separator = self.sep;
        }
        Ok(source)
    }

    /// The selected model family with `params` layered over its defaults.
    pub fn model_config(&self) -> Result<ModelConfig> {
        let kind = ModelKind::from_str(&self.model)?;
        match &self.params {
            None => Ok(kind.default_config()),
            Some(params) => {
                let config: ModelConfig = serde_json::from_value(serde_json::json!({
                    "model": kind.name(),
                    "params": params,
                }))
                .with_context(|| format!("Invalid parameters for model '{}'", kind))?;
                config.validate()?;
                Ok(config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainedml::config::KnnParams;

    #[test]
    fn test_source_precedence() {
        let config = RunConfig {
            url: Some("https://example.org/data.csv".to_string()),
            target: Some("y".to_string()),
            sep: Some(';'),
            ..RunConfig::default()
        };
        assert_eq!(
            config.source().unwrap(),
            DataSource::Url {
                url: "https://example.org/data.csv".to_string(),
                target: "y".to_string(),
                separator: Some(';'),
            }
        );

        let named = RunConfig::default().source().unwrap();
        assert_eq!(named, DataSource::Named("iris".to_string()));

        let missing = RunConfig {
            csv: Some(PathBuf::from("data.csv")),
            ..RunConfig::default()
        };
        assert!(missing.source().is_err());
    }

    #[test]
    fn test_model_params_merge_with_defaults() {
        let config = RunConfig {
            model: "knn".to_string(),
            params: Some(serde_json::json!({ "n_neighbors": 3 })),
            ..RunConfig::default()
        };
        assert_eq!(
            config.model_config().unwrap(),
            ModelConfig::Knn(KnnParams {
                n_neighbors: 3,
                ..KnnParams::default()
            })
        );

        let zero = RunConfig {
            model: "knn".to_string(),
            params: Some(serde_json::json!({ "n_neighbors": 0 })),
            ..RunConfig::default()
        };
        assert!(zero.model_config().is_err());
    }
}
