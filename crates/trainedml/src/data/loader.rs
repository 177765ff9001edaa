use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::cache::{self, FetchCache};
use crate::data::table::{Series, Table};
use crate::error::{Result, TrainedMlError};

pub const IRIS_URL: &str = "https://raw.githubusercontent.com/mwaskom/seaborn-data/master/iris.csv";
pub const WINE_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/wine/wine.data";

const WINE_COLUMNS: [&str; 14] = [
    "class",
    "alcohol",
    "malic_acid",
    "ash",
    "alcalinity_of_ash",
    "magnesium",
    "total_phenols",
    "flavanoids",
    "nonflavanoid_phenols",
    "proanthocyanins",
    "color_intensity",
    "hue",
    "od280/od315_of_diluted_wines",
    "proline",
];

/// A dataset with a fixed remote location and target column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownDataset {
    Iris,
    Wine,
}

impl KnownDataset {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "iris" => Ok(KnownDataset::Iris),
            "wine" => Ok(KnownDataset::Wine),
            _ => Err(TrainedMlError::UnknownDataset(name.to_string())),
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            KnownDataset::Iris => IRIS_URL,
            KnownDataset::Wine => WINE_URL,
        }
    }

    pub fn target(&self) -> &'static str {
        match self {
            KnownDataset::Iris => "species",
            KnownDataset::Wine => "class",
        }
    }

    /// Column names for sources published without a header row.
    fn header(&self) -> Option<&'static [&'static str]> {
        match self {
            KnownDataset::Iris => None,
            KnownDataset::Wine => Some(&WINE_COLUMNS),
        }
    }
}

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Named(String),
    Url {
        url: String,
        target: String,
        separator: Option<char>,
    },
    Path {
        path: PathBuf,
        target: String,
        separator: Option<char>,
    },
}

impl DataSource {
    /// Build a source from the CLI-style triple of dataset name, url and target.
    pub fn resolve(dataset: Option<&str>, url: Option<&str>, target: Option<&str>) -> Result<Self> {
        match (url, dataset) {
            (Some(url), _) => match target {
                Some(target) => Ok(DataSource::Url {
                    url: url.to_string(),
                    target: target.to_string(),
                    separator: None,
                }),
                None => Err(TrainedMlError::MissingTarget {
                    location: url.to_string(),
                }),
            },
            (None, Some(name)) => {
                KnownDataset::from_name(name)?;
                Ok(DataSource::Named(name.to_string()))
            }
            (None, None) => Err(TrainedMlError::invalid(
                "dataset",
                "specify a known dataset name or a url with a target column",
            )),
        }
    }

    pub fn location(&self) -> String {
        match self {
            DataSource::Named(name) => name.clone(),
            DataSource::Url { url, .. } => url.clone(),
            DataSource::Path { path, .. } => path.display().to_string(),
        }
    }
}

/// Feature table and target series loaded from a [`DataSource`].
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Table,
    pub target: Series,
}

impl Dataset {
    pub fn nrows(&self) -> usize {
        self.features.nrows()
    }

    /// Features and target as a single table, target last.
    pub fn to_table(&self) -> Result<Table> {
        self.features.with_series(&self.target)
    }
}

pub struct DatasetLoader {
    cache: FetchCache,
}

impl DatasetLoader {
    pub fn new(cache: FetchCache) -> Self {
        Self { cache }
    }

    /// Loader backed by the process-wide cache set up with [`cache::init_global`].
    pub fn from_global() -> Result<Self> {
        Ok(Self::new(cache::global()?.clone()))
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    /// Load a dataset and split off its target column.
    pub fn load_dataset(&self, source: &DataSource) -> Result<Dataset> {
        let (table, target) = self.load_source(source)?;
        let (features, target) = table.split_target(&target)?;
        log::info!(
            "Loaded {} rows x {} features from {} (target: {})",
            features.nrows(),
            features.ncols(),
            source.location(),
            target.name
        );
        Ok(Dataset { features, target })
    }

    /// Load the full table, target column included.
    pub fn load_table(&self, source: &DataSource) -> Result<Table> {
        self.load_source(source).map(|(table, _)| table)
    }

    /// Download (or reuse a cached copy of) a delimited file and parse it.
    pub fn load_csv_from_url(&self, url: &str, known_hash: Option<&str>, separator: char) -> Result<Table> {
        let bytes = self.cache.fetch(url, known_hash)?;
        parse_bytes(url, &bytes, separator, None)
    }

    pub fn load_csv_from_path<P: AsRef<Path>>(&self, path: P, separator: char) -> Result<Table> {
        let path = path.as_ref();
        let location = path.display().to_string();
        let file = File::open(path).map_err(|e| TrainedMlError::Fetch {
            location: location.clone(),
            message: e.to_string(),
        })?;
        Table::from_csv_reader(BufReader::new(file), delimiter(&location, separator)?)
            .map_err(|source| TrainedMlError::Parse { location, source })
    }

    fn load_source(&self, source: &DataSource) -> Result<(Table, String)> {
        match source {
            DataSource::Named(name) => {
                let dataset = KnownDataset::from_name(name)?;
                let bytes = self.cache.fetch(dataset.url(), None)?;
                let table = parse_bytes(dataset.url(), &bytes, ',', dataset.header())?;
                Ok((table, dataset.target().to_string()))
            }
            DataSource::Url {
                url,
                target,
                separator,
            } => {
                let separator = separator.unwrap_or_else(|| default_separator(url));
                let table = self.load_csv_from_url(url, None, separator)?;
                Ok((table, target.clone()))
            }
            DataSource::Path {
                path,
                target,
                separator,
            } => {
                let table = self.load_csv_from_path(path, separator.unwrap_or(','))?;
                Ok((table, target.clone()))
            }
        }
    }
}

/// `;` for the UCI wine-quality files, `,` otherwise.
pub fn default_separator(url: &str) -> char {
    if url.contains("winequality") {
        ';'
    } else {
        ','
    }
}

fn delimiter(location: &str, separator: char) -> Result<u8> {
    u8::try_from(separator).map_err(|_| {
        TrainedMlError::invalid(
            "separator",
            format!("'{}' is not a single-byte separator for {}", separator, location),
        )
    })
}

fn parse_bytes(location: &str, bytes: &[u8], separator: char, header: Option<&[&str]>) -> Result<Table> {
    let delim = delimiter(location, separator)?;
    let parsed = match header {
        Some(names) => Table::from_csv_reader_with_names(bytes, delim, names),
        None => Table::from_csv_reader(bytes, delim),
    };
    parsed.map_err(|source| TrainedMlError::Parse {
        location: location.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn loader() -> (tempfile::TempDir, DatasetLoader) {
        let dir = tempfile::tempdir().unwrap();
        let cache = FetchCache::new(dir.path()).unwrap();
        (dir, DatasetLoader::new(cache))
    }

    #[test]
    fn test_unknown_dataset_is_config_error() {
        let (_dir, loader) = loader();
        let err = loader
            .load_dataset(&DataSource::Named("not_a_real_dataset".into()))
            .unwrap_err();
        assert!(matches!(err, TrainedMlError::UnknownDataset(_)));
        assert!(err.is_config_error());
        assert_eq!(fs::read_dir(loader.cache().dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_url_without_target_fails() {
        let err = DataSource::resolve(None, Some("https://example.org/x.csv"), None).unwrap_err();
        assert!(matches!(err, TrainedMlError::MissingTarget { .. }));
        assert!(DataSource::resolve(Some("not_a_real_dataset"), None, None).is_err());
    }

    #[test]
    fn test_named_dataset_reads_cached_copy() {
        let (_dir, loader) = loader();
        let csv = "sepal_length,sepal_width,petal_length,petal_width,species\n\
                   5.1,3.5,1.4,0.2,setosa\n7.0,3.2,4.7,1.4,versicolor\n";
        fs::write(loader.cache().cached_path(IRIS_URL), csv).unwrap();

        let dataset = loader.load_dataset(&DataSource::Named("iris".into())).unwrap();
        assert_eq!(dataset.features.shape(), (2, 4));
        assert_eq!(dataset.target.name, "species");
    }

    #[test]
    fn test_wine_gets_header_names() {
        let (_dir, loader) = loader();
        let row = "1,14.23,1.71,2.43,15.6,127,2.8,3.06,.28,2.29,5.64,1.04,3.92,1065\n";
        fs::write(loader.cache().cached_path(WINE_URL), row).unwrap();

        let dataset = loader.load_dataset(&DataSource::Named("wine".into())).unwrap();
        assert_eq!(dataset.target.name, "class");
        assert!(dataset.features.has_column("proline"));
        assert_eq!(dataset.features.ncols(), 13);
    }

    #[test]
    fn test_path_source_missing_target() {
        let (dir, loader) = loader();
        let path = dir.path().join("data.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();
        let source = DataSource::Path {
            path,
            target: "c".into(),
            separator: None,
        };
        let err = loader.load_dataset(&source).unwrap_err();
        assert!(matches!(err, TrainedMlError::TargetNotFound { .. }));
    }

    #[test]
    fn test_default_separator() {
        assert_eq!(default_separator("https://x/winequality-red.csv"), ';');
        assert_eq!(default_separator("https://x/data.csv"), ',');
    }
}
