use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use plotly::layout::Axis;
use plotly::Plot;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainedMlError};

/// Output format of a [`Figure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Standalone interactive HTML page.
    #[default]
    Html,
    /// Plotly figure JSON.
    Json,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Html => "html",
            Backend::Json => "json",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = TrainedMlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" | "plotly" => Ok(Backend::Html),
            "json" => Ok(Backend::Json),
            other => Err(TrainedMlError::UnsupportedBackend(other.to_string())),
        }
    }
}

/// A rendered plot plus the format it is shown and saved in.
#[derive(Clone)]
pub struct Figure {
    plot: Plot,
    backend: Backend,
}

impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure").field("backend", &self.backend).finish()
    }
}

impl Figure {
    pub fn new(plot: Plot) -> Self {
        Self {
            plot,
            backend: Backend::default(),
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn plot(&self) -> &Plot {
        &self.plot
    }

    pub fn into_plot(self) -> Plot {
        self.plot
    }

    /// Replace the title and axis labels that are given; the others are kept.
    pub fn annotate(&mut self, title: Option<&str>, xlabel: Option<&str>, ylabel: Option<&str>) -> &mut Self {
        let mut layout = self.plot.layout().clone();
        if let Some(title) = title {
            layout = layout.title(title);
        }
        if let Some(xlabel) = xlabel {
            layout = layout.x_axis(Axis::new().title(xlabel));
        }
        if let Some(ylabel) = ylabel {
            layout = layout.y_axis(Axis::new().title(ylabel));
        }
        self.plot.set_layout(layout);
        self
    }

    pub fn to_html(&self) -> String {
        self.plot.to_html()
    }

    pub fn to_json(&self) -> String {
        self.plot.to_json()
    }

    /// Figure text in the format of its backend.
    pub fn render(&self) -> String {
        match self.backend {
            Backend::Html => self.to_html(),
            Backend::Json => self.to_json(),
        }
    }

    /// Write the rendered figure, creating missing parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())?;
        log::info!("[trainedml::figure] Saved {} figure to {}", self.backend, path.display());
        Ok(path.to_path_buf())
    }

    /// Open the figure in a browser, or print its JSON for the JSON backend.
    pub fn show(&self) {
        match self.backend {
            Backend::Html => self.plot.show(),
            Backend::Json => println!("{}", self.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotly::Scatter;

    fn figure() -> Figure {
        let mut plot = Plot::new();
        plot.add_trace(Scatter::new(vec![1.0, 2.0], vec![3.0, 4.0]).name("points"));
        Figure::new(plot)
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("html".parse::<Backend>().unwrap(), Backend::Html);
        assert_eq!("Plotly".parse::<Backend>().unwrap(), Backend::Html);
        assert_eq!("json".parse::<Backend>().unwrap(), Backend::Json);
        let err = "matplotlib".parse::<Backend>().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("plot.json");
        let mut fig = figure().with_backend(Backend::Json);
        fig.annotate(Some("Title"), Some("x"), None);
        fig.save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("points"));
        assert!(written.contains("Title"));
    }

    #[test]
    fn test_html_render() {
        let html = figure().render();
        assert!(html.contains("<html"));
    }
}
