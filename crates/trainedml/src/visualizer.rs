use crate::analysis::{
    self, CorrelationMatrix, CorrelationMethod, Describe, MissingSummary, NormalityResult,
    OutlierMethod, OutlierSummary, Profile, TargetSummary, VifEntry,
};
use crate::data::table::Table;
use crate::error::Result;
use crate::report::figure::{Backend, Figure};
use crate::report::plots;

/// Plots and summaries over one table; every figure uses the visualizer's backend.
#[derive(Debug, Clone)]
pub struct Visualizer {
    table: Table,
    backend: Backend,
}

impl Visualizer {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            backend: Backend::default(),
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    fn finish(&self, figure: Figure) -> Figure {
        figure.with_backend(self.backend)
    }

    pub fn heatmap(
        &self,
        features: Option<&[String]>,
        method: CorrelationMethod,
        mask: bool,
    ) -> Result<Figure> {
        plots::heatmap(&self.table, features, method, mask).map(|f| self.finish(f))
    }

    pub fn histogram(&self, columns: Option<&[String]>, legend: bool, bins: usize) -> Result<Figure> {
        plots::histogram(&self.table, columns, legend, bins).map(|f| self.finish(f))
    }

    pub fn line(&self, x: &str, y: &str) -> Result<Figure> {
        plots::line(&self.table, x, y).map(|f| self.finish(f))
    }

    pub fn features(&self) -> &[String] {
        self.table.column_names()
    }

    pub fn distribution(&self, columns: Option<&[String]>) -> Result<Vec<Describe>> {
        analysis::distribution(&self.table, columns)
    }

    pub fn distribution_plot(&self, columns: Option<&[String]>, bins: usize) -> Result<Figure> {
        plots::distribution_plot(&self.table, columns, bins).map(|f| self.finish(f))
    }

    pub fn correlation(&self, features: Option<&[String]>, method: CorrelationMethod) -> Result<CorrelationMatrix> {
        analysis::correlation(&self.table, features, method)
    }

    pub fn missing(&self) -> Vec<MissingSummary> {
        analysis::missing(&self.table)
    }

    pub fn missing_plot(&self) -> Figure {
        self.finish(plots::missing_plot(&self.table))
    }

    pub fn outliers(&self, method: OutlierMethod, threshold: Option<f64>) -> Result<Vec<OutlierSummary>> {
        analysis::outliers(&self.table, method, threshold)
    }

    pub fn outlier_plot(&self) -> Figure {
        self.finish(plots::outlier_plot(&self.table))
    }

    pub fn target(&self, column: &str) -> Result<TargetSummary> {
        analysis::target(&self.table, column)
    }

    pub fn target_plot(&self, column: &str) -> Result<Figure> {
        plots::target_plot(&self.table, column).map(|f| self.finish(f))
    }

    pub fn boxplot(&self, columns: Option<&[String]>, by: Option<&str>) -> Result<Figure> {
        plots::boxplot(&self.table, columns, by).map(|f| self.finish(f))
    }

    pub fn bivariate(&self, x: &str, y: &str) -> Result<Figure> {
        plots::bivariate(&self.table, x, y).map(|f| self.finish(f))
    }

    pub fn normality(&self, columns: Option<&[String]>) -> Result<Vec<NormalityResult>> {
        analysis::normality(&self.table, columns)
    }

    pub fn qq_plot(&self, columns: Option<&[String]>) -> Result<Figure> {
        plots::qq_plot(&self.table, columns).map(|f| self.finish(f))
    }

    pub fn multicollinearity(&self) -> Result<Vec<VifEntry>> {
        analysis::multicollinearity(&self.table)
    }

    pub fn vif_plot(&self) -> Result<Figure> {
        plots::vif_plot(&self.table).map(|f| self.finish(f))
    }

    pub fn profiling(&self) -> Profile {
        analysis::profiling(&self.table)
    }
}
