//! A small column-oriented table used for features, targets and exploratory analysis.
//!
//! Columns are either numeric (`f64`) or text; every cell may be missing. Tables
//! are built from CSV input and converted to dense `ndarray` matrices before they
//! reach an estimator.
use std::collections::HashSet;
use std::io::Read;

use csv::ReaderBuilder;
use ndarray::Array2;

use crate::error::{Result, TrainedMlError};

const MISSING_MARKERS: [&str; 6] = ["", "na", "nan", "n/a", "null", "none"];

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            Column::Numeric(_) => "numeric",
            Column::Text(_) => "text",
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            Column::Text(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Non-missing numeric values, in row order. Empty for text columns.
    pub fn numeric_values(&self) -> Vec<f64> {
        match self {
            Column::Numeric(v) => v.iter().flatten().copied().collect(),
            Column::Text(_) => Vec::new(),
        }
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// Cell rendered as a label; `None` for missing cells.
    pub fn label_at(&self, row: usize) -> Option<String> {
        match self {
            Column::Numeric(v) => v[row].map(format_number),
            Column::Text(v) => v[row].clone(),
        }
    }

    /// Number of distinct non-missing values.
    pub fn n_unique(&self) -> usize {
        (0..self.len())
            .filter_map(|i| self.label_at(i))
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    fn from_raw(cells: Vec<String>) -> Column {
        let missing = |s: &str| MISSING_MARKERS.contains(&s.trim().to_lowercase().as_str());
        let parsed: Option<Vec<Option<f64>>> = cells
            .iter()
            .map(|cell| {
                if missing(cell.as_str()) {
                    Some(None)
                } else {
                    cell.trim().parse::<f64>().ok().map(Some)
                }
            })
            .collect();

        match parsed {
            Some(values) => Column::Numeric(values),
            None => Column::Text(
                cells
                    .into_iter()
                    .map(|cell| if missing(cell.as_str()) { None } else { Some(cell) })
                    .collect(),
            ),
        }
    }
}

/// Render a number the way a class label reads: integral values drop the fraction.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// A named column, typically the target of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Column,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Column) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn take(&self, indices: &[usize]) -> Series {
        Series::new(self.name.clone(), self.values.take(indices))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self> {
        let mut table = Table::default();
        for (name, column) in columns {
            table.push(name, column)?;
        }
        Ok(table)
    }

    pub fn push(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(TrainedMlError::invalid(
                "columns",
                format!("duplicate column '{}'", name),
            ));
        }
        if !self.columns.is_empty() && column.len() != self.nrows() {
            return Err(TrainedMlError::invalid(
                "columns",
                format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    column.len(),
                    self.nrows()
                ),
            ));
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Parse delimited text with a header row.
    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> std::result::Result<Self, csv::Error> {
        Self::read_delimited(reader, delimiter, None)
    }

    /// Parse headerless delimited text, naming columns from `names`.
    pub fn from_csv_reader_with_names<R: Read>(
        reader: R,
        delimiter: u8,
        names: &[&str],
    ) -> std::result::Result<Self, csv::Error> {
        Self::read_delimited(reader, delimiter, Some(names))
    }

    fn read_delimited<R: Read>(
        reader: R,
        delimiter: u8,
        names: Option<&[&str]>,
    ) -> std::result::Result<Self, csv::Error> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(names.is_none())
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = match names {
            Some(names) => names.iter().map(|s| s.to_string()).collect(),
            None => rdr.headers()?.iter().map(|h| h.to_string()).collect(),
        };
        let headers = dedup_headers(headers);

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for result in rdr.records() {
            let record = result?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            for (i, cells) in raw.iter_mut().enumerate() {
                cells.push(record.get(i).unwrap_or("").to_string());
            }
        }

        Ok(Table {
            names: headers,
            columns: raw.into_iter().map(Column::from_raw).collect(),
        })
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Look up a column, reporting `argument` as the offending parameter when absent.
    pub fn require(&self, argument: &'static str, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| TrainedMlError::UnknownColumn {
            argument,
            column: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, c)| c.is_numeric())
            .map(|(n, _)| n.to_string())
            .collect()
    }

    /// Resolve an optional column selection: `None` means every numeric column.
    pub fn resolve_numeric(&self, argument: &'static str, columns: Option<&[String]>) -> Result<Vec<String>> {
        match columns {
            None => Ok(self.numeric_column_names()),
            Some(cols) => {
                for col in cols {
                    let column = self.require(argument, col)?;
                    if !column.is_numeric() {
                        return Err(TrainedMlError::invalid(
                            argument,
                            format!("column '{}' is not numeric", col),
                        ));
                    }
                }
                Ok(cols.to_vec())
            }
        }
    }

    pub fn select(&self, names: &[String]) -> Result<Table> {
        let mut out = Table::default();
        for name in names {
            out.push(name.clone(), self.require("columns", name)?.clone())?;
        }
        Ok(out)
    }

    /// Split off `target`, returning the remaining features and the target series.
    pub fn split_target(&self, target: &str) -> Result<(Table, Series)> {
        let Some(idx) = self.names.iter().position(|n| n == target) else {
            return Err(TrainedMlError::TargetNotFound {
                target: target.to_string(),
                available: self.names.join(", "),
            });
        };
        let mut features = self.clone();
        let name = features.names.remove(idx);
        let column = features.columns.remove(idx);
        Ok((features, Series::new(name, column)))
    }

    pub fn with_series(&self, series: &Series) -> Result<Table> {
        let mut out = self.clone();
        out.push(series.name.clone(), series.values.clone())?;
        Ok(out)
    }

    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
        }
    }

    /// Dense row-major feature matrix. Every column must be numeric and complete.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let (nrows, ncols) = self.shape();
        let mut data = Vec::with_capacity(nrows * ncols);
        let mut numeric = Vec::with_capacity(ncols);
        for (name, column) in self.iter() {
            let Some(values) = column.as_numeric() else {
                return Err(TrainedMlError::invalid(
                    "features",
                    format!("column '{}' is not numeric; encode it before training", name),
                ));
            };
            if column.missing_count() > 0 {
                return Err(TrainedMlError::invalid(
                    "features",
                    format!("column '{}' has missing values", name),
                ));
            }
            numeric.push(values);
        }
        for row in 0..nrows {
            for values in &numeric {
                data.push(values[row].unwrap_or(f64::NAN));
            }
        }
        Array2::from_shape_vec((nrows, ncols), data)
            .map_err(|e| TrainedMlError::invalid("features", e.to_string()))
    }

    /// Rows where every listed numeric column is present, as a dense matrix.
    pub fn complete_rows(&self, names: &[String]) -> Result<Array2<f64>> {
        let mut cols = Vec::with_capacity(names.len());
        for name in names {
            let column = self.require("columns", name)?;
            let values = column.as_numeric().ok_or_else(|| {
                TrainedMlError::invalid("columns", format!("column '{}' is not numeric", name))
            })?;
            cols.push(values);
        }
        let mut data = Vec::new();
        let mut kept = 0;
        for row in 0..self.nrows() {
            if cols.iter().all(|c| c[row].is_some()) {
                data.extend(cols.iter().map(|c| c[row].unwrap_or(f64::NAN)));
                kept += 1;
            }
        }
        Array2::from_shape_vec((kept, names.len()), data)
            .map_err(|e| TrainedMlError::invalid("columns", e.to_string()))
    }
}

/// Repeated header names get a `.1`, `.2`, ... suffix so every column stays addressable.
fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut out = Vec::with_capacity(headers.len());
    for header in headers {
        let mut name = header.clone();
        let mut k = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", header, k);
            k += 1;
        }
        if name != header {
            log::warn!("Duplicate column '{}' renamed to '{}'", header, name);
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "a,b,label\n1.0,2,x\n2.5,,y\nNA,4,x\n";

    #[test]
    fn test_csv_infers_column_types() {
        let table = Table::from_csv_reader(CSV.as_bytes(), b',').unwrap();
        assert_eq!(table.shape(), (3, 3));
        assert!(table.column("a").unwrap().is_numeric());
        assert!(!table.column("label").unwrap().is_numeric());
        assert_eq!(table.column("a").unwrap().missing_count(), 1);
        assert_eq!(table.column("b").unwrap().missing_count(), 1);
    }

    #[test]
    fn test_repeated_headers_stay_distinct() {
        let table =
            Table::from_csv_reader("a,b,a,a.1\n1,2,3,4\n".as_bytes(), b',').unwrap();
        let names: Vec<&str> = table.column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "a.1", "a.1.1"]);
        assert_eq!(table.column("a").unwrap().as_numeric().unwrap()[0], Some(1.0));
        assert_eq!(table.column("a.1").unwrap().as_numeric().unwrap()[0], Some(3.0));
    }

    #[test]
    fn test_headerless_names() {
        let table =
            Table::from_csv_reader_with_names("1,2\n3,4\n".as_bytes(), b',', &["x", "y"]).unwrap();
        assert_eq!(table.column_names(), &["x".to_string(), "y".to_string()]);
        assert_eq!(table.nrows(), 2);
    }

    #[test]
    fn test_split_target_and_matrix() {
        let table = Table::from_csv_reader("a,b,y\n1,2,0\n3,4,1\n".as_bytes(), b',').unwrap();
        let (features, target) = table.split_target("y").unwrap();
        assert_eq!(target.name, "y");
        let x = features.to_matrix().unwrap();
        assert_eq!(x.shape(), &[2, 2]);
        assert_eq!(x[(1, 0)], 3.0);
        assert!(table.split_target("missing").is_err());
    }

    #[test]
    fn test_to_matrix_rejects_text_and_missing() {
        let table = Table::from_csv_reader(CSV.as_bytes(), b',').unwrap();
        assert!(table.to_matrix().is_err());
        let numeric = table.select(&["a".to_string()]).unwrap();
        assert!(numeric.to_matrix().is_err());
    }

    #[test]
    fn test_format_number_labels() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
    }
}
