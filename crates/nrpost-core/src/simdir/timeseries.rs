use super::parser::{data_columns, merge_restarts, read_header, read_table, require_columns};
use crate::domain::{PostError, ReaderResult, Reduction};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Columns of a reduction file: iteration, time, then data.
const TIME_COLUMN: usize = 1;
const FIRST_DATA_COLUMN: usize = 2;

/// Real-valued series sampled in simulation time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ColumnSource {
    path: PathBuf,
    column: usize,
}

/// Reduced time series of one reduction kind, grouped by variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesCatalog {
    reduction: Reduction,
    sources: BTreeMap<String, Vec<ColumnSource>>,
}

impl TimeseriesCatalog {
    /// Reads the header of every file to learn which variables it holds.
    /// Files without a `# data columns:` header hold one variable named after
    /// the file.
    pub(crate) fn from_files(reduction: Reduction, files: &[(String, PathBuf)]) -> ReaderResult<Self> {
        let mut sources: BTreeMap<String, Vec<ColumnSource>> = BTreeMap::new();
        for (base, path) in files {
            let columns = data_columns(&read_header(path)?);
            if columns.is_empty() {
                sources.entry(base.clone()).or_default().push(ColumnSource {
                    path: path.clone(),
                    column: FIRST_DATA_COLUMN,
                });
                continue;
            }
            for (column, name) in columns {
                sources.entry(name).or_default().push(ColumnSource {
                    path: path.clone(),
                    column,
                });
            }
        }
        Ok(Self { reduction, sources })
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn load(&self, name: &str) -> ReaderResult<TimeSeries> {
        let sources = self.sources.get(name).ok_or_else(|| {
            PostError::not_found(
                "DATA.TIMESERIES",
                format!(
                    "{} time series '{name}' is not available; available variables: [{}]",
                    self.reduction,
                    self.names().join(", ")
                ),
            )
        })?;

        let chunks = sources
            .iter()
            .map(|source| read_column(&source.path, source.column))
            .collect::<ReaderResult<Vec<_>>>()?;

        let (times, values) = merge_restarts(chunks).into_iter().unzip();
        Ok(TimeSeries { times, values })
    }
}

fn read_column(path: &Path, column: usize) -> ReaderResult<Vec<(f64, f64)>> {
    let table = read_table(path)?;
    require_columns(path, &table, column.max(TIME_COLUMN) + 1)?;
    Ok(table
        .rows()
        .into_iter()
        .map(|row| (row[TIME_COLUMN], row[column]))
        .collect())
}
