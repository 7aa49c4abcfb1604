//! Two-column dataset loading for the plotting pipelines.

use crate::domain::PostError;
use ndarray::{Array2, ArrayView2};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError, read_npy};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// On-disk layout of a dataset, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    /// Single `.npy` array dump.
    Npy,
    /// `.npz` archive; the first stored array is used.
    Npz,
    /// Whitespace-separated columns with `#` comments. Fallback for every
    /// other extension, including none.
    Text,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_ascii_lowercase())
            .as_deref()
        {
            Some("npy") => Self::Npy,
            Some("npz") => Self::Npz,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode array dump '{}': {source}", path.display())]
    Npy {
        path: PathBuf,
        source: ReadNpyError,
    },
    #[error("failed to decode array archive '{}': {source}", path.display())]
    Npz {
        path: PathBuf,
        source: ReadNpzError,
    },
    #[error("array archive '{}' holds no arrays", path.display())]
    EmptyArchive { path: PathBuf },
    #[error("line {line} of '{}': {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("column {column} is out of range for a dataset with {available} columns")]
    ColumnOutOfRange { column: usize, available: usize },
}

impl From<DatasetError> for PostError {
    fn from(error: DatasetError) -> Self {
        match error {
            DatasetError::Read { .. } => PostError::io_system("IO.DATASET_READ", error.to_string()),
            DatasetError::ColumnOutOfRange { .. } => {
                PostError::invalid_argument("ARG.DATASET_COLUMN", error.to_string())
            }
            _ => PostError::invalid_input("INPUT.DATASET", error.to_string()),
        }
    }
}

/// The two selected columns of a dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnPair {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

pub fn load_columns(
    path: &Path,
    x_column: usize,
    y_column: usize,
) -> Result<ColumnPair, DatasetError> {
    let table = match DataFormat::from_path(path) {
        DataFormat::Npy => read_npy::<_, Array2<f64>>(path).map_err(|source| DatasetError::Npy {
            path: path.to_path_buf(),
            source,
        })?,
        DataFormat::Npz => read_first_npz_array(path)?,
        DataFormat::Text => read_text_table(path)?,
    };
    select_columns(table.view(), x_column, y_column)
}

pub fn select_columns(
    table: ArrayView2<'_, f64>,
    x_column: usize,
    y_column: usize,
) -> Result<ColumnPair, DatasetError> {
    let available = table.ncols();
    for column in [x_column, y_column] {
        if column >= available {
            return Err(DatasetError::ColumnOutOfRange { column, available });
        }
    }

    Ok(ColumnPair {
        x: table.column(x_column).to_vec(),
        y: table.column(y_column).to_vec(),
    })
}

fn read_first_npz_array(path: &Path) -> Result<Array2<f64>, DatasetError> {
    let npz_error = |source| DatasetError::Npz {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = NpzReader::new(file).map_err(npz_error)?;
    let names = archive.names().map_err(npz_error)?;
    let first = names.first().ok_or_else(|| DatasetError::EmptyArchive {
        path: path.to_path_buf(),
    })?;
    archive.by_name(first).map_err(npz_error)
}

/// Parses whitespace-separated numeric rows; blank lines and `#` comments are
/// skipped and every row must have the same number of columns.
pub fn read_text_table(path: &Path) -> Result<Array2<f64>, DatasetError> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_text_table(path, &content)
}

pub(crate) fn parse_text_table(path: &Path, content: &str) -> Result<Array2<f64>, DatasetError> {
    let parse_error = |line: usize, message: String| DatasetError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut width = None;
    let mut values = Vec::new();
    let mut rows = 0;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|_| parse_error(index + 1, format!("invalid number '{token}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match width {
            None => width = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(parse_error(
                    index + 1,
                    format!("expected {expected} columns, found {}", row.len()),
                ));
            }
            Some(_) => {}
        }

        values.extend(row);
        rows += 1;
    }

    let columns = width.unwrap_or(0);
    Array2::from_shape_vec((rows, columns), values)
        .map_err(|error| parse_error(0, format!("inconsistent table shape: {error}")))
}

#[cfg(test)]
mod tests {
    use super::{ColumnPair, DataFormat, DatasetError, load_columns, parse_text_table};
    use crate::domain::PostErrorCategory;
    use crate::domain::PostError;
    use ndarray::array;
    use ndarray_npy::{NpzWriter, write_npy};
    use std::fs::{self, File};
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn format_is_chosen_by_extension_with_text_fallback() {
        assert_eq!(DataFormat::from_path(Path::new("a.npy")), DataFormat::Npy);
        assert_eq!(DataFormat::from_path(Path::new("a.NPZ")), DataFormat::Npz);
        assert_eq!(DataFormat::from_path(Path::new("a.dat")), DataFormat::Text);
        assert_eq!(DataFormat::from_path(Path::new("series")), DataFormat::Text);
    }

    #[test]
    fn text_tables_skip_comments_and_blank_lines() {
        let table = parse_text_table(
            Path::new("t.dat"),
            "# t value\n0.0 1.0 5.0\n\n1.0 2.0 6.0 # trailing\n",
        )
        .expect("table should parse");
        assert_eq!(table, array![[0.0, 1.0, 5.0], [1.0, 2.0, 6.0]]);
    }

    #[test]
    fn ragged_or_non_numeric_rows_are_rejected() {
        let error = parse_text_table(Path::new("t.dat"), "1 2\n3\n").expect_err("ragged");
        assert!(matches!(error, DatasetError::Parse { line: 2, .. }));
        let error = parse_text_table(Path::new("t.dat"), "1 abc\n").expect_err("non numeric");
        assert!(error.to_string().contains("invalid number 'abc'"));
    }

    #[test]
    fn columns_are_selected_from_every_format() {
        let temp = TempDir::new().expect("tempdir should be created");
        let table = array![[0.0, 10.0, 20.0], [1.0, 11.0, 21.0], [2.0, 12.0, 22.0]];
        let expected = ColumnPair {
            x: vec![0.0, 1.0, 2.0],
            y: vec![20.0, 21.0, 22.0],
        };

        let npy = temp.path().join("table.npy");
        write_npy(&npy, &table).expect("npy should be written");
        assert_eq!(load_columns(&npy, 0, 2).unwrap(), expected);

        let npz = temp.path().join("table.npz");
        let mut writer = NpzWriter::new(File::create(&npz).expect("npz should be created"));
        writer.add_array("arr_0", &table).expect("array should be added");
        writer.finish().expect("npz should be finished");
        assert_eq!(load_columns(&npz, 0, 2).unwrap(), expected);

        let text = temp.path().join("table.asc");
        fs::write(&text, "0 10 20\n1 11 21\n2 12 22\n").expect("text should be written");
        assert_eq!(load_columns(&text, 0, 2).unwrap(), expected);
    }

    #[test]
    fn errors_map_to_the_shared_taxonomy() {
        let temp = TempDir::new().expect("tempdir should be created");
        let text = temp.path().join("table.asc");
        fs::write(&text, "0 1\n").expect("text should be written");

        let error: PostError = load_columns(&text, 0, 4).expect_err("column 4 missing").into();
        assert_eq!(error.category(), PostErrorCategory::InvalidArgument);

        let error: PostError = load_columns(&temp.path().join("missing.asc"), 0, 1)
            .expect_err("missing file")
            .into();
        assert_eq!(error.category(), PostErrorCategory::IoSystem);
    }
}
