use crate::dataset::read_text_table;
use crate::domain::{GridDimension, PostError, Reduction, ReaderResult};
use ndarray::Array2;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const MULTIPOLE_PATTERN: &str = r"^mp_([a-zA-Z0-9\[\]_]+)_l(\d+)_m(-?\d+)_r([0-9.]+)\.asc$";
const GRID_FUNCTION_PATTERN: &str = r"^([\w\[\]]+?)(?:-\d+)?\.(x|y|z|xy|xz|yz|xyz)\.asc$";
const TIMESERIES_PATTERN: &str =
    r"^([\w\-\[\]]+?)\.(minimum|maximum|norm1|norm2|norm_inf|infnorm|average|scalars)?\.asc$";
const DATA_COLUMNS_MARKER: &str = "# data columns:";

/// What a simulation output file holds, decided from its name alone.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OutputFile {
    Multipole {
        name: String,
        l: u32,
        m: i32,
        radius: f64,
    },
    GridFunction {
        base: String,
        dimension: GridDimension,
    },
    Timeseries {
        base: String,
        reduction: Reduction,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct FileClassifier {
    multipole: Regex,
    grid_function: Regex,
    timeseries: Regex,
}

impl FileClassifier {
    pub(crate) fn new() -> ReaderResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|error| {
                PostError::internal(
                    "INTERNAL.FILE_PATTERN",
                    format!("invalid output file pattern '{pattern}': {error}"),
                )
            })
        };
        Ok(Self {
            multipole: compile(MULTIPOLE_PATTERN)?,
            grid_function: compile(GRID_FUNCTION_PATTERN)?,
            timeseries: compile(TIMESERIES_PATTERN)?,
        })
    }

    pub(crate) fn classify(&self, file_name: &str) -> Option<OutputFile> {
        if let Some(captures) = self.multipole.captures(file_name) {
            return Some(OutputFile::Multipole {
                name: captures[1].to_string(),
                l: captures[2].parse().ok()?,
                m: captures[3].parse().ok()?,
                radius: captures[4].parse().ok()?,
            });
        }

        if let Some(captures) = self.grid_function.captures(file_name) {
            return Some(OutputFile::GridFunction {
                base: captures[1].to_string(),
                dimension: captures[2].parse().ok()?,
            });
        }

        let captures = self.timeseries.captures(file_name)?;
        let token = captures.get(2).map_or("", |token| token.as_str());
        Some(OutputFile::Timeseries {
            base: captures[1].to_string(),
            reduction: Reduction::from_file_token(token)?,
        })
    }
}

/// Leading comment block of an ASCII output file.
pub(crate) fn read_header(path: &Path) -> ReaderResult<Vec<String>> {
    let file = File::open(path).map_err(|error| io_error(path, &error))?;
    let mut header = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|error| io_error(path, &error))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with('#') {
            break;
        }
        header.push(trimmed.to_string());
    }
    Ok(header)
}

/// `(column index, variable name)` pairs from a `# data columns:` header line,
/// zero-based and with any `thorn::` prefix removed.
pub(crate) fn data_columns(header: &[String]) -> Vec<(usize, String)> {
    header
        .iter()
        .filter_map(|line| line.strip_prefix(DATA_COLUMNS_MARKER))
        .flat_map(|columns| columns.split_whitespace())
        .filter_map(|token| {
            let (number, name) = token.split_once(':')?;
            let column = number.parse::<usize>().ok()?.checked_sub(1)?;
            let name = name.rsplit("::").next().unwrap_or(name);
            Some((column, name.to_string()))
        })
        .collect()
}

pub(crate) fn read_table(path: &Path) -> ReaderResult<Array2<f64>> {
    read_text_table(path).map_err(PostError::from)
}

pub(crate) fn require_columns(path: &Path, table: &Array2<f64>, needed: usize) -> ReaderResult<()> {
    if table.nrows() > 0 && table.ncols() < needed {
        return Err(PostError::invalid_input(
            "INPUT.SIMDIR_COLUMNS",
            format!(
                "'{}' has {} columns but at least {} are expected",
                path.display(),
                table.ncols(),
                needed
            ),
        ));
    }
    Ok(())
}

/// Joins samples read from successive restarts. The result is ordered by
/// time; when two chunks share a time the later chunk wins.
pub(crate) fn merge_restarts<T>(chunks: Vec<Vec<(f64, T)>>) -> Vec<(f64, T)> {
    let mut tagged: Vec<(f64, usize, T)> = chunks
        .into_iter()
        .enumerate()
        .flat_map(|(order, chunk)| chunk.into_iter().map(move |(time, value)| (time, order, value)))
        .collect();
    tagged.sort_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0).then(lhs.1.cmp(&rhs.1)));

    let mut merged: Vec<(f64, T)> = Vec::with_capacity(tagged.len());
    for (time, _, value) in tagged {
        match merged.last_mut() {
            Some(last) if last.0 == time => last.1 = value,
            _ => merged.push((time, value)),
        }
    }
    merged
}

pub(crate) fn io_error(path: &Path, error: &std::io::Error) -> PostError {
    PostError::io_system(
        "IO.SIMDIR_READ",
        format!("failed to read '{}': {error}", path.display()),
    )
}

#[cfg(test)]
mod tests {
    use super::{FileClassifier, OutputFile, data_columns, merge_restarts};
    use crate::domain::{GridDimension, Reduction};

    fn classify(name: &str) -> Option<OutputFile> {
        FileClassifier::new()
            .expect("patterns should compile")
            .classify(name)
    }

    #[test]
    fn multipole_files_carry_name_index_and_radius() {
        assert_eq!(
            classify("mp_Psi4_l2_m-2_r100.00.asc"),
            Some(OutputFile::Multipole {
                name: "Psi4".to_string(),
                l: 2,
                m: -2,
                radius: 100.0,
            })
        );
        assert_eq!(
            classify("mp_phi_re_l0_m0_r12.5.asc"),
            Some(OutputFile::Multipole {
                name: "phi_re".to_string(),
                l: 0,
                m: 0,
                radius: 12.5,
            })
        );
    }

    #[test]
    fn grid_function_files_carry_dimension() {
        assert_eq!(
            classify("rho.xy.asc"),
            Some(OutputFile::GridFunction {
                base: "rho".to_string(),
                dimension: GridDimension::Xy,
            })
        );
        assert_eq!(
            classify("phi-3.yz.asc"),
            Some(OutputFile::GridFunction {
                base: "phi".to_string(),
                dimension: GridDimension::Yz,
            })
        );
    }

    #[test]
    fn reduction_files_map_to_reductions() {
        let cases = [
            ("rho.maximum.asc", Reduction::Maximum),
            ("rho.norm_inf.asc", Reduction::InfNorm),
            ("rho..asc", Reduction::Scalar),
            ("hydrobase-rho.scalars.asc", Reduction::Scalar),
        ];
        for (name, reduction) in cases {
            match classify(name) {
                Some(OutputFile::Timeseries {
                    reduction: actual, ..
                }) => assert_eq!(actual, reduction, "{name}"),
                other => panic!("{name} classified as {other:?}"),
            }
        }
    }

    #[test]
    fn unrelated_files_are_ignored() {
        assert_eq!(classify("parameters.par"), None);
        assert_eq!(classify("rho.xy.h5"), None);
        assert_eq!(classify("rho.sum.asc"), None);
    }

    #[test]
    fn data_column_headers_strip_thorn_prefix() {
        let header = vec![
            "# 1:iteration 2:time 3:data".to_string(),
            "# data columns: 3:hydrobase::rho 4:press".to_string(),
        ];
        assert_eq!(
            data_columns(&header),
            vec![(2, "rho".to_string()), (3, "press".to_string())]
        );
        assert!(data_columns(&["# plain".to_string()]).is_empty());
    }

    #[test]
    fn later_restarts_win_on_overlap() {
        let merged = merge_restarts(vec![
            vec![(0.0, 'a'), (1.0, 'b'), (2.0, 'c')],
            vec![(2.0, 'C'), (3.0, 'D')],
        ]);
        assert_eq!(merged, vec![(0.0, 'a'), (1.0, 'b'), (2.0, 'C'), (3.0, 'D')]);
    }
}
