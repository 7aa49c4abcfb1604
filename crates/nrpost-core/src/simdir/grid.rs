//! Grid functions written by CarpetIOASCII.
//!
//! Every data row carries `it tl rl c ml ix iy iz time x y z data...`. Rows of
//! one iteration are grouped by refinement level and keyed by their integer
//! grid indices, so components and restarts of the same level merge into one
//! node set.

use super::parser::{data_columns, read_header, read_table, require_columns};
use crate::domain::{Axis, GridDimension, PostError, ReaderResult};
use crate::numerics::interpolation_weight;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

const ITERATION_COLUMN: usize = 0;
const LEVEL_COLUMN: usize = 2;
const INDEX_COLUMNS: [usize; 3] = [5, 6, 7];
const TIME_COLUMN: usize = 8;
const COORDINATE_COLUMNS: [usize; 3] = [9, 10, 11];
const FIRST_DATA_COLUMN: usize = 12;

#[derive(Debug, Clone, PartialEq)]
struct ColumnSource {
    path: PathBuf,
    column: usize,
}

/// Grid functions of one dimensionality, grouped by variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct GridFunctionCatalog {
    dimension: GridDimension,
    sources: BTreeMap<String, Vec<ColumnSource>>,
}

impl GridFunctionCatalog {
    pub(crate) fn from_files(
        dimension: GridDimension,
        files: &[(String, PathBuf)],
    ) -> ReaderResult<Self> {
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
        Ok(Self { dimension, sources })
    }

    pub fn dimension(&self) -> GridDimension {
        self.dimension
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn load(&self, name: &str) -> ReaderResult<GridFunction> {
        let sources = self.sources.get(name).ok_or_else(|| {
            PostError::not_found(
                "DATA.GRID_FUNCTION",
                format!(
                    "Grid function {name} is not available. Available grid functions are: [{}]",
                    self.names().join(", ")
                ),
            )
        })?;

        let mut function = GridFunction {
            name: name.to_string(),
            dimension: self.dimension,
            iterations: BTreeMap::new(),
        };
        for source in sources {
            function.absorb(source)?;
        }
        Ok(function)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct RefinementLevel {
    /// Values keyed by grid index; axes the slice does not span stay at 0.
    nodes: HashMap<[i64; 3], f64>,
    coordinates: [BTreeMap<i64, f64>; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Snapshot {
    time: f64,
    levels: BTreeMap<i64, RefinementLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridFunction {
    name: String,
    dimension: GridDimension,
    iterations: BTreeMap<i64, Snapshot>,
}

impl GridFunction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> GridDimension {
        self.dimension
    }

    /// Iterations with data, ascending.
    pub fn available_iterations(&self) -> Vec<i64> {
        self.iterations.keys().copied().collect()
    }

    pub fn time_at_iteration(&self, iteration: i64) -> ReaderResult<f64> {
        self.snapshot(iteration).map(|snapshot| snapshot.time)
    }

    /// Value at `point` (one coordinate per axis of the dimension) on
    /// `iteration`, interpolated on the finest level that covers the point.
    pub fn evaluate(&self, iteration: i64, point: &[f64]) -> ReaderResult<f64> {
        let axes = self.dimension.axes();
        if point.len() != axes.len() {
            return Err(PostError::invalid_argument(
                "ARG.POINT_RANK",
                format!(
                    "{} data needs {} coordinates, got {}",
                    self.dimension,
                    axes.len(),
                    point.len()
                ),
            ));
        }

        let snapshot = self.snapshot(iteration)?;
        snapshot
            .levels
            .values()
            .rev()
            .find_map(|level| level.interpolate(axes, point))
            .ok_or_else(|| {
                PostError::not_found(
                    "DATA.POINT_OUTSIDE_GRID",
                    format!(
                        "point {point:?} lies outside the {} grid of '{}' at iteration {iteration}",
                        self.dimension, self.name
                    ),
                )
            })
    }

    fn snapshot(&self, iteration: i64) -> ReaderResult<&Snapshot> {
        self.iterations.get(&iteration).ok_or_else(|| {
            PostError::not_found(
                "DATA.ITERATION",
                format!(
                    "iteration {iteration} of '{}' is not available ({} iterations on disk)",
                    self.name,
                    self.iterations.len()
                ),
            )
        })
    }

    /// Later rows overwrite earlier ones at the same node, so restarts and
    /// per-process chunks merge in file order.
    fn absorb(&mut self, source: &ColumnSource) -> ReaderResult<()> {
        let table = read_table(&source.path)?;
        require_columns(
            &source.path,
            &table,
            (source.column + 1).max(FIRST_DATA_COLUMN),
        )?;

        let spanned = self.dimension.axes();
        for row in table.rows() {
            let snapshot = self
                .iterations
                .entry(row[ITERATION_COLUMN] as i64)
                .or_default();
            snapshot.time = row[TIME_COLUMN];

            let level = snapshot.levels.entry(row[LEVEL_COLUMN] as i64).or_default();
            let mut key = [0_i64; 3];
            for axis in spanned {
                let slot = axis.index();
                key[slot] = row[INDEX_COLUMNS[slot]] as i64;
                level.coordinates[slot].insert(key[slot], row[COORDINATE_COLUMNS[slot]]);
            }
            level.nodes.insert(key, row[source.column]);
        }
        Ok(())
    }
}

impl RefinementLevel {
    fn interpolate(&self, axes: &[Axis], point: &[f64]) -> Option<f64> {
        let brackets = axes
            .iter()
            .zip(point)
            .map(|(axis, value)| bracket(&self.coordinates[axis.index()], *value))
            .collect::<Option<Vec<_>>>()?;

        let mut value = 0.0;
        for corner in 0..(1_usize << axes.len()) {
            let mut key = [0_i64; 3];
            let mut weight = 1.0;
            for (bit, (axis, (lower, upper, fraction))) in axes.iter().zip(&brackets).enumerate() {
                if (corner >> bit) & 1 == 1 {
                    key[axis.index()] = *upper;
                    weight *= fraction;
                } else {
                    key[axis.index()] = *lower;
                    weight *= 1.0 - fraction;
                }
            }
            if weight == 0.0 {
                continue;
            }
            value += weight * self.nodes.get(&key)?;
        }
        Some(value)
    }
}

/// Adjacent grid indices around `value` and the fractional position between
/// them. A value sitting on a node returns that node twice.
fn bracket(coordinates: &BTreeMap<i64, f64>, value: f64) -> Option<(i64, i64, f64)> {
    let mut lower: Option<(i64, f64)> = None;
    for (&index, &coordinate) in coordinates {
        if coordinate == value {
            return Some((index, index, 0.0));
        }
        if coordinate > value {
            let (lower_index, lower_coordinate) = lower?;
            return Some((
                lower_index,
                index,
                interpolation_weight(lower_coordinate, coordinate, value),
            ));
        }
        lower = Some((index, coordinate));
    }
    None
}
