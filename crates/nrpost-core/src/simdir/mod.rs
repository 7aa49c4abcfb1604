//! Reader for a Cactus simulation output directory.
//!
//! `SimDir::open` walks the directory once and sorts output files by what
//! their names say they hold; the catalogs then read file contents on demand.

mod grid;
mod multipole;
mod parser;
mod timeseries;

pub use grid::{GridFunction, GridFunctionCatalog};
pub use multipole::{MultipoleCatalog, MultipoleSeries};
pub use timeseries::{TimeSeries, TimeseriesCatalog};

use crate::common::RunConfig;
use crate::domain::{GridDimension, PostError, ReaderResult, Reduction};
use parser::{FileClassifier, OutputFile, io_error};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories nested deeper than this below the root are not scanned.
pub const MAX_SCAN_DEPTH: usize = 8;

#[derive(Debug, Clone)]
pub struct SimDir {
    root: PathBuf,
    ignore_symlinks: bool,
    multipoles: MultipoleCatalog,
    grid_files: Vec<(GridDimension, String, PathBuf)>,
    timeseries_files: Vec<(Reduction, String, PathBuf)>,
}

impl SimDir {
    pub fn open(datadir: &Path, ignore_symlinks: bool) -> ReaderResult<Self> {
        if !datadir.is_dir() {
            return Err(PostError::not_found(
                "DATA.SIMDIR",
                format!("simulation directory '{}' does not exist", datadir.display()),
            ));
        }

        let mut files = Vec::new();
        collect_files(datadir, ignore_symlinks, 0, &mut files)?;
        // Sorted paths put output-0000 before output-0001, which is restart order.
        files.sort();

        let classifier = FileClassifier::new()?;
        let mut simdir = Self {
            root: datadir.to_path_buf(),
            ignore_symlinks,
            multipoles: MultipoleCatalog::default(),
            grid_files: Vec::new(),
            timeseries_files: Vec::new(),
        };
        for path in files {
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            match classifier.classify(file_name) {
                Some(OutputFile::Multipole { name, l, m, radius }) => {
                    simdir.multipoles.insert(name, l, m, radius, path)
                }
                Some(OutputFile::GridFunction { base, dimension }) => {
                    simdir.grid_files.push((dimension, base, path))
                }
                Some(OutputFile::Timeseries { base, reduction }) => {
                    simdir.timeseries_files.push((reduction, base, path))
                }
                None => {}
            }
        }

        debug!(
            root = %simdir.root.display(),
            multipoles = simdir.multipoles.names().len(),
            grid_files = simdir.grid_files.len(),
            timeseries_files = simdir.timeseries_files.len(),
            "indexed simulation directory"
        );
        Ok(simdir)
    }

    pub fn from_config(config: &RunConfig) -> ReaderResult<Self> {
        Self::open(&config.datadir, config.ignore_symlinks)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ignores_symlinks(&self) -> bool {
        self.ignore_symlinks
    }

    pub fn multipoles(&self) -> &MultipoleCatalog {
        &self.multipoles
    }

    pub fn gridfunctions(&self, dimension: GridDimension) -> ReaderResult<GridFunctionCatalog> {
        let files: Vec<(String, PathBuf)> = self
            .grid_files
            .iter()
            .filter(|(candidate, _, _)| *candidate == dimension)
            .map(|(_, base, path)| (base.clone(), path.clone()))
            .collect();
        GridFunctionCatalog::from_files(dimension, &files)
    }

    pub fn timeseries(&self, reduction: Reduction) -> ReaderResult<TimeseriesCatalog> {
        let files: Vec<(String, PathBuf)> = self
            .timeseries_files
            .iter()
            .filter(|(candidate, _, _)| *candidate == reduction)
            .map(|(_, base, path)| (base.clone(), path.clone()))
            .collect();
        TimeseriesCatalog::from_files(reduction, &files)
    }
}

fn collect_files(
    directory: &Path,
    ignore_symlinks: bool,
    depth: usize,
    files: &mut Vec<PathBuf>,
) -> ReaderResult<()> {
    let entries = fs::read_dir(directory).map_err(|error| io_error(directory, &error))?;
    for entry in entries {
        let entry = entry.map_err(|error| io_error(directory, &error))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|error| io_error(&path, &error))?;

        if file_type.is_symlink() {
            // Symlinked directories are never followed.
            if !ignore_symlinks && path.is_file() {
                files.push(path);
            }
        } else if file_type.is_dir() {
            if depth < MAX_SCAN_DEPTH {
                collect_files(&path, ignore_symlinks, depth + 1, files)?;
            }
        } else if file_type.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::SimDir;
    use crate::domain::{GridDimension, PostErrorCategory, Reduction};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn nested_outputs_are_classified() {
        let temp = TempDir::new().unwrap();
        let restart = temp.path().join("output-0000").join("sim");
        fs::create_dir_all(&restart).unwrap();
        fs::write(restart.join("mp_phi_l0_m0_r10.00.asc"), "0 1 0\n").unwrap();
        fs::write(restart.join("rho.maximum.asc"), "0 0.0 1.0\n").unwrap();
        fs::write(restart.join("rho.x.asc"), "").unwrap();
        fs::write(restart.join("notes.txt"), "ignored").unwrap();

        let simdir = SimDir::open(temp.path(), false).expect("directory should open");
        assert_eq!(simdir.multipoles().names(), vec!["phi"]);
        assert_eq!(
            simdir.timeseries(Reduction::Maximum).unwrap().names(),
            vec!["rho"]
        );
        assert!(simdir.timeseries(Reduction::Minimum).unwrap().names().is_empty());
        assert_eq!(
            simdir.gridfunctions(GridDimension::X).unwrap().names(),
            vec!["rho"]
        );
        assert!(simdir.gridfunctions(GridDimension::Xy).unwrap().names().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_can_be_skipped() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("mp_phi_l0_m0_r10.00.asc");
        fs::write(&target, "0 1 0\n").unwrap();
        std::os::unix::fs::symlink(&target, temp.path().join("mp_phi_l0_m0_r10.00.asc")).unwrap();

        let followed = SimDir::open(temp.path(), false).unwrap();
        assert!(followed.multipoles().contains("phi"));

        let skipped = SimDir::open(temp.path(), true).unwrap();
        assert!(!skipped.multipoles().contains("phi"));
    }

    #[test]
    fn missing_directory_is_not_found() {
        let temp = TempDir::new().unwrap();
        let error = SimDir::open(&temp.path().join("absent"), false).expect_err("absent");
        assert_eq!(error.category(), PostErrorCategory::NotFound);
    }
}
