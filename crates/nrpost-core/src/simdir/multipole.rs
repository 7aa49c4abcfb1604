use super::parser::{merge_restarts, read_table, require_columns};
use crate::domain::{MultipoleKey, PostError, ReaderResult, format_float_token};
use num_complex::Complex64;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Complex multipole coefficient series `Phi_lm(r, t)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipoleSeries {
    pub key: MultipoleKey,
    pub times: Vec<f64>,
    pub values: Vec<Complex64>,
}

impl MultipoleSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn real(&self) -> Vec<f64> {
        self.values.iter().map(|value| value.re).collect()
    }

    pub fn imag(&self) -> Vec<f64> {
        self.values.iter().map(|value| value.im).collect()
    }

    pub fn abs(&self) -> Vec<f64> {
        self.values.iter().map(|value| value.norm()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MultipoleFile {
    radius: f64,
    l: u32,
    m: i32,
    path: PathBuf,
}

/// Multipole files of a simulation, grouped by variable name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipoleCatalog {
    files: BTreeMap<String, Vec<MultipoleFile>>,
}

impl MultipoleCatalog {
    pub(crate) fn insert(&mut self, name: String, l: u32, m: i32, radius: f64, path: PathBuf) {
        self.files
            .entry(name)
            .or_default()
            .push(MultipoleFile { radius, l, m, path });
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Extraction radii available for `name`, ascending.
    pub fn radii(&self, name: &str) -> ReaderResult<Vec<f64>> {
        let mut radii: Vec<f64> = self.files_for(name)?.iter().map(|file| file.radius).collect();
        radii.sort_by(f64::total_cmp);
        radii.dedup();
        Ok(radii)
    }

    /// `(l, m)` pairs measured at `radius`, ascending.
    pub fn available_lm(&self, name: &str, radius: f64) -> ReaderResult<Vec<(u32, i32)>> {
        let radii = self.radii(name)?;
        if !radii.contains(&radius) {
            return Err(PostError::not_found(
                "DATA.MULTIPOLE_RADIUS",
                format!(
                    "radius {} is not available for '{name}'; available radii: [{}]",
                    format_float_token(radius),
                    join_tokens(radii.iter().map(|radius| format_float_token(*radius)))
                ),
            ));
        }

        let mut available: Vec<(u32, i32)> = self.files[name]
            .iter()
            .filter(|file| file.radius == radius)
            .map(|file| (file.l, file.m))
            .collect();
        available.sort_unstable();
        available.dedup();
        Ok(available)
    }

    /// Reads the series for `key`, merging restarts in time order.
    pub fn load(&self, key: &MultipoleKey) -> ReaderResult<MultipoleSeries> {
        let available = self.available_lm(&key.name, key.radius)?;
        if !available.contains(&(key.l, key.m)) {
            return Err(PostError::not_found(
                "DATA.MULTIPOLE_LM",
                format!(
                    "multipole ({}, {}) is not available for '{}' at radius {}; available: [{}]",
                    key.l,
                    key.m,
                    key.name,
                    format_float_token(key.radius),
                    join_tokens(available.iter().map(|(l, m)| format!("({l}, {m})")))
                ),
            ));
        }

        let chunks = self.files[&key.name]
            .iter()
            .filter(|file| file.radius == key.radius && file.l == key.l && file.m == key.m)
            .map(|file| read_multipole_file(&file.path))
            .collect::<ReaderResult<Vec<_>>>()?;

        let (times, values) = merge_restarts(chunks).into_iter().unzip();
        Ok(MultipoleSeries {
            key: key.clone(),
            times,
            values,
        })
    }

    fn files_for(&self, name: &str) -> ReaderResult<&[MultipoleFile]> {
        self.files.get(name).map(Vec::as_slice).ok_or_else(|| {
            PostError::not_found(
                "DATA.MULTIPOLE",
                format!(
                    "{name} not available; available multipoles: [{}]",
                    self.names().join(", ")
                ),
            )
        })
    }
}

fn read_multipole_file(path: &Path) -> ReaderResult<Vec<(f64, Complex64)>> {
    let table = read_table(path)?;
    require_columns(path, &table, 3)?;
    Ok(table
        .rows()
        .into_iter()
        .map(|row| (row[0], Complex64::new(row[1], row[2])))
        .collect())
}

fn join_tokens(tokens: impl Iterator<Item = String>) -> String {
    tokens.collect::<Vec<_>>().join(", ")
}
