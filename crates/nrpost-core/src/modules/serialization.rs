use crate::domain::{PostError, PostResult};
use chrono::{DateTime, TimeZone};
use ndarray::Array2;
use ndarray_npy::{NpzWriter, write_npy};
use std::fs::{self, File};
use std::path::Path;

pub const ARRAY_DUMP_EXTENSION: &str = "npy";
pub const ARRAY_ARCHIVE_EXTENSION: &str = "npz";
pub const TIMESTAMP_FORMAT: &str = "%d_%m_%Y_%H:%M:%S";

/// Name under which an archive stores a single unnamed array.
const ARCHIVE_ARRAY_NAME: &str = "arr_0";

/// Keeps `.npy` and `.npz` names as given and appends `.npy` to anything else.
pub fn array_file_name(name: &str) -> String {
    let suffix_npy = format!(".{ARRAY_DUMP_EXTENSION}");
    let suffix_npz = format!(".{ARRAY_ARCHIVE_EXTENSION}");
    if name.ends_with(&suffix_npy) || name.ends_with(&suffix_npz) {
        name.to_string()
    } else {
        format!("{name}{suffix_npy}")
    }
}

/// Writes `array` as a `.npy` dump, or as the single entry of an `.npz`
/// archive when `path` says so.
pub fn write_array(path: &Path, array: &Array2<f64>) -> PostResult<()> {
    let is_archive = path
        .extension()
        .is_some_and(|extension| extension == ARRAY_ARCHIVE_EXTENSION);
    let failure = |detail: String| {
        PostError::io_system(
            "IO.ARRAY_WRITE",
            format!("failed to write array '{}': {detail}", path.display()),
        )
    };

    if !is_archive {
        return write_npy(path, array).map_err(|error| failure(error.to_string()));
    }

    let file = File::create(path).map_err(|error| failure(error.to_string()))?;
    let mut archive = NpzWriter::new(file);
    archive
        .add_array(ARCHIVE_ARRAY_NAME, array)
        .map_err(|error| failure(error.to_string()))?;
    archive
        .finish()
        .map_err(|error| failure(error.to_string()))?;
    Ok(())
}

/// `printf`-style `%.18e`: 18 fractional digits and a signed exponent of at
/// least two digits.
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let rendered = format!("{value:.18e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => rendered,
    }
}

/// Space-separated rows of `%.18e` values.
pub fn format_table(rows: impl IntoIterator<Item = Vec<f64>>) -> String {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(format_scientific)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn timestamped_file_name<Tz>(stem: &str, now: &DateTime<Tz>, extension: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{stem}_{}.{extension}", now.format(TIMESTAMP_FORMAT))
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> PostResult<()> {
    fs::write(path, normalize_text_artifact(content)).map_err(|error| {
        PostError::io_system(
            "IO.TEXT_WRITE",
            format!("failed to write '{}': {error}", path.display()),
        )
    })
}
