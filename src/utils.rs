//! Utility functions for naming and writing import files

use crate::config::ExportStyle;
use crate::error::Result;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extension of tab-separated import files
pub const TSV_SUFFIX: &str = ".tsv";

/// Build a file name stamped with the given time
///
/// # Arguments
///
/// * `prefix` - Leading part of the name, e.g. "anki_import"
/// * `suffix` - Extension including the dot
/// * `time` - Timestamp rendered as `yyMMdd-HHmm-ss`
///
/// # Examples
///
/// ```
/// use skritter_export::utils::file_name_at;
/// use chrono::{TimeZone, Utc};
///
/// let time = Utc.with_ymd_and_hms(2023, 6, 17, 9, 5, 3).unwrap();
/// assert_eq!(file_name_at("anki_import", ".tsv", &time), "anki_import-230617-0905-03.tsv");
/// ```
pub fn file_name_at<Tz>(prefix: &str, suffix: &str, time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}-{}{}", prefix, time.format("%y%m%d-%H%M-%S"), suffix)
}

/// Build a file name stamped with the current local time
pub fn generate_file_name(prefix: &str, suffix: &str) -> String {
    file_name_at(prefix, suffix, &Local::now())
}

/// Write an import file into `output_dir`
///
/// The name is derived from the export style and the current time. An
/// existing file of the same name is replaced.
///
/// # Returns
///
/// The path of the written file.
pub async fn write_import_file(output_dir: &Path, style: ExportStyle, data: &str) -> Result<PathBuf> {
    let path = output_dir.join(generate_file_name(style.file_prefix(), TSV_SUFFIX));
    tokio::fs::write(&path, data).await?;
    info!(path = %path.display(), bytes = data.len(), "import file written");
    Ok(path)
}
