//! JSON file exports for return payloads and reports

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::BooksResult;

pub const FINANCIAL_REPORT_FILE: &str = "financial_report.json";

/// Serialize `value` as pretty-printed JSON
pub fn write_json<T, W>(value: &T, writer: W) -> BooksResult<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    let mut writer = writer;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Write `value` to `dir/file_name`, creating `dir` if needed
pub fn save_json<T>(dir: impl AsRef<Path>, file_name: &str, value: &T) -> BooksResult<PathBuf>
where
    T: Serialize + ?Sized,
{
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(file_name);
    write_json(value, BufWriter::new(File::create(&path)?))?;

    info!(path = %path.display(), "saved JSON export");
    Ok(path)
}
