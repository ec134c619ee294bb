//! Output files for each export format.
//!
//! Every file is rendered in memory first and then written with the
//! write-rename pattern, so a failed export never leaves a partial file.
//! Formats with several files stage all of them before renaming any.

use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::export::{Cogstruction, Companion, ExportError};

pub const COMPANION_FILE: &str = "idleon_companion.json";
pub const COG_DATAS_FILE: &str = "cog_datas.csv";
pub const EMPTIES_FILE: &str = "empties_datas.csv";

const CSV_LINE_END: &str = "\r\n";

/// Write the companion document into `workdir`
pub fn write_companion(workdir: &Path, companion: &Companion) -> Result<PathBuf, ExportError> {
    let json = serde_json::to_vec(companion)?;
    let path = workdir.join(COMPANION_FILE);
    write_file(&path, &json)?;
    Ok(path)
}

/// Write both cog board tables into `workdir`
pub fn write_cogstruction(
    workdir: &Path,
    board: &Cogstruction,
) -> Result<Vec<PathBuf>, ExportError> {
    // Render both before touching the disk
    let files = [
        (workdir.join(COG_DATAS_FILE), render_cog_datas(board)),
        (workdir.join(EMPTIES_FILE), render_empties(board)),
    ];

    let mut staged = Vec::with_capacity(files.len());
    for (path, contents) in &files {
        match stage(path, contents.as_bytes()) {
            Ok(tmp_path) => staged.push(tmp_path),
            Err(source) => {
                for tmp_path in &staged {
                    let _ = fs::remove_file(tmp_path);
                }
                return Err(write_error(path, source));
            }
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for ((path, _), tmp_path) in files.into_iter().zip(staged) {
        fs::rename(&tmp_path, &path).map_err(|source| write_error(&path, source))?;
        info!("Wrote file: {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Cog rows as CSV; the header comes from the bonus schema, not the rows
pub fn render_cog_datas(board: &Cogstruction) -> String {
    let header = ["cog type", "name"]
        .into_iter()
        .chain(board.fields.iter().map(|f| f.column.as_str()));
    let mut out = csv_line(header.map(escape_csv));

    for row in &board.cog_datas {
        let cells = [row.kind.to_string(), row.name.clone()]
            .into_iter()
            .chain(row.bonuses.iter().map(|bonus| match bonus {
                Some(value) => csv_value(value),
                None => String::new(),
            }));
        out.push_str(&csv_line(cells.map(|cell| escape_csv(&cell))));
    }

    out
}

/// Empty slot coordinates as CSV
pub fn render_empties(board: &Cogstruction) -> String {
    let mut out = csv_line(["empties_x".to_string(), "empties_y".to_string()]);
    for slot in &board.empties {
        out.push_str(&csv_line([slot.x.to_string(), slot.y.to_string()]));
    }
    out
}

fn csv_line(cells: impl IntoIterator<Item = String>) -> String {
    let mut line = cells.into_iter().collect::<Vec<_>>().join(",");
    line.push_str(CSV_LINE_END);
    line
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Escape a string for CSV output
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Atomically writes `data` to `path` using the write-rename pattern.
///
/// 1. Write to `{path}.tmp`
/// 2. `sync_all()` to flush to disk
/// 3. `rename` temp to final path
///
/// If anything fails before the rename, the file at `path` is untouched.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp_path = stage(path, data)?;
    fs::rename(&tmp_path, path)
}

/// Write and sync `{path}.tmp`, returning its path; removed again on failure
fn stage(path: &Path, data: &[u8]) -> std::io::Result<PathBuf> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let result = File::create(&tmp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    Ok(tmp_path)
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), ExportError> {
    atomic_write(path, data).map_err(|source| write_error(path, source))?;
    info!("Wrote file: {}", path.display());
    Ok(())
}

fn write_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Write {
        path: path.to_path_buf(),
        source,
    }
}
