use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::constants::DATA_FILE_PREFIX;
use crate::error::Result;

/// Open the current data file, creating and growing a fresh `data.0` if the
/// directory holds none. The highest `data.<N>` suffix wins.
pub fn ensure_current_data_file(data_dir: &Path, capacity: usize) -> Result<File> {
    let path = latest_data_file_path(data_dir)?;
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)?;

    if file.metadata()?.len() == 0 {
        tracing::info!(path = %path.display(), capacity, "growing fresh data file");
        file.set_len(capacity as u64)?;
    }
    Ok(file)
}

/// Path of the most recently created data file, or of an initial `data.0`
/// if none exists yet. Files whose suffix is not a decimal integer are not
/// data files and are ignored.
fn latest_data_file_path(data_dir: &Path) -> Result<PathBuf> {
    let mut latest: Option<u64> = None;
    for entry in fs::read_dir(data_dir)? {
        let name = entry?.file_name();
        let suffix = name
            .to_str()
            .and_then(|n| n.strip_prefix(DATA_FILE_PREFIX))
            .and_then(|rest| rest.parse::<u64>().ok());
        if let Some(n) = suffix {
            if latest.map_or(true, |cur| n > cur) {
                latest = Some(n);
            }
        }
    }
    Ok(data_dir.join(format!("{}{}", DATA_FILE_PREFIX, latest.unwrap_or(0))))
}
