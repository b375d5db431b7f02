//! JSON assets for imported models.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::geometry::GeometryImport;

pub fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    fs::write(path, bytes)
}

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> io::Result<T> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Writes `<dir>/<part name>.json` for every part and returns the paths in
/// part-name order.
pub fn write_part_assets(
    dir: impl AsRef<Path>,
    import: &GeometryImport,
) -> io::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut written = Vec::with_capacity(import.len());
    for part in import.parts() {
        let path = dir.join(format!("{}.json", asset_stem(part.name())));
        save_json(&path, part)?;
        written.push(path);
    }
    Ok(written)
}

/// Part names may hold characters that are not valid in file names.
fn asset_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}
