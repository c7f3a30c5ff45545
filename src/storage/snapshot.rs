use std::fs;
use std::path::Path;

use super::memory::Collections;
use super::StoreResult;

/// Load all collections from a JSON snapshot. A missing file is an empty store.
pub(super) fn load(path: &Path) -> StoreResult<Collections> {
    if !path.exists() { return Ok(Collections::new()); }
    let bytes = fs::read(path)?;
    if bytes.is_empty() { return Ok(Collections::new()); }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Write the snapshot to a sibling temp file, then rename it over the target.
pub(super) fn save(path: &Path, collections: &Collections) -> StoreResult<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() { fs::create_dir_all(dir)?; }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_vec(collections)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
