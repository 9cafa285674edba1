use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::{Context, Result};

use super::loader::load_file;
use super::model::SalesTable;

/// Process-lifetime table cache keyed by canonical path.
static TABLES: OnceLock<Mutex<HashMap<PathBuf, Arc<SalesTable>>>> = OnceLock::new();

/// Load `path` once and hand out the same table on every later call.
///
/// Failed loads are not remembered, so a fixed file can be retried.
pub fn load_cached(path: &Path) -> Result<Arc<SalesTable>> {
    let key = path
        .canonicalize()
        .with_context(|| format!("resolving {}", path.display()))?;

    let cache = TABLES.get_or_init(|| Mutex::new(HashMap::new()));
    // Held across the load so concurrent callers never read the file twice.
    let mut tables = cache
        .lock()
        .map_err(|_| anyhow::anyhow!("sales table cache poisoned"))?;

    if let Some(table) = tables.get(&key) {
        log::debug!("Table cache hit for {}", key.display());
        return Ok(Arc::clone(table));
    }

    let table = Arc::new(load_file(&key)?);
    tables.insert(key, Arc::clone(&table));
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Date,Sales Person,Country,Product,Amount,Boxes Shipped\n\
                       01/01/2023,A,US,X,10,5\n";

    #[test]
    fn same_path_returns_pointer_equal_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("again.csv");
        std::fs::write(&path, CSV).unwrap();

        let first = load_cached(&path).unwrap();
        // A rewritten file is not re-read.
        std::fs::write(&path, "not,a,sales,file\n").unwrap();
        let second = load_cached(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(
            &path,
            "Date,Sales Person,Country,Product,Amount,Boxes Shipped\n2023-01-01,A,US,X,1,1\n",
        )
        .unwrap();
        assert!(load_cached(&path).is_err());

        std::fs::write(&path, CSV).unwrap();
        assert_eq!(load_cached(&path).unwrap().len(), 1);
    }
}
