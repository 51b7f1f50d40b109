use crate::catalog::RepoCatalog;
use crate::error::{RepoError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// CatalogStore reads and writes the repository JSON file
pub struct CatalogStore {
    catalog_path: PathBuf,
}

impl CatalogStore {
    pub fn new<P: AsRef<Path>>(catalog_path: P) -> Self {
        Self {
            catalog_path: catalog_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.catalog_path
    }

    /// Load the persisted catalog, or an empty one named `name` when the file does not exist yet.
    pub fn load_or_default(&self, name: &str, identifier: &str) -> Result<RepoCatalog> {
        match self.load()? {
            Some(catalog) => Ok(catalog),
            None => Ok(RepoCatalog::new(name, identifier)),
        }
    }

    /// Load the persisted catalog. A missing file is `None`; an unreadable or malformed one is an error.
    pub fn load(&self) -> Result<Option<RepoCatalog>> {
        let content = match fs::read_to_string(&self.catalog_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RepoError::Catalog(format!(
                    "Failed to read '{}': {e}",
                    self.catalog_path.display()
                )));
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            RepoError::Catalog(format!(
                "Failed to parse '{}': {e}",
                self.catalog_path.display()
            ))
        })
    }

    /// Serialize the whole catalog, replacing whatever the file held before.
    pub fn persist(&self, catalog: &RepoCatalog) -> Result<()> {
        let mut content = serde_json::to_string_pretty(catalog)?;
        content.push('\n');
        fs::write(&self.catalog_path, content)?;
        Ok(())
    }
}
