//! Shared context for running CLI commands.

use std::{fs, path::Path, process::ExitCode, sync::Arc};

use quarry_catalog::{Catalog, CatalogSet, FieldDirectory};
use tracing::debug;

/// Catalogs loaded once per CLI invocation.
pub struct CommandContext {
    /// Every entity declared in the catalog file.
    pub catalogs: CatalogSet,
}

impl CommandContext {
    /// Loads and freezes the catalog file at `path`.
    pub fn load(path: &Path) -> Result<Self, ExitCode> {
        match CatalogSet::load(path) {
            Ok(catalogs) => {
                debug!(path = %path.display(), entities = catalogs.len(), "catalog loaded");
                Ok(Self { catalogs })
            }
            Err(e) => {
                eprintln!("error: {e}");
                Err(ExitCode::FAILURE)
            }
        }
    }

    /// The catalog of `entity`.
    pub fn catalog(&self, entity: &str) -> Result<&Arc<Catalog>, ExitCode> {
        self.catalogs.get(entity).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }
}

/// Reads live field names from `path`, one per line, into a directory.
///
/// Blank lines and lines starting with `#` are skipped. Without a file the directory is
/// empty and dynamic facets expand to nothing.
pub fn load_field_directory(path: Option<&Path>) -> Result<FieldDirectory, ExitCode> {
    let Some(path) = path else {
        return Ok(FieldDirectory::default());
    };
    let contents = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", path.display());
        ExitCode::FAILURE
    })?;
    let names: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    debug!(count = names.len(), "live fields read");
    Ok(FieldDirectory::new(names))
}
