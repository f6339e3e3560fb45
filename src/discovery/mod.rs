//! Test discovery engine
//!
//! Walks a root directory for test index files and expands them into an
//! ordered list of test units. Ordering is lexicographic by qualified name,
//! so repeated runs over the same tree always see the same sequence.

mod error;
mod index;

pub use error::DiscoveryError;

use index::{is_index_file, ClassIndex};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::models::{SizeCategory, TestUnit};

/// Result of a discovery pass
#[derive(Debug, Default)]
pub struct Discovery {
    /// Enabled units, sorted by qualified name
    pub units: Vec<TestUnit>,
    /// Qualified names of units marked disabled, sorted
    pub disabled: Vec<String>,
    /// Number of index files read
    pub index_files: usize,
}

/// Discovery engine
#[derive(Clone, Debug, Default)]
pub struct DiscoveryEngine {
    name_filter: Option<String>,
    sizes: Vec<SizeCategory>,
}

impl DiscoveryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only units whose qualified name contains `filter`
    pub fn with_name_filter(mut self, filter: impl Into<String>) -> Self {
        self.name_filter = Some(filter.into());
        self
    }

    /// Keep only units of the given sizes (empty keeps all)
    pub fn with_sizes(mut self, sizes: Vec<SizeCategory>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Discover all enabled units under `root`
    pub fn discover(&self, root: impl AsRef<Path>) -> Result<Discovery, DiscoveryError> {
        let root = root.as_ref();

        if !root.exists() {
            return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(DiscoveryError::RootNotDirectory(root.to_path_buf()));
        }

        info!("Discovering tests under {}", root.display());

        let mut index_paths = collect_index_files(root)?;
        index_paths.sort();

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut discovery = Discovery {
            index_files: index_paths.len(),
            ..Default::default()
        };

        for path in &index_paths {
            debug!("Reading test index {}", path.display());
            let indexed = ClassIndex::load(path)?.into_units(path);

            for unit in indexed.enabled {
                if let Some(first) = seen.insert(unit.qualified_name.clone(), path.clone()) {
                    return Err(DiscoveryError::DuplicateUnit {
                        name: unit.qualified_name,
                        first,
                        second: path.clone(),
                    });
                }
                if self.matches(&unit) {
                    discovery.units.push(unit);
                }
            }
            for name in indexed.disabled {
                if let Some(first) = seen.insert(name.clone(), path.clone()) {
                    return Err(DiscoveryError::DuplicateUnit {
                        name,
                        first,
                        second: path.clone(),
                    });
                }
                discovery.disabled.push(name);
            }
        }

        discovery
            .units
            .sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        discovery.disabled.sort();

        info!(
            "Discovered {} units in {} index files ({} disabled)",
            discovery.units.len(),
            discovery.index_files,
            discovery.disabled.len()
        );

        Ok(discovery)
    }

    fn matches(&self, unit: &TestUnit) -> bool {
        let name_ok = self
            .name_filter
            .as_deref()
            .map(|f| unit.qualified_name.contains(f))
            .unwrap_or(true);
        let size_ok = self.sizes.is_empty() || self.sizes.contains(&unit.size);
        name_ok && size_ok
    }
}

/// Collect index files under `root`, skipping hidden directories
///
/// Symlinks are not followed, so a link back to an ancestor cannot make the
/// walk revisit a directory.
fn collect_index_files(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && is_hidden(e)));

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_dir() && is_index_file(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn walk_error(root: &Path, error: walkdir::Error) -> DiscoveryError {
    let path = error.path().unwrap_or(root).to_path_buf();
    let message = error.to_string();
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    DiscoveryError::Unreadable { path, source }
}
