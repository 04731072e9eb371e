//! Raw text node access
//!
//! Driver control files hold exactly one value each and are read and
//! written as whole strings. Nothing here knows about types.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Storage backend for single-value text nodes
pub trait NodeStorage: Send + Sync {
    /// Whether the node currently exists (the feature is present on this host)
    fn exists(&self, location: &Path) -> bool;

    /// Whether the location is an existing directory
    fn is_dir(&self, location: &Path) -> bool;

    /// Read the full content of the node
    fn read(&self, location: &Path) -> Result<String>;

    /// Replace the content of the node
    fn write(&self, location: &Path, value: &str) -> Result<()>;
}

/// Filesystem-backed nodes, relative locations resolve against `root`
#[derive(Debug, Clone)]
pub struct SysfsNodes {
    root: PathBuf,
}

impl Default for SysfsNodes {
    fn default() -> Self {
        Self::new(crate::constants::paths::SYSFS_ROOT)
    }
}

impl SysfsNodes {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute locations are kept as they are
    pub fn resolve(&self, location: &Path) -> PathBuf {
        self.root.join(location)
    }
}

impl NodeStorage for SysfsNodes {
    fn exists(&self, location: &Path) -> bool {
        self.resolve(location).exists()
    }

    fn is_dir(&self, location: &Path) -> bool {
        self.resolve(location).is_dir()
    }

    fn read(&self, location: &Path) -> Result<String> {
        let path = self.resolve(location);
        let file = File::open(&path)
            .inspect_err(|e| error!(path = %path.display(), error = %e, "Failed to open node"))
            .with_context(|| format!("Failed to open node {}", path.display()))?;

        // Nodes end with a newline; lines are joined without terminators
        let mut content = String::new();
        for line in BufReader::new(file).lines() {
            let line = line
                .inspect_err(|e| error!(path = %path.display(), error = %e, "Failed to read node"))
                .with_context(|| format!("Failed to read node {}", path.display()))?;
            content.push_str(&line);
        }

        debug!(path = %path.display(), content = %content, "Read node");
        Ok(content)
    }

    fn write(&self, location: &Path, value: &str) -> Result<()> {
        let path = self.resolve(location);

        // Truncating open; sysfs rejects create so the node must already exist
        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .inspect_err(|e| error!(path = %path.display(), error = %e, "Failed to open node for writing"))
            .with_context(|| format!("Failed to open node {} for writing", path.display()))?;

        file.write_all(value.as_bytes())
            .and_then(|_| file.flush())
            .inspect_err(|e| error!(path = %path.display(), error = %e, "Failed to write node"))
            .with_context(|| format!("Failed to write node {}", path.display()))?;

        debug!(path = %path.display(), value = %value, "Wrote node");
        Ok(())
    }
}
