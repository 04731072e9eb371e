//! In-memory doubles shared by unit tests

use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::node::NodeStorage;

/// Node storage kept in a map, counts writes
#[derive(Default)]
pub struct MemoryNodes {
    nodes: Mutex<HashMap<PathBuf, String>>,
    dirs: Mutex<HashSet<PathBuf>>,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryNodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, location: &str, content: &str) {
        self.nodes.lock().unwrap().insert(PathBuf::from(location), content.to_string());
    }

    pub fn remove(&self, location: &str) {
        self.nodes.lock().unwrap().remove(Path::new(location));
    }

    pub fn add_dir(&self, location: &str) {
        self.dirs.lock().unwrap().insert(PathBuf::from(location));
    }

    pub fn get(&self, location: &str) -> Option<String> {
        self.nodes.lock().unwrap().get(Path::new(location)).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl NodeStorage for MemoryNodes {
    fn exists(&self, location: &Path) -> bool {
        self.nodes.lock().unwrap().contains_key(location) || self.is_dir(location)
    }

    fn is_dir(&self, location: &Path) -> bool {
        self.dirs.lock().unwrap().contains(location)
    }

    fn read(&self, location: &Path) -> Result<String> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("read of {} failed", location.display());
        }
        match self.nodes.lock().unwrap().get(location) {
            Some(content) => Ok(content.clone()),
            None => bail!("no node at {}", location.display()),
        }
    }

    fn write(&self, location: &Path, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("write of {} failed", location.display());
        }
        let mut nodes = self.nodes.lock().unwrap();
        match nodes.get_mut(location) {
            Some(content) => {
                *content = value.to_string();
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => bail!("no node at {}", location.display()),
        }
    }
}
