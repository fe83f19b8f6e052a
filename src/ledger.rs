// src/ledger.rs
//! Persisted dedup ledger: one published link per line, UTF-8, append-only.
//!
//! The whole file is read into a `HashSet` at startup; `record` appends and
//! flushes before touching the in-memory set, so an acknowledged record
//! survives a crash. Nothing is ever deleted or compacted.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    links: HashSet<String>,
}

impl Ledger {
    /// Load all previously recorded links. A missing file yields an empty
    /// ledger; any other I/O error is `Error::Storage`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let links = match std::fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, links })
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably append `link`, then add it to the in-memory set. Callers are
    /// expected to check `contains` first; a double record merely writes a
    /// harmless duplicate line.
    pub fn record(&mut self, link: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(link.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        self.links.insert(link.to_string());
        Ok(())
    }
}
