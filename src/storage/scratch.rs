// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scratch space for intermediate request files
//!
//! Every request that needs disk opens its own [`RequestWorkspace`], a
//! uniquely named directory under the scratch root. The directory and
//! everything in it are removed when the workspace is dropped, on success
//! and on every error path alike, so concurrent requests never see or delete
//! each other's files.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ScratchError {
    #[error("scratch I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScratchError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ScratchError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Process-wide scratch root
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    root: PathBuf,
}

impl ScratchSpace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root if it is missing
    pub fn ensure_root(&self) -> Result<(), ScratchError> {
        std::fs::create_dir_all(&self.root).map_err(|e| ScratchError::io(&self.root, e))
    }

    /// Delete everything under the root and recreate it empty.
    ///
    /// Only safe while no request is running; used at startup to clear
    /// leftovers of a previous process.
    pub fn purge(&self) -> Result<(), ScratchError> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => info!("🧹 Cleared scratch directory {}", self.root.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ScratchError::io(&self.root, e)),
        }
        self.ensure_root()
    }

    /// Startup cleanup: purge leftovers, logging a failed purge.
    ///
    /// Fails only when the root cannot be created at all.
    pub fn prepare(&self) -> Result<(), ScratchError> {
        if let Err(e) = self.purge() {
            warn!("⚠️ Could not clear scratch directory: {}", e);
        }
        self.ensure_root()
    }

    /// Open a fresh workspace for one request
    pub fn open_workspace(&self) -> Result<RequestWorkspace, ScratchError> {
        self.ensure_root()?;
        let dir = tempfile::Builder::new()
            .prefix("req-")
            .tempdir_in(&self.root)
            .map_err(|e| ScratchError::io(&self.root, e))?;
        debug!("Opened request workspace {}", dir.path().display());
        Ok(RequestWorkspace { dir })
    }
}

/// Per-request scratch directory, removed on drop
#[derive(Debug)]
pub struct RequestWorkspace {
    dir: TempDir,
}

impl RequestWorkspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace now, logging instead of failing
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove workspace {}: {}", path.display(), e);
        }
    }
}
