//! On-disk layout of catalog inputs and pipeline outputs.
//!
//! ```text
//! <root>/
//! ├── catalogues/
//! │   └── sweep/              sweep-<brick>.<ext>
//! └── data/
//!     ├── match_backups/
//!     └── lephare/
//!         ├── input/
//!         ├── output/
//!         ├── filters/
//!         └── templates/
//! ```

use crate::errors::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Catalogues,
    Sweep,
    Data,
    MatchBackups,
    Lephare,
    LephareInput,
    LephareOutput,
    LephareFilters,
    LephareTemplates,
}

impl PathKind {
    pub const ALL: [PathKind; 9] = [
        PathKind::Catalogues,
        PathKind::Sweep,
        PathKind::Data,
        PathKind::MatchBackups,
        PathKind::Lephare,
        PathKind::LephareInput,
        PathKind::LephareOutput,
        PathKind::LephareFilters,
        PathKind::LephareTemplates,
    ];

    /// Location relative to the root.
    fn relative(self) -> &'static str {
        match self {
            Self::Catalogues => "catalogues",
            Self::Sweep => "catalogues/sweep",
            Self::Data => "data",
            Self::MatchBackups => "data/match_backups",
            Self::Lephare => "data/lephare",
            Self::LephareInput => "data/lephare/input",
            Self::LephareOutput => "data/lephare/output",
            Self::LephareFilters => "data/lephare/filters",
            Self::LephareTemplates => "data/lephare/templates",
        }
    }
}

/// Resolves every [`PathKind`] under one root directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    root: PathBuf,
}

impl PathConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, kind: PathKind) -> PathBuf {
        self.root.join(kind.relative())
    }

    /// Create every directory of the layout. Existing directories are kept.
    pub fn create_all(&self) -> CatalogResult<()> {
        for kind in PathKind::ALL {
            let dir = self.path(kind);
            fs::create_dir_all(&dir).map_err(|e| CatalogError::io(&dir, e))?;
        }
        debug!(root = %self.root.display(), "created directory layout");
        Ok(())
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
