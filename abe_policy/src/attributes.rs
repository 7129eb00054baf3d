//! The attribute universe offered by the editor's attribute picker.
//!
//! The registration side starts from a pool of numbered attributes (`1` ..
//! `100`) and lets an uploaded file rename them. The file is plain text with
//! comma-separated names; name `i` renames pool entry `i`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{Level, debug, instrument};

use crate::error::AttributeError;

/// Size of the default numbered pool.
pub const DEFAULT_POOL_SIZE: usize = 100;

/// Ordered list of attribute names a policy may reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeUniverse {
    names: Vec<String>,
}

impl Default for AttributeUniverse {
    fn default() -> Self {
        Self::numbered(DEFAULT_POOL_SIZE)
    }
}

impl AttributeUniverse {
    /// Pool of `size` attributes named `1` through `size`.
    pub fn numbered(size: usize) -> Self {
        Self {
            names: (1..=size).map(|i| i.to_string()).collect(),
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Rename pool entries by position from comma-separated `content`.
    ///
    /// Blank segments keep the existing name and names past the end of the
    /// pool are dropped. Returns how many entries were renamed.
    pub fn overlay_csv(&mut self, content: &str) -> usize {
        let mut renamed = 0;
        for (slot, name) in self.names.iter_mut().zip(content.split(',')) {
            let name = name.trim();
            if !name.is_empty() {
                *slot = name.to_string();
                renamed += 1;
            }
        }
        renamed
    }

    /// Read an attribute file and apply it with [`Self::overlay_csv`].
    #[instrument(level = Level::TRACE, skip(self))]
    pub fn load_overlay(&mut self, path: &Path) -> Result<usize, AttributeError> {
        let content = std::fs::read_to_string(path).map_err(|source| AttributeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let renamed = self.overlay_csv(&content);
        debug!(path = %path.display(), renamed, "applied attribute file");
        Ok(renamed)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
