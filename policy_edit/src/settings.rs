//! Editor settings.
//!
//! Loaded with [figment](https://docs.rs/figment/) in order of precedence
//! (lowest to highest):
//! 1. Built-in defaults
//! 2. `~/.abe-policy/settings.json`
//! 3. `ABE_POLICY_*` environment variables (e.g. `ABE_POLICY_POOL_SIZE=20`)
//!
//! Command line flags are applied on top with [`EditorSettings::with_overrides`].

use std::path::{Path, PathBuf};

use abe_policy::{AttributeUniverse, DEFAULT_POOL_SIZE};
use anyhow::{Context, Result, ensure};
use dirs::home_dir;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use serde::{Deserialize, Serialize};
use tracing::{Level, info, instrument};

const SETTINGS_DIR: &str = ".abe-policy";
const SETTINGS_FILE: &str = "settings.json";
const ENV_PREFIX: &str = "ABE_POLICY_";

/// Largest numbered attribute pool the editor will build.
pub const MAX_POOL_SIZE: usize = 100_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Comma-separated attribute names overlaid on the numbered pool.
    #[serde(default)]
    pub attribute_file: Option<PathBuf>,

    /// Size of the numbered attribute pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Where to write logs. Falls back to `~/.abe-policy/policy_edit.log`.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            attribute_file: None,
            pool_size: DEFAULT_POOL_SIZE,
            log_file: None,
        }
    }
}

impl EditorSettings {
    pub fn settings_dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(SETTINGS_DIR))
    }

    pub fn settings_file() -> Option<PathBuf> {
        Self::settings_dir().map(|dir| dir.join(SETTINGS_FILE))
    }

    /// Load from the default settings file and environment.
    #[instrument(level = Level::TRACE)]
    pub fn load() -> Result<Self> {
        let file = Self::settings_file();
        Self::figment(file.as_deref())
            .extract()
            .context("failed to load editor settings")
    }

    /// The provider stack, reading `file` if it exists.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file
            && path.exists()
        {
            figment = figment.merge(Json::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Apply command line overrides.
    pub fn with_overrides(mut self, attribute_file: Option<PathBuf>, pool_size: Option<usize>) -> Self {
        if attribute_file.is_some() {
            self.attribute_file = attribute_file;
        }
        if let Some(size) = pool_size {
            self.pool_size = size;
        }
        self
    }

    /// Build the attribute universe these settings describe.
    pub fn universe(&self) -> Result<AttributeUniverse> {
        ensure!(
            self.pool_size <= MAX_POOL_SIZE,
            "attribute pool size {} exceeds the maximum of {MAX_POOL_SIZE}",
            self.pool_size
        );
        let mut universe = AttributeUniverse::numbered(self.pool_size);
        if let Some(ref path) = self.attribute_file {
            let renamed = universe.load_overlay(path)?;
            info!(path = %path.display(), renamed, "loaded attribute file");
        }
        Ok(universe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(SETTINGS_FILE);
        let settings: EditorSettings = EditorSettings::figment(Some(&missing)).extract().unwrap();
        assert_eq!(settings.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(settings.attribute_file, None);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"pool_size": 5, "attribute_file": "/srv/attrs.txt"}}"#
        )
        .unwrap();
        let settings: EditorSettings = EditorSettings::figment(Some(file.path()))
            .extract()
            .unwrap();
        assert_eq!(settings.pool_size, 5);
        assert_eq!(settings.attribute_file, Some(PathBuf::from("/srv/attrs.txt")));
        assert_eq!(settings.log_file, None);
    }

    #[test]
    fn cli_overrides_win() {
        let settings = EditorSettings {
            attribute_file: Some("a.txt".into()),
            ..EditorSettings::default()
        }
        .with_overrides(None, Some(3));
        assert_eq!(settings.attribute_file, Some(PathBuf::from("a.txt")));
        assert_eq!(settings.pool_size, 3);

        let settings = settings.with_overrides(Some("b.txt".into()), None);
        assert_eq!(settings.attribute_file, Some(PathBuf::from("b.txt")));
    }

    #[test]
    fn oversized_pool_is_rejected() {
        let settings = EditorSettings::default().with_overrides(None, Some(usize::MAX));
        let err = settings.universe().unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"), "{err}");

        let settings = EditorSettings::default().with_overrides(None, Some(MAX_POOL_SIZE));
        assert_eq!(settings.universe().unwrap().len(), MAX_POOL_SIZE);
    }

    #[test]
    fn universe_applies_attribute_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "age, role").unwrap();
        let settings = EditorSettings::default().with_overrides(Some(file.path().into()), Some(3));
        let universe = settings.universe().unwrap();
        assert_eq!(universe.names(), ["age", "role", "3"]);
    }
}
