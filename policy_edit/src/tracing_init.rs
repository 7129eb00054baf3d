use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;

use crate::settings::EditorSettings;

pub fn init_tracing(settings: &EditorSettings, verbose: bool) {
    // Log path: POLICY_EDIT_LOG env var > settings > ~/.abe-policy/policy_edit.log > stderr fallback.
    let log_path = std::env::var_os("POLICY_EDIT_LOG")
        .map(PathBuf::from)
        .or_else(|| settings.log_file.clone())
        .or_else(|| EditorSettings::settings_dir().map(|d| d.join("policy_edit.log")));

    let level = if verbose { Level::DEBUG } else { Level::INFO };

    // Ensure parent directory exists.
    let log_file = log_path.as_deref().and_then(|path| {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    let layer: Box<dyn Layer<_> + Send + Sync> = match log_file {
        Some(file) => tracing_subscriber::fmt::layer()
            .with_writer(file)
            .pretty()
            .with_ansi(false)
            .with_filter(LevelFilter::from_level(level))
            .boxed(),
        None => {
            // Fallback to stderr if log file can't be opened.
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .pretty()
                .with_ansi(false)
                .with_filter(LevelFilter::from_level(level))
                .boxed()
        }
    };

    tracing_subscriber::registry().with(layer).init()
}
