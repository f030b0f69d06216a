//! Static message bundles: one JSON document per locale.
//!
//! Production builds embed `messages/*.json` into the binary. Deployments that
//! want to edit bundles without rebuilding can point `i18n.bundle_dir` at a
//! directory with the same layout.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use include_dir::{Dir, include_dir};
use serde_json::Value;
use tracing::debug;

use crate::application::repos::{BundleError, BundleSource};
use crate::config::I18nSettings;
use crate::domain::{locale::Locale, message_tree::MessageTree};

static EMBEDDED_MESSAGES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/messages");

fn bundle_file_name(locale: Locale) -> String {
    format!("{}.json", locale.code())
}

fn parse_bundle(path: &str, contents: &[u8]) -> Result<MessageTree, BundleError> {
    let value: Value = serde_json::from_slice(contents).map_err(|source| BundleError::Parse {
        path: path.to_string(),
        source,
    })?;

    match value {
        Value::Object(_) => MessageTree::from_json(&value).ok_or_else(|| BundleError::NotAnObject {
            path: path.to_string(),
        }),
        _ => Err(BundleError::NotAnObject {
            path: path.to_string(),
        }),
    }
}

/// Bundles compiled into the binary from the `messages/` directory.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedBundles {
    dir: &'static Dir<'static>,
}

impl Default for EmbeddedBundles {
    fn default() -> Self {
        Self {
            dir: &EMBEDDED_MESSAGES,
        }
    }
}

impl EmbeddedBundles {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BundleSource for EmbeddedBundles {
    async fn load(&self, locale: Locale) -> Result<Option<MessageTree>, BundleError> {
        let name = bundle_file_name(locale);
        match self.dir.get_file(&name) {
            Some(file) => parse_bundle(&name, file.contents()).map(Some),
            None => Ok(None),
        }
    }
}

/// Bundles read from disk on every load.
#[derive(Debug, Clone)]
pub struct DirectoryBundles {
    root: PathBuf,
}

impl DirectoryBundles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BundleSource for DirectoryBundles {
    async fn load(&self, locale: Locale) -> Result<Option<MessageTree>, BundleError> {
        let path = self.root.join(bundle_file_name(locale));
        let shown = path.display().to_string();

        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    target = "infra::bundles::DirectoryBundles",
                    path = %shown,
                    "Bundle file not present"
                );
                return Ok(None);
            }
            Err(source) => {
                return Err(BundleError::Io {
                    path: shown,
                    source,
                });
            }
        };

        parse_bundle(&shown, &contents).map(Some)
    }
}

/// Pick the bundle source configured for this deployment.
pub fn from_settings(settings: &I18nSettings) -> Arc<dyn BundleSource> {
    match settings.bundle_dir.as_ref() {
        Some(dir) => {
            debug!(
                target = "infra::bundles",
                path = %dir.display(),
                "Reading message bundles from directory"
            );
            Arc::new(DirectoryBundles::new(dir.clone()))
        }
        None => Arc::new(EmbeddedBundles::new()),
    }
}
