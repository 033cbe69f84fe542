//! Load resource configs from YAML strings, files, or a routing manifest.

use crate::config::{process, RawResourceConfig, ResourceConfig};
use crate::error::ConfigError;
use crate::routing::{compile, RouteSet};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Route import type handled by [`ResourceLoader`].
pub const RESOURCE_TYPE: &str = "crud.resource";

/// Parse and validate a single resource document.
pub fn parse_resource(yaml: &str) -> Result<ResourceConfig, ConfigError> {
    let raw: RawResourceConfig = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
    process(raw)
}

/// One import in a routing manifest.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    pub resource: ManifestResource,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Either a path (relative to the manifest) or the resource config inline.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ManifestResource {
    Path(String),
    Inline(RawResourceConfig),
}

/// Routes plus the configs they were compiled from, ordered by import name.
#[derive(Clone, Debug, Default)]
pub struct LoadedResources {
    pub routes: RouteSet,
    pub resources: Vec<ResourceConfig>,
}

impl LoadedResources {
    fn add(&mut self, config: ResourceConfig, prefix: Option<&str>) -> Result<(), ConfigError> {
        let mut routes = compile(&config)?;
        if let Some(prefix) = prefix {
            routes = routes.with_prefix(prefix);
        }
        self.routes.merge(routes)?;
        self.resources.push(config);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceLoader;

impl ResourceLoader {
    pub fn new() -> Self {
        ResourceLoader
    }

    pub fn supports(&self, kind: Option<&str>) -> bool {
        kind == Some(RESOURCE_TYPE)
    }

    /// Compile one resource document into its routes.
    pub fn load_str(&self, yaml: &str) -> Result<RouteSet, ConfigError> {
        let config = parse_resource(yaml)?;
        let routes = compile(&config)?;
        tracing::info!(
            resource = %config.resource_name,
            routes = routes.len(),
            "loaded resource"
        );
        Ok(routes)
    }

    pub async fn load_file(&self, path: impl AsRef<Path>) -> Result<RouteSet, ConfigError> {
        let yaml = read(path.as_ref()).await?;
        self.load_str(&yaml)
    }

    /// Load every supported import of a manifest. Imports of other types are skipped.
    pub async fn load_manifest(&self, path: impl AsRef<Path>) -> Result<LoadedResources, ConfigError> {
        let path = path.as_ref();
        let yaml = read(path).await?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.load_manifest_str(&yaml, &base_dir).await
    }

    pub async fn load_manifest_str(&self, yaml: &str, base_dir: &Path) -> Result<LoadedResources, ConfigError> {
        let entries: BTreeMap<String, ManifestEntry> =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut loaded = LoadedResources::default();
        for (name, entry) in entries {
            if !self.supports(entry.kind.as_deref()) {
                tracing::debug!(import = %name, kind = ?entry.kind, "skipping unsupported import");
                continue;
            }
            let config = match entry.resource {
                ManifestResource::Path(p) => {
                    let file: PathBuf = base_dir.join(p);
                    parse_resource(&read(&file).await?)?
                }
                ManifestResource::Inline(raw) => process(raw)?,
            };
            tracing::info!(import = %name, resource = %config.resource_name, "loaded resource");
            loaded.add(config, entry.prefix.as_deref())?;
        }
        Ok(loaded)
    }
}

async fn read(path: &Path) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(path).await.map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
