use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::assets::importer::ImportError;

/// Opaque reference to a host-side shader, addressed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderHandle {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ShaderBundleManifest {
    shaders: Vec<String>,
}

/// Name → shader lookup. The integration layer routes intercepted host
/// shader queries through [`ShaderRegistry::find`] before falling back to
/// the host's own lookup, which is how converted materials resolve the
/// player shader the bundle ships.
#[derive(Debug, Default)]
pub struct ShaderRegistry {
    shaders: HashMap<String, ShaderHandle>,
}

impl ShaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the bundle manifest and register every shader it provides.
    pub fn load_bundle(&mut self, path: &Path) -> Result<usize, ImportError> {
        if !path.exists() {
            return Err(ImportError::NotFound(path.display().to_string()));
        }
        let raw = fs::read_to_string(path).map_err(|err| ImportError::ParseFailure {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let manifest: ShaderBundleManifest =
            serde_json::from_str(&raw).map_err(|err| ImportError::ParseFailure {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;

        let count = manifest.shaders.len();
        for name in manifest.shaders {
            info!("Add shader: {}", name);
            self.register(ShaderHandle { name });
        }
        Ok(count)
    }

    pub fn register(&mut self, handle: ShaderHandle) {
        self.shaders.insert(handle.name.clone(), handle);
    }

    pub fn find(&self, name: &str) -> Option<&ShaderHandle> {
        self.shaders.get(name)
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}
