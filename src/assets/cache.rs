use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::assets::importer::{AssetLoader, VrmImporter};
use crate::assets::transform::{self, TransformOptions};
use crate::scene::graph::SceneGraph;

/// File extension avatar assets are stored under.
pub const AVATAR_EXT: &str = "vrm";

pub struct AssetCache<K, V> {
    cache: HashMap<K, V>,
}

impl<K, V> AssetCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        AssetCache {
            cache: HashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.cache.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.cache.insert(key, value);
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.cache.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl<K, V> Default for AssetCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Memoizes asset name → processed scene-graph template for the process
/// lifetime. Import + transform run at most once per distinct name; a failed
/// load is memoized too, so a broken file is reported once and every later
/// request cheaply falls back to native rendering. Single simulation thread,
/// so no locking.
pub struct AvatarCache {
    templates: AssetCache<String, Option<Arc<SceneGraph>>>,
    loader: Box<dyn AssetLoader<SceneGraph>>,
    options: TransformOptions,
    assets_dir: PathBuf,
}

impl AvatarCache {
    pub fn new(assets_dir: PathBuf, options: TransformOptions) -> Self {
        Self::with_loader(assets_dir, options, Box::new(VrmImporter::new()))
    }

    pub fn with_loader(
        assets_dir: PathBuf,
        options: TransformOptions,
        loader: Box<dyn AssetLoader<SceneGraph>>,
    ) -> Self {
        Self {
            templates: AssetCache::new(),
            loader,
            options,
            assets_dir,
        }
    }

    /// Cached template for `name` (case-normalized), importing and
    /// transforming on first use. `None` means the asset could not be loaded
    /// and the identity stays with the host's own geometry.
    pub fn get_or_load(&mut self, name: &str) -> Option<Arc<SceneGraph>> {
        let name = name.to_lowercase();
        if let Some(entry) = self.templates.get(&name) {
            return entry.clone();
        }

        let path = self.assets_dir.join(format!("{name}.{AVATAR_EXT}"));
        let entry = match self.loader.load(&path) {
            Ok(mut graph) => {
                graph.name = name.clone();
                transform::apply(&mut graph, &self.options);
                info!(name = %name, path = %path.display(), "Loaded avatar template");
                Some(Arc::new(graph))
            }
            Err(err) => {
                warn!(
                    name = %name,
                    path = %path.display(),
                    error = %err,
                    "Avatar unavailable; identities mapped to it keep native rendering"
                );
                None
            }
        };

        self.templates.insert(name, entry.clone());
        entry
    }

    /// Whether a load (successful or failed) has already been memoized.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
