use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::assets::cache::AvatarCache;
use crate::assets::importer::AssetLoader;
use crate::assets::shader::ShaderRegistry;
use crate::config::avatars::AvatarSettings;
use crate::host::{HostApi, HostIdentity, RagdollId};
use crate::scene::graph::SceneGraph;
use crate::substitution::registry::{
    EyeSync, IdentityRegistry, SubstitutionRecord, SyncState,
};
use crate::substitution::{sync, visibility};

/// Bones probed for the eye look-at sync, most specific first.
const EYE_BONE_CANDIDATES: &[&str] = &["LeftEye", "Head", "Neck"];

/// The substitution core behind the interception layer's hooks.
///
/// Owns the avatar cache, the identity registry and the shader registry;
/// constructed once per session and torn down with it. The integration layer
/// wires host lifecycle events to the `on_*` entry points; all of them run
/// synchronously on the host's simulation thread.
pub struct AvatarSystem {
    settings: AvatarSettings,
    shaders: ShaderRegistry,
    cache: AvatarCache,
    registry: IdentityRegistry,
}

impl AvatarSystem {
    pub fn new(settings: AvatarSettings) -> Self {
        let cache = AvatarCache::new(settings.assets_dir.clone(), settings.transform_options());
        Self::build(settings, cache)
    }

    /// Construct with a custom asset loader in place of file import.
    pub fn with_loader(
        settings: AvatarSettings,
        loader: Box<dyn AssetLoader<SceneGraph>>,
    ) -> Self {
        let cache = AvatarCache::with_loader(
            settings.assets_dir.clone(),
            settings.transform_options(),
            loader,
        );
        Self::build(settings, cache)
    }

    fn build(settings: AvatarSettings, cache: AvatarCache) -> Self {
        let mut shaders = ShaderRegistry::new();
        match shaders.load_bundle(&settings.shader_bundle) {
            Ok(count) => {
                info!(count, "Shader bundle loaded");
                if shaders.find(&settings.target_shader).is_none() {
                    warn!(
                        shader = %settings.target_shader,
                        "Shader bundle does not provide the target shader"
                    );
                }
            }
            Err(err) => {
                warn!(
                    error = %err,
                    "Shader bundle unavailable; host shader lookups will not be redirected"
                );
            }
        }

        Self {
            settings,
            shaders,
            cache,
            registry: IdentityRegistry::new(),
        }
    }

    /// Eagerly load every distinct configured avatar plus the fallback, so
    /// no spawn pays first-import latency. Returns how many loaded.
    pub fn preload(&mut self) -> usize {
        let mut loaded = 0;
        for name in self.settings.configured_models() {
            if self.cache.get_or_load(&name).is_some() {
                loaded += 1;
            }
        }
        loaded
    }

    pub fn settings(&self) -> &AvatarSettings {
        &self.settings
    }

    pub fn shader_registry(&self) -> &ShaderRegistry {
        &self.shaders
    }

    /// Cached template for an asset name, loading it on first use.
    pub fn template(&mut self, name: &str) -> Option<Arc<SceneGraph>> {
        self.cache.get_or_load(name)
    }

    pub fn record(&self, identity: HostIdentity) -> Option<&SubstitutionRecord> {
        self.registry.lookup(identity)
    }

    pub fn substituted_identities(&self) -> Vec<HostIdentity> {
        self.registry.identities().collect()
    }

    /// Hook: a character spawned. Resolves its avatar, instantiates a private
    /// clone, hides the host's own geometry and starts Alive-state sync. On
    /// any failure the character simply keeps its native look.
    pub fn on_character_spawn(&mut self, identity: HostIdentity, host: &mut dyn HostApi) {
        let Some(character_name) = host.character_name(identity) else {
            warn!(identity = %identity, "Character has no resolvable name; substitution skipped");
            return;
        };
        let model = self.settings.model_for(&character_name).to_string();
        info!(
            identity = %identity,
            character = %character_name,
            model = %model,
            "Character spawned"
        );

        let Some(template) = self.cache.get_or_load(&model) else {
            debug!(identity = %identity, model = %model, "No avatar template; native rendering kept");
            return;
        };

        let mut instance: SceneGraph = (*template).clone();
        instance.active = true;

        let eye = if self.settings.fix_camera_height {
            pick_eye_bone(&instance)
        } else {
            None
        };

        host.suppress_native_rendering(identity);
        host.force_animator_always_evaluate(identity);
        visibility::hide_host_geometry(host, identity);

        let original_lod_ref = instance
            .lod
            .as_ref()
            .map(|lod| lod.reference_point)
            .unwrap_or_default();

        self.registry.register(SubstitutionRecord {
            identity,
            asset_name: model,
            instance,
            state: SyncState::Alive,
            original_lod_ref,
            eye,
        });
    }

    /// Hook: per-frame tick for a substituted identity.
    pub fn on_frame(&mut self, identity: HostIdentity, host: &mut dyn HostApi) {
        if let Some(record) = self.registry.lookup_mut(identity) {
            sync::sync_frame(record, host);
        }
    }

    /// Hook: the host created a ragdoll for the identity (death).
    pub fn on_ragdoll_created(
        &mut self,
        identity: HostIdentity,
        ragdoll: RagdollId,
        host: &mut dyn HostApi,
    ) {
        let Some(record) = self.registry.lookup_mut(identity) else {
            debug!(identity = %identity, "Ragdoll for an unsubstituted identity; ignored");
            return;
        };
        sync::enter_ragdoll(record, ragdoll, host);
    }

    /// Hook: the host toggled the character's visibility (e.g. first-person
    /// camera).
    pub fn on_visibility_changed(&mut self, identity: HostIdentity, visible: bool) {
        if let Some(record) = self.registry.lookup_mut(identity) {
            visibility::set_substitute_visible(record, visible);
        }
    }

    /// Hook: the character was removed/despawned; releases the clone.
    pub fn on_character_removed(&mut self, identity: HostIdentity) {
        if self.registry.unregister(identity).is_some() {
            debug!(identity = %identity, "Substitution released");
        }
    }
}

fn pick_eye_bone(instance: &SceneGraph) -> Option<EyeSync> {
    EYE_BONE_CANDIDATES
        .iter()
        .copied()
        .find(|name| instance.skeleton.bone_index(name).is_some())
        .map(|name| EyeSync {
            bone: name.to_string(),
        })
}
