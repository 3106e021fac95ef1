use std::sync::Arc;

use tracing::debug;

use crate::scene::graph::{FadeMode, LodGroup, LodLevel, SceneGraph};

/// Fixed glossiness written to every converted material.
pub const GLOSSINESS: f32 = 0.2;
/// Fixed metal glossiness written to every converted material.
pub const METAL_GLOSSINESS: f32 = 0.0;
/// Screen fraction below which the substitute's single detail level culls.
pub const LOD_SCREEN_FRACTION: f32 = 0.1;

/// Tuning for the one-time material rewrite of a freshly imported graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOptions {
    /// Shader every converted material is switched to.
    pub target_shader: String,
    /// Uniform scale applied once at the graph root.
    pub scale_factor: f32,
    /// HSV value multiplier baked into the base texture.
    pub brightness: f32,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            target_shader: "custom/player".to_string(),
            scale_factor: 1.1,
            brightness: 0.8,
        }
    }
}

/// Rewrite a not-yet-shared graph's materials to the target shader, bake
/// tint/brightness into its base textures, scale the root once, and group all
/// skinned meshes into a single visibility LOD level.
///
/// Materials already using the target shader are skipped; when every material
/// referenced by a mesh already conforms, the whole pass is a no-op, so
/// running it twice leaves the graph unchanged.
pub fn apply(graph: &mut SceneGraph, options: &TransformOptions) {
    let pending: Vec<usize> = graph
        .used_materials()
        .into_iter()
        .filter(|&index| graph.materials[index].shader != options.target_shader)
        .collect();
    if pending.is_empty() {
        debug!(graph = %graph.name, "All materials already conform; skipping transform");
        return;
    }

    for index in pending {
        rewrite_material(graph, index, options);
    }

    graph.root.scale *= options.scale_factor;
    graph.lod = Some(build_lod_group(graph));
    graph.active = false;

    debug!(
        graph = %graph.name,
        scale = options.scale_factor,
        brightness = options.brightness,
        "Converted graph to target shader"
    );
}

/// Convert one material: bake its tint/brightness into a new owned texture
/// (the shared source texture is never written), then populate the target
/// shader's slots.
fn rewrite_material(graph: &mut SceneGraph, index: usize, options: &TransformOptions) {
    let base_color = graph.materials[index].base_color_or_white();
    let base_texture = graph.materials[index].base_texture;
    let bump_texture = graph.materials[index].bump_texture;

    let baked_texture = base_texture.and_then(|texture_index| {
        let source = graph.textures.get(texture_index)?;
        let baked = source.baked(base_color, options.brightness);
        graph.textures.push(Arc::new(baked));
        Some(graph.textures.len() - 1)
    });

    let material = &mut graph.materials[index];
    material.shader = options.target_shader.clone();
    material.slots.main_texture = baked_texture;
    material.slots.chest_texture = baked_texture;
    material.slots.legs_texture = baked_texture;
    material.slots.skin_bump = bump_texture;
    material.slots.chest_bump = bump_texture;
    material.slots.legs_bump = bump_texture;
    material.slots.skin_color = Some(base_color);
    material.slots.glossiness = Some(GLOSSINESS);
    material.slots.metal_glossiness = Some(METAL_GLOSSINESS);
}

/// One LOD level covering every skinned mesh, culled below
/// [`LOD_SCREEN_FRACTION`]. Fade behavior is carried over from a group
/// already present on the source graph; otherwise no cross-fade.
fn build_lod_group(graph: &SceneGraph) -> LodGroup {
    let (fade_mode, animate_cross_fading) = match &graph.lod {
        Some(source) => (source.fade_mode, source.animate_cross_fading),
        None => (FadeMode::None, false),
    };

    LodGroup {
        reference_point: graph.root.translation,
        fade_mode,
        animate_cross_fading,
        levels: vec![LodLevel {
            screen_fraction: LOD_SCREEN_FRACTION,
            meshes: graph.skinned_meshes(),
        }],
    }
}
