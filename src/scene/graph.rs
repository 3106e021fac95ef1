use std::collections::BTreeSet;
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::assets::material::MaterialDescriptor;
use crate::assets::texture::TextureData;
use crate::scene::skeleton::Skeleton;

/// Local translation/rotation/scale triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Compose with a child-space transform, producing the child in this
    /// transform's parent space.
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.translation + self.rotation * (self.scale * child.translation),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Straight-alpha color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeMode {
    #[default]
    None,
    CrossFade,
}

/// One renderable detail level: the mesh indices shown while the group
/// occupies at least `screen_fraction` of the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct LodLevel {
    pub screen_fraction: f32,
    pub meshes: Vec<usize>,
}

/// Distance-based visibility group. The host's culling keys off
/// `reference_point`, which is also how the substitute is hidden without
/// touching any render flag.
#[derive(Debug, Clone, PartialEq)]
pub struct LodGroup {
    pub reference_point: Vec3,
    pub fade_mode: FadeMode,
    pub animate_cross_fading: bool,
    pub levels: Vec<LodLevel>,
}

impl Default for LodGroup {
    fn default() -> Self {
        Self {
            reference_point: Vec3::ZERO,
            fade_mode: FadeMode::None,
            animate_cross_fading: false,
            levels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Static,
    Skinned,
}

/// Vertex/index data as uploaded to the host renderer. Shared between clones
/// of a graph; never written after import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    pub name: String,
    pub kind: MeshKind,
    pub material: Option<usize>,
    pub geometry: Arc<MeshData>,
}

/// An imported avatar asset: meshes, skeleton, materials and the texel
/// buffers they reference.
///
/// The cache holds one transformed master per asset name; every substituted
/// identity works on its own clone. Geometry and texel buffers are behind
/// `Arc` and shared between clones, while transforms, materials and the
/// skeleton pose are cloned deep so no two identities can observe each
/// other's state.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub name: String,
    pub root: Transform,
    pub meshes: Vec<MeshNode>,
    pub skeleton: Skeleton,
    pub materials: Vec<MaterialDescriptor>,
    pub textures: Vec<Arc<TextureData>>,
    pub lod: Option<LodGroup>,
    pub active: bool,
}

impl SceneGraph {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: Transform::IDENTITY,
            meshes: Vec::new(),
            skeleton: Skeleton::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            lod: None,
            active: true,
        }
    }

    /// Distinct material indices referenced by any mesh, so a material shared
    /// between meshes is visited once.
    pub fn used_materials(&self) -> BTreeSet<usize> {
        self.meshes
            .iter()
            .filter_map(|mesh| mesh.material)
            .filter(|&index| index < self.materials.len())
            .collect()
    }

    /// Indices of all skinned mesh nodes.
    pub fn skinned_meshes(&self) -> Vec<usize> {
        self.meshes
            .iter()
            .enumerate()
            .filter(|(_, mesh)| mesh.kind == MeshKind::Skinned)
            .map(|(index, _)| index)
            .collect()
    }
}
