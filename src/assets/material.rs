use crate::scene::graph::Rgba;

/// Shader identifier of imported PBR materials.
pub const SHADER_GLTF_PBR: &str = "gltf/pbr";
/// Shader identifier of imported unlit materials.
pub const SHADER_GLTF_UNLIT: &str = "gltf/unlit";

/// Texture/color inputs of the host's player shader.
///
/// The host shades body regions from separate slots; a converted avatar
/// aliases its single baked texture into all of them. Texture fields index
/// into the owning graph's texture table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderSlots {
    pub main_texture: Option<usize>,
    pub chest_texture: Option<usize>,
    pub legs_texture: Option<usize>,
    pub skin_bump: Option<usize>,
    pub chest_bump: Option<usize>,
    pub legs_bump: Option<usize>,
    pub skin_color: Option<Rgba>,
    pub glossiness: Option<f32>,
    pub metal_glossiness: Option<f32>,
}

/// One material as imported, plus the target-shader slots populated by the
/// transform pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    pub name: String,
    pub shader: String,
    pub base_color: Option<Rgba>,
    pub base_texture: Option<usize>,
    pub bump_texture: Option<usize>,
    pub slots: ShaderSlots,
}

impl MaterialDescriptor {
    pub fn new(name: impl Into<String>, shader: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader: shader.into(),
            base_color: None,
            base_texture: None,
            bump_texture: None,
            slots: ShaderSlots::default(),
        }
    }

    /// Effective base color; opaque white when the source material carries
    /// none.
    pub fn base_color_or_white(&self) -> Rgba {
        self.base_color.unwrap_or(Rgba::WHITE)
    }
}
