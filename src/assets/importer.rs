use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::{Quat, Vec3};
use tracing::debug;

use crate::assets::material::{MaterialDescriptor, ShaderSlots, SHADER_GLTF_PBR, SHADER_GLTF_UNLIT};
use crate::assets::texture::TextureData;
use crate::scene::graph::{MeshData, MeshKind, MeshNode, Rgba, SceneGraph, Transform};
use crate::scene::skeleton::Skeleton;

/// glTF extensions this importer can map onto the scene graph. A file
/// *requiring* anything else is rejected rather than half-imported.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "KHR_materials_unlit",
    "KHR_texture_transform",
    "KHR_materials_emissive_strength",
];

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("scene file not found: {0}")]
    NotFound(String),
    #[error("malformed scene file {path}: {reason}")]
    ParseFailure { path: String, reason: String },
    #[error("unsupported scene feature in {path}: {reason}")]
    UnsupportedFeature { path: String, reason: String },
}

/// Synchronous asset loading seam. Production code uses [`VrmImporter`];
/// tests substitute a stub so cache and sync behavior can be exercised
/// without files on disk.
pub trait AssetLoader<A> {
    fn load(&self, path: &Path) -> Result<A, ImportError>;
}

/// Imports a VRM/GLB container: a JSON scene description chunk plus embedded
/// binary buffers. The returned graph owns every mesh, bone and texel buffer
/// it references; nothing points back into the source file.
#[derive(Debug, Default)]
pub struct VrmImporter;

impl VrmImporter {
    pub fn new() -> Self {
        Self
    }
}

impl AssetLoader<SceneGraph> for VrmImporter {
    fn load(&self, path: &Path) -> Result<SceneGraph, ImportError> {
        if !path.exists() {
            return Err(ImportError::NotFound(path.display().to_string()));
        }

        let (document, buffers, images) =
            gltf::import(path).map_err(|err| classify_gltf_error(path, err))?;

        for extension in document.extensions_required() {
            if !SUPPORTED_EXTENSIONS.contains(&extension) {
                return Err(ImportError::UnsupportedFeature {
                    path: path.display().to_string(),
                    reason: format!("required glTF extension {extension}"),
                });
            }
        }

        let textures = images
            .iter()
            .map(|image| convert_image(path, image))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(Arc::new)
            .collect::<Vec<_>>();

        let materials = document
            .materials()
            .enumerate()
            .map(|(index, material)| convert_material(index, &material))
            .collect::<Vec<_>>();

        let skeleton = build_skeleton(&document);

        let mut meshes = Vec::new();
        for node in document.nodes() {
            let Some(mesh) = node.mesh() else { continue };
            let kind = if node.skin().is_some() {
                MeshKind::Skinned
            } else {
                MeshKind::Static
            };
            for primitive in mesh.primitives() {
                meshes.push(MeshNode {
                    name: mesh
                        .name()
                        .map(str::to_owned)
                        .unwrap_or_else(|| format!("mesh{}", meshes.len())),
                    kind,
                    material: primitive.material().index(),
                    geometry: Arc::new(read_geometry(&primitive, &buffers)),
                });
            }
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(
            path = %path.display(),
            meshes = meshes.len(),
            bones = skeleton.len(),
            materials = materials.len(),
            textures = textures.len(),
            "Imported scene"
        );

        Ok(SceneGraph {
            name,
            root: Transform::IDENTITY,
            meshes,
            skeleton,
            materials,
            textures,
            lod: None,
            active: true,
        })
    }
}

fn classify_gltf_error(path: &Path, err: gltf::Error) -> ImportError {
    let path = path.display().to_string();
    match err {
        gltf::Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            ImportError::NotFound(path)
        }
        gltf::Error::UnsupportedScheme
        | gltf::Error::UnsupportedImageEncoding
        | gltf::Error::ExternalReferenceInSliceImport => ImportError::UnsupportedFeature {
            path,
            reason: err.to_string(),
        },
        other => ImportError::ParseFailure {
            path,
            reason: other.to_string(),
        },
    }
}

/// Expand a decoded image to owned RGBA8. 16- and 32-bit formats are not
/// mappable to the host's texel layout.
fn convert_image(path: &Path, image: &gltf::image::Data) -> Result<TextureData, ImportError> {
    use gltf::image::Format;

    let pixels = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|texel| [texel[0], texel[1], texel[2], u8::MAX])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|texel| [texel[0], texel[0], texel[0], texel[1]])
            .collect(),
        Format::R8 => image
            .pixels
            .iter()
            .flat_map(|&luma| [luma, luma, luma, u8::MAX])
            .collect(),
        other => {
            return Err(ImportError::UnsupportedFeature {
                path: path.display().to_string(),
                reason: format!("texture pixel format {other:?}"),
            })
        }
    };

    TextureData::new(image.width, image.height, pixels).map_err(|err| ImportError::ParseFailure {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

fn convert_material(index: usize, material: &gltf::Material<'_>) -> MaterialDescriptor {
    let shader = if material.unlit() {
        SHADER_GLTF_UNLIT
    } else {
        SHADER_GLTF_PBR
    };
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();

    MaterialDescriptor {
        name: material
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("material{index}")),
        shader: shader.to_owned(),
        base_color: Some(Rgba::new(r, g, b, a)),
        base_texture: pbr
            .base_color_texture()
            .map(|info| info.texture().source().index()),
        bump_texture: material
            .normal_texture()
            .map(|normal| normal.texture().source().index()),
        slots: ShaderSlots::default(),
    }
}

/// Build the skeleton from the first skin's joints. Parent links are taken
/// from the node hierarchy, restricted to nodes that are themselves joints;
/// the rest-pose node transforms become the bind pose.
fn build_skeleton(document: &gltf::Document) -> Skeleton {
    let mut skeleton = Skeleton::new();
    let Some(skin) = document.skins().next() else {
        return skeleton;
    };

    let joints: Vec<gltf::Node<'_>> = skin.joints().collect();
    let joint_order: HashMap<usize, usize> = joints
        .iter()
        .enumerate()
        .map(|(order, node)| (node.index(), order))
        .collect();

    let mut parent_of: HashMap<usize, usize> = HashMap::new();
    for node in document.nodes() {
        if !joint_order.contains_key(&node.index()) {
            continue;
        }
        for child in node.children() {
            if joint_order.contains_key(&child.index()) {
                parent_of.insert(child.index(), node.index());
            }
        }
    }

    for (order, joint) in joints.iter().enumerate() {
        let (translation, rotation, scale) = joint.transform().decomposed();
        let bind = Transform {
            translation: Vec3::from(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from(scale),
        };
        skeleton.add_bone(
            joint
                .name()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("bone{order}")),
            parent_of
                .get(&joint.index())
                .map(|parent| joint_order[parent]),
            bind,
        );
    }

    skeleton
}

fn read_geometry(primitive: &gltf::Primitive<'_>, buffers: &[gltf::buffer::Data]) -> MeshData {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    MeshData {
        positions: reader
            .read_positions()
            .map(|iter| iter.collect())
            .unwrap_or_default(),
        normals: reader
            .read_normals()
            .map(|iter| iter.collect())
            .unwrap_or_default(),
        tex_coords: reader
            .read_tex_coords(0)
            .map(|coords| coords.into_f32().collect())
            .unwrap_or_default(),
        joints: reader
            .read_joints(0)
            .map(|joints| joints.into_u16().collect())
            .unwrap_or_default(),
        weights: reader
            .read_weights(0)
            .map(|weights| weights.into_f32().collect())
            .unwrap_or_default(),
        indices: reader
            .read_indices()
            .map(|indices| indices.into_u32().collect())
            .unwrap_or_default(),
    }
}
