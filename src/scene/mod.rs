pub mod graph;
pub mod skeleton;

pub use graph::{FadeMode, LodGroup, LodLevel, MeshKind, MeshNode, Rgba, SceneGraph, Transform};
pub use skeleton::{Bone, Skeleton};
