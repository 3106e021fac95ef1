use std::collections::HashMap;

use crate::scene::graph::Transform;

/// One joint of a skeleton. `bind` is the authored rest transform and never
/// changes after import; `local` is the current pose and starts at `bind`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    pub bind: Transform,
    pub local: Transform,
}

/// Named bone hierarchy. Bones are addressed by index; the name lookup is
/// what skeleton retargeting matches on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    bones: Vec<Bone>,
    by_name: HashMap<String, usize>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone and return its index. The parent index may refer to a
    /// bone added later; only the final hierarchy has to be consistent.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        bind: Transform,
    ) -> usize {
        let name = name.into();
        let index = self.bones.len();
        self.by_name.insert(name.clone(), index);
        self.bones.push(Bone {
            name,
            parent,
            bind,
            local: bind,
        });
        index
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn set_local(&mut self, index: usize, local: Transform) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.local = local;
        }
    }

    pub fn reset_to_bind(&mut self) {
        for bone in &mut self.bones {
            bone.local = bone.bind;
        }
    }

    /// World transform of a bone under the given graph root, walking the
    /// parent chain up from the bone.
    pub fn world_transform(&self, index: usize, root: &Transform) -> Option<Transform> {
        let mut chain = Vec::new();
        let mut current = Some(index);
        while let Some(bone_index) = current {
            // A parent chain longer than the bone count means a cycle in a
            // malformed rig; bail rather than spin.
            if chain.len() > self.bones.len() {
                return None;
            }
            let bone = self.bones.get(bone_index)?;
            chain.push(bone_index);
            current = bone.parent;
        }

        let mut world = *root;
        for bone_index in chain.into_iter().rev() {
            world = world.mul_transform(&self.bones[bone_index].local);
        }
        Some(world)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}
