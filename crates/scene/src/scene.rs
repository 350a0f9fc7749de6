use crate::material::{Material, Prefab};
use dissolve_common::{MaterialId, ObjectId, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An event record produced by every mutation to the scene.
///
/// Consumers (renderers, tooling, tests) drain the log to observe what a
/// frame changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// Object was created with the given transform and parent.
    Spawned {
        id: ObjectId,
        name: String,
        transform: Transform,
        parent: Option<ObjectId>,
    },
    /// Object was destroyed together with its material instances.
    Despawned { id: ObjectId, name: String },
    /// Object transform was updated.
    TransformUpdated {
        id: ObjectId,
        old: Transform,
        new: Transform,
    },
    /// A float uniform was written on a material instance.
    MaterialFloatSet {
        material: MaterialId,
        param: String,
        value: f32,
    },
}

/// Renderer attached to an object: the material instances it draws with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRenderer {
    pub materials: Vec<MaterialId>,
}

/// Per-object data stored in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub parent: Option<ObjectId>,
    pub renderer: Option<MeshRenderer>,
}

/// The authoritative scene.
///
/// Objects and materials live in BTreeMaps for deterministic iteration.
/// Material instances are owned by the object whose renderer references
/// them and are freed with it.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    /// parent -> direct children; kept in step with `SceneObject::parent`.
    children: BTreeMap<ObjectId, BTreeSet<ObjectId>>,
    materials: BTreeMap<MaterialId, Material>,
    next_material: u64,
    /// Append-only log of all mutations since the last drain.
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of live material instances.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Create an object without a renderer. Returns its id.
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        parent: Option<ObjectId>,
    ) -> ObjectId {
        self.insert_object(name.into(), transform, parent, None)
    }

    /// Instantiate a prefab at `position`. Each material template is copied
    /// into a fresh material instance owned by the new object.
    pub fn instantiate(
        &mut self,
        prefab: &Prefab,
        name: impl Into<String>,
        position: Vec3,
        parent: Option<ObjectId>,
    ) -> ObjectId {
        let renderer = prefab.materials.as_ref().map(|templates| MeshRenderer {
            materials: templates
                .iter()
                .map(|template| self.insert_material(template.clone()))
                .collect(),
        });
        let transform = Transform {
            position,
            scale: prefab.scale,
            ..Transform::default()
        };
        self.insert_object(name.into(), transform, parent, renderer)
    }

    fn insert_object(
        &mut self,
        name: String,
        transform: Transform,
        parent: Option<ObjectId>,
        renderer: Option<MeshRenderer>,
    ) -> ObjectId {
        let id = ObjectId::new();
        self.event_log.push(SceneEvent::Spawned {
            id,
            name: name.clone(),
            transform,
            parent,
        });
        if let Some(parent) = parent {
            self.children.entry(parent).or_default().insert(id);
        }
        self.objects.insert(
            id,
            SceneObject {
                name,
                transform,
                parent,
                renderer,
            },
        );
        id
    }

    fn insert_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.insert(id, material);
        id
    }

    /// Destroy an object, its children and its material instances.
    /// Returns the object's data if it existed.
    pub fn despawn(&mut self, id: ObjectId) -> Option<SceneObject> {
        if !self.objects.contains_key(&id) {
            return None;
        }
        for child in self.children.remove(&id).unwrap_or_default() {
            self.despawn(child);
        }
        let data = self.objects.remove(&id)?;
        if let Some(parent) = data.parent {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.remove(&id);
                if siblings.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
        if let Some(renderer) = &data.renderer {
            for material in &renderer.materials {
                self.materials.remove(material);
            }
        }
        tracing::trace!(id = %id.short(), name = %data.name, "despawned object");
        self.event_log.push(SceneEvent::Despawned {
            id,
            name: data.name.clone(),
        });
        Some(data)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Direct children of `parent`, in id order.
    pub fn children(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.children
            .get(&parent)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Update an object's transform and log the change.
    pub fn set_transform(&mut self, id: ObjectId, new: Transform) -> bool {
        if let Some(obj) = self.objects.get_mut(&id) {
            let old = obj.transform;
            obj.transform = new;
            self.event_log
                .push(SceneEvent::TransformUpdated { id, old, new });
            true
        } else {
            false
        }
    }

    /// Move an object vertically, keeping x and z.
    pub fn set_height(&mut self, id: ObjectId, y: f32) -> bool {
        let Some(obj) = self.objects.get(&id) else {
            return false;
        };
        let mut t = obj.transform;
        t.position.y = y;
        self.set_transform(id, t)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    /// Materials of an object's renderer; empty when it has none.
    pub fn renderer_materials(&self, object: ObjectId) -> &[MaterialId] {
        self.objects
            .get(&object)
            .and_then(|obj| obj.renderer.as_ref())
            .map(|r| r.materials.as_slice())
            .unwrap_or(&[])
    }

    /// The first material of an object's renderer.
    pub fn primary_material(&self, object: ObjectId) -> Option<MaterialId> {
        self.renderer_materials(object).first().copied()
    }

    /// Write a float uniform. Returns false if the material no longer exists.
    pub fn set_float(&mut self, material: MaterialId, param: &str, value: f32) -> bool {
        let Some(m) = self.materials.get_mut(&material) else {
            return false;
        };
        m.set_float(param, value);
        self.event_log.push(SceneEvent::MaterialFloatSet {
            material,
            param: param.to_string(),
            value,
        });
        true
    }

    pub fn get_float(&self, material: MaterialId, param: &str) -> Option<f32> {
        self.materials.get(&material).and_then(|m| m.float(param))
    }
}
