use dissolve_common::{DISSOLVE_PARAM, VISIBLE};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A material instance exposing named float uniforms.
///
/// Only float parameters are modelled; they are what the dissolve shader
/// consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    floats: BTreeMap<String, f32>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            floats: BTreeMap::new(),
        }
    }

    /// Builder-style float assignment, used for prefab templates.
    pub fn with_float(mut self, param: impl Into<String>, value: f32) -> Self {
        self.floats.insert(param.into(), value);
        self
    }

    pub fn float(&self, param: &str) -> Option<f32> {
        self.floats.get(param).copied()
    }

    pub fn set_float(&mut self, param: &str, value: f32) {
        match self.floats.get_mut(param) {
            Some(v) => *v = value,
            None => {
                self.floats.insert(param.to_string(), value);
            }
        }
    }

    pub fn floats(&self) -> &BTreeMap<String, f32> {
        &self.floats
    }
}

/// Template for instantiating objects.
///
/// `materials: None` produces objects without a renderer. Every instance gets
/// its own copies of the template materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefab {
    pub name: String,
    pub scale: Vec3,
    pub materials: Option<Vec<Material>>,
}

impl Prefab {
    /// A prefab that renders nothing.
    pub fn without_renderer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: Vec3::ONE,
            materials: None,
        }
    }

    pub fn has_renderer(&self) -> bool {
        self.materials.is_some()
    }
}

impl Default for Prefab {
    fn default() -> Self {
        Self {
            name: "DissolveTile".into(),
            scale: Vec3::ONE,
            materials: Some(vec![
                Material::new("DissolveMaterial").with_float(DISSOLVE_PARAM, VISIBLE),
            ]),
        }
    }
}
