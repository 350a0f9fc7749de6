use crate::ordering;
use dissolve_common::{DISSOLVE_PARAM, Epoch, MaterialId, ObjectId, TileCoord};
use dissolve_scene::{Prefab, Scene};
use glam::Vec3;

/// A tile object and the material its fade drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSlot {
    pub object: ObjectId,
    /// `None` when the prefab has no renderer.
    pub material: Option<MaterialId>,
}

/// One generation of tiles, indexed by coordinate.
///
/// Tiles are parented to the controller root and placed at
/// `(origin.x + x, dissolve, origin.z + y)`.
#[derive(Debug, Clone)]
pub struct TileGrid {
    epoch: Epoch,
    width: u32,
    height: u32,
    /// x-major: index = x * height + y.
    tiles: Vec<TileSlot>,
    materials: Vec<MaterialId>,
}

impl TileGrid {
    /// Instantiate `width * height` tiles at the initial `dissolve` value.
    pub fn generate(
        scene: &mut Scene,
        root: ObjectId,
        prefab: &Prefab,
        width: u32,
        height: u32,
        dissolve: f32,
        epoch: Epoch,
    ) -> Self {
        let _span = tracing::debug_span!("generate_grid", %epoch, width, height).entered();
        let origin = scene
            .get(root)
            .map(|r| r.transform.position)
            .unwrap_or(Vec3::ZERO);

        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        let mut materials = Vec::new();
        for coord in ordering::coords(width, height) {
            let position = Vec3::new(
                origin.x + coord.x as f32,
                dissolve,
                origin.z + coord.y as f32,
            );
            let object = scene.instantiate(prefab, format!("Tile {coord}"), position, Some(root));
            let renderer_materials = scene.renderer_materials(object).to_vec();
            for material in &renderer_materials {
                scene.set_float(*material, DISSOLVE_PARAM, dissolve);
            }
            tiles.push(TileSlot {
                object,
                material: renderer_materials.first().copied(),
            });
            materials.extend(renderer_materials);
        }

        tracing::debug!(
            tiles = tiles.len(),
            materials = materials.len(),
            dissolve,
            "grid generated"
        );
        Self {
            epoch,
            width,
            height,
            tiles,
            materials,
        }
    }

    /// Destroy every tile of this generation. Returns how many were freed.
    pub fn destroy(self, scene: &mut Scene) -> usize {
        let freed = self
            .tiles
            .iter()
            .filter(|slot| scene.despawn(slot.object).is_some())
            .count();
        tracing::debug!(epoch = %self.epoch, freed, "grid destroyed");
        freed
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&TileSlot> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        self.tiles
            .get(coord.x as usize * self.height as usize + coord.y as usize)
    }

    /// Every tile with its coordinate, in x-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &TileSlot)> {
        ordering::coords(self.width, self.height).zip(self.tiles.iter())
    }

    /// All material instances of this generation, for batch access.
    pub fn materials(&self) -> &[MaterialId] {
        &self.materials
    }
}
