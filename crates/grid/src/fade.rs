use crate::scheduler::{Step, Task, TaskContext};
use dissolve_common::{
    CONVERGENCE_EPSILON, DISSOLVE_PARAM, Epoch, MaterialId, ObjectId, TileCoord, lerp_clamped,
};

/// Fades one tile's dissolve value from `from` to `to`, mirroring it onto
/// the tile's height.
///
/// The value is `lerp_clamped(from, to, elapsed * speed)` with `elapsed`
/// accumulating frame deltas after each step, so a fade lasts roughly
/// `1 / speed` seconds. Once within [`CONVERGENCE_EPSILON`] of `to` the
/// material and height snap to `to` exactly.
#[derive(Debug, Clone)]
pub struct FadeTask {
    epoch: Epoch,
    coord: TileCoord,
    object: ObjectId,
    material: Option<MaterialId>,
    from: f32,
    to: f32,
    speed: f32,
    value: f32,
    elapsed: f32,
}

impl FadeTask {
    pub fn new(
        epoch: Epoch,
        coord: TileCoord,
        object: ObjectId,
        material: Option<MaterialId>,
        from: f32,
        to: f32,
        speed: f32,
    ) -> Self {
        Self {
            epoch,
            coord,
            object,
            material,
            from,
            to,
            speed,
            value: from,
            elapsed: 0.0,
        }
    }

    /// Last value written.
    pub fn value(&self) -> f32 {
        self.value
    }

    fn write(&self, cx: &mut TaskContext<'_>, material: MaterialId, value: f32) {
        cx.scene.set_float(material, DISSOLVE_PARAM, value);
        cx.scene.set_height(self.object, value);
    }
}

impl Task for FadeTask {
    fn label(&self) -> &'static str {
        "fade"
    }

    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn step(&mut self, cx: &mut TaskContext<'_>) -> Step {
        if cx.current_epoch() != Some(self.epoch) {
            tracing::trace!(coord = %self.coord, epoch = %self.epoch, "stale fade dropped");
            return Step::Done;
        }
        let Some(material) = self.material else {
            return Step::Done;
        };
        if !cx.scene.contains(self.object) {
            return Step::Done;
        }

        if (self.value - self.to).abs() > CONVERGENCE_EPSILON {
            self.value = lerp_clamped(self.from, self.to, self.elapsed * self.speed);
            self.write(cx, material, self.value);
            self.elapsed += cx.dt;
            Step::Yield
        } else {
            self.value = self.to;
            self.write(cx, material, self.to);
            Step::Done
        }
    }
}
