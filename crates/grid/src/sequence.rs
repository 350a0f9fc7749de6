use crate::fade::FadeTask;
use crate::scheduler::{Step, Task, TaskContext};
use dissolve_common::{Epoch, TileCoord};
use dissolve_input::Action;

/// Walks a precomputed tile order, launching one [`FadeTask`] per tile and
/// waiting `delay` seconds after each launch. Does not wait for the fades.
#[derive(Debug, Clone)]
pub struct SequenceTask {
    action: Action,
    epoch: Epoch,
    order: Vec<TileCoord>,
    next: usize,
    from: f32,
    to: f32,
    speed: f32,
    delay: f32,
}

impl SequenceTask {
    pub fn new(
        action: Action,
        epoch: Epoch,
        order: Vec<TileCoord>,
        from: f32,
        to: f32,
        speed: f32,
        delay: f32,
    ) -> Self {
        Self {
            action,
            epoch,
            order,
            next: 0,
            from,
            to,
            speed,
            delay,
        }
    }
}

impl Task for SequenceTask {
    fn label(&self) -> &'static str {
        self.action.label()
    }

    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn step(&mut self, cx: &mut TaskContext<'_>) -> Step {
        let Some(grid) = cx.grid.filter(|g| g.epoch() == self.epoch) else {
            tracing::debug!(action = %self.action, epoch = %self.epoch, "sequence outlived its grid");
            return Step::Done;
        };
        let Some(&coord) = self.order.get(self.next) else {
            tracing::debug!(action = %self.action, launched = self.next, "all tiles launched");
            return Step::Done;
        };
        self.next += 1;

        if let Some(slot) = grid.tile(coord) {
            tracing::trace!(action = %self.action, %coord, "launching fade");
            cx.spawn(FadeTask::new(
                self.epoch,
                coord,
                slot.object,
                slot.material,
                self.from,
                self.to,
                self.speed,
            ));
        }
        Step::Wait(self.delay)
    }
}
