//! Frame-driven cooperative task scheduler.
//!
//! Tasks are stepped at most once per [`Scheduler::tick`]. A task either
//! yields to the next frame, waits a number of seconds measured in
//! accumulated frame deltas, or finishes. Tasks started from outside a tick
//! take their first step on the next tick; tasks spawned by another task
//! take their first step in the tick that spawned them.

use crate::grid::TileGrid;
use dissolve_common::Epoch;
use dissolve_scene::Scene;

/// What a task wants after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Resume on the next frame.
    Yield,
    /// Resume on the first frame after this many seconds have passed.
    Wait(f32),
    Done,
}

/// Owned handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Everything a task may touch during one step.
pub struct TaskContext<'a> {
    pub scene: &'a mut Scene,
    pub grid: Option<&'a TileGrid>,
    /// Seconds since the previous frame.
    pub dt: f32,
    spawned: Vec<Box<dyn Task>>,
}

impl<'a> TaskContext<'a> {
    pub fn new(scene: &'a mut Scene, grid: Option<&'a TileGrid>, dt: f32) -> Self {
        Self {
            scene,
            grid,
            dt,
            spawned: Vec::new(),
        }
    }

    /// The epoch of the live grid, if there is one.
    pub fn current_epoch(&self) -> Option<Epoch> {
        self.grid.map(TileGrid::epoch)
    }

    /// Start another task. It takes its first step later in this tick.
    pub fn spawn(&mut self, task: impl Task + 'static) {
        self.spawned.push(Box::new(task));
    }
}

/// A cooperative unit of work resumed once per frame.
pub trait Task {
    /// Short name for logs.
    fn label(&self) -> &'static str;

    /// The grid generation this task belongs to.
    fn epoch(&self) -> Epoch;

    fn step(&mut self, cx: &mut TaskContext<'_>) -> Step;
}

struct Slot {
    id: TaskId,
    task: Box<dyn Task>,
    /// Seconds left before the task resumes.
    wait: Option<f32>,
}

/// Owns running tasks and steps them once per frame.
#[derive(Default)]
pub struct Scheduler {
    slots: Vec<Slot>,
    pending: Vec<(TaskId, Box<dyn Task>)>,
    next_id: u64,
    frame: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Queue a task. It takes its first step on the next tick.
    pub fn start(&mut self, task: impl Task + 'static) -> TaskId {
        let id = self.alloc_id();
        tracing::trace!(task = task.label(), ?id, "task queued");
        self.pending.push((id, Box::new(task)));
        id
    }

    /// Whether the task is queued or still running.
    pub fn is_running(&self, id: TaskId) -> bool {
        self.slots.iter().any(|s| s.id == id) || self.pending.iter().any(|(p, _)| *p == id)
    }

    /// Number of queued and running tasks.
    pub fn len(&self) -> usize {
        self.slots.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of queued and running tasks belonging to `epoch`.
    pub fn count_in_epoch(&self, epoch: Epoch) -> usize {
        self.slots.iter().filter(|s| s.task.epoch() == epoch).count()
            + self
                .pending
                .iter()
                .filter(|(_, t)| t.epoch() == epoch)
                .count()
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance every task by one frame.
    pub fn tick(&mut self, scene: &mut Scene, grid: Option<&TileGrid>, dt: f32) {
        let _span = tracing::trace_span!("scheduler_tick", frame = self.frame).entered();
        let mut cx = TaskContext::new(scene, grid, dt);

        let mut slots = std::mem::take(&mut self.slots);
        slots.retain_mut(|slot| {
            if let Some(wait) = slot.wait {
                let left = wait - dt;
                if left > 0.0 {
                    slot.wait = Some(left);
                    return true;
                }
                slot.wait = None;
            }
            let step = slot.task.step(&mut cx);
            apply(slot, step)
        });

        // First steps: queued tasks, then whatever they and the running
        // tasks spawned this frame, until nothing new appears.
        let mut incoming = std::mem::take(&mut self.pending);
        loop {
            for task in cx.spawned.drain(..) {
                let id = self.alloc_id();
                incoming.push((id, task));
            }
            if incoming.is_empty() {
                break;
            }
            for (id, mut task) in incoming.drain(..) {
                let step = task.step(&mut cx);
                let mut slot = Slot {
                    id,
                    task,
                    wait: None,
                };
                if apply(&mut slot, step) {
                    slots.push(slot);
                }
            }
        }

        self.slots = slots;
        self.frame += 1;
    }
}

/// Record the step outcome on the slot. Returns whether the task lives on.
fn apply(slot: &mut Slot, step: Step) -> bool {
    match step {
        Step::Yield => true,
        Step::Wait(seconds) => {
            slot.wait = Some(seconds);
            true
        }
        Step::Done => {
            tracing::trace!(task = slot.task.label(), id = ?slot.id, "task finished");
            false
        }
    }
}
