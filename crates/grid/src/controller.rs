use crate::config::{BusyUntil, ConfigError, DissolveConfig};
use crate::grid::TileGrid;
use crate::ordering;
use crate::scheduler::{Scheduler, TaskId};
use crate::sequence::SequenceTask;
use dissolve_common::{DISSOLVE_PARAM, DISSOLVED, Epoch, MaterialId, ObjectId, TileCoord, Transform, VISIBLE};
use dissolve_input::{Action, InputFrame};
use dissolve_scene::Scene;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Whether a sequence currently owns the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running {
        epoch: Epoch,
        sequence: TaskId,
        action: Action,
    },
}

/// Errors from starting a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("{0} is still running")]
    Busy(Action),
    #[error("grid not generated; trigger expand-appear first")]
    NoGrid,
}

/// Owns the tile grid and drives its dissolve sequences.
///
/// Call [`GridController::update`] once per frame with the keys pressed that
/// frame. The controller spawns a root object in the scene; tiles are
/// parented to it.
pub struct GridController {
    config: DissolveConfig,
    root: ObjectId,
    grid: Option<TileGrid>,
    /// Last epoch handed out; the live grid, if any, carries it.
    epoch: Epoch,
    scheduler: Scheduler,
    state: ControllerState,
    rng: StdRng,
}

impl GridController {
    /// Validate `config` and spawn the grid root at its origin.
    pub fn new(scene: &mut Scene, config: DissolveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let root = scene.spawn("DissolveGrid", Transform::from_position(config.origin), None);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        tracing::info!(
            width = config.width,
            height = config.height,
            busy_until = ?config.busy_until,
            "dissolve grid controller ready"
        );
        Ok(Self {
            config,
            root,
            grid: None,
            epoch: Epoch::default(),
            scheduler: Scheduler::new(),
            state: ControllerState::Idle,
            rng,
        })
    }

    pub fn config(&self) -> &DissolveConfig {
        &self.config
    }

    /// The object all tiles are parented to.
    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ControllerState::Idle
    }

    pub fn grid(&self) -> Option<&TileGrid> {
        self.grid.as_ref()
    }

    /// Epoch of the live grid.
    pub fn epoch(&self) -> Option<Epoch> {
        self.grid.as_ref().map(TileGrid::epoch)
    }

    /// Material instances of the live grid.
    pub fn materials(&self) -> &[MaterialId] {
        self.grid.as_ref().map(TileGrid::materials).unwrap_or(&[])
    }

    /// Sequence and fade tasks still scheduled.
    pub fn active_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Scheduled tasks belonging to `epoch`.
    pub fn tasks_in_epoch(&self, epoch: Epoch) -> usize {
        self.scheduler.count_in_epoch(epoch)
    }

    /// Current dissolve value of a tile's primary material.
    pub fn dissolve_at(&self, scene: &Scene, coord: TileCoord) -> Option<f32> {
        let material = self.grid.as_ref()?.tile(coord)?.material?;
        scene.get_float(material, DISSOLVE_PARAM)
    }

    /// Advance one frame: start at most one sequence from `input` when idle,
    /// then step every task. Returns the sequence started this frame.
    pub fn update(&mut self, scene: &mut Scene, input: &InputFrame, dt: f32) -> Option<Action> {
        let _span =
            tracing::debug_span!("dissolve_update", frame = self.scheduler.frame()).entered();
        self.refresh_state();

        let mut started = None;
        if self.is_idle() {
            if let Some(action) = self.config.keys.resolve(input) {
                match self.trigger(scene, action) {
                    Ok(_) => started = Some(action),
                    // trigger already logged the warning
                    Err(SequenceError::NoGrid) => {}
                    Err(e) => tracing::debug!("{e}"),
                }
            }
        } else if !input.is_empty() {
            tracing::trace!("input ignored while a sequence runs");
        }

        self.scheduler.tick(scene, self.grid.as_ref(), dt);
        self.refresh_state();
        started
    }

    /// Start a sequence directly, bypassing key bindings. Its first launch
    /// happens on the next [`GridController::update`].
    pub fn trigger(&mut self, scene: &mut Scene, action: Action) -> Result<Epoch, SequenceError> {
        self.refresh_state();
        if let ControllerState::Running { action: running, .. } = self.state {
            return Err(SequenceError::Busy(running));
        }

        let (from, to) = match action {
            Action::ExpandAppear | Action::RandomAppear => (DISSOLVED, VISIBLE),
            Action::ContractDisappear | Action::RandomDisappear => (VISIBLE, DISSOLVED),
        };
        match action {
            Action::ExpandAppear => {
                self.generate(scene, DISSOLVED);
            }
            Action::ContractDisappear => {
                if self.grid.is_none() {
                    let err = SequenceError::NoGrid;
                    tracing::warn!("{err}");
                    return Err(err);
                }
            }
            Action::RandomAppear | Action::RandomDisappear => {
                if self.grid.is_none() {
                    self.generate(scene, from);
                }
            }
        }
        let Some(grid) = self.grid.as_ref() else {
            return Err(SequenceError::NoGrid);
        };

        let (width, height) = (grid.width(), grid.height());
        let order = match action {
            Action::ExpandAppear => ordering::center_out(width, height),
            Action::ContractDisappear => ordering::edge_in(width, height),
            Action::RandomAppear | Action::RandomDisappear => {
                ordering::random_order(width, height, &mut self.rng)
            }
        };
        let epoch = grid.epoch();
        let tiles = order.len();
        let sequence = self.scheduler.start(SequenceTask::new(
            action,
            epoch,
            order,
            from,
            to,
            self.config.cycle_speed,
            self.config.delay_between_tiles,
        ));
        self.state = ControllerState::Running {
            epoch,
            sequence,
            action,
        };
        tracing::info!(%action, %epoch, tiles, "sequence started");
        Ok(epoch)
    }

    /// Destroy any existing grid and build a new one at `dissolve`.
    /// Fades of the previous grid stop on their next step.
    pub fn generate(&mut self, scene: &mut Scene, dissolve: f32) -> Epoch {
        if let Some(old) = self.grid.take() {
            old.destroy(scene);
        }
        self.epoch = self.epoch.next();
        let grid = TileGrid::generate(
            scene,
            self.root,
            &self.config.tile_prefab,
            self.config.width,
            self.config.height,
            dissolve,
            self.epoch,
        );
        tracing::info!(epoch = %self.epoch, tiles = grid.len(), dissolve, "grid generated");
        self.grid = Some(grid);
        self.epoch
    }

    /// Destroy the grid without building a new one. Returns the number of
    /// tiles freed.
    pub fn clear(&mut self, scene: &mut Scene) -> usize {
        let Some(grid) = self.grid.take() else {
            return 0;
        };
        self.epoch = self.epoch.next();
        let freed = grid.destroy(scene);
        tracing::info!(freed, "grid cleared");
        freed
    }

    fn refresh_state(&mut self) {
        let ControllerState::Running {
            epoch,
            sequence,
            action,
        } = self.state
        else {
            return;
        };
        let busy = match self.config.busy_until {
            BusyUntil::LaunchesIssued => self.scheduler.is_running(sequence),
            BusyUntil::FadesSettled => {
                self.scheduler.is_running(sequence) || self.scheduler.count_in_epoch(epoch) > 0
            }
        };
        if !busy {
            tracing::info!(%action, %epoch, "sequence finished");
            self.state = ControllerState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dissolve_input::Key;
    use dissolve_scene::SceneEvent;

    const DT: f32 = 1.0 / 60.0;

    fn controller(width: u32, height: u32, busy_until: BusyUntil) -> (Scene, GridController) {
        let mut scene = Scene::new();
        let config = DissolveConfig {
            width,
            height,
            busy_until,
            seed: Some(7),
            ..DissolveConfig::default()
        };
        let ctrl = GridController::new(&mut scene, config).unwrap();
        (scene, ctrl)
    }

    fn idle_frames(ctrl: &mut GridController, scene: &mut Scene, n: usize) {
        for _ in 0..n {
            ctrl.update(scene, &InputFrame::new(), DT);
        }
    }

    /// Run empty frames until the controller is idle; returns frames taken.
    fn run_until_idle(ctrl: &mut GridController, scene: &mut Scene) -> usize {
        for n in 1..5_000 {
            ctrl.update(scene, &InputFrame::new(), DT);
            if ctrl.is_idle() {
                return n;
            }
        }
        panic!("controller never went idle");
    }

    fn all_dissolve(ctrl: &GridController, scene: &Scene) -> Vec<f32> {
        let grid = ctrl.grid().unwrap();
        grid.iter()
            .map(|(c, _)| ctrl.dissolve_at(scene, c).unwrap())
            .collect()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut scene = Scene::new();
        let config = DissolveConfig {
            width: 0,
            ..DissolveConfig::default()
        };
        assert!(GridController::new(&mut scene, config).is_err());
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn contract_without_grid_is_rejected() {
        let (mut scene, mut ctrl) = controller(3, 3, BusyUntil::FadesSettled);
        let err = ctrl.trigger(&mut scene, Action::ContractDisappear);
        assert_eq!(err, Err(SequenceError::NoGrid));
        assert_eq!(
            SequenceError::NoGrid.to_string(),
            "grid not generated; trigger expand-appear first"
        );
        assert!(ctrl.is_idle());
        assert!(ctrl.grid().is_none());
        assert_eq!(scene.object_count(), 1);

        // through input as well
        let started = ctrl.update(&mut scene, &InputFrame::with(Key::Digit2), DT);
        assert_eq!(started, None);
        assert!(ctrl.is_idle());
    }

    #[test]
    fn expand_appear_reveals_whole_grid() {
        let (mut scene, mut ctrl) = controller(4, 3, BusyUntil::FadesSettled);
        let started = ctrl.update(&mut scene, &InputFrame::with(Key::Digit1), DT);
        assert_eq!(started, Some(Action::ExpandAppear));
        assert_eq!(ctrl.grid().unwrap().len(), 12);
        assert_eq!(ctrl.materials().len(), 12);

        run_until_idle(&mut ctrl, &mut scene);
        assert!(all_dissolve(&ctrl, &scene).iter().all(|v| *v == VISIBLE));
        for (_, slot) in ctrl.grid().unwrap().iter() {
            assert_eq!(scene.get(slot.object).unwrap().transform.position.y, VISIBLE);
        }
        assert_eq!(ctrl.active_tasks(), 0);
    }

    #[test]
    fn expand_reveals_center_before_corners() {
        let (mut scene, mut ctrl) = controller(5, 5, BusyUntil::FadesSettled);
        ctrl.update(&mut scene, &InputFrame::with(Key::Digit1), DT);
        idle_frames(&mut ctrl, &mut scene, 10);
        let center = ctrl.dissolve_at(&scene, TileCoord::new(2, 2)).unwrap();
        let corner = ctrl.dissolve_at(&scene, TileCoord::new(0, 0)).unwrap();
        assert!(center < corner, "center {center} corner {corner}");
    }

    #[test]
    fn contract_dissolves_edges_first_and_ends_hidden() {
        let (mut scene, mut ctrl) = controller(5, 5, BusyUntil::FadesSettled);
        ctrl.update(&mut scene, &InputFrame::with(Key::Digit1), DT);
        run_until_idle(&mut ctrl, &mut scene);

        let epoch = ctrl.epoch();
        let started = ctrl.update(&mut scene, &InputFrame::with(Key::Digit2), DT);
        assert_eq!(started, Some(Action::ContractDisappear));
        // no regeneration
        assert_eq!(ctrl.epoch(), epoch);

        idle_frames(&mut ctrl, &mut scene, 10);
        let center = ctrl.dissolve_at(&scene, TileCoord::new(2, 2)).unwrap();
        let corner = ctrl.dissolve_at(&scene, TileCoord::new(4, 4)).unwrap();
        assert!(corner > center, "center {center} corner {corner}");

        run_until_idle(&mut ctrl, &mut scene);
        assert!(all_dissolve(&ctrl, &scene).iter().all(|v| *v == DISSOLVED));
    }

    #[test]
    fn input_is_ignored_while_running() {
        let (mut scene, mut ctrl) = controller(3, 3, BusyUntil::FadesSettled);
        ctrl.update(&mut scene, &InputFrame::with(Key::Digit1), DT);
        let state = ctrl.state();
        assert!(matches!(state, ControllerState::Running { action: Action::ExpandAppear, .. }));

        let started = ctrl.update(&mut scene, &InputFrame::with(Key::Digit2), DT);
        assert_eq!(started, None);
        assert_eq!(ctrl.state(), state);
        assert_eq!(
            ctrl.trigger(&mut scene, Action::RandomAppear),
            Err(SequenceError::Busy(Action::ExpandAppear))
        );
    }

    #[test]
    fn launches_issued_releases_before_fades_finish() {
        let (mut scene, mut ctrl) = controller(3, 3, BusyUntil::LaunchesIssued);
        ctrl.update(&mut scene, &InputFrame::with(Key::Digit1), DT);
        let frames = run_until_idle(&mut ctrl, &mut scene);
        // nine launches one frame apart plus the trailing delay
        assert_eq!(frames, 9);
        assert!(ctrl.active_tasks() > 0);
        assert!(all_dissolve(&ctrl, &scene).iter().any(|v| *v > VISIBLE));
    }

    #[test]
    fn fades_settled_waits_for_every_tile() {
        let (mut scene, mut ctrl) = controller(3, 3, BusyUntil::FadesSettled);
        ctrl.update(&mut scene, &InputFrame::with(Key::Digit1), DT);
        let frames = run_until_idle(&mut ctrl, &mut scene);
        // each fade lasts about 1 / cycle_speed = 2s
        assert!(frames > 120, "went idle after {frames} frames");
        assert_eq!(ctrl.active_tasks(), 0);
    }

    #[test]
    fn regeneration_frees_old_tiles_and_stops_stale_fades() {
        let (mut scene, mut ctrl) = controller(3, 3, BusyUntil::LaunchesIssued);
        ctrl.update(&mut scene, &InputFrame::with(Key::Digit1), DT);
        run_until_idle(&mut ctrl, &mut scene);
        let old_epoch = ctrl.epoch().unwrap();
        let old_objects: Vec<ObjectId> = ctrl.grid().unwrap().iter().map(|(_, s)| s.object).collect();
        assert!(ctrl.tasks_in_epoch(old_epoch) > 0);

        ctrl.update(&mut scene, &InputFrame::with(Key::Digit1), DT);
        let new_epoch = ctrl.epoch().unwrap();
        assert!(new_epoch > old_epoch);
        assert_eq!(scene.object_count(), 1 + 9);
        assert!(old_objects.iter().all(|id| !scene.contains(*id)));
        assert_eq!(ctrl.tasks_in_epoch(old_epoch), 0);

        scene.drain_events();
        idle_frames(&mut ctrl, &mut scene, 5);
        let live: Vec<MaterialId> = ctrl.materials().to_vec();
        for event in scene.events() {
            if let SceneEvent::MaterialFloatSet { material, .. } = event {
                assert!(live.contains(material));
            }
        }
    }

    #[test]
    fn random_appear_generates_hidden_grid_and_reveals_it() {
        let (mut scene, mut ctrl) = controller(4, 4, BusyUntil::FadesSettled);
        ctrl.trigger(&mut scene, Action::RandomAppear).unwrap();
        assert!(all_dissolve(&ctrl, &scene).iter().all(|v| *v == DISSOLVED));
        run_until_idle(&mut ctrl, &mut scene);
        assert!(all_dissolve(&ctrl, &scene).iter().all(|v| *v == VISIBLE));
    }

    #[test]
    fn random_disappear_keeps_existing_grid() {
        let (mut scene, mut ctrl) = controller(4, 4, BusyUntil::FadesSettled);
        ctrl.trigger(&mut scene, Action::ExpandAppear).unwrap();
        run_until_idle(&mut ctrl, &mut scene);
        let epoch = ctrl.epoch();

        ctrl.trigger(&mut scene, Action::RandomDisappear).unwrap();
        assert_eq!(ctrl.epoch(), epoch);
        run_until_idle(&mut ctrl, &mut scene);
        assert!(all_dissolve(&ctrl, &scene).iter().all(|v| *v == DISSOLVED));
    }

    #[test]
    fn random_disappear_without_grid_starts_visible() {
        let (mut scene, mut ctrl) = controller(2, 3, BusyUntil::FadesSettled);
        ctrl.trigger(&mut scene, Action::RandomDisappear).unwrap();
        assert!(all_dissolve(&ctrl, &scene).iter().all(|v| *v == VISIBLE));
    }

    #[test]
    fn clear_destroys_grid() {
        let (mut scene, mut ctrl) = controller(3, 2, BusyUntil::FadesSettled);
        ctrl.generate(&mut scene, VISIBLE);
        assert_eq!(ctrl.clear(&mut scene), 6);
        assert!(ctrl.grid().is_none());
        assert!(ctrl.materials().is_empty());
        assert_eq!(scene.object_count(), 1);
        assert_eq!(ctrl.clear(&mut scene), 0);
        assert_eq!(
            ctrl.trigger(&mut scene, Action::ContractDisappear),
            Err(SequenceError::NoGrid)
        );
    }

    #[test]
    fn tiles_follow_configured_origin() {
        let mut scene = Scene::new();
        let config = DissolveConfig {
            width: 2,
            height: 2,
            origin: glam::Vec3::new(5.0, 0.0, 7.0),
            ..DissolveConfig::default()
        };
        let mut ctrl = GridController::new(&mut scene, config).unwrap();
        ctrl.generate(&mut scene, DISSOLVED);
        let slot = ctrl.grid().unwrap().tile(TileCoord::new(1, 1)).unwrap();
        assert_eq!(
            scene.get(slot.object).unwrap().transform.position,
            glam::Vec3::new(6.0, 1.0, 8.0)
        );
        assert_eq!(scene.get(slot.object).unwrap().parent, Some(ctrl.root()));
    }
}
