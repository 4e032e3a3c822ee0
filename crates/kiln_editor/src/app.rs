//! Editor application state, the frame loop and play/edit transitions.

use crate::console::Console;
use crate::{EditorError, EditorMode};
use kiln_asset::TextureCache;
use kiln_core::components::Transform;
use kiln_core::ecs::{EntityHandle, Registry};
use kiln_core::math::Vec2;
use kiln_core::time::FixedStepClock;
use kiln_metrics::{Counter, FrameTimer, PhaseProfiler};
use kiln_physics::{bridge, PhysicsProvider, PhysicsWorld};
use kiln_scene::SceneError;
use kiln_script::ScriptHost;
use kiln_services::{InputEvent, InputState, KeyCode, Settings, Vfs};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the editor owns: world, simulation, scripts, input and the
/// play/edit state machine.
///
/// Entering play mode snapshots the world through the scene codec; leaving
/// it tears the world down and reloads that snapshot, so nothing a script
/// or the simulation did while playing survives.
pub struct EditorApp {
    pub(crate) registry: Registry,
    pub(crate) physics: PhysicsWorld,
    pub(crate) scripts: ScriptHost,
    pub(crate) input: InputState,
    pub(crate) vfs: Vfs,
    pub(crate) textures: TextureCache,
    pub(crate) console: Console,
    pub(crate) mode: EditorMode,
    pub(crate) selected: EntityHandle,
    clock: FixedStepClock,
    settings: Settings,
    current_scene_path: PathBuf,
    frame_timer: FrameTimer,
    counters: Counter,
    profiler: PhaseProfiler,
}

impl EditorApp {
    pub fn new(settings: Settings) -> Result<Self, EditorError> {
        let vfs = Vfs::with_mounts(settings.vfs.mounts.iter().cloned());
        let physics = PhysicsWorld::new(
            Vec2::from(settings.physics.gravity),
            settings.physics.solver_iterations,
        );
        let scripts = ScriptHost::new(vfs.clone())?;

        let mut console = Console::default();
        console.log("Engine initialized");

        Ok(Self {
            registry: Registry::new(),
            physics,
            scripts,
            input: InputState::new(),
            vfs,
            textures: TextureCache::new(),
            console,
            mode: EditorMode::Editing,
            selected: EntityHandle::NULL,
            clock: FixedStepClock::from_hz(settings.physics.tick_rate_hz),
            current_scene_path: settings.editor.default_scene_path.clone(),
            settings,
            frame_timer: FrameTimer::new(60),
            counters: Counter::new(),
            profiler: PhaseProfiler::new(),
        })
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn is_playing(&self) -> bool {
        self.mode == EditorMode::Playing
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn scripts(&self) -> &ScriptHost {
        &self.scripts
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_scene_path(&self) -> &Path {
        &self.current_scene_path
    }

    pub fn counters(&self) -> &Counter {
        &self.counters
    }

    pub fn profiler(&self) -> &PhaseProfiler {
        &self.profiler
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.frame_timer
    }

    /// Deliver a platform event. F5 toggles play mode.
    pub fn handle_input(&mut self, event: InputEvent) {
        if event == InputEvent::KeyDown(KeyCode::F5) {
            // Failures are already on the console.
            let _ = self.toggle();
        }
        self.input.handle(event);
    }

    /// Advance one rendered frame of `dt` wall time. Returns the number of
    /// fixed steps simulated.
    ///
    /// The step budget is drained in both modes so that entering play mode
    /// never replays time spent editing. Key presses seen this frame are
    /// cleared on return.
    pub fn frame(&mut self, dt: Duration) -> u32 {
        self.frame_timer.record(dt);
        self.clock.accumulate(dt);

        let mut steps = 0;
        while self.clock.next_step() {
            if self.is_playing() {
                self.fixed_step();
                steps += 1;
            }
        }

        self.input.begin_frame();
        steps
    }

    /// Scripts, then registry to simulation, one simulation step, then
    /// simulation back to registry.
    fn fixed_step(&mut self) {
        let dt = self.clock.step_secs();

        let report = self.profiler.time("scripts", || {
            self.scripts
                .update(&mut self.registry, &mut self.physics, &self.input, dt)
        });
        for line in report.log {
            self.console.log(line);
        }
        if !report.failures.is_empty() {
            self.counters
                .increment("script_failures", report.failures.len() as u64);
            for failure in &report.failures {
                self.console.log(format!("Script error: {failure}"));
            }
        }

        self.profiler.time("physics", || {
            bridge::sync_to_physics(&self.registry, &mut self.physics);
            self.physics.step(dt);
            bridge::sync_from_physics(&mut self.registry, &self.physics);
        });
        self.counters.increment("steps", 1);
    }

    /// Snapshot the world and start simulating. When the snapshot cannot be
    /// written the editor stays in edit mode.
    pub fn play(&mut self) -> Result<(), EditorError> {
        if self.is_playing() {
            return Ok(());
        }
        let snapshot = self.settings.editor.snapshot_path.clone();
        if let Err(err) = kiln_scene::save(&snapshot, &self.registry) {
            self.console
                .log(format!("Failed to enter play mode: {err}"));
            return Err(err.into());
        }

        self.mode = EditorMode::Playing;
        tracing::info!(snapshot = %snapshot.display(), "play mode started");
        self.console.log("Entering Play mode");
        Ok(())
    }

    /// Stop simulating and restore the snapshot taken by [`play`].
    ///
    /// The editor is back in edit mode even when this fails; in that case
    /// the world is left as the simulation last had it.
    ///
    /// [`play`]: EditorApp::play
    pub fn stop(&mut self) -> Result<(), EditorError> {
        if !self.is_playing() {
            return Ok(());
        }
        self.mode = EditorMode::Editing;

        let snapshot = self.settings.editor.snapshot_path.clone();
        let source = self.read_scene(&snapshot)?;
        self.replace_world(&source);

        tracing::info!("play mode stopped");
        self.console.log("Exiting Play mode");
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<(), EditorError> {
        match self.mode {
            EditorMode::Editing => self.play(),
            EditorMode::Playing => self.stop(),
        }
    }

    /// Replace the world with the scene at `path`. Only allowed while
    /// editing; the world is untouched if the file cannot be read.
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        if self.is_playing() {
            return Err(EditorError::WhilePlaying);
        }
        let path = path.as_ref();
        let source = self.read_scene(path)?;
        self.replace_world(&source);
        self.current_scene_path = path.to_path_buf();
        self.console
            .log(format!("Scene loaded: {}", path.display()));
        Ok(())
    }

    pub fn save_scene(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref();
        if let Err(err) = kiln_scene::save(path, &self.registry) {
            self.console.log(format!("Failed to save scene: {err}"));
            return Err(err.into());
        }
        self.current_scene_path = path.to_path_buf();
        self.console.log(format!("Scene saved: {}", path.display()));
        Ok(())
    }

    /// Save to the scene path last saved or loaded.
    pub fn save_current_scene(&mut self) -> Result<(), EditorError> {
        let path = self.current_scene_path.clone();
        self.save_scene(path)
    }

    fn read_scene(&mut self, path: &Path) -> Result<String, SceneError> {
        kiln_scene::read_source(path, &self.vfs).inspect_err(|err| {
            self.console.log(format!("Failed to load scene: {err}"));
        })
    }

    /// Tear down every Transform-bearing entity (and its body) and all
    /// script instances, then load `source`.
    fn replace_world(&mut self, source: &str) {
        for entity in self.registry.entities_with::<Transform>() {
            bridge::despawn(&mut self.registry, &mut self.physics, entity);
        }
        self.scripts.clear();
        self.selected = EntityHandle::NULL;

        let report = kiln_scene::load_str(source, &mut self.registry, &mut self.physics);
        if report.malformed > 0 {
            self.console.log(format!(
                "Scene had {} malformed line(s); affected entities are incomplete",
                report.malformed
            ));
        }
        tracing::debug!(
            entities = report.entities,
            bodies = report.bodies,
            live_bodies = self.physics.body_count(),
            "world replaced"
        );
    }
}

impl std::fmt::Debug for EditorApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorApp")
            .field("mode", &self.mode)
            .field("entities", &self.registry.live_count())
            .field("selected", &self.selected)
            .field("scene", &self.current_scene_path)
            .finish_non_exhaustive()
    }
}
