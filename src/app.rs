//! Fixed-cadence driver: a worker thread steps the shared simulation while
//! settings arrive from other threads through the same mutex.

use std::any::Any;
use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::{debug, error, info};

use crate::config::RuntimeConfig;
use crate::rain::animation::{AnimationSystem, FrameStats};

pub type SharedRain = Arc<Mutex<AnimationSystem>>;

/// Live settings changes, applied between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RainCommand {
    SetDensity(f32),
    IncreaseDensity,
    DecreaseDensity,
    SetSpeed(f32),
    SetZoomVelocity(f32),
    Resize { width: f32, height: f32 },
    Clear,
}

impl RainCommand {
    pub fn apply(self, system: &mut AnimationSystem) {
        match self {
            RainCommand::SetDensity(p) => system.set_density_percentage(p),
            RainCommand::IncreaseDensity => system.increase_density(),
            RainCommand::DecreaseDensity => system.decrease_density(),
            RainCommand::SetSpeed(p) => system.set_animation_speed(p),
            RainCommand::SetZoomVelocity(v) => system.set_zoom_velocity(v),
            RainCommand::Resize { width, height } => system.resize(width, height),
            RainCommand::Clear => system.clear_all_streaks(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DriverParams {
    pub fps: f32,
    pub frames: Option<u64>,
}

impl DriverParams {
    fn frame_dt(&self) -> f32 {
        if self.fps.is_finite() && self.fps > 0.0 {
            1.0 / self.fps
        } else {
            1.0 / 60.0
        }
    }
}

impl From<&RuntimeConfig> for DriverParams {
    fn from(cfg: &RuntimeConfig) -> Self {
        Self {
            fps: cfg.fps,
            frames: cfg.frames,
        }
    }
}

pub struct RainDriver {
    system: SharedRain,
    stats_rx: Receiver<FrameStats>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

/// A panic mid-frame cannot leave a half-updated system behind, so a poisoned
/// lock is still usable.
pub fn lock(system: &Mutex<AnimationSystem>) -> MutexGuard<'_, AnimationSystem> {
    system.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RainDriver {
    pub fn spawn(
        system: AnimationSystem,
        params: DriverParams,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<Self> {
        let system = Arc::new(Mutex::new(system));
        let (stats_tx, stats_rx) = bounded::<FrameStats>(8);

        let system_worker = system.clone();
        let stop_worker = stop.clone();
        let handle = thread::Builder::new()
            .name("rain-update".into())
            .spawn(move || worker_loop(system_worker, stats_tx, stop_worker, params))?;

        Ok(Self {
            system,
            stats_rx,
            stop,
            handle: Some(handle),
        })
    }

    /// Serialized against the update loop through the shared mutex.
    pub fn apply(&self, cmd: RainCommand) {
        debug!(target: "rain::driver", ?cmd, "applying command");
        cmd.apply(&mut lock(&self.system));
    }

    pub fn system(&self) -> SharedRain {
        self.system.clone()
    }

    /// Per-frame snapshots; frames are dropped while the receiver lags.
    pub fn stats(&self) -> &Receiver<FrameStats> {
        &self.stats_rx
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Waits for the update thread. `Err` carries the worker's panic payload.
    pub fn join(mut self) -> thread::Result<()> {
        self.join_worker()
    }

    fn join_worker(&mut self) -> thread::Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        handle.join().inspect_err(|payload| {
            error!(
                target: "rain::driver",
                reason = panic_message(&**payload),
                "update thread panicked"
            );
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl Drop for RainDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = self.join_worker();
    }
}

fn worker_loop(
    system: SharedRain,
    stats_tx: Sender<FrameStats>,
    stop: Arc<AtomicBool>,
    params: DriverParams,
) {
    let dt = params.frame_dt();
    let frame_duration = Duration::from_secs_f32(dt);
    let mut next_deadline = Instant::now();
    let mut frames: u64 = 0;
    info!(target: "rain::driver", fps = 1.0 / dt, limit = ?params.frames, "update loop started");

    loop {
        if stop.load(Ordering::SeqCst) {
            info!(target: "rain::driver", frames, "stop requested");
            break;
        }
        if params.frames.is_some_and(|limit| frames >= limit) {
            info!(target: "rain::driver", frames, "frame limit reached");
            break;
        }

        next_deadline += frame_duration;

        let stats = {
            let mut sys = lock(&system);
            sys.update(dt);
            sys.stats()
        };
        let _ = stats_tx.try_send(stats);
        frames += 1;

        let now = Instant::now();
        if next_deadline > now {
            thread::sleep(next_deadline - now);
        } else {
            // Behind schedule: resync rather than bursting to catch up.
            next_deadline = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreakConfig;
    use crate::rain::density::DensityController;
    use crate::rain::glyphs::GlyphSet;
    use crate::rain::viewport::Viewport;

    fn system() -> AnimationSystem {
        let mut sys =
            AnimationSystem::seeded(Arc::new(GlyphSet::default()), StreakConfig::default(), Some(11));
        sys.initialize(Viewport::new(640.0, 480.0), DensityController::new(32.0, 50.0));
        sys
    }

    #[test]
    fn commands_route_to_system() {
        let mut sys = system();
        RainCommand::SetDensity(100.0).apply(&mut sys);
        assert_eq!(sys.density().unwrap().percentage(), 100.0);
        RainCommand::DecreaseDensity.apply(&mut sys);
        assert_eq!(sys.density().unwrap().percentage(), 95.0);
        RainCommand::SetSpeed(50.0).apply(&mut sys);
        assert_eq!(sys.animation_speed(), 50.0);
        RainCommand::Resize {
            width: 1280.0,
            height: 960.0,
        }
        .apply(&mut sys);
        assert_eq!(sys.viewport().unwrap().width, 1280.0);
        RainCommand::Clear.apply(&mut sys);
        assert_eq!(sys.active_streak_count(), 0);
    }

    #[test]
    fn join_reports_worker_panic() {
        let stop = Arc::new(AtomicBool::new(false));
        let (_stats_tx, stats_rx) = bounded::<FrameStats>(1);
        let handle = thread::spawn(|| panic!("update failed"));
        let driver = RainDriver {
            system: Arc::new(Mutex::new(system())),
            stats_rx,
            stop,
            handle: Some(handle),
        };
        let payload = driver.join().expect_err("panic should surface");
        assert_eq!(panic_message(&*payload), "update failed");
    }

    #[test]
    fn join_is_ok_after_frame_limit() {
        let params = DriverParams {
            fps: 1_000.0,
            frames: Some(3),
        };
        let driver = RainDriver::spawn(system(), params, Arc::new(AtomicBool::new(false)))
            .expect("spawn driver");
        assert!(driver.join().is_ok());
    }

    #[test]
    fn nonpositive_fps_falls_back() {
        let p = DriverParams {
            fps: 0.0,
            frames: None,
        };
        assert!((p.frame_dt() - 1.0 / 60.0).abs() < 1e-9);
    }
}
