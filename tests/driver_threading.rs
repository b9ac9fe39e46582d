use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use glyphrain::app::{DriverParams, RainCommand, RainDriver, lock};
use glyphrain::config::AppConfig;
use glyphrain::rain::animation::AnimationSystem;

fn seeded_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.animation.seed = Some(5);
    cfg.density.percentage = 20.0;
    cfg
}

fn wait_until_finished(driver: &RainDriver) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !driver.is_finished() {
        assert!(Instant::now() < deadline, "driver did not finish");
        thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn frame_limit_stops_worker() {
    let cfg = seeded_config();
    let stop = Arc::new(AtomicBool::new(false));
    let params = DriverParams {
        fps: 1_000.0,
        frames: Some(25),
    };
    let driver = RainDriver::spawn(AnimationSystem::from_config(&cfg), params, stop).unwrap();
    wait_until_finished(&driver);

    let system = driver.system();
    assert_eq!(lock(&system).frame(), 25);
    let received: Vec<_> = driver.stats().try_iter().collect();
    assert!(!received.is_empty());
    assert!(received.windows(2).all(|w| w[0].frame < w[1].frame));
    assert!(driver.join().is_ok());
}

#[test]
fn stop_flag_ends_unbounded_run() {
    let cfg = seeded_config();
    let stop = Arc::new(AtomicBool::new(false));
    let params = DriverParams {
        fps: 500.0,
        frames: None,
    };
    let driver =
        RainDriver::spawn(AnimationSystem::from_config(&cfg), params, stop.clone()).unwrap();
    thread::sleep(Duration::from_millis(30));
    stop.store(true, Ordering::SeqCst);
    wait_until_finished(&driver);
    assert!(lock(&driver.system()).frame() > 0);
}

#[test]
fn settings_from_another_thread_apply_between_frames() {
    let cfg = seeded_config();
    let stop = Arc::new(AtomicBool::new(false));
    let params = DriverParams {
        fps: 500.0,
        frames: None,
    };
    let driver = RainDriver::spawn(AnimationSystem::from_config(&cfg), params, stop).unwrap();

    thread::scope(|scope| {
        scope.spawn(|| {
            driver.apply(RainCommand::SetDensity(60.0));
            driver.apply(RainCommand::SetSpeed(150.0));
        });
    });

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let stats = driver.stats().recv_timeout(Duration::from_secs(5)).unwrap();
        if stats.target == 144 && stats.active_heads >= 144 {
            break;
        }
        assert!(Instant::now() < deadline, "density change never took effect");
    }
    let system = driver.system();
    let sys = lock(&system);
    assert_eq!(sys.animation_speed(), 150.0);
    for s in sys.streaks() {
        assert!((s.drop_interval() - s.base_drop_interval() / 1.5).abs() < 1e-5);
    }
    drop(sys);
    driver.stop();
    assert!(driver.join().is_ok());
}
