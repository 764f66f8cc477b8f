mod common;

use common::RecordingSurface;
use driver::{AnimationDriver, DriverState, FrameQueue, PointerSettings, TIME_STEP};
use shading::Vec2;
use surface::{NoPointer, SharedPointer};

fn fixed(x: f32, y: f32) -> PointerSettings {
    PointerSettings {
        tracking: false,
        fixed: Vec2::new(x, y),
    }
}

#[test]
fn double_start_keeps_a_single_frame_chain() {
    let (surface, log) = RecordingSurface::boxed(800, 600);
    let mut d = AnimationDriver::new(surface, Box::new(NoPointer), Box::new(FrameQueue::new()), fixed(1.0, 2.0));

    d.start();
    d.start();
    assert_eq!(d.scheduler().pending(), 1);
    assert!(d.is_running());

    for _ in 0..5 {
        assert_eq!(d.pump(), 1);
        assert_eq!(d.scheduler().pending(), 1);
    }
    assert_eq!(log.borrow().renders.len(), 5);
    assert!((f64::from(d.uniforms().time) - 5.0 * TIME_STEP).abs() < 1e-6);
}

#[test]
fn stale_callback_after_stop_does_nothing() {
    let (surface, log) = RecordingSurface::boxed(800, 600);
    let mut d = AnimationDriver::new(surface, Box::new(NoPointer), Box::new(FrameQueue::new()), fixed(1.0, 2.0));

    d.start();
    let token = d.pending_token().expect("frame requested");
    d.stop();
    assert_eq!(d.state(), DriverState::Stopped);
    assert_eq!(d.scheduler().pending(), 0);

    let before = *d.uniforms();
    assert!(!d.on_frame(token));
    assert_eq!(*d.uniforms(), before);
    assert!(log.borrow().renders.is_empty());
    assert_eq!(d.pump(), 0);
}

#[test]
fn token_from_previous_run_is_stale_after_restart() {
    let (surface, log) = RecordingSurface::boxed(64, 48);
    let mut d = AnimationDriver::new(surface, Box::new(NoPointer), Box::new(FrameQueue::new()), fixed(0.0, 0.0));

    d.start();
    let old = d.pending_token().unwrap();
    d.stop();
    d.start();
    let current = d.pending_token().unwrap();
    assert_ne!(old, current);

    assert!(!d.on_frame(old));
    assert!(d.on_frame(current));
    assert!(!d.on_frame(current));
    assert_eq!(log.borrow().renders.len(), 1);
}

#[test]
fn destroy_is_idempotent_and_terminal() {
    let (surface, log) = RecordingSurface::boxed(64, 48);
    let mut d = AnimationDriver::new(surface, Box::new(NoPointer), Box::new(FrameQueue::new()), fixed(0.0, 0.0));
    d.start();
    let token = d.pending_token().unwrap();

    d.destroy();
    d.destroy();
    assert_eq!(d.state(), DriverState::Destroyed);
    assert_eq!(log.borrow().releases, 1);
    assert!(d.surface().is_released());

    d.start();
    assert_eq!(d.state(), DriverState::Destroyed);
    assert!(!d.on_frame(token));
    d.tick();
    d.stop();
    assert_eq!(d.state(), DriverState::Destroyed);
    assert!(log.borrow().renders.is_empty());
    assert_eq!(d.uniforms().time, 0.0);
}

#[test]
fn fixed_pointer_wins_when_tracking_is_disabled() {
    let live = SharedPointer::new();
    live.set(700.0, 500.0);
    let (surface, log) = RecordingSurface::boxed(800, 600);
    let mut d = AnimationDriver::new(surface, Box::new(live.clone()), Box::new(FrameQueue::new()), fixed(100.0, 50.0));

    d.start();
    for i in 0..20 {
        live.set(i as f32, 2.0 * i as f32);
        d.pump();
        assert_eq!(d.uniforms().pointer, Vec2::new(100.0, 50.0));
    }
    assert!(log
        .borrow()
        .renders
        .iter()
        .all(|(u, _)| u.pointer == Vec2::new(100.0, 50.0)));
}

#[test]
fn toggling_tracking_switches_the_pointer_source() {
    let live = SharedPointer::new();
    live.set(10.0, 20.0);
    let (surface, _log) = RecordingSurface::boxed(800, 600);
    let mut d = AnimationDriver::new(surface, Box::new(live), Box::new(FrameQueue::new()), fixed(100.0, 50.0));

    d.tick();
    assert_eq!(d.uniforms().pointer, Vec2::new(100.0, 50.0));

    d.set_mouse_tracking(true);
    d.tick();
    assert_eq!(d.uniforms().pointer, Vec2::new(10.0, 20.0));

    d.set_mouse_tracking(false);
    d.set_fixed_pointer(Vec2::new(1.0, 1.0));
    d.tick();
    assert_eq!(d.uniforms().pointer, Vec2::new(1.0, 1.0));
}

#[test]
fn uniforms_are_written_before_render() {
    let live = SharedPointer::new();
    live.set(5.0, 6.0);
    let (surface, log) = RecordingSurface::boxed(32, 32);
    let settings = PointerSettings {
        tracking: true,
        fixed: Vec2::ZERO,
    };
    let mut d = AnimationDriver::new(surface, Box::new(live), Box::new(FrameQueue::new()), settings);

    d.tick();
    let (seen, _) = log.borrow().renders[0];
    assert_eq!(seen, *d.uniforms());
    assert!((f64::from(seen.time) - TIME_STEP).abs() < 1e-7);
    assert_eq!(seen.pointer, Vec2::new(5.0, 6.0));
}

#[test]
fn resize_keeps_resolution_and_surface_in_step() {
    let (surface, log) = RecordingSurface::boxed(800, 600);
    let mut d = AnimationDriver::new(surface, Box::new(NoPointer), Box::new(FrameQueue::new()), fixed(0.0, 0.0));
    d.start();
    d.pump();

    d.resize(400, 300).unwrap();
    assert_eq!(d.uniforms().resolution, Vec2::new(400.0, 300.0));
    assert_eq!(d.surface().size(), (400, 300));
    d.pump();

    let log = log.borrow();
    assert_eq!(log.resizes, vec![(400, 300)]);
    for (u, size) in &log.renders {
        assert_eq!(u.resolution, Vec2::new(size.0 as f32, size.1 as f32));
    }
}

#[test]
fn failed_resize_changes_nothing() {
    let (surface, log) = RecordingSurface::boxed(800, 600);
    let mut d = AnimationDriver::new(surface, Box::new(NoPointer), Box::new(FrameQueue::new()), fixed(0.0, 0.0));
    log.borrow_mut().fail_resize = true;

    assert!(d.resize(400, 300).is_err());
    assert_eq!(d.uniforms().resolution, Vec2::new(800.0, 600.0));
    assert_eq!(d.surface().size(), (800, 600));
}
