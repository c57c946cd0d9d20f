//! Headless locomotion demo
//!
//! Builds a floor and a wall, then drives the controller through a scripted
//! session: teleport onto the floor, a rejected aim at the wall, a snap-turn,
//! a strafe and a second teleport from a motion controller thumbstick. Pass
//! a RON config path as the first argument to override the defaults.

use std::rc::Rc;

use locomotion::core::LocomotionEvent;
use locomotion::physics::PointerRay;
use locomotion::prelude::*;

const FRAME: f32 = 1.0 / 72.0;
const GAMEPAD: SourceId = SourceId(0);
const CONTROLLER: SourceId = SourceId(1);

/// One scripted stick state held for a number of frames
struct Step {
    label: &'static str,
    movement: Vec2,
    rotation: Vec2,
    aim: Vec3,
    frames: u32,
    /// Controller thumbstick position sent when the step begins
    thumbstick: Option<Vec2>,
}

impl Step {
    const fn new(label: &'static str, movement: Vec2, rotation: Vec2, aim: Vec3, frames: u32) -> Self {
        Self {
            label,
            movement,
            rotation,
            aim,
            frames,
            thumbstick: None,
        }
    }

    /// Drive this step from the motion controller instead of the gamepad
    fn from_controller(mut self, position: Vec2) -> Self {
        self.thumbstick = Some(position);
        self
    }

    fn pointer_source(&self) -> SourceId {
        if self.thumbstick.is_some() { CONTROLLER } else { GAMEPAD }
    }
}

fn build_scene() -> Rc<Physics> {
    let mut physics = Physics::new();

    let ground = physics.create_static_body(Vec3::new(0.0, -0.1, 0.0), Quat::IDENTITY);
    physics.add_ground_plane(ground);

    let wall = physics.create_static_body(Vec3::new(6.0, 1.5, 0.0), Quat::IDENTITY);
    physics.add_box_collider(wall, Vec3::new(0.1, 1.5, 4.0));

    physics.refresh_queries();
    log::info!("scene ready with {} colliders", physics.collider_count());
    Rc::new(physics)
}

fn load_config() -> LocomotionConfig {
    let Some(path) = std::env::args().nth(1) else {
        return LocomotionConfig::default();
    };

    match LocomotionConfig::load_ron(&path) {
        Ok(config) => {
            log::info!("loaded config from {path}");
            config
        }
        Err(e) => {
            log::warn!("{e}, using defaults");
            LocomotionConfig::default()
        }
    }
}

fn report(locomotion: &mut Locomotion) {
    locomotion.events_mut().swap();
    for event in locomotion.events_mut().drain() {
        match event {
            LocomotionEvent::Teleported { token, target } => {
                log::info!("{token}: camera now at {target}");
            }
            LocomotionEvent::Rotated { token, degrees } => {
                log::info!("{token}: turned {degrees} degrees");
            }
            LocomotionEvent::Strafed { token, offset } => {
                log::info!("{token}: stepped {offset}");
            }
            other => log::debug!("{other:?}"),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let physics = build_scene();
    let pointers = Rc::new(RayPointers::new(Rc::clone(&physics)));

    let mut locomotion = match LocomotionBuilder::new(load_config(), Rig::standing(1.6))
        .with_display(HeadlessDisplay::connected())
        .with_fade(ScreenFade::new())
        .with_focus(pointers.clone())
        .with_spatial(physics.clone())
        .build()
    {
        Ok(locomotion) => locomotion,
        Err(e) => {
            eprintln!("Locomotion error: {e}");
            return;
        }
    };

    let forward = Vec2::new(0.0, 0.9);
    let floor = Vec3::new(0.0, -0.6, -1.0);
    let wall = Vec3::new(1.0, 0.0, 0.0);
    let script = [
        Step::new("aim at floor", forward, Vec2::ZERO, floor, 10),
        Step::new("release", Vec2::ZERO, Vec2::ZERO, floor, 60),
        Step::new("aim at wall", forward, Vec2::ZERO, wall, 10),
        Step::new("release", Vec2::ZERO, Vec2::ZERO, wall, 10),
        Step::new("turn right", Vec2::ZERO, Vec2::new(0.95, 0.0), floor, 1),
        Step::new("settle", Vec2::ZERO, Vec2::ZERO, floor, 40),
        Step::new("strafe left", Vec2::new(-0.95, 0.0), Vec2::ZERO, floor, 1),
        Step::new("settle", Vec2::ZERO, Vec2::ZERO, floor, 40),
        Step::new("controller aim", Vec2::ZERO, Vec2::ZERO, floor, 10).from_controller(forward),
        Step::new("controller release", Vec2::ZERO, Vec2::ZERO, floor, 60)
            .from_controller(Vec2::new(0.0, 0.05)),
    ];

    let config = locomotion.config().clone();
    let mut input = Input::new();

    for step in &script {
        log::info!("-- {}", step.label);
        input.set_stick(&config.axes.movement_x, &config.axes.movement_y, step.movement);
        input.set_stick(&config.axes.rotation_x, &config.axes.rotation_y, step.rotation);
        if let Some(position) = step.thumbstick {
            input.process_position(PressKind::Thumbstick, position, CONTROLLER);
        }

        // A single registered pointer doubles as the gamepad pointer
        let source = step.pointer_source();
        pointers.remove_pointer(if source == GAMEPAD { CONTROLLER } else { GAMEPAD });

        for _ in 0..step.frames {
            let camera = locomotion.rig().camera();
            let direction = camera.rotation() * step.aim;
            pointers.set_pointer(source, PointerRay::new(camera.position(), direction));

            locomotion.handle_pending(&mut input);
            locomotion.update(&input, FRAME);
            report(&mut locomotion);
        }
    }

    let stage = locomotion.rig().stage_transform();
    log::info!(
        "final stage at {} facing {}",
        stage.position,
        stage.forward()
    );
}
