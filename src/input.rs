//! Keyboard and mouse controls
//!
//! Polling produces an [`InputState`] snapshot; [`Controls::apply`] turns it
//! into camera motion and pipeline toggles without touching the window, so
//! the bindings are testable.

use macroquad::prelude::*;

use crate::pipeline::RenderPipeline;
use crate::rasterizer::Vec3;
use crate::scene::{Camera, Transformable};

/// Continuous actions, applied every frame while the key is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Up,
    Down,
    YawLeft,
    YawRight,
    PitchUp,
    PitchDown,
    RollLeft,
    RollRight,
}

/// One-shot actions, applied once per key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Wireframe,
    Texture,
    Culling,
    Shading,
    Debug,
    Help,
}

const HELD_BINDINGS: [(KeyCode, Command); 12] = [
    (KeyCode::W, Command::Forward),
    (KeyCode::S, Command::Back),
    (KeyCode::A, Command::StrafeLeft),
    (KeyCode::D, Command::StrafeRight),
    (KeyCode::Q, Command::Up),
    (KeyCode::E, Command::Down),
    (KeyCode::Left, Command::YawLeft),
    (KeyCode::Right, Command::YawRight),
    (KeyCode::Up, Command::PitchUp),
    (KeyCode::Down, Command::PitchDown),
    (KeyCode::Comma, Command::RollLeft),
    (KeyCode::Period, Command::RollRight),
];

const PRESS_BINDINGS: [(KeyCode, Toggle); 6] = [
    (KeyCode::X, Toggle::Wireframe),
    (KeyCode::T, Toggle::Texture),
    (KeyCode::B, Toggle::Culling),
    (KeyCode::L, Toggle::Shading),
    (KeyCode::F1, Toggle::Debug),
    (KeyCode::H, Toggle::Help),
];

/// Help text for the overlay
pub const HELP_LINES: [&str; 7] = [
    "WASD move, Q/E up/down",
    "Arrows look, ,/. roll",
    "Click to grab mouse, Esc to release",
    "T cycle texture/fill/wireframe",
    "X wireframe overlay, B culling",
    "L shading, F1 stats",
    "H hide help",
];

/// Everything the controls need from one frame of input
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub held: Vec<Command>,
    pub pressed: Vec<Toggle>,
    /// Mouse movement in pixels since the last frame
    pub mouse_delta: (f64, f64),
    /// Mouse is grabbed; only then does it steer the camera
    pub look_lock: bool,
}

/// Tracks cursor grab between frames
pub struct InputPoller {
    look_lock: bool,
}

impl InputPoller {
    pub fn new() -> Self {
        Self { look_lock: false }
    }

    /// Read the keyboard and mouse for this frame
    pub fn poll(&mut self) -> InputState {
        if !self.look_lock && is_mouse_button_pressed(MouseButton::Left) {
            self.set_look_lock(true);
        } else if self.look_lock && is_key_pressed(KeyCode::Escape) {
            self.set_look_lock(false);
        }

        let delta = if self.look_lock {
            let d = mouse_delta_position();
            local_delta_to_pixels((d.x, d.y), (screen_width(), screen_height()))
        } else {
            (0.0, 0.0)
        };

        InputState {
            held: HELD_BINDINGS
                .iter()
                .filter(|(key, _)| is_key_down(*key))
                .map(|(_, cmd)| *cmd)
                .collect(),
            pressed: PRESS_BINDINGS
                .iter()
                .filter(|(key, _)| is_key_pressed(*key))
                .map(|(_, toggle)| *toggle)
                .collect(),
            mouse_delta: delta,
            look_lock: self.look_lock,
        }
    }

    fn set_look_lock(&mut self, on: bool) {
        self.look_lock = on;
        set_cursor_grab(on);
        show_mouse(!on);
    }
}

/// macroquad reports mouse deltas as last minus current, in window-local
/// units spanning [-1, 1]. Flip and scale to screen pixels.
fn local_delta_to_pixels(delta: (f32, f32), screen: (f32, f32)) -> (f64, f64) {
    (
        -(delta.0 * screen.0 * 0.5) as f64,
        -(delta.1 * screen.1 * 0.5) as f64,
    )
}

/// Movement and look speeds
#[derive(Debug, Clone, Copy)]
pub struct Controls {
    /// Units per second
    pub move_speed: f64,
    /// Radians per second
    pub turn_speed: f64,
    /// Radians per pixel of mouse travel
    pub mouse_sensitivity: f64,
}

impl Default for Controls {
    fn default() -> Self {
        Self { move_speed: 8.0, turn_speed: 2.0, mouse_sensitivity: 0.001 }
    }
}

impl Controls {
    /// Move and turn the camera, flip pipeline toggles. Returns toggles the
    /// pipeline doesn't own (help) for the caller.
    pub fn apply(
        &self,
        input: &InputState,
        camera: &mut Camera,
        pipeline: &mut RenderPipeline,
        elapsed: f64,
    ) -> Vec<Toggle> {
        if input.look_lock {
            let (dx, dy) = input.mouse_delta;
            if dx != 0.0 {
                camera.rotate_y(-dx * self.mouse_sensitivity);
            }
            if dy != 0.0 {
                camera.rotate_x(dy * self.mouse_sensitivity);
            }
        }

        let trans = self.move_speed * elapsed;
        let rot = self.turn_speed * elapsed;
        let look = camera.horizontal_look_direction();
        let forward = look * trans;
        let right = look.cross(Vec3::new(0.0, -1.0, 0.0)) * trans;
        let up = Vec3::UP * trans;

        for &cmd in &input.held {
            match cmd {
                Command::Forward => camera.translate(forward),
                Command::Back => camera.translate(forward.invert()),
                Command::StrafeLeft => camera.translate(right.invert()),
                Command::StrafeRight => camera.translate(right),
                Command::Up => camera.translate(up),
                Command::Down => camera.translate(up.invert()),
                Command::YawLeft => camera.rotate_y(rot),
                Command::YawRight => camera.rotate_y(-rot),
                Command::PitchUp => camera.rotate_x(-rot),
                Command::PitchDown => camera.rotate_x(rot),
                Command::RollLeft => camera.rotate_z(rot),
                Command::RollRight => camera.rotate_z(-rot),
            }
        }

        let mut unhandled = Vec::new();
        for &toggle in &input.pressed {
            match toggle {
                Toggle::Wireframe => pipeline.toggle_wireframe(),
                Toggle::Texture => pipeline.toggle_texture(),
                Toggle::Culling => pipeline.toggle_culling(),
                Toggle::Shading => pipeline.toggle_shading(),
                Toggle::Debug => pipeline.toggle_debug(),
                Toggle::Help => unhandled.push(toggle),
            }
        }
        unhandled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{DrawMode, PipelineSettings, Switch};

    fn setup() -> (Camera, RenderPipeline, Controls) {
        (
            Camera::new(1.0, 90.0, 0.1, 1000.0),
            RenderPipeline::new(PipelineSettings::default()),
            Controls::default(),
        )
    }

    fn holding(cmds: &[Command]) -> InputState {
        InputState { held: cmds.to_vec(), ..Default::default() }
    }

    #[test]
    fn test_forward_moves_along_look() {
        let (mut cam, mut pipeline, controls) = setup();
        controls.apply(&holding(&[Command::Forward]), &mut cam, &mut pipeline, 0.5);
        let p = cam.position();
        assert!(p.x.abs() < 1e-12);
        assert!((p.z - 4.0).abs() < 1e-12);

        controls.apply(&holding(&[Command::Back]), &mut cam, &mut pipeline, 0.25);
        assert!((cam.position().z - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_forward_ignores_pitch() {
        let (mut cam, mut pipeline, controls) = setup();
        cam.rotate_x(0.7);
        controls.apply(&holding(&[Command::Forward]), &mut cam, &mut pipeline, 1.0);
        assert!(cam.position().y.abs() < 1e-12);
        assert!((cam.position().z - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_strafe_and_vertical() {
        let (mut cam, mut pipeline, controls) = setup();
        controls.apply(&holding(&[Command::StrafeRight]), &mut cam, &mut pipeline, 1.0);
        // (0,0,1) x (0,-1,0) = (1,0,0)
        assert!((cam.position().x - 8.0).abs() < 1e-12);

        controls.apply(&holding(&[Command::StrafeLeft, Command::Up]), &mut cam, &mut pipeline, 1.0);
        assert!(cam.position().x.abs() < 1e-12);
        assert!((cam.position().y - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_turning() {
        let (mut cam, mut pipeline, controls) = setup();
        let input = holding(&[Command::YawLeft, Command::PitchUp, Command::RollRight]);
        controls.apply(&input, &mut cam, &mut pipeline, 0.1);
        let r = cam.rotation();
        assert!((r.y - 0.2).abs() < 1e-12);
        assert!((r.x + 0.2).abs() < 1e-12);
        assert!((r.z + 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_mouse_needs_look_lock() {
        let (mut cam, mut pipeline, controls) = setup();
        let mut input = InputState { mouse_delta: (100.0, -50.0), ..Default::default() };
        controls.apply(&input, &mut cam, &mut pipeline, 0.016);
        assert_eq!(cam.rotation(), Vec3::ZERO);

        input.look_lock = true;
        controls.apply(&input, &mut cam, &mut pipeline, 0.016);
        assert!((cam.rotation().y + 0.1).abs() < 1e-12);
        assert!((cam.rotation().x + 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_local_delta_to_pixels() {
        // moved right by a quarter of the width, up by an eighth of the height
        let (dx, dy) = local_delta_to_pixels((-0.5, 0.25), (960.0, 720.0));
        assert!((dx - 240.0).abs() < 1e-9);
        assert!((dy + 90.0).abs() < 1e-9);
        assert_eq!(local_delta_to_pixels((0.0, 0.0), (960.0, 720.0)), (0.0, 0.0));
    }

    #[test]
    fn test_toggles_reach_pipeline() {
        let (mut cam, mut pipeline, controls) = setup();
        let input = InputState {
            pressed: vec![Toggle::Texture, Toggle::Culling, Toggle::Help],
            ..Default::default()
        };
        let rest = controls.apply(&input, &mut cam, &mut pipeline, 0.016);
        assert_eq!(pipeline.draw_mode(), DrawMode::Filled);
        assert_eq!(pipeline.culling(), Switch::Off);
        assert_eq!(pipeline.shading(), Switch::On);
        assert_eq!(rest, vec![Toggle::Help]);
    }
}
