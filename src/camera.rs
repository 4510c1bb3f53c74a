use anyhow::Result;
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use winit::event::WindowEvent;

use crate::config::CameraConfig;
use crate::core::{Button, Controller};

/// Pitch stays this far inside +-90 degrees so the view never flips
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Time step assumed by [`CameraShake::smooth_random_movement`]
pub const SHAKE_FRAME_STEP: f32 = 1.0 / 60.0;

/// Move a position from the held movement buttons.
///
/// Forward/backward follows `direction`, strafing follows
/// `direction x normal` and rise/fall follows `normal`. The combined
/// movement is normalised so diagonals are no faster than straight lines.
pub fn move_camera_on_keyboard(
    position: Vec3,
    normal: Vec3,
    direction: Vec3,
    controller: &dyn Controller,
    step: f32,
) -> Vec3 {
    let forward = direction.normalize_or_zero();
    let up = normal.normalize_or_zero();
    let right = forward.cross(up).normalize_or_zero();

    let wish = forward * controller.axis(Button::Forward, Button::Backward)
        + right * controller.axis(Button::StrafeRight, Button::StrafeLeft)
        + up * controller.axis(Button::Rise, Button::Fall);

    position + wish.normalize_or_zero() * step
}

/// Smooth random camera shake.
///
/// Interpolates between random offsets inside a ball of radius `magnitude`,
/// so the offset never leaves the ball and never jumps between frames.
#[derive(Clone)]
pub struct CameraShake {
    rng: StdRng,
    rate: f32,
    from: Vec3,
    to: Vec3,
    progress: f32,
}

impl CameraShake {
    pub fn new(rate: f32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            rate: rate.max(0.0),
            from: Vec3::ZERO,
            to: Vec3::ZERO,
            progress: 0.0,
        }
    }

    /// Offset the position by the shake, advancing one nominal frame
    pub fn smooth_random_movement(&mut self, position: Vec3, magnitude: f32) -> Vec3 {
        position + self.advance(SHAKE_FRAME_STEP, magnitude)
    }

    /// Advance the shake by `dt` seconds and return the current offset
    pub fn advance(&mut self, dt: f32, magnitude: f32) -> Vec3 {
        if !magnitude.is_finite() || magnitude <= 0.0 {
            self.reset();
            return Vec3::ZERO;
        }

        // a shrinking magnitude pulls the endpoints inward
        self.from = self.from.clamp_length_max(magnitude);
        self.to = self.to.clamp_length_max(magnitude);

        self.progress += dt.max(0.0) * self.rate;
        if self.progress >= 1.0 {
            // long frames skip whole segments instead of replaying them
            self.progress = self.progress.fract();
            self.from = self.to;
            self.to = self.random_in_ball(magnitude);
        }

        self.offset()
    }

    pub fn reset(&mut self) {
        self.from = Vec3::ZERO;
        self.to = Vec3::ZERO;
        self.progress = 0.0;
    }

    fn offset(&self) -> Vec3 {
        let t = self.progress.clamp(0.0, 1.0);
        let eased = t * t * (3.0 - 2.0 * t);
        self.from.lerp(self.to, eased)
    }

    fn random_in_ball(&mut self, radius: f32) -> Vec3 {
        loop {
            let p = Vec3::new(
                self.rng.random_range(-1.0f32..=1.0),
                self.rng.random_range(-1.0f32..=1.0),
                self.rng.random_range(-1.0f32..=1.0),
            );
            if p.length_squared() <= 1.0 {
                return p * radius;
            }
        }
    }
}

/// Free-roaming first-person camera
#[derive(Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    width: u32,
    height: u32,
    speed: f32,
    mouse_sensitivity: f32,
    last_mouse: Option<(f32, f32)>,
    shake: CameraShake,
    shake_magnitude: f32,
    shake_offset: Vec3,
    /// Separate generator for [`Camera::smooth_random_movement`], so direct
    /// calls never advance the shake that `update` applies
    manual_shake: CameraShake,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let [width, height] = config.viewport;
        let mut camera = Self {
            position: Vec3::from_array(config.position),
            yaw: 0.0,
            pitch: 0.0,
            fov_y: config.fov_y_degrees.to_radians(),
            near: config.near,
            far: config.far,
            width: 1,
            height: 1,
            speed: config.speed,
            mouse_sensitivity: config.mouse_sensitivity,
            last_mouse: None,
            shake: CameraShake::new(config.shake_rate, config.shake_seed),
            shake_magnitude: config.shake_magnitude,
            shake_offset: Vec3::ZERO,
            manual_shake: CameraShake::new(config.shake_rate, config.shake_seed.map(|seed| seed.wrapping_add(1))),
        };
        camera.set_orientation(config.yaw, config.pitch);
        camera.reshape(width, height);
        log::debug!(
            "Camera initialised at {:?}, yaw {:.2}, pitch {:.2}",
            camera.position,
            camera.yaw,
            camera.pitch
        );
        camera
    }

    /// Validate the configuration first, rejecting degenerate projections
    pub fn try_new(config: &CameraConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Unit view direction
    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.direction().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        Vec3::Y
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Position the camera renders from, including any shake offset
    pub fn camera_pos(&self) -> Vec3 {
        self.position + self.shake_offset
    }

    /// Position without shake
    pub fn base_position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = wrap_angle(yaw);
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn set_shake(&mut self, magnitude: f32) {
        self.shake_magnitude = magnitude;
    }

    pub fn shake_magnitude(&self) -> f32 {
        self.shake_magnitude
    }

    /// Apply held movement buttons for `dt` seconds and advance the shake
    pub fn update(&mut self, dt: f32, controller: &dyn Controller) {
        let dt = dt.max(0.0);
        self.position = move_camera_on_keyboard(
            self.position,
            self.up(),
            self.direction(),
            controller,
            self.speed * dt,
        );
        self.shake_offset = self.shake.advance(dt, self.shake_magnitude);
    }

    /// Shake an arbitrary position; independent of the shake `update` applies
    pub fn smooth_random_movement(&mut self, position: Vec3, magnitude: f32) -> Vec3 {
        self.manual_shake.smooth_random_movement(position, magnitude)
    }

    /// Mouse-look from an absolute cursor position.
    ///
    /// The first position after construction or [`Camera::release_mouse`]
    /// only becomes the reference point.
    pub fn handle_mouse(&mut self, x: f32, y: f32) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = x - last_x;
            let dy = y - last_y;
            self.set_orientation(
                self.yaw - dx * self.mouse_sensitivity,
                self.pitch - dy * self.mouse_sensitivity,
            );
        }
        self.last_mouse = Some((x, y));
    }

    /// Forget the reference cursor position (cursor left the window)
    pub fn release_mouse(&mut self) {
        self.last_mouse = None;
    }

    /// Record a new viewport size; zero-sized viewports are ignored
    pub fn reshape(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring reshape to {}x{}", width, height);
            return;
        }
        self.width = width;
        self.height = height;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio(), self.near, self.far)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.camera_pos(), self.direction(), self.up())
    }

    pub fn projection_view_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Route cursor and resize events; returns whether the event was used
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_mouse(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.release_mouse();
                true
            }
            WindowEvent::Resized(size) => {
                self.reshape(size.width, size.height);
                true
            }
            _ => false,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

/// Wrap an angle into (-PI, PI]
fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
