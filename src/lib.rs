//! Sprite Pong - classic two-player Pong
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (paddles, ball, collisions, scoring)
//! - `renderer`: Draw command accumulation, sprite batching, WebGPU submission
//! - `game`: Per-frame tick → extract → batch driver
//! - `settings`: Window/presentation configuration

pub mod error;
pub mod game;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::PongError;
pub use game::Pong;
pub use settings::Settings;

/// Game configuration constants
///
/// World units: the court spans [-1, 1] on both axes. Speeds are per-tick
/// displacements, tuned for one tick per displayed frame.
pub mod consts {
    use glam::Vec2;

    /// Half-size of the square court
    pub const COURT_HALF_EXTENT: f32 = 1.0;
    /// Thickness of the top and bottom walls
    pub const WALL_THICKNESS: f32 = 0.1;

    /// Paddle half-extent
    pub const PADDLE_EXTENT: Vec2 = Vec2::new(0.02, 0.15);
    /// Distance of each paddle center from its court edge
    pub const PADDLE_X_OFFSET: f32 = 0.05;
    /// Paddle vertical movement per tick while a key is held
    pub const PADDLE_SPEED: f32 = 0.02;

    /// Ball half-extent
    pub const BALL_EXTENT: Vec2 = Vec2::new(0.02, 0.02);
    /// Serve speed (per tick)
    pub const BALL_START_SPEED: f32 = 0.01;
    /// Speed after any paddle hit (per tick)
    pub const BALL_SPEED: f32 = 0.025;
    /// Maximum deflection off a paddle (60 degrees)
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

    /// Draw command slots available per frame
    pub const MAX_DRAW_COMMANDS: usize = 256;
    /// Sprite batches available per frame
    pub const MAX_BATCHES: usize = 32;
}

/// Sign with `sign(0) == 0`, unlike `f32::signum`
#[inline]
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(0.3), 1.0);
        assert_eq!(sign(-2.0), -1.0);
    }
}
