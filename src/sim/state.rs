//! Game state and core simulation types
//!
//! Everything the tick reads or writes lives in [`GameState`]. The renderer
//! only ever borrows it immutably.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::consts::*;

/// Player / paddle index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Left = 0,
    Right = 1,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::Left, Player::Right];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One held-key input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputFlag {
    LeftUp,
    LeftDown,
    RightUp,
    RightDown,
}

impl InputFlag {
    pub const ALL: [InputFlag; 4] = [
        InputFlag::LeftUp,
        InputFlag::LeftDown,
        InputFlag::RightUp,
        InputFlag::RightDown,
    ];

    /// Map a DOM `KeyboardEvent.key` value to a flag
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" | "W" => Some(InputFlag::LeftUp),
            "s" | "S" => Some(InputFlag::LeftDown),
            "ArrowUp" => Some(InputFlag::RightUp),
            "ArrowDown" => Some(InputFlag::RightDown),
            _ => None,
        }
    }

    /// Paddle this flag drives
    pub fn player(self) -> Player {
        match self {
            InputFlag::LeftUp | InputFlag::LeftDown => Player::Left,
            InputFlag::RightUp | InputFlag::RightDown => Player::Right,
        }
    }

    /// Vertical direction (+1 = up)
    pub fn direction(self) -> f32 {
        match self {
            InputFlag::LeftUp | InputFlag::RightUp => 1.0,
            InputFlag::LeftDown | InputFlag::RightDown => -1.0,
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of currently held inputs
///
/// Level-triggered: the tick reads these every frame and never clears them,
/// so a held key keeps moving its paddle until released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFlags(u8);

impl InputFlags {
    pub fn set(&mut self, flag: InputFlag, pressed: bool) {
        if pressed {
            self.0 |= flag.bit();
        } else {
            self.0 &= !flag.bit();
        }
    }

    #[inline]
    pub fn contains(&self, flag: InputFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Held flags in declaration order
    pub fn iter(&self) -> impl Iterator<Item = InputFlag> + '_ {
        InputFlag::ALL
            .into_iter()
            .filter(move |f| self.contains(*f))
    }
}

/// Rounds won this session (memory only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn record(&mut self, winner: Player) {
        match winner {
            Player::Left => self.left += 1,
            Player::Right => self.right += 1,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Top and bottom walls (fixed after init)
    pub walls: [Aabb; 2],
    /// Paddles indexed by [`Player`]
    pub paddles: [Aabb; 2],
    pub ball: Aabb,
    /// Per-tick displacement
    pub ball_velocity: Vec2,
    /// Held inputs, written by the event boundary
    pub input: InputFlags,
    pub score: Score,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Fresh court with the first serve heading right
    pub fn new() -> Self {
        let wall_extent = Vec2::new(COURT_HALF_EXTENT, WALL_THICKNESS / 2.0);
        let wall_y = COURT_HALF_EXTENT - WALL_THICKNESS / 2.0;
        let paddle_x = COURT_HALF_EXTENT - PADDLE_X_OFFSET;

        let mut state = Self {
            walls: [
                Aabb::new(Vec2::new(0.0, wall_y), wall_extent),
                Aabb::new(Vec2::new(0.0, -wall_y), wall_extent),
            ],
            paddles: [
                Aabb::new(Vec2::new(-paddle_x, 0.0), PADDLE_EXTENT),
                Aabb::new(Vec2::new(paddle_x, 0.0), PADDLE_EXTENT),
            ],
            ball: Aabb::new(Vec2::ZERO, BALL_EXTENT),
            ball_velocity: Vec2::ZERO,
            input: InputFlags::default(),
            score: Score::default(),
            time_ticks: 0,
        };
        state.spawn_ball(1.0);
        state
    }

    /// Reset the ball to the court center, serving toward `direction` (+1 right, -1 left)
    pub fn spawn_ball(&mut self, direction: f32) {
        self.ball = Aabb::new(Vec2::ZERO, BALL_EXTENT);
        self.ball_velocity = Vec2::new(direction * BALL_START_SPEED, 0.0);
    }

    pub fn set_input_flag(&mut self, flag: InputFlag, pressed: bool) {
        self.input.set(flag, pressed);
    }

    #[inline]
    pub fn paddle(&self, player: Player) -> &Aabb {
        &self.paddles[player.index()]
    }

    /// Allowed range for a paddle center so it never overlaps a wall
    pub fn paddle_y_range(paddle: &Aabb) -> (f32, f32) {
        let limit = COURT_HALF_EXTENT - paddle.extent.y - WALL_THICKNESS;
        (-limit, limit)
    }
}
