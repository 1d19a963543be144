//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One fixed tick per frame, no variable `dt`
//! - Input arrives only through [`GameState::set_input_flag`]
//! - No rendering or platform dependencies

pub mod aabb;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use state::{GameState, InputFlag, InputFlags, Player, Score};
pub use tick::tick;
