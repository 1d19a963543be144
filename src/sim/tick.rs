//! Fixed timestep simulation tick
//!
//! One call advances the court by exactly one frame. Velocities are per-tick
//! displacements, so there is no `dt`.

use super::state::{GameState, Player};
use crate::consts::*;
use crate::sign;

/// Advance the game state by one tick
///
/// Returns the winner of the round if the ball left the court this tick.
pub fn tick(state: &mut GameState) -> Option<Player> {
    state.time_ticks += 1;

    // Paddle control (level-triggered, flags are never cleared here)
    let input = state.input;
    for flag in input.iter() {
        let paddle = &mut state.paddles[flag.player().index()];
        paddle.center.y += flag.direction() * PADDLE_SPEED;
    }

    for paddle in &mut state.paddles {
        let (lo, hi) = GameState::paddle_y_range(paddle);
        paddle.center.y = paddle.center.y.clamp(lo, hi);
    }

    state.ball.center += state.ball_velocity;

    // No positional correction: the ball may overlap a wall for a frame
    for wall in &state.walls {
        if state.ball.intersects(wall) {
            state.ball_velocity.y = -state.ball_velocity.y;
        }
    }

    for paddle in &state.paddles {
        if state.ball.intersects(paddle) {
            let relative_y = paddle.center.y - state.ball.center.y;
            let normalized_y = relative_y / paddle.extent.y;
            let bounce_angle = normalized_y * MAX_BOUNCE_ANGLE;
            // Side of the court decides the direction, not the paddle index
            let bounce_sign = -sign(state.ball.center.x);
            state.ball_velocity = glam::Vec2::new(
                bounce_sign * bounce_angle.cos(),
                -bounce_angle.sin(),
            ) * BALL_SPEED;
        }
    }

    let left_won = state.ball.center.x > COURT_HALF_EXTENT;
    let right_won = state.ball.center.x < -COURT_HALF_EXTENT;
    if left_won || right_won {
        let winner = if left_won { Player::Left } else { Player::Right };
        state.spawn_ball(if left_won { 1.0 } else { -1.0 });
        state.score.record(winner);
        log::info!(
            "{:?} scores at tick {} ({} - {})",
            winner,
            state.time_ticks,
            state.score.left,
            state.score.right
        );
        return Some(winner);
    }

    None
}
