//! Game state → draw commands

use super::atlas::PongSprites;
use super::draw::DrawList;
use super::vertex::colors;
use crate::error::PongError;
use crate::sim::{GameState, Player};

/// Push the frame's draw commands for `state`
///
/// Pure function of the state: calling it twice without a tick in between
/// produces identical command sequences.
pub fn extract(
    state: &GameState,
    sprites: &PongSprites,
    list: &mut DrawList,
) -> Result<(), PongError> {
    for wall in &state.walls {
        list.draw_aabb(wall, colors::WALL)?;
    }

    for player in Player::ALL {
        let color = match player {
            Player::Left => colors::PADDLE_LEFT,
            Player::Right => colors::PADDLE_RIGHT,
        };
        list.draw_sprite(
            &sprites.atlas,
            PongSprites::PADDLE,
            state.paddle(player),
            color,
        )?;
    }

    list.draw_sprite(&sprites.atlas, PongSprites::BALL, &state.ball, colors::BALL)
}
