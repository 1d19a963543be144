//! Frame driver: tick → extract → batch
//!
//! Owns the simulation and the per-frame draw resources. The host feeds it
//! input flags and submits whatever [`Pong::frame`] returns.

use crate::consts::*;
use crate::error::PongError;
use crate::renderer::{BatchedFrame, DrawList, PongSprites, SpriteBatcher, TextureHandle, extract};
use crate::sim::{GameState, InputFlag, Player, tick};

/// One running game
pub struct Pong {
    state: GameState,
    sprites: PongSprites,
    draw_list: DrawList,
    batcher: SpriteBatcher,
}

impl Pong {
    /// Build a game, rejecting content that can't fit the frame budget
    pub fn new(white: TextureHandle, atlas: TextureHandle) -> Result<Self, PongError> {
        Self::with_capacity(white, atlas, MAX_DRAW_COMMANDS, MAX_BATCHES)
    }

    pub fn with_capacity(
        white: TextureHandle,
        atlas: TextureHandle,
        max_draw_commands: usize,
        max_batches: usize,
    ) -> Result<Self, PongError> {
        let sprites = PongSprites::new(atlas);

        if PongSprites::WORST_CASE_COMMANDS > max_draw_commands {
            return Err(PongError::CapacityExceeded {
                what: "draw command",
                capacity: max_draw_commands,
            });
        }
        if sprites.textures().len() > max_batches {
            return Err(PongError::CapacityExceeded {
                what: "sprite batch",
                capacity: max_batches,
            });
        }
        // Catch bad atlas layouts now rather than on the first frame
        sprites.atlas.uv_rect(PongSprites::PADDLE)?;
        sprites.atlas.uv_rect(PongSprites::BALL)?;

        log::info!(
            "Frame budget: {} of {} draw commands, {} of {} batches",
            PongSprites::WORST_CASE_COMMANDS,
            max_draw_commands,
            sprites.textures().len(),
            max_batches
        );

        Ok(Self {
            state: GameState::new(),
            sprites,
            draw_list: DrawList::new(max_draw_commands, white),
            batcher: SpriteBatcher::new(max_batches),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn set_input_flag(&mut self, flag: InputFlag, pressed: bool) {
        self.state.set_input_flag(flag, pressed);
    }

    /// Advance one tick and build the frame's batches
    pub fn frame(&mut self) -> Result<(BatchedFrame, Option<Player>), PongError> {
        let winner = tick(&mut self.state);
        let frame = self.present()?;
        Ok((frame, winner))
    }

    /// Build batches for the current state without ticking
    pub fn present(&mut self) -> Result<BatchedFrame, PongError> {
        if let Err(e) = extract(&self.state, &self.sprites, &mut self.draw_list) {
            self.draw_list.clear();
            return Err(e);
        }
        self.batcher.build(&mut self.draw_list)
    }
}
