//! Per-frame draw command accumulator

use glam::{Vec2, Vec4};

use super::atlas::SpriteAtlas;
use super::texture::TextureHandle;
use super::vertex::SpriteInstance;
use crate::error::PongError;
use crate::sim::Aabb;

/// One textured quad request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub position_offset: Vec2,
    /// Half-extent of the quad
    pub position_scale: Vec2,
    pub uv_offset: Vec2,
    pub uv_scale: Vec2,
    pub color: Vec4,
    pub texture: TextureHandle,
}

impl DrawCommand {
    pub fn to_instance(&self) -> SpriteInstance {
        SpriteInstance {
            position_offset: self.position_offset.to_array(),
            position_scale: self.position_scale.to_array(),
            uv_offset: self.uv_offset.to_array(),
            uv_scale: self.uv_scale.to_array(),
            color: self.color.to_array(),
        }
    }
}

/// Fixed-capacity list of draw commands for one frame
///
/// Overflowing the capacity is a content-budget bug, reported as
/// [`PongError::CapacityExceeded`].
#[derive(Debug, Clone)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    capacity: usize,
    white: TextureHandle,
}

impl DrawList {
    pub fn new(capacity: usize, white: TextureHandle) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
            capacity,
            white,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Hand the accumulated commands to the batcher, leaving the list empty
    pub(crate) fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::replace(&mut self.commands, Vec::with_capacity(self.capacity))
    }

    pub fn push(&mut self, command: DrawCommand) -> Result<(), PongError> {
        if self.commands.len() >= self.capacity {
            return Err(PongError::CapacityExceeded {
                what: "draw command",
                capacity: self.capacity,
            });
        }
        self.commands.push(command);
        Ok(())
    }

    /// Solid-colored box using the white texture
    pub fn draw_aabb(&mut self, aabb: &Aabb, color: [f32; 4]) -> Result<(), PongError> {
        self.push(DrawCommand {
            position_offset: aabb.center,
            position_scale: aabb.extent,
            uv_offset: Vec2::ZERO,
            uv_scale: Vec2::ONE,
            color: Vec4::from_array(color),
            texture: self.white,
        })
    }

    /// Atlas sprite stretched over a box
    pub fn draw_sprite(
        &mut self,
        atlas: &SpriteAtlas,
        index: usize,
        aabb: &Aabb,
        color: [f32; 4],
    ) -> Result<(), PongError> {
        let (uv_offset, uv_scale) = atlas.uv_rect(index)?;
        self.push(DrawCommand {
            position_offset: aabb.center,
            position_scale: aabb.extent,
            uv_offset,
            uv_scale,
            color: Vec4::from_array(color),
            texture: atlas.texture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::atlas::PongSprites;

    fn unit_box() -> Aabb {
        Aabb::new(Vec2::new(0.5, -0.25), Vec2::new(0.1, 0.2))
    }

    #[test]
    fn test_draw_aabb_uses_white_texture() {
        let mut list = DrawList::new(4, TextureHandle::WHITE);
        list.draw_aabb(&unit_box(), [1.0, 0.0, 0.0, 1.0]).unwrap();

        let cmd = list.commands()[0];
        assert_eq!(cmd.texture, TextureHandle::WHITE);
        assert_eq!(cmd.position_offset, Vec2::new(0.5, -0.25));
        assert_eq!(cmd.position_scale, Vec2::new(0.1, 0.2));
        assert_eq!(cmd.uv_scale, Vec2::ONE);
        assert_eq!(cmd.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_draw_sprite_uses_atlas_uvs() {
        let sprites = PongSprites::new(TextureHandle::new(1));
        let mut list = DrawList::new(4, TextureHandle::WHITE);
        list.draw_sprite(&sprites.atlas, PongSprites::BALL, &unit_box(), [1.0; 4])
            .unwrap();

        let cmd = list.commands()[0];
        assert_eq!(cmd.texture, TextureHandle::new(1));
        assert_eq!(cmd.uv_offset, Vec2::new(0.25, 0.0));
        assert_eq!(cmd.uv_scale, Vec2::new(0.25, 0.25));
    }

    #[test]
    fn test_bad_sprite_index_is_not_appended() {
        let sprites = PongSprites::new(TextureHandle::new(1));
        let mut list = DrawList::new(4, TextureHandle::WHITE);
        let err = list
            .draw_sprite(&sprites.atlas, 9, &unit_box(), [1.0; 4])
            .unwrap_err();
        assert!(matches!(err, PongError::InvariantViolation(_)));
        assert!(list.is_empty());
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut list = DrawList::new(2, TextureHandle::WHITE);
        list.draw_aabb(&unit_box(), [1.0; 4]).unwrap();
        list.draw_aabb(&unit_box(), [1.0; 4]).unwrap();
        let err = list.draw_aabb(&unit_box(), [1.0; 4]).unwrap_err();
        assert_eq!(
            err,
            PongError::CapacityExceeded {
                what: "draw command",
                capacity: 2
            }
        );
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_take_empties_list() {
        let mut list = DrawList::new(2, TextureHandle::WHITE);
        list.draw_aabb(&unit_box(), [1.0; 4]).unwrap();
        let taken = list.take();
        assert_eq!(taken.len(), 1);
        assert!(list.is_empty());
        assert_eq!(list.capacity(), 2);
    }
}
