//! Sprite batching: sort draw commands by texture and group them
//!
//! Each frame the accumulated [`DrawCommand`]s are stable-sorted by
//! [`TextureHandle`] and scanned once. Every maximal run of one texture
//! becomes a [`SpriteBatch`], which the GPU boundary submits as a single
//! instanced draw. Within a run commands keep their insertion order.

use super::draw::DrawList;
use super::texture::TextureHandle;
use super::vertex::SpriteInstance;
use crate::consts::MAX_BATCHES;
use crate::error::PongError;

/// A contiguous range of instances sharing one texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteBatch {
    pub instance_offset: u32,
    pub instance_count: u32,
    pub texture: TextureHandle,
}

impl SpriteBatch {
    /// Instance range for `draw_indexed`
    pub fn instances(&self) -> std::ops::Range<u32> {
        self.instance_offset..self.instance_offset + self.instance_count
    }
}

/// Everything the GPU boundary needs for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchedFrame {
    /// Instance data in batch order
    pub instances: Vec<SpriteInstance>,
    pub batches: Vec<SpriteBatch>,
}

/// Groups a frame's draw commands into texture batches
#[derive(Debug, Clone)]
pub struct SpriteBatcher {
    max_batches: usize,
}

impl Default for SpriteBatcher {
    fn default() -> Self {
        Self::new(MAX_BATCHES)
    }
}

impl SpriteBatcher {
    pub fn new(max_batches: usize) -> Self {
        Self { max_batches }
    }

    pub fn max_batches(&self) -> usize {
        self.max_batches
    }

    /// Drain `list` and build the frame's batches
    ///
    /// The list is empty afterwards even when the batch budget is exceeded.
    pub fn build(&self, list: &mut DrawList) -> Result<BatchedFrame, PongError> {
        let mut commands = list.take();
        // Vec::sort_by_key is stable, so equal textures keep insertion order
        commands.sort_by_key(|c| c.texture);

        let mut batches: Vec<SpriteBatch> = Vec::new();
        for (i, command) in commands.iter().enumerate() {
            match batches.last_mut() {
                Some(batch) if batch.texture == command.texture => batch.instance_count += 1,
                _ => {
                    if batches.len() == self.max_batches {
                        return Err(PongError::CapacityExceeded {
                            what: "sprite batch",
                            capacity: self.max_batches,
                        });
                    }
                    batches.push(SpriteBatch {
                        instance_offset: i as u32,
                        instance_count: 1,
                        texture: command.texture,
                    });
                }
            }
        }

        let instances = commands.iter().map(|c| c.to_instance()).collect();
        Ok(BatchedFrame { instances, batches })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::draw::DrawCommand;
    use glam::{Vec2, Vec4};
    use proptest::prelude::*;

    fn command(texture: u32, tag: f32) -> DrawCommand {
        DrawCommand {
            position_offset: Vec2::new(tag, 0.0),
            position_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            uv_scale: Vec2::ONE,
            color: Vec4::ONE,
            texture: TextureHandle::new(texture),
        }
    }

    fn list_of(textures: &[u32]) -> DrawList {
        let mut list = DrawList::new(64, TextureHandle::WHITE);
        for (i, &t) in textures.iter().enumerate() {
            list.push(command(t, i as f32)).unwrap();
        }
        list
    }

    #[test]
    fn test_interleaved_textures_make_two_batches() {
        // A = 2, B = 1 in insertion order [A, B, A]
        let mut list = list_of(&[2, 1, 2]);
        let frame = SpriteBatcher::default().build(&mut list).unwrap();

        assert_eq!(
            frame.batches,
            vec![
                SpriteBatch {
                    instance_offset: 0,
                    instance_count: 1,
                    texture: TextureHandle::new(1)
                },
                SpriteBatch {
                    instance_offset: 1,
                    instance_count: 2,
                    texture: TextureHandle::new(2)
                },
            ]
        );
        // B's command first, then both A's in insertion order
        let tags: Vec<f32> = frame.instances.iter().map(|i| i.position_offset[0]).collect();
        assert_eq!(tags, vec![1.0, 0.0, 2.0]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_empty_list_gives_no_batches() {
        let mut list = list_of(&[]);
        let frame = SpriteBatcher::default().build(&mut list).unwrap();
        assert!(frame.batches.is_empty());
        assert!(frame.instances.is_empty());
    }

    #[test]
    fn test_single_texture_single_batch() {
        let mut list = list_of(&[4, 4, 4, 4]);
        let frame = SpriteBatcher::default().build(&mut list).unwrap();
        assert_eq!(frame.batches.len(), 1);
        assert_eq!(frame.batches[0].instances(), 0..4);
    }

    #[test]
    fn test_batch_budget_exceeded() {
        let mut list = list_of(&[0, 1, 2]);
        let err = SpriteBatcher::new(2).build(&mut list).unwrap_err();
        assert_eq!(
            err,
            PongError::CapacityExceeded {
                what: "sprite batch",
                capacity: 2
            }
        );
        assert!(list.is_empty());
    }

    #[test]
    fn test_budget_counts_batches_not_commands() {
        let mut list = list_of(&[0, 1, 0, 1, 0, 1]);
        let frame = SpriteBatcher::new(2).build(&mut list).unwrap();
        assert_eq!(frame.batches.len(), 2);
        assert_eq!(frame.instances.len(), 6);
    }

    proptest! {
        #[test]
        fn prop_batches_partition_commands(textures in proptest::collection::vec(0u32..6, 0..48)) {
            let mut list = list_of(&textures);
            let frame = SpriteBatcher::new(MAX_BATCHES).build(&mut list).unwrap();

            let mut distinct = textures.clone();
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(frame.batches.len(), distinct.len());

            let mut next = 0u32;
            for (batch, &texture) in frame.batches.iter().zip(&distinct) {
                prop_assert_eq!(batch.texture, TextureHandle::new(texture));
                prop_assert_eq!(batch.instance_offset, next);
                let expected = textures.iter().filter(|&&t| t == texture).count() as u32;
                prop_assert_eq!(batch.instance_count, expected);

                // Stable: tags (insertion indices) ascend within a batch
                let range = batch.instances();
                let tags: Vec<f32> = frame.instances[range.start as usize..range.end as usize]
                    .iter()
                    .map(|i| i.position_offset[0])
                    .collect();
                prop_assert!(tags.windows(2).all(|w| w[0] < w[1]));
                next += batch.instance_count;
            }
            prop_assert_eq!(next as usize, textures.len());
        }
    }
}
