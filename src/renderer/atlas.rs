//! Grid texture atlas
//!
//! The atlas is addressed in whole cells: a sprite is a rectangle of
//! `num_cols × num_rows` cells starting at (`col`, `row`). UVs are derived by
//! dividing by the grid size, so the pixel resolution of a cell never matters
//! to the draw path.

use glam::Vec2;

use super::texture::TextureHandle;
use crate::error::PongError;

/// A sprite's cell rectangle inside the atlas grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRegion {
    pub col: u32,
    pub row: u32,
    pub num_cols: u32,
    pub num_rows: u32,
}

impl SpriteRegion {
    pub const fn new(col: u32, row: u32, num_cols: u32, num_rows: u32) -> Self {
        Self {
            col,
            row,
            num_cols,
            num_rows,
        }
    }
}

/// A texture split into a `width × height` grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAtlas {
    pub texture: TextureHandle,
    /// Grid columns
    pub width: u32,
    /// Grid rows
    pub height: u32,
    pub sprites: Vec<SpriteRegion>,
}

impl SpriteAtlas {
    pub fn new(
        texture: TextureHandle,
        width: u32,
        height: u32,
        sprites: Vec<SpriteRegion>,
    ) -> Self {
        Self {
            texture,
            width,
            height,
            sprites,
        }
    }

    /// UV offset and scale of sprite `index`
    pub fn uv_rect(&self, index: usize) -> Result<(Vec2, Vec2), PongError> {
        let region = self.sprites.get(index).ok_or_else(|| {
            PongError::InvariantViolation(format!(
                "sprite index {index} out of range ({} sprites)",
                self.sprites.len()
            ))
        })?;

        if region.num_cols == 0
            || region.num_rows == 0
            || region.col.checked_add(region.num_cols).is_none_or(|end| end > self.width)
            || region.row.checked_add(region.num_rows).is_none_or(|end| end > self.height)
        {
            return Err(PongError::InvariantViolation(format!(
                "sprite {index} {region:?} outside {}x{} atlas grid",
                self.width, self.height
            )));
        }

        let grid = Vec2::new(self.width as f32, self.height as f32);
        let offset = Vec2::new(region.col as f32, region.row as f32) / grid;
        let scale = Vec2::new(region.num_cols as f32, region.num_rows as f32) / grid;
        Ok((offset, scale))
    }
}

/// Layout of the built-in Pong atlas
#[derive(Debug, Clone, PartialEq)]
pub struct PongSprites {
    pub atlas: SpriteAtlas,
}

impl PongSprites {
    pub const GRID: u32 = 4;
    pub const PADDLE: usize = 0;
    pub const BALL: usize = 1;

    /// Walls + paddles + ball
    pub const WORST_CASE_COMMANDS: usize = 5;

    pub fn new(texture: TextureHandle) -> Self {
        Self {
            atlas: SpriteAtlas::new(
                texture,
                Self::GRID,
                Self::GRID,
                vec![SpriteRegion::new(0, 0, 1, 4), SpriteRegion::new(1, 0, 1, 1)],
            ),
        }
    }

    /// Every texture a frame can reference
    pub fn textures(&self) -> Vec<TextureHandle> {
        let mut textures = vec![TextureHandle::WHITE, self.atlas.texture];
        textures.sort();
        textures.dedup();
        textures
    }
}

/// CPU-side RGBA8 pixels for an atlas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl AtlasImage {
    /// Pixel size of one grid cell
    pub const CELL: u32 = 8;

    /// Procedurally drawn sprites matching [`PongSprites`]
    ///
    /// Sprites are grayscale; the instance color tints them.
    pub fn pong() -> Self {
        let size = PongSprites::GRID * Self::CELL;
        let mut image = Self {
            width: size,
            height: size,
            rgba: vec![0; (size * size * 4) as usize],
        };

        // Paddle: column 0, all rows, with a darker one-pixel bevel on every edge
        let bar_height = Self::CELL * PongSprites::GRID;
        for y in 0..bar_height {
            for x in 0..Self::CELL {
                let edge = x == 0 || x == Self::CELL - 1 || y == 0 || y == bar_height - 1;
                let shade = if edge { 190 } else { 255 };
                image.put(x, y, [shade, shade, shade, 255]);
            }
        }

        // Ball: disc in column 1, row 0
        let radius = Self::CELL as f32 / 2.0;
        for y in 0..Self::CELL {
            for x in 0..Self::CELL {
                let dx = x as f32 + 0.5 - radius;
                let dy = y as f32 + 0.5 - radius;
                if dx * dx + dy * dy <= radius * radius {
                    image.put(Self::CELL + x, y, [255, 255, 255, 255]);
                }
            }
        }

        image
    }

    fn put(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        let i = ((y * self.width + x) * 4) as usize;
        self.rgba[i..i + 4].copy_from_slice(&pixel);
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_rect_from_grid_cells() {
        let sprites = PongSprites::new(TextureHandle::new(1));
        let (offset, scale) = sprites.atlas.uv_rect(PongSprites::BALL).unwrap();
        assert_eq!(offset, Vec2::new(0.25, 0.0));
        assert_eq!(scale, Vec2::new(0.25, 0.25));

        let (offset, scale) = sprites.atlas.uv_rect(PongSprites::PADDLE).unwrap();
        assert_eq!(offset, Vec2::ZERO);
        assert_eq!(scale, Vec2::new(0.25, 1.0));
    }

    #[test]
    fn test_unknown_sprite_is_invariant_violation() {
        let sprites = PongSprites::new(TextureHandle::new(1));
        let err = sprites.atlas.uv_rect(7).unwrap_err();
        assert!(matches!(err, PongError::InvariantViolation(_)));
    }

    #[test]
    fn test_row_outside_grid_is_invariant_violation() {
        let atlas = SpriteAtlas::new(
            TextureHandle::new(1),
            4,
            2,
            vec![SpriteRegion::new(0, 1, 1, 2)],
        );
        assert!(matches!(
            atlas.uv_rect(0),
            Err(PongError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_huge_region_origin_is_invariant_violation() {
        for region in [
            SpriteRegion::new(u32::MAX, 0, 1, 1),
            SpriteRegion::new(0, u32::MAX, 1, 1),
        ] {
            let atlas = SpriteAtlas::new(TextureHandle::new(1), 4, 4, vec![region]);
            assert!(matches!(
                atlas.uv_rect(0),
                Err(PongError::InvariantViolation(_))
            ));
        }
    }

    #[test]
    fn test_textures_are_deduplicated() {
        let sprites = PongSprites::new(TextureHandle::WHITE);
        assert_eq!(sprites.textures(), vec![TextureHandle::WHITE]);
        let sprites = PongSprites::new(TextureHandle::new(2));
        assert_eq!(sprites.textures().len(), 2);
    }

    #[test]
    fn test_pong_atlas_pixels() {
        let image = AtlasImage::pong();
        assert_eq!(image.width, 32);
        assert_eq!(image.rgba.len(), 32 * 32 * 4);
        // Paddle interior and bevel
        assert_eq!(image.pixel(3, 10), [255, 255, 255, 255]);
        assert_eq!(image.pixel(0, 10), [190, 190, 190, 255]);
        assert_eq!(image.pixel(3, 0), [190, 190, 190, 255]);
        assert_eq!(image.pixel(3, 31), [190, 190, 190, 255]);
        // Ball center is opaque, ball cell corner is not
        assert_eq!(image.pixel(12, 4)[3], 255);
        assert_eq!(image.pixel(8, 0)[3], 0);
        // Unused cells stay transparent
        assert_eq!(image.pixel(20, 20)[3], 0);
    }
}
