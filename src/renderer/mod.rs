//! Sprite-batched rendering
//!
//! CPU side (`draw`, `atlas`, `batch`, `extract`) is GPU-free and produces a
//! [`BatchedFrame`]; `pipeline` submits it through WebGPU.

pub mod atlas;
pub mod batch;
pub mod draw;
pub mod extract;
pub mod pipeline;
pub mod texture;
pub mod vertex;

pub use atlas::{AtlasImage, PongSprites, SpriteAtlas, SpriteRegion};
pub use batch::{BatchedFrame, SpriteBatch, SpriteBatcher};
pub use draw::{DrawCommand, DrawList};
pub use extract::extract;
pub use pipeline::{SetupError, SpriteRenderState};
pub use texture::TextureHandle;
pub use vertex::SpriteInstance;
