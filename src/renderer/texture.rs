//! Texture handles and GPU texture uploads

use serde::{Deserialize, Serialize};

/// Opaque texture identity
///
/// Ordered by creation id; the batcher relies on this order to group
/// commands. Handle 0 is always the 1×1 white texture.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Plain white texel used by untextured quads
    pub const WHITE: TextureHandle = TextureHandle(0);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn id(self) -> u32 {
        self.0
    }
}

/// An uploaded RGBA8 texture and its bind group
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub size: (u32, u32),
}

impl GpuTexture {
    /// Upload tightly packed RGBA8 pixels
    #[allow(clippy::too_many_arguments)]
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            texture,
            view,
            bind_group,
            size: (width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_order_by_id() {
        let a = TextureHandle::new(3);
        let b = TextureHandle::new(1);
        assert!(b < a);
        assert!(TextureHandle::WHITE < b);
        assert_eq!(TextureHandle::default(), TextureHandle::WHITE);
    }
}
