/// Texture traits, pixel formats, and texture info

use std::any::Any;

/// Pixel format of images, textures, and attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // Color formats
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R16G16B16A16_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Depth/stencil formats
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
    D32_FLOAT_S8_UINT,
}

impl TextureFormat {
    /// Returns true for formats with a depth component
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM
                | TextureFormat::D32_FLOAT
                | TextureFormat::D24_UNORM_S8_UINT
                | TextureFormat::D32_FLOAT_S8_UINT
        )
    }

    /// Returns true for formats with a stencil component
    pub fn has_stencil(&self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT_S8_UINT)
    }

    /// Size of one texel in bytes
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::D16_UNORM => 2,
            TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::B8G8R8A8_SRGB
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::D32_FLOAT
            | TextureFormat::D24_UNORM_S8_UINT => 4,
            TextureFormat::R16G16B16A16_SFLOAT | TextureFormat::D32_FLOAT_S8_UINT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
        }
    }
}

/// Read-only properties of a loaded texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Number of array layers (6 for cubemaps)
    pub array_layers: u32,
    /// Whether the layers form a cubemap
    pub cubemap: bool,
}

/// Texture resource trait
///
/// Textures are uploaded by the resource loader and handed to the
/// `ResourceManager`; the core only creates views over them.
/// The texture is destroyed when the last reference is dropped.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;

    fn as_any(&self) -> &dyn Any;
}

/// Sampled view over a texture, created by `GraphicsDevice::create_texture_view`
pub trait TextureView: Send + Sync {
    /// Properties of the viewed texture
    fn info(&self) -> &TextureInfo;

    fn as_any(&self) -> &dyn Any;
}
