//! Resource-level texture type.
//!
//! Wraps a device texture with the name it was registered under. Views
//! are not owned here: consumers (model and skybox components) create and
//! release their own views when their state is rebuilt.

use std::sync::Arc;
use crate::graphics_device::{Texture, TextureInfo};

pub struct TextureResource {
    name: String,
    texture: Arc<dyn Texture>,
}

impl TextureResource {
    pub fn new(name: impl Into<String>, texture: Arc<dyn Texture>) -> Self {
        Self { name: name.into(), texture }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    pub fn info(&self) -> &TextureInfo {
        self.texture.info()
    }

    pub fn is_cubemap(&self) -> bool {
        self.texture.info().cubemap
    }
}
