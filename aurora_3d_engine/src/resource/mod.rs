//! Resource management module
//!
//! Provides centralized storage and access to engine resources.

mod resource_manager;
pub mod texture;
pub mod mesh;

pub use resource_manager::{ResourceManager, MeshKey, TextureKey};
pub use texture::TextureResource;
pub use mesh::{Mesh, MeshDesc, IndexData};
