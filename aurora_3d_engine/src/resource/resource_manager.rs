/// Central resource manager for the engine.
///
/// Stores meshes and textures in slot maps. Components refer to them by
/// key; a key whose resource was removed resolves to nothing instead of
/// dangling. Textures additionally fall back to a default texture so a
/// model with an unset or stale texture still renders.

use std::sync::Arc;
use slotmap::{SlotMap, new_key_type};
use crate::error::Result;
use crate::engine_debug;
use crate::graphics_device::{GraphicsDevice, Texture};
use crate::resource::{Mesh, MeshDesc, TextureResource};

// ===== SLOT MAP KEYS =====

new_key_type! {
    /// Stable key for a Mesh in the ResourceManager
    pub struct MeshKey;

    /// Stable key for a TextureResource in the ResourceManager
    pub struct TextureKey;
}

#[derive(Default)]
pub struct ResourceManager {
    meshes: SlotMap<MeshKey, Mesh>,
    textures: SlotMap<TextureKey, TextureResource>,
    default_texture: Option<TextureKey>,
}

impl ResourceManager {
    /// Create a new empty resource manager
    pub fn new() -> Self {
        Self::default()
    }

    // ===== MESHES =====

    /// Upload a mesh and register it
    pub fn create_mesh(&mut self, device: &dyn GraphicsDevice, desc: MeshDesc) -> Result<MeshKey> {
        let mesh = Mesh::from_desc(device, desc)?;
        engine_debug!("aurora3d::ResourceManager", "Created mesh '{}' ({} indices)",
            mesh.name(), mesh.index_count());
        Ok(self.meshes.insert(mesh))
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshKey {
        self.meshes.insert(mesh)
    }

    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    pub fn remove_mesh(&mut self, key: MeshKey) -> Option<Mesh> {
        self.meshes.remove(key)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    // ===== TEXTURES =====

    pub fn add_texture(&mut self, name: impl Into<String>, texture: Arc<dyn Texture>) -> TextureKey {
        self.textures.insert(TextureResource::new(name, texture))
    }

    pub fn texture(&self, key: TextureKey) -> Option<&TextureResource> {
        self.textures.get(key)
    }

    /// Remove a texture; removing the default texture unsets the default
    pub fn remove_texture(&mut self, key: TextureKey) -> Option<TextureResource> {
        if self.default_texture == Some(key) {
            self.default_texture = None;
        }
        self.textures.remove(key)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Texture used wherever a texture is unset or no longer exists
    ///
    /// Returns false (and keeps the previous default) if `key` is stale.
    pub fn set_default_texture(&mut self, key: TextureKey) -> bool {
        if !self.textures.contains_key(key) {
            return false;
        }
        self.default_texture = Some(key);
        true
    }

    pub fn default_texture(&self) -> Option<TextureKey> {
        self.default_texture
    }

    /// Resolve an optional texture reference, falling back to the default
    ///
    /// Returns `None` only when neither the texture nor a default exists.
    pub fn resolve_texture(&self, key: Option<TextureKey>) -> Option<&TextureResource> {
        key.and_then(|key| self.textures.get(key))
            .or_else(|| self.default_texture.and_then(|key| self.textures.get(key)))
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
