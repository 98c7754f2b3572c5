/*!
# Aurora 3D Engine

Backend-agnostic core of the Aurora 3D deferred renderer.

The crate turns a declarative render graph into compiled render passes,
keeps an arena-backed scene tree, and assembles per-frame camera, shadow,
light, and model data from it. GPU work goes through capability traits
implemented by a backend crate (see `aurora_3d_engine_renderer_vulkan`).

## Architecture

- **RenderGraphBuilder / RenderGraph**: subgraphs of passes and targets
  compiled into render pass descriptors, images, and framebuffers
- **Scene / SceneManager**: object tree with stable keys and lifecycle events
- **FrameAssembler**: one linear pass over the scene per frame
- **DeferredRenderer**: shadow maps, G-buffer fill, and composition
- **GraphicsDevice**: factory trait implemented by backends

Everything public is reached through the `aurora3d` namespace module.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod event;
pub mod utils;
pub mod graphics_device;
pub mod render_graph;
pub mod resource;
pub mod scene;
pub mod frame;
pub mod deferred;

// Main aurora3d namespace module
pub mod aurora3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Device factory trait
    pub use crate::graphics_device::GraphicsDevice;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    pub mod event {
        pub use crate::event::*;
    }

    pub mod utils {
        pub use crate::utils::*;
    }

    // Render sub-module with the device capability types
    pub mod render {
        pub use crate::graphics_device::*;
    }

    pub mod render_graph {
        pub use crate::render_graph::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod frame {
        pub use crate::frame::*;
    }

    pub mod deferred {
        pub use crate::deferred::*;
    }
}

// Re-export math library at crate root
pub use glam;
