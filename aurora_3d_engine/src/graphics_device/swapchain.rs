/// Swapchain trait - presentation images as seen by the render graph
///
/// Creation, acquisition, and presentation stay with the host; the render
/// graph only needs the current extent and format and the per-index views.

use std::sync::Arc;
use crate::graphics_device::{Extent2D, ImageView, TextureFormat};

pub trait Swapchain: Send + Sync {
    /// Get the number of images in the swapchain
    fn image_count(&self) -> usize;

    /// Current extent of the swapchain images
    fn extent(&self) -> Extent2D;

    /// Get the pixel format of the swapchain images
    fn format(&self) -> TextureFormat;

    /// Presentable view for an image index, None if out of range
    fn image_view(&self, index: u32) -> Option<Arc<dyn ImageView>>;
}
