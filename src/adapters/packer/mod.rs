//! Asset packing
//!
//! An [`AssetPacker`] writes one article, plus whatever its content references,
//! into a container folder.

pub mod html;

pub use html::HtmlAssetPacker;

use crate::core::export::archive::ContainerFolder;
use crate::domain::Result;
use async_trait::async_trait;

/// Embeds an article and its referenced assets into a folder
#[async_trait]
pub trait AssetPacker: Send + Sync {
    /// Pack `content` into `folder`, naming the main file after `base_name`
    ///
    /// # Errors
    ///
    /// Returns a `Pack` error if the content or any of its assets cannot be
    /// embedded.
    async fn pack(&self, content: &str, base_name: &str, folder: &mut ContainerFolder)
        -> Result<()>;
}
