use std::path::{Path, PathBuf};

use crate::foundation::core::PixelSize;
use crate::foundation::error::{StoryError, StoryResult};
use crate::post::model::ImageRef;

/// Reports pixel dimensions for an image reference without decoding pixels.
pub trait ImageProbe {
    /// Returns [`StoryError::MissingAsset`] when the image cannot be found or read.
    fn probe(&self, image: &ImageRef) -> StoryResult<PixelSize>;
}

/// Probe that reads image headers from files under `root`.
#[derive(Clone, Debug)]
pub struct FsImageProbe {
    root: PathBuf,
}

impl FsImageProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, image: &ImageRef) -> PathBuf {
        resolve_image_path(&self.root, image)
    }
}

pub fn resolve_image_path(root: &Path, image: &ImageRef) -> PathBuf {
    root.join(Path::new(image.as_str()))
}

impl ImageProbe for FsImageProbe {
    fn probe(&self, image: &ImageRef) -> StoryResult<PixelSize> {
        let path = self.resolve(image);
        if !path.is_file() {
            return Err(StoryError::missing_asset(format!(
                "image not found: '{}'",
                path.display()
            )));
        }
        let (width, height) = image::image_dimensions(&path).map_err(|e| {
            StoryError::missing_asset(format!("unreadable image '{}': {e}", path.display()))
        })?;
        if width == 0 || height == 0 {
            return Err(StoryError::missing_asset(format!(
                "image '{}' has zero size",
                path.display()
            )));
        }
        Ok(PixelSize { width, height })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/probe.rs"]
mod tests;
