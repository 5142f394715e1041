use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;

use crate::foundation::error::{StoryError, StoryResult};

/// Reference to an image file, relative to the assets root.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(source: &str) -> StoryResult<Self> {
        normalize_rel_path(source).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ImageRef {
    type Error = StoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One input record; each post becomes exactly one page.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Post {
    pub title: String,
    /// HTML body; may be empty.
    #[serde(default)]
    pub body: String,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub pictures: Vec<ImageRef>,
    #[serde(default)]
    pub qr_code: Option<ImageRef>,
}

impl Post {
    /// Date line as printed under the body, e.g. `January 24, 2025`.
    pub fn date_label(&self) -> String {
        self.created_at.format("%B %-d, %Y").to_string()
    }

    /// Images considered for layout; anything past `max_images` is ignored.
    pub fn layout_pictures(&self, max_images: usize) -> &[ImageRef] {
        let n = self.pictures.len().min(max_images);
        &self.pictures[..n]
    }
}

pub fn posts_from_json_str(s: &str) -> StoryResult<Vec<Post>> {
    Ok(serde_json::from_str(s)?)
}

pub fn load_posts(path: impl AsRef<Path>) -> StoryResult<Vec<Post>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read posts '{}'", path.display()))?;
    posts_from_json_str(&text)
}

/// Normalize and validate asset paths relative to the assets root.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> StoryResult<String> {
    let s = source.trim().replace('\\', "/");
    if s.starts_with('/') {
        return Err(StoryError::validation("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(StoryError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StoryError::validation("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StoryError::validation(
            "image path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/post/model.rs"]
mod tests;
