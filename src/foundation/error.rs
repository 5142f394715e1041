pub type StoryResult<T> = Result<T, StoryError>;

#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("missing asset: {0}")]
    MissingAsset(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_asset(msg: impl Into<String>) -> Self {
        Self::MissingAsset(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Missing assets degrade a page instead of aborting the run.
    pub fn is_missing_asset(&self) -> bool {
        matches!(self, Self::MissingAsset(_))
    }
}

impl From<serde_json::Error> for StoryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
