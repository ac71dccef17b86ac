use thiserror::Error;

/// Errors raised by the generation passes.
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("sample ({x}, {y}) is outside the {width}x{height} source")]
    OutOfRange {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("no texture band covers height {height} at cell ({x}, {y})")]
    DegenerateSplat { x: usize, y: usize, height: f32 },

    #[error("no location within [{min}, {max}] found after {attempts} attempts")]
    ExhaustedAttempts { min: f32, max: f32, attempts: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, TerrainError>;

impl TerrainError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
