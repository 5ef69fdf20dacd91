//! Result and Error types for gridkit-raster

/// Type alias for `Result<T, raster::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `gridkit-raster` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Array(#[from] gridkit_array::Error),

    #[error("failed input/output stream")]
    Io(#[from] std::io::Error),

    #[error("png encoding failed")]
    Png(#[from] png::EncodingError),

    #[error("invalid colormap: {0}")]
    InvalidColormap(String),

    #[error("rasters need at most two dimensions, found {0}")]
    InvalidRasterRank(usize),

    #[error("invalid raster options: {0}")]
    InvalidOptions(String),
}
