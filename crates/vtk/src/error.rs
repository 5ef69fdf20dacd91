//! Result and Error types for gridkit-vtk

/// Type alias for `Result<T, vtk::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `gridkit-vtk` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Array(#[from] gridkit_array::Error),

    #[error("failed input/output stream")]
    Io(#[from] std::io::Error),

    #[error("failed to write vtk file")]
    Vtkio(#[from] vtkio::Error),

    #[error("structured points need one to three dimensions, found {0}")]
    InvalidRank(usize),

    #[error("invalid vtk options: {0}")]
    InvalidOptions(String),
}
