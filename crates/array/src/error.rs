//! Result and Error types for gridkit-array

use std::path::PathBuf;

/// Type alias for `Result<T, array::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `gridkit-array` crate
///
/// Every variant renders to a fixed message so that long running callers can
/// report a failed file and move on to the next one. Any context is kept in
/// the variant fields rather than in the message.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The container could not be opened
    #[error("error opening array container")]
    OpenFailed(PathBuf),

    /// No dataset name was given and the container holds no datasets
    #[error("couldn't find data set in array container")]
    DatasetNotFound,

    /// An explicitly named dataset is missing or could not be opened
    #[error("error opening data set in array container")]
    DatasetOpenFailed(String),

    /// A positive rank was required
    #[error("non-positive rank in array container")]
    InvalidRank(usize),

    /// A slice directive axis or index is out of bounds
    #[error("invalid slice of array data")]
    InvalidSlice { axis: usize, index: i64 },

    /// Data transfer failed after a successful open
    #[error("error reading data from array container")]
    ReadFailed(String),

    /// Data transfer of a hyperslab failed after a successful open
    #[error("error reading data slice from array container")]
    SliceReadFailed(String),

    /// Two arrays expected to share a shape do not
    #[error("arrays are not conformant")]
    NotConformant {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// A range was requested on an array with no elements
    #[error("no elements in array")]
    EmptyArray,

    /// Allocation of an array buffer failed
    #[error("out of memory")]
    OutOfMemory,

    /// Writing a dataset to a container failed
    #[error("error writing data to array container")]
    WriteFailed(String),

    /// Underlying file I/O error
    #[error("failed input/output stream")]
    Io(#[from] std::io::Error),

    /// Text input could not be interpreted as numeric data
    #[error("parser failed")]
    ParseError(String),
}
