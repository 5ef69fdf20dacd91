//! Array containers and the read/write entry points
//!
//! A container is anything holding named datasets of doubles. The traits here
//! are the only interface the slice extractor needs, so new storage formats
//! can be plugged in without touching the extraction logic.
//!
//! Two implementations are provided:
//!
//! - [NpzFile] for numpy `.npz` archives on disk
//! - [MemoryContainer] for arrays already in memory
//!
//! The free functions [read()], [read_shape()] and [write()] cover the common
//! case of working with `.npz` files directly.

mod header;
mod memory;
mod npz;

// standard library
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::slice::{Hyperslab, SliceDirectives};
use crate::Array;

// external crates
use log::debug;

#[doc(inline)]
pub use memory::MemoryContainer;

#[doc(inline)]
pub use npz::NpzFile;

/// Read access to the datasets of a container
pub trait ContainerRead {
    /// Dataset names in container order
    fn dataset_names(&mut self) -> Result<Vec<String>>;

    /// Extents of a dataset, without reading any data
    fn shape(&mut self, name: &str) -> Result<Vec<usize>>;

    /// Read a hyperslab of a dataset as doubles in row-major order
    fn read_hyperslab(&mut self, name: &str, slab: &Hyperslab) -> Result<Vec<f64>>;

    /// Resolve the dataset to work on
    ///
    /// An explicit name must exist in the container, otherwise the first
    /// dataset in container order is used.
    fn locate_dataset(&mut self, name: Option<&str>) -> Result<String> {
        let names = self.dataset_names()?;
        match name {
            Some(name) if names.iter().any(|n| n == name) => Ok(name.to_string()),
            Some(name) => Err(Error::DatasetOpenFailed(name.to_string())),
            None => names.into_iter().next().ok_or(Error::DatasetNotFound),
        }
    }
}

/// Write access to the datasets of a container
pub trait ContainerWrite {
    /// Remove a dataset if present, returning whether anything was removed
    fn delete_dataset(&mut self, name: &str) -> Result<bool>;

    /// Store a row-major buffer of doubles under `name`
    ///
    /// Any existing dataset of the same name is replaced.
    fn write_dataset(&mut self, name: &str, dims: &[usize], data: &[f64]) -> Result<()>;

    /// Make all pending changes durable
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Extract an array from any container
///
/// The dataset is located by name (or the first found if `None`), the slice
/// directives are resolved against its shape, and only the selected
/// hyperslab is read. No partial array is ever returned on failure.
///
/// ```rust
/// # use gridkit_array::{extract, Array, MemoryContainer, SliceDirectives};
/// let mut container = MemoryContainer::new();
/// let array = Array::from_vec(vec![2, 3], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// container.insert("density", array);
///
/// let row = extract(&mut container, None, &SliceDirectives::new().x(1)).unwrap();
/// assert_eq!(row.dims(), &[3]);
/// assert_eq!(row.data(), &[3.0, 4.0, 5.0]);
/// ```
pub fn extract<C: ContainerRead + ?Sized>(
    container: &mut C,
    name: Option<&str>,
    directives: &SliceDirectives,
) -> Result<Array> {
    let name = container.locate_dataset(name)?;
    let dims = container.shape(&name)?;
    debug!("Located dataset \"{name}\" with {} axes", dims.len());

    let slab = directives.select(&dims)?;
    let data = container.read_hyperslab(&name, &slab)?;

    Array::from_vec(slab.output_dims, data)
}

/// Read an array from an `.npz` file
///
/// Convenience for [NpzFile::open()] followed by [extract()].
pub fn read<P: AsRef<Path>>(
    path: P,
    name: Option<&str>,
    directives: &SliceDirectives,
) -> Result<Array> {
    let mut file = NpzFile::open(path)?;
    extract(&mut file, name, directives)
}

/// Extents of a dataset in an `.npz` file without reading its data
pub fn read_shape<P: AsRef<Path>>(path: P, name: Option<&str>) -> Result<Vec<usize>> {
    let mut file = NpzFile::open(path)?;
    let name = file.locate_dataset(name)?;
    let dims = file.shape(&name)?;
    if dims.is_empty() {
        return Err(Error::InvalidRank(0));
    }
    Ok(dims)
}

/// Rank of a dataset in an `.npz` file without reading its data
pub fn read_rank<P: AsRef<Path>>(path: P, name: Option<&str>) -> Result<usize> {
    Ok(read_shape(path, name)?.len())
}

/// Write an array to an `.npz` file
///
/// With `append` set an existing file keeps its other datasets, and a dataset
/// with the same name is replaced. Otherwise the file is created fresh.
pub fn write<P: AsRef<Path>>(array: &Array, path: P, name: &str, append: bool) -> Result<()> {
    let mut file = NpzFile::create(path, append)?;
    file.write_dataset(name, array.dims(), array.data())?;
    file.flush()
}
