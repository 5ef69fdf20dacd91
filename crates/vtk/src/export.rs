//! Converting arrays into VTK structured points
//!
//! [ArrayToVtk] holds the export options and does the conversion, with
//! [ArrayToVtkBuilder] for chained configuration. Writing is left to
//! [write_vtk()].

mod builder;
mod convert;

#[doc(inline)]
pub use builder::ArrayToVtkBuilder;

#[doc(inline)]
pub use convert::ArrayToVtk;

// standard library
use std::path::Path;

// crate modules
use crate::error::Result;

// gridkit modules
use gridkit_array::Array;

// external crates
use log::debug;
use vtkio::model::{ByteOrder, Vtk};

/// Supported VTK output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VtkFormat {
    /// Legacy text format
    LegacyAscii,
    /// Legacy binary format in the byte order of the Vtk
    LegacyBinary,
    /// XML image data, the path should end in `.vti`
    Xml,
}

/// Write a Vtk to a file in the chosen format
///
/// ```rust, no_run
/// # use gridkit_vtk::{write_vtk, ArrayToVtk, VtkFormat};
/// # use gridkit_array::Array;
/// let data = Array::from_vec(vec![2, 2], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
/// let vtk = ArrayToVtk::new().convert("data", &data).unwrap();
/// write_vtk(vtk, "data.vtk", VtkFormat::LegacyAscii).unwrap();
/// ```
pub fn write_vtk<P: AsRef<Path>>(vtk: Vtk, path: P, format: VtkFormat) -> Result<()> {
    let path = path.as_ref();
    debug!("Writing {format:?} vtk to {}", path.display());

    match format {
        VtkFormat::LegacyAscii => vtk.export_ascii(path)?,
        VtkFormat::LegacyBinary => match vtk.byte_order {
            ByteOrder::BigEndian => vtk.export_be(path)?,
            ByteOrder::LittleEndian => vtk.export_le(path)?,
        },
        VtkFormat::Xml => vtk.export(path)?,
    }

    Ok(())
}

/// Convert one array with default options and write it as a legacy binary
/// file
pub fn array_to_vtk<P: AsRef<Path>>(array: &Array, name: &str, path: P) -> Result<()> {
    let vtk = ArrayToVtk::default().convert(name, array)?;
    write_vtk(vtk, path, VtkFormat::LegacyBinary)
}
