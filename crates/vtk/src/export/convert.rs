// gridkit modules
use gridkit_array::{Array, RangeAccumulator, ValueRange};
use gridkit_utils::{f, ShapeExt, StringExt, ValueExt};

// crate modules
use crate::error::{Error, Result};
use crate::export::ArrayToVtkBuilder;
use crate::quantize::{Quantizer, StoreBytes};

// external crates
use log::{debug, warn};
use vtkio::model::{
    Attribute, Attributes, ByteOrder, DataArray, DataSet, ElementType, Extent, FieldArray,
    IOBuffer, ImageDataPiece, Piece, Version, Vtk,
};

/// Convert arrays to VTK structured points for plotting
///
/// Arrays of rank 1 to 3 become point data on a regular grid with the first
/// axis as x, which varies fastest in the file.
///
/// The fields remain public for direct use, but for convenience and style
/// preference a builder pattern is also implemented and recommended.
///
/// # General properties
///
/// ## Storage
///
/// **By default values are stored as 4-byte integer levels, big-endian.**
///
/// The 1, 2 and 4 byte modes rescale the value window onto the full integer
/// range of that width. ASCII storage keeps the values themselves.
///
/// ```rust
/// # use gridkit_vtk::{ArrayToVtk, StoreBytes};
/// // Single byte levels over a fixed window
/// let converter = ArrayToVtk::builder()
///     .store(StoreBytes::One)
///     .min(0.0)
///     .max(10.0)
///     .build();
/// ```
///
/// Byte order matters for binary compatability with plotting software. Visit
/// only reads big endian, which is the default. Turning off byte order fixing
/// writes in the host order instead.
///
/// ```rust
/// # use gridkit_vtk::ArrayToVtk;
/// let converter = ArrayToVtk::builder()
///     .fix_byte_order(false)
///     .build();
/// ```
///
/// ## Several arrays
///
/// A set of conformant arrays share one value window and are written
/// together. One array gives scalars, three give vectors, and any other
/// number is written as a single field array with one component per input.
///
/// ## Geometry
///
/// Origin and spacing default to `0` and `1` on every axis. Where an array
/// carries coordinate scales the origin and spacing of that axis are taken
/// from its first two values.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayToVtk {
    /// Storage of each value
    pub store: StoreBytes,
    /// Write multi-byte levels big-endian regardless of host
    pub fix_byte_order: bool,
    /// Value mapped to level 0
    pub min: Option<f64>,
    /// Value mapped to the top level
    pub max: Option<f64>,
    /// Make the value window symmetric about zero
    pub zero_center: bool,
    /// Invert the levels
    pub invert: bool,
    /// Grid origin
    pub origin: [f64; 3],
    /// Grid spacing
    pub spacing: [f64; 3],
}

// Public API
impl ArrayToVtk {
    /// Start with the default configuration
    pub fn new() -> ArrayToVtk {
        Default::default()
    }

    /// Get an instance of the [ArrayToVtkBuilder]
    pub fn builder() -> ArrayToVtkBuilder {
        ArrayToVtkBuilder::default()
    }

    /// Convert a single named array to a vtkio::Vtk object
    pub fn convert(&self, name: &str, array: &Array) -> Result<Vtk> {
        self.convert_all(&[(name, array)])
    }

    /// Convert a set of conformant named arrays to one vtkio::Vtk object
    pub fn convert_all(&self, arrays: &[(&str, &Array)]) -> Result<Vtk> {
        let (_, first) = arrays
            .first()
            .ok_or_else(|| Error::InvalidOptions("no arrays to convert".to_string()))?;

        for (_, array) in arrays {
            first.check_conformant(array)?;
        }

        let dims = Self::grid_dims(first)?;
        let quantizer = self.quantizer(arrays)?;

        debug!(
            "Converting {} array(s) of {} to {} structured points",
            arrays.len(),
            first.dims().shape_string(),
            quantizer.store
        );

        let attribute = self.attribute(arrays, &quantizer)?;
        let (origin, spacing) = self.geometry(first);
        let extent = Extent::Dims(dims);

        Ok(Vtk {
            version: Version::Auto,
            title: "Generated by gridkit".to_string(),
            byte_order: self.byte_order(),
            file_path: None,
            data: DataSet::ImageData {
                extent: extent.clone(),
                origin,
                spacing,
                meta: None,
                pieces: vec![Piece::Inline(Box::new(ImageDataPiece {
                    extent,
                    data: Attributes {
                        point: vec![attribute],
                        cell: Vec::new(),
                    },
                }))],
            },
        })
    }

    /// Shared value window over every array
    pub fn resolve_range(&self, arrays: &[(&str, &Array)]) -> Result<ValueRange> {
        let mut accumulator = RangeAccumulator::new();
        for (_, array) in arrays {
            accumulator.include(array)?;
        }

        Ok(ValueRange::resolve(
            accumulator.finish()?,
            self.min,
            self.max,
            self.zero_center,
            self.invert,
        ))
    }
}

impl Default for ArrayToVtk {
    fn default() -> Self {
        ArrayToVtkBuilder::default().build()
    }
}

/// Common use implementations
impl ArrayToVtk {
    /// Structured points extents with unused axes set to 1
    fn grid_dims(array: &Array) -> Result<[u32; 3]> {
        let rank = array.rank();
        if !(1..=3).contains(&rank) {
            return Err(Error::InvalidRank(rank));
        }

        let mut dims = [1_u32; 3];
        for (d, n) in dims.iter_mut().zip(array.dims()) {
            *d = u32::try_from(*n)
                .map_err(|_| Error::InvalidOptions(f!("axis of {n} points is too large")))?;
        }
        Ok(dims)
    }

    fn byte_order(&self) -> ByteOrder {
        if self.fix_byte_order || cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    fn quantizer(&self, arrays: &[(&str, &Array)]) -> Result<Quantizer> {
        let range = self.resolve_range(arrays)?;
        Ok(Quantizer::new(range, self.store).fix_byte_order(self.fix_byte_order))
    }

    /// Origin and spacing, from coordinate scales where available
    fn geometry(&self, array: &Array) -> ([f32; 3], [f32; 3]) {
        let mut origin = self.origin;
        let mut spacing = self.spacing;

        for axis in 0..array.rank() {
            match array.scale(axis) {
                Some([first, second, ..]) => {
                    origin[axis] = *first;
                    spacing[axis] = second - first;
                }
                Some([first]) => origin[axis] = *first,
                _ => (),
            }
        }

        if spacing.iter().any(|s| *s <= 0.0) {
            warn!(
                "Warning: Non-positive grid spacing {}, {}, {}",
                spacing[0].sci(3),
                spacing[1].sci(3),
                spacing[2].sci(3)
            );
        }

        (origin.map(|v| v as f32), spacing.map(|v| v as f32))
    }

    /// Point attribute holding every array, interleaved per point
    fn attribute(&self, arrays: &[(&str, &Array)], quantizer: &Quantizer) -> Result<Attribute> {
        let mut columns = Vec::with_capacity(arrays.len());
        for (_, array) in arrays {
            columns.push(Self::x_fastest(array)?);
        }
        let data = Self::buffer(&Self::interleave(&columns), quantizer);

        let attribute = match arrays {
            [(name, _)] => Attribute::DataArray(DataArray {
                name: name.dashed(),
                elem: ElementType::Scalars {
                    num_comp: 1,
                    lookup_table: None,
                },
                data,
            }),
            [_, _, _] => Attribute::DataArray(DataArray {
                name: "vectors".to_string(),
                elem: ElementType::Vectors,
                data,
            }),
            _ => Attribute::Field {
                name: "fields".to_string(),
                data_array: vec![FieldArray {
                    name: "array".to_string(),
                    elem: arrays.len() as u32,
                    data,
                }],
            },
        };

        Ok(attribute)
    }

    /// Values reordered so the first axis varies fastest
    fn x_fastest(array: &Array) -> Result<Vec<f64>> {
        let mut reordered = array.clone();
        reordered.transpose()?;
        Ok(reordered.into_vec())
    }

    fn interleave(columns: &[Vec<f64>]) -> Vec<f64> {
        match columns {
            [single] => single.clone(),
            _ => {
                let points = columns.first().map(|c| c.len()).unwrap_or(0);
                (0..points)
                    .flat_map(|i| columns.iter().map(move |c| c[i]))
                    .collect()
            }
        }
    }

    fn buffer(values: &[f64], quantizer: &Quantizer) -> IOBuffer {
        match quantizer.store {
            StoreBytes::Ascii => {
                IOBuffer::F64(values.iter().map(|v| quantizer.oriented(*v)).collect())
            }
            StoreBytes::One => {
                IOBuffer::U8(values.iter().map(|v| quantizer.level(*v) as u8).collect())
            }
            StoreBytes::Two => {
                IOBuffer::U16(values.iter().map(|v| quantizer.level(*v) as u16).collect())
            }
            StoreBytes::Four => IOBuffer::U32(quantizer.levels(values)),
        }
    }
}
