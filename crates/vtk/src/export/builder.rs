// crate modules
use crate::export::ArrayToVtk;
use crate::quantize::StoreBytes;

// external crates
use log::warn;

/// Builder implementation for ArrayToVtk configuration
///
/// The fields of [ArrayToVtk] are left public for direct use but the module
/// also implements a builder.
///
/// For those not familiar, the builder allows for chained setter calls for a
/// functional approach that could be considered more readable. Any number of
/// parameters can be set this way (including none).
///
/// To get the final [ArrayToVtk] from the builder, call
/// [build()](ArrayToVtkBuilder::build).
///
/// ```rust, no_run
/// # use gridkit_vtk::{write_vtk, ArrayToVtk, StoreBytes, VtkFormat};
/// # use gridkit_array::{read, SliceDirectives};
/// let field = read("fields.npz", Some("density"), &SliceDirectives::new()).unwrap();
///
/// // Make a new builder, change some values
/// let converter = ArrayToVtk::builder()
///     .store(StoreBytes::Two)
///     .zero_center(true)
///     .spacing([0.5, 0.5, 0.5])
///     .build();
///
/// // Convert the array using the parameters set
/// let vtk = converter.convert("density", &field).unwrap();
///
/// // Write to "density.vtk" using the legacy binary format
/// write_vtk(vtk, "./density.vtk", VtkFormat::LegacyBinary).unwrap();
/// ```
pub struct ArrayToVtkBuilder {
    store: StoreBytes,
    fix_byte_order: bool,
    min: Option<f64>,
    max: Option<f64>,
    zero_center: bool,
    invert: bool,
    origin: [f64; 3],
    spacing: [f64; 3],
}

impl ArrayToVtkBuilder {
    /// Create a new instance of the builder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [ArrayToVtk] type
    pub fn build(self) -> ArrayToVtk {
        ArrayToVtk {
            store: self.store,
            fix_byte_order: self.fix_byte_order,
            min: self.min,
            max: self.max,
            zero_center: self.zero_center,
            invert: self.invert,
            origin: self.origin,
            spacing: self.spacing,
        }
    }

    /// Storage of each value
    ///
    /// - ascii: decimal text of the values themselves
    /// - one: 8-bit levels
    /// - two: 16-bit levels
    /// - four: 32-bit levels (default)
    pub fn store(mut self, store: StoreBytes) -> Self {
        self.store = store;
        self
    }

    /// Write multi-byte levels big-endian regardless of host
    ///
    /// On by default, since Visit only reads big endian.
    pub fn fix_byte_order(mut self, fix: bool) -> Self {
        self.fix_byte_order = fix;
        self
    }

    /// Value mapped to level 0, defaults to the data minimum
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Value mapped to the top level, defaults to the data maximum
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Make the value window symmetric about zero
    pub fn zero_center(mut self, zero_center: bool) -> Self {
        self.zero_center = zero_center;
        self
    }

    /// Invert the levels so the minimum maps to the top
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Grid origin, overridden per axis by coordinate scales
    pub fn origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Grid spacing, overridden per axis by coordinate scales
    pub fn spacing(mut self, spacing: [f64; 3]) -> Self {
        if spacing.iter().any(|s| *s <= 0.0) {
            warn!("Warning: Grid spacing should be positive");
        }
        self.spacing = spacing;
        self
    }
}

impl Default for ArrayToVtkBuilder {
    fn default() -> Self {
        Self {
            store: StoreBytes::Four,
            fix_byte_order: true,
            min: None,
            max: None,
            zero_center: false,
            invert: false,
            origin: [0.0; 3],
            spacing: [1.0; 3],
        }
    }
}
