// standard library
use std::fmt;

// crate modules
use crate::error::{Error, Result};

// gridkit modules
use gridkit_utils::ShapeExt;

/// Owned, dense, row-major array of doubles
///
/// The last axis varies fastest. A rank 0 array is a scalar holding a single
/// element, so `len()` is always the product of `dims()` with the empty
/// product taken as 1.
///
/// Each axis may also own an optional coordinate buffer ("scale") with one
/// value per index along that axis. These are never shared between arrays and
/// follow the axes through [transpose()](Array::transpose).
///
/// ```rust
/// # use gridkit_array::Array;
/// let array = Array::from_vec(vec![2, 3], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert_eq!(array.rank(), 2);
/// assert_eq!(array.get(&[1, 0]), Some(3.0));
/// assert_eq!(array.range().unwrap(), (0.0, 5.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    dims: Vec<usize>,
    data: Vec<f64>,
    scales: Vec<Option<Vec<f64>>>,
}

impl Array {
    /// Zero filled array of the given extents
    ///
    /// Allocation failure is reported as [Error::OutOfMemory] rather than
    /// aborting the process.
    pub fn zeros(dims: &[usize]) -> Result<Self> {
        let count = dims.element_count().ok_or(Error::OutOfMemory)?;
        let mut data = allocate(count)?;
        data.resize(count, 0.0);

        Ok(Self {
            dims: dims.to_vec(),
            data,
            scales: vec![None; dims.len()],
        })
    }

    /// Take ownership of an existing buffer without copying
    ///
    /// The buffer length must match the product of the extents.
    pub fn from_vec(dims: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        match dims.element_count() {
            Some(count) if count == data.len() => Ok(Self {
                scales: vec![None; dims.len()],
                dims,
                data,
            }),
            _ => Err(Error::NotConformant {
                expected: dims,
                found: vec![data.len()],
            }),
        }
    }

    /// Build from a tagged sample buffer, normalising to doubles
    pub fn from_samples(dims: Vec<usize>, samples: Samples) -> Result<Self> {
        Self::from_vec(dims, samples.into_f64()?)
    }

    /// Number of axes
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Extent of every axis
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when at least one axis has zero extent
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major element buffer
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major element buffer
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Release the array, keeping only the element buffer
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Element at a multi-index, or `None` if out of bounds
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.rank() || index.iter().zip(&self.dims).any(|(i, d)| i >= d) {
            return None;
        }

        let offset = index
            .iter()
            .zip(self.dims.row_major_strides())
            .map(|(i, stride)| i * stride)
            .sum::<usize>();

        self.data.get(offset).copied()
    }

    /// True if both arrays have the same rank and extents
    pub fn conformant(&self, other: &Array) -> bool {
        self.dims == other.dims
    }

    /// Same as [conformant()](Array::conformant) but as a `Result`
    pub fn check_conformant(&self, other: &Array) -> Result<()> {
        if self.conformant(other) {
            Ok(())
        } else {
            Err(Error::NotConformant {
                expected: self.dims.clone(),
                found: other.dims.clone(),
            })
        }
    }

    /// Minimum and maximum element in a single scan
    ///
    /// NaN values are skipped unless nothing else is present.
    pub fn range(&self) -> Result<(f64, f64)> {
        let (first, rest) = self.data.split_first().ok_or(Error::EmptyArray)?;

        Ok(rest.iter().fold((*first, *first), |(min, max), &v| {
            (min.min(v), max.max(v))
        }))
    }

    /// Reverse the axis order and permute the buffer to match
    ///
    /// The buffer is rebuilt by decomposing each destination index over the
    /// new strides and recomposing it over the old ones, so the cost does not
    /// depend on rank beyond the stride tables. Rank 0 and 1 arrays are left
    /// untouched.
    pub fn transpose(&mut self) -> Result<()> {
        if self.rank() < 2 {
            return Ok(());
        }

        let rank = self.rank();
        let old_strides = self.dims.row_major_strides();
        let new_dims = self.dims.iter().rev().copied().collect::<Vec<usize>>();
        let new_strides = new_dims.row_major_strides();

        let mut data = allocate(self.data.len())?;
        for j in 0..self.data.len() {
            let mut remainder = j;
            let mut source = 0;
            for (k, stride) in new_strides.iter().enumerate() {
                source += (remainder / stride) * old_strides[rank - 1 - k];
                remainder %= stride;
            }
            data.push(self.data[source]);
        }

        self.data = data;
        self.dims = new_dims;
        self.scales.reverse();
        Ok(())
    }

    /// Coordinate values along an axis, if any have been set
    pub fn scale(&self, axis: usize) -> Option<&[f64]> {
        self.scales.get(axis)?.as_deref()
    }

    /// Attach coordinate values to an axis
    ///
    /// There must be exactly one value per index along the axis.
    pub fn set_scale(&mut self, axis: usize, values: Vec<f64>) -> Result<()> {
        let extent = self.dims.get(axis).copied();
        if extent != Some(values.len()) {
            return Err(Error::NotConformant {
                expected: extent.into_iter().collect(),
                found: vec![values.len()],
            });
        }
        self.scales[axis] = Some(values);
        Ok(())
    }

    /// Remove the coordinate values of an axis
    pub fn clear_scale(&mut self, axis: usize) -> Option<Vec<f64>> {
        self.scales.get_mut(axis)?.take()
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Array {} ({} values)",
            self.dims.shape_string(),
            self.data.len()
        )
    }
}

/// Tagged sample buffer read from a container
///
/// Containers may hold single or double precision values. Everything is
/// normalised to doubles when converted into an [Array].
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Samples {
    /// Number of samples held
    pub fn len(&self) -> usize {
        match self {
            Samples::F32(v) => v.len(),
            Samples::F64(v) => v.len(),
        }
    }

    /// True if no samples are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to a double precision buffer
    pub fn into_f64(self) -> Result<Vec<f64>> {
        match self {
            Samples::F64(v) => Ok(v),
            Samples::F32(v) => {
                let mut data = allocate(v.len())?;
                data.extend(v.into_iter().map(f64::from));
                Ok(data)
            }
        }
    }
}

impl From<Vec<f64>> for Samples {
    fn from(value: Vec<f64>) -> Self {
        Samples::F64(value)
    }
}

impl From<Vec<f32>> for Samples {
    fn from(value: Vec<f32>) -> Self {
        Samples::F32(value)
    }
}

/// Empty buffer with room for exactly `count` doubles
pub(crate) fn allocate(count: usize) -> Result<Vec<f64>> {
    let mut data = Vec::new();
    data.try_reserve_exact(count)
        .map_err(|_| Error::OutOfMemory)?;
    Ok(data)
}

#[cfg(test)]
mod array_tests {
    use super::*;

    fn sequence(dims: &[usize]) -> Array {
        let count = dims.element_count().unwrap();
        Array::from_vec(dims.to_vec(), (0..count).map(|v| v as f64).collect()).unwrap()
    }

    #[test]
    fn zeros_matches_shape() {
        let array = Array::zeros(&[2, 3, 4]).unwrap();
        assert_eq!(array.len(), 24);
        assert_eq!(array.data().len(), 24);
        assert!(array.data().iter().all(|v| *v == 0.0));

        let scalar = Array::zeros(&[]).unwrap();
        assert_eq!(scalar.rank(), 0);
        assert_eq!(scalar.len(), 1);
    }

    #[test]
    fn zeros_too_large() {
        let result = Array::zeros(&[usize::MAX, 2]);
        assert!(matches!(result, Err(Error::OutOfMemory)));
    }

    #[test]
    fn from_vec_length_mismatch() {
        let result = Array::from_vec(vec![2, 2], vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(Error::NotConformant { .. })));
    }

    #[test]
    fn get_row_major() {
        let array = sequence(&[2, 3, 4]);
        assert_eq!(array.get(&[0, 0, 3]), Some(3.0));
        assert_eq!(array.get(&[0, 1, 0]), Some(4.0));
        assert_eq!(array.get(&[1, 0, 0]), Some(12.0));
        assert_eq!(array.get(&[1, 2, 3]), Some(23.0));
        assert_eq!(array.get(&[2, 0, 0]), None);
        assert_eq!(array.get(&[0, 0]), None);
    }

    #[test]
    fn range_bounds() {
        let array = Array::from_vec(vec![5], vec![3.0, -1.5, 7.25, 0.0, 2.0]).unwrap();
        assert_eq!(array.range().unwrap(), (-1.5, 7.25));

        let empty = Array::zeros(&[3, 0]).unwrap();
        assert!(matches!(empty.range(), Err(Error::EmptyArray)));
    }

    #[test]
    fn transpose_matrix() {
        let mut array = sequence(&[2, 3]);
        array.transpose().unwrap();
        assert_eq!(array.dims(), &[3, 2]);
        assert_eq!(array.data(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn transpose_rank_three() {
        let original = sequence(&[2, 3, 4]);
        let mut array = original.clone();
        array.transpose().unwrap();
        assert_eq!(array.dims(), &[4, 3, 2]);
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(array.get(&[k, j, i]), original.get(&[i, j, k]));
                }
            }
        }
    }

    #[test]
    fn transpose_involution() {
        let original = sequence(&[3, 1, 5, 2]);
        let mut array = original.clone();
        array.transpose().unwrap();
        array.transpose().unwrap();
        assert_eq!(array, original);
    }

    #[test]
    fn transpose_low_rank_noop() {
        let mut vector = sequence(&[4]);
        vector.transpose().unwrap();
        assert_eq!(vector, sequence(&[4]));

        let mut scalar = Array::from_vec(vec![], vec![9.0]).unwrap();
        scalar.transpose().unwrap();
        assert_eq!(scalar.dims(), &[] as &[usize]);
        assert_eq!(scalar.data(), &[9.0]);
    }

    #[test]
    fn scales_follow_transpose() {
        let mut array = sequence(&[2, 3]);
        array.set_scale(0, vec![0.5, 1.5]).unwrap();
        array.transpose().unwrap();
        assert_eq!(array.scale(0), None);
        assert_eq!(array.scale(1), Some([0.5, 1.5].as_slice()));
    }

    #[test]
    fn scale_length_checked() {
        let mut array = sequence(&[2, 3]);
        assert!(array.set_scale(1, vec![0.0, 1.0]).is_err());
        assert!(array.set_scale(5, vec![0.0]).is_err());
        assert!(array.set_scale(1, vec![0.0, 1.0, 2.0]).is_ok());
        assert_eq!(array.clear_scale(1), Some(vec![0.0, 1.0, 2.0]));
    }

    #[test]
    fn conformant_shapes() {
        let a = sequence(&[2, 3]);
        assert!(a.conformant(&Array::zeros(&[2, 3]).unwrap()));
        assert!(!a.conformant(&Array::zeros(&[3, 2]).unwrap()));
        assert!(!a.conformant(&Array::zeros(&[2, 3, 1]).unwrap()));
        assert!(a.check_conformant(&sequence(&[6])).is_err());
    }

    #[test]
    fn samples_to_doubles() {
        let samples = Samples::from(vec![1.5_f32, -2.0]);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples.into_f64().unwrap(), vec![1.5, -2.0]);

        let array = Array::from_samples(vec![2], Samples::from(vec![4.0_f64, 5.0])).unwrap();
        assert_eq!(array.data(), &[4.0, 5.0]);
    }

    #[test]
    fn display_shape() {
        assert_eq!(sequence(&[2, 3]).to_string(), "Array 2x3 (6 values)");
    }
}
