//! Slice directives and hyperslab selection
//!
//! A slice directive fixes one axis of a source array to a single index. Up
//! to four directives are evaluated together against a source shape to give
//! a [Hyperslab], the per-axis `(start, count)` selection handed to a
//! container, along with the reduced shape of the result.

// crate modules
use crate::array::allocate;
use crate::error::{Error, Result};

// gridkit modules
use gridkit_utils::ShapeExt;

// external crates
use log::debug;

/// Axis targeted by a [SliceDirective]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceAxis {
    /// Explicit axis index
    Index(usize),
    /// Whatever the last axis of the source turns out to be
    Last,
}

/// Fix one axis of a source array to a single index
///
/// When `centered` is set the index is taken relative to the middle of the
/// axis, i.e. `floor(extent / 2)` is added before bounds checking. Negative
/// indices are therefore only meaningful for centered directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceDirective {
    pub axis: SliceAxis,
    pub index: i64,
    pub centered: bool,
}

impl SliceDirective {
    /// Slice an explicit axis at an absolute index
    pub fn new(axis: usize, index: i64) -> Self {
        Self {
            axis: SliceAxis::Index(axis),
            index,
            centered: false,
        }
    }

    /// Slice the last axis of the source at an absolute index
    pub fn last(index: i64) -> Self {
        Self {
            axis: SliceAxis::Last,
            index,
            centered: false,
        }
    }

    /// Interpret the index relative to the centre of the axis
    pub fn centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    /// Resolve the axis and index against a source shape
    fn resolve(&self, dims: &[usize]) -> Result<(usize, usize)> {
        let axis = match self.axis {
            SliceAxis::Index(axis) => axis,
            SliceAxis::Last => dims.len().saturating_sub(1),
        };

        let extent = *dims.get(axis).ok_or(Error::InvalidSlice {
            axis,
            index: self.index,
        })?;
        let index = if self.centered {
            i64::try_from(extent / 2)
                .ok()
                .and_then(|half| self.index.checked_add(half))
                .ok_or(Error::InvalidSlice {
                    axis,
                    index: self.index,
                })?
        } else {
            self.index
        };

        if index < 0 || index as usize >= extent {
            return Err(Error::InvalidSlice { axis, index });
        }

        Ok((axis, index as usize))
    }
}

/// Set of up to four slice directives
///
/// The three leading axes and the last axis each get one optional slot,
/// following the usual x/y/z convention for gridded data. The `centered`
/// flag applies to the x, y and z slots only, never to the last axis.
///
/// ```rust
/// # use gridkit_array::SliceDirectives;
/// // Take the middle z plane of a 3D grid
/// let directives = SliceDirectives::new().z(0).centered(true);
/// let slab = directives.select(&[4, 5, 6]).unwrap();
/// assert_eq!(slab.start, vec![0, 0, 3]);
/// assert_eq!(slab.output_dims, vec![4, 5]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceDirectives {
    /// Index along the first axis
    pub x: Option<i64>,
    /// Index along the second axis
    pub y: Option<i64>,
    /// Index along the third axis
    pub z: Option<i64>,
    /// Index along the last axis
    pub last: Option<i64>,
    /// Indices for x, y and z are relative to the axis centre
    pub centered: bool,
}

impl SliceDirectives {
    /// No directives, i.e. read the whole dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the first axis
    pub fn x(mut self, index: i64) -> Self {
        self.x = Some(index);
        self
    }

    /// Fix the second axis
    pub fn y(mut self, index: i64) -> Self {
        self.y = Some(index);
        self
    }

    /// Fix the third axis
    pub fn z(mut self, index: i64) -> Self {
        self.z = Some(index);
        self
    }

    /// Fix the last axis, whatever the rank of the source
    pub fn last(mut self, index: i64) -> Self {
        self.last = Some(index);
        self
    }

    /// Toggle centering for the x, y and z directives
    pub fn centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    /// True if no directive is set
    pub fn is_empty(&self) -> bool {
        self.directives().is_empty()
    }

    /// The active directives in x, y, z, last order
    pub fn directives(&self) -> Vec<SliceDirective> {
        let mut directives = [self.x, self.y, self.z]
            .into_iter()
            .enumerate()
            .filter_map(|(axis, index)| {
                index.map(|i| SliceDirective::new(axis, i).centered(self.centered))
            })
            .collect::<Vec<SliceDirective>>();

        if let Some(index) = self.last {
            directives.push(SliceDirective::last(index));
        }

        directives
    }

    /// Compute the hyperslab for a source shape
    pub fn select(&self, dims: &[usize]) -> Result<Hyperslab> {
        select(dims, &self.directives())
    }
}

/// Per-axis `(start, count)` selection and the resulting reduced shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperslab {
    /// First selected index of every source axis
    pub start: Vec<usize>,
    /// Number of selected indices of every source axis
    pub count: Vec<usize>,
    /// Shape of the extracted array
    pub output_dims: Vec<usize>,
}

impl Hyperslab {
    /// Select everything, keeping the source shape
    pub fn full(dims: &[usize]) -> Self {
        Self {
            start: vec![0; dims.len()],
            count: dims.to_vec(),
            output_dims: dims.to_vec(),
        }
    }

    /// Number of elements selected
    pub fn len(&self) -> usize {
        self.count.element_count().unwrap_or(usize::MAX)
    }

    /// True if nothing is selected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the selection covers the entirety of `dims`
    pub fn is_full(&self, dims: &[usize]) -> bool {
        self.start.iter().all(|s| *s == 0) && self.count == dims
    }

    /// Copy the selected elements out of a row-major buffer of shape `dims`
    ///
    /// Elements come out in row-major order over the selection.
    pub fn gather(&self, dims: &[usize], data: &[f64]) -> Result<Vec<f64>> {
        if dims.len() != self.start.len()
            || self
                .start
                .iter()
                .zip(&self.count)
                .zip(dims)
                .any(|((s, c), d)| s + c > *d)
        {
            return Err(Error::NotConformant {
                expected: dims.to_vec(),
                found: self.count.clone(),
            });
        }

        let source_strides = dims.row_major_strides();
        let slab_strides = self.count.row_major_strides();
        let total = self.count.element_count().ok_or(Error::OutOfMemory)?;

        let mut selected = allocate(total)?;
        for j in 0..total {
            let mut remainder = j;
            let mut source = 0;
            for k in 0..slab_strides.len() {
                let i = remainder / slab_strides[k];
                remainder %= slab_strides[k];
                source += (self.start[k] + i) * source_strides[k];
            }
            let value = data.get(source).ok_or_else(|| {
                Error::SliceReadFailed(gridkit_utils::f!("element {source} out of bounds"))
            })?;
            selected.push(*value);
        }

        Ok(selected)
    }
}

/// Compute the hyperslab selected by a set of directives
///
/// Sliced axes get a count of 1 at the resolved index and every other axis is
/// selected in full. The output shape drops every axis with a count of exactly
/// 1, whether it was sliced or already degenerate in the source, and a result
/// that would be a true scalar is kept as rank 1 with a single element.
///
/// With no directives the output shape is the source shape, unchanged.
///
/// Directives naming the same axis with different indices are rejected as an
/// [Error::InvalidSlice].
pub fn select(dims: &[usize], directives: &[SliceDirective]) -> Result<Hyperslab> {
    if dims.is_empty() {
        return Err(Error::InvalidRank(0));
    }

    if directives.is_empty() {
        return Ok(Hyperslab::full(dims));
    }

    let mut start = vec![0; dims.len()];
    let mut count = dims.to_vec();
    let mut sliced = vec![false; dims.len()];

    for directive in directives {
        let (axis, index) = directive.resolve(dims)?;
        if sliced[axis] && start[axis] != index {
            return Err(Error::InvalidSlice {
                axis,
                index: directive.index,
            });
        }
        sliced[axis] = true;
        start[axis] = index;
        count[axis] = 1;
    }

    let mut output_dims = count
        .iter()
        .copied()
        .filter(|c| *c != 1)
        .collect::<Vec<usize>>();

    if output_dims.is_empty() {
        output_dims.push(1);
    }

    debug!(
        "Slice of {} selects {} (start {:?})",
        dims.shape_string(),
        output_dims.shape_string(),
        start
    );

    Ok(Hyperslab {
        start,
        count,
        output_dims,
    })
}

#[cfg(test)]
mod slice_tests {
    use super::*;

    #[test]
    fn no_directives_keeps_shape() {
        let slab = select(&[3, 1, 4], &[]).unwrap();
        assert_eq!(slab.output_dims, vec![3, 1, 4]);
        assert!(slab.is_full(&[3, 1, 4]));
    }

    #[test]
    fn collapse_includes_degenerate_axes() {
        let slab = select(&[3, 1, 4], &[SliceDirective::new(0, 2)]).unwrap();
        assert_eq!(slab.start, vec![2, 0, 0]);
        assert_eq!(slab.count, vec![1, 1, 4]);
        assert_eq!(slab.output_dims, vec![4]);
    }

    #[test]
    fn scalar_result_is_rank_one() {
        let slab = select(&[2, 3], &[SliceDirective::new(0, 1), SliceDirective::last(2)]).unwrap();
        assert_eq!(slab.output_dims, vec![1]);
        assert_eq!(slab.len(), 1);
    }

    #[test]
    fn centered_offsets() {
        let slab = select(&[5, 4], &[SliceDirective::new(0, -1).centered(true)]).unwrap();
        assert_eq!(slab.start, vec![1, 0]);

        let result = select(&[5, 4], &[SliceDirective::new(0, 3).centered(true)]);
        assert!(matches!(result, Err(Error::InvalidSlice { axis: 0, index: 5 })));
    }

    #[test]
    fn centered_overflow_rejected() {
        let result = select(&[5, 4], &[SliceDirective::new(0, i64::MAX).centered(true)]);
        assert!(matches!(
            result,
            Err(Error::InvalidSlice {
                axis: 0,
                index: i64::MAX
            })
        ));
    }

    #[test]
    fn bounds_rejected() {
        for directive in [
            SliceDirective::new(0, -1),
            SliceDirective::new(0, 2),
            SliceDirective::new(2, 0),
        ] {
            let result = select(&[2, 3], &[directive]);
            assert!(matches!(result, Err(Error::InvalidSlice { .. })));
        }
    }

    #[test]
    fn conflicting_directives() {
        let ok = select(&[2, 3], &[SliceDirective::new(1, 2), SliceDirective::last(2)]);
        assert!(ok.is_ok());

        let conflict = select(&[2, 3], &[SliceDirective::new(1, 0), SliceDirective::last(2)]);
        assert!(matches!(conflict, Err(Error::InvalidSlice { axis: 1, .. })));
    }

    #[test]
    fn rank_zero_rejected() {
        assert!(matches!(select(&[], &[]), Err(Error::InvalidRank(0))));
    }

    #[test]
    fn centered_skips_last() {
        let directives = SliceDirectives::new().x(0).last(0).centered(true);
        let slab = directives.select(&[4, 6]).unwrap();
        assert_eq!(slab.start, vec![2, 0]);
        assert_eq!(slab.output_dims, vec![1]);
    }

    #[test]
    fn gather_cross_section() {
        let data = (0..24).map(|v| v as f64).collect::<Vec<f64>>();
        let slab = select(&[2, 3, 4], &[SliceDirective::new(1, 1)]).unwrap();
        let selected = slab.gather(&[2, 3, 4], &data).unwrap();
        assert_eq!(selected, vec![4.0, 5.0, 6.0, 7.0, 16.0, 17.0, 18.0, 19.0]);
    }
}
