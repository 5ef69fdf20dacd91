use crate::f;

/// Extends slices of axis extents with shape bookkeeping
pub trait ShapeExt {
    /// Total number of elements, `None` on overflow
    ///
    /// The product over an empty shape is 1, i.e. a scalar.
    ///
    /// ```rust
    /// # use gridkit_utils::ShapeExt;
    /// assert_eq!([2usize, 3, 4].element_count(), Some(24));
    /// assert_eq!(<[usize]>::element_count(&[]), Some(1));
    /// assert_eq!([usize::MAX, 2usize].element_count(), None);
    /// ```
    fn element_count(&self) -> Option<usize>;

    /// Row-major strides, last axis fastest
    ///
    /// ```rust
    /// # use gridkit_utils::ShapeExt;
    /// assert_eq!([2usize, 3, 4].row_major_strides(), vec![12, 4, 1]);
    /// ```
    fn row_major_strides(&self) -> Vec<usize>;

    /// Human readable shape, e.g. `2x3x4`
    fn shape_string(&self) -> String;
}

impl ShapeExt for [usize] {
    fn element_count(&self) -> Option<usize> {
        self.iter()
            .try_fold(1usize, |count, extent| count.checked_mul(*extent))
    }

    fn row_major_strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.len()];
        for axis in (0..self.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self[axis + 1];
        }
        strides
    }

    fn shape_string(&self) -> String {
        if self.is_empty() {
            return "scalar".to_string();
        }
        self.iter()
            .map(|extent| f!("{extent}"))
            .collect::<Vec<String>>()
            .join("x")
    }
}
