//! Row-major numeric arrays.

/// An untyped n-dimensional array as read from a data source.
///
/// `data` is in row-major order and its length equals the product of `shape`.
/// Missing values are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
    /// Physical unit from the variable's `units` attribute, if any
    pub units: Option<String>,
}

impl RawArray {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Self {
        Self {
            shape,
            data,
            units: None,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Number of elements implied by the shape, `None` if it overflows.
    pub fn element_count(&self) -> Option<usize> {
        element_count(&self.shape)
    }
}

/// Product of the dimensions, `None` if it overflows `usize`.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// A 2-D grid of `f64` values, indexed `[row][col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Array2 {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Array2 {
    /// Build from row-major data. Returns `None` if the length does not match.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (element_count(&[rows, cols]) == Some(data.len())).then_some(Self { rows, cols, data })
    }

    /// Build by evaluating `f(row, col)` for every cell.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// A 3-D grid of `f64` values, indexed `[row][col][k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Array3 {
    rows: usize,
    cols: usize,
    depth: usize,
    data: Vec<f64>,
}

impl Array3 {
    pub fn from_vec(rows: usize, cols: usize, depth: usize, data: Vec<f64>) -> Option<Self> {
        (element_count(&[rows, cols, depth]) == Some(data.len())).then_some(Self {
            rows,
            cols,
            depth,
            data,
        })
    }

    pub fn from_fn(
        rows: usize,
        cols: usize,
        depth: usize,
        mut f: impl FnMut(usize, usize, usize) -> f64,
    ) -> Self {
        let mut data = Vec::with_capacity(rows * cols * depth);
        for row in 0..rows {
            for col in 0..cols {
                for k in 0..depth {
                    data.push(f(row, col, k));
                }
            }
        }
        Self {
            rows,
            cols,
            depth,
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.rows, self.cols, self.depth]
    }

    /// The `depth` values stored for one cell.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &[f64] {
        let start = (row * self.cols + col) * self.depth;
        &self.data[start..start + self.depth]
    }
}

impl TryFrom<RawArray> for Array2 {
    type Error = RawArray;

    fn try_from(raw: RawArray) -> Result<Self, Self::Error> {
        let shape = raw.shape.clone();
        match shape.as_slice() {
            &[rows, cols] if raw.element_count() == Some(raw.data.len()) => Ok(Self {
                rows,
                cols,
                data: raw.data,
            }),
            _ => Err(raw),
        }
    }
}

impl TryFrom<RawArray> for Array3 {
    type Error = RawArray;

    fn try_from(raw: RawArray) -> Result<Self, Self::Error> {
        let shape = raw.shape.clone();
        match shape.as_slice() {
            &[rows, cols, depth] if raw.element_count() == Some(raw.data.len()) => Ok(Self {
                rows,
                cols,
                depth,
                data: raw.data,
            }),
            _ => Err(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array2_row_major_indexing() {
        let a = Array2::from_fn(2, 3, |r, c| (r * 10 + c) as f64);
        assert_eq!(a.get(0, 2), 2.0);
        assert_eq!(a.get(1, 0), 10.0);
        assert_eq!(a.as_slice().len(), 6);
    }

    #[test]
    fn test_array3_cell_slice() {
        let a = Array3::from_fn(2, 2, 4, |r, c, k| (r * 100 + c * 10 + k) as f64);
        assert_eq!(a.cell(1, 1), &[110.0, 111.0, 112.0, 113.0]);
    }

    #[test]
    fn test_from_vec_rejects_bad_length() {
        assert!(Array2::from_vec(2, 2, vec![0.0; 3]).is_none());
        assert!(Array3::from_vec(1, 1, 4, vec![0.0; 4]).is_some());
    }

    #[test]
    fn test_try_from_raw_checks_rank() {
        let raw = RawArray::new(vec![2, 2, 4], vec![0.0; 16]);
        assert!(Array2::try_from(raw.clone()).is_err());
        assert!(Array3::try_from(raw).is_ok());
    }

    #[test]
    fn test_overflowing_shape_is_rejected() {
        let huge = usize::MAX / 2 + 1;
        assert_eq!(element_count(&[huge, 2]), None);
        assert_eq!(element_count(&[2, 3, 4]), Some(24));

        let raw = RawArray::new(vec![huge, 2], vec![0.0; 2]);
        assert_eq!(raw.element_count(), None);
        assert!(Array2::try_from(raw).is_err());
        assert!(Array2::from_vec(huge, 2, vec![0.0; 2]).is_none());
        assert!(Array3::try_from(RawArray::new(vec![huge, 2, 4], vec![0.0; 8])).is_err());
    }
}
