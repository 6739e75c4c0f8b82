//! The dense tensor type

use scirs2_core::ndarray_ext::{Array, ArrayView, Dimension, IxDyn};
use scirs2_core::numeric::Num;

/// Row-major N-dimensional tensor
///
/// Reference tensors of a density-fitted pair are stored as `DenseND`, with
/// the connecting (auxiliary) index as mode 0. Every constructor produces
/// standard layout, so the last index varies fastest.
///
/// ```
/// use cpdf_core::DenseND;
///
/// let tensor = DenseND::<f64>::zeros(&[2, 3, 4]);
/// assert_eq!(tensor.shape(), &[2, 3, 4]);
/// assert_eq!(tensor.rank(), 3);
/// assert_eq!(tensor.len(), 24);
/// ```
#[derive(Clone, PartialEq)]
pub struct DenseND<T> {
    pub(crate) data: Array<T, IxDyn>,
}

impl<T> DenseND<T>
where
    T: Clone + Num,
{
    /// Wrap row-major `values` in a tensor of extents `shape`
    ///
    /// ```
    /// use cpdf_core::DenseND;
    ///
    /// let tensor = DenseND::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(tensor[&[1, 0]], 4.0);
    /// ```
    pub fn from_vec(values: Vec<T>, shape: &[usize]) -> anyhow::Result<Self> {
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            anyhow::bail!(
                "{} values cannot fill a tensor of shape {:?} ({} elements)",
                values.len(),
                shape,
                expected
            );
        }
        Ok(Self {
            data: Array::from_shape_vec(IxDyn(shape), values)?,
        })
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: Array::ones(IxDyn(shape)),
        }
    }

    /// Number of modes
    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Extent of `mode`; panics when `mode >= rank()`
    pub fn extent(&self, mode: usize) -> usize {
        self.data.shape()[mode]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the storage can be reinterpreted as a matrix without copying
    pub fn is_contiguous(&self) -> bool {
        self.data.is_standard_layout()
    }

    pub fn view(&self) -> ArrayView<'_, T, IxDyn> {
        self.data.view()
    }

    /// Overwrite every element with `f(index)`, visiting indices in row-major order
    ///
    /// ```
    /// use cpdf_core::DenseND;
    ///
    /// let mut tensor = DenseND::<f64>::zeros(&[2, 3]);
    /// tensor.fill_with(|idx| (idx[0] * 10 + idx[1]) as f64);
    /// assert_eq!(tensor[&[1, 2]], 12.0);
    /// ```
    pub fn fill_with<F>(&mut self, mut f: F)
    where
        F: FnMut(&[usize]) -> T,
    {
        for (index, value) in self.data.indexed_iter_mut() {
            *value = f(index.slice());
        }
    }

    /// Elements in row-major order
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(DenseND::from_vec(vec![1.0, 2.0, 3.0], &[2, 2]).is_err());
    }

    #[test]
    fn test_extent_and_layout() {
        let tensor = DenseND::<f64>::zeros(&[5, 2, 7]);
        assert_eq!(tensor.extent(0), 5);
        assert_eq!(tensor.extent(2), 7);
        assert!(tensor.is_contiguous());
    }

    #[test]
    fn test_fill_with_visits_row_major() {
        let mut tensor = DenseND::<f64>::zeros(&[2, 2, 2]);
        let mut counter = 0.0;
        tensor.fill_with(|_| {
            counter += 1.0;
            counter
        });
        assert_eq!(tensor.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }
}
