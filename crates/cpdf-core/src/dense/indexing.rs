//! Multi-index element access

use super::types::DenseND;
use scirs2_core::ndarray_ext::IxDyn;
use scirs2_core::numeric::Num;
use std::fmt;
use std::ops::{Index, IndexMut};

impl<T> DenseND<T>
where
    T: Clone + Num,
{
    /// Element at `index`, or `None` when the index has the wrong arity or
    /// falls outside the extents
    ///
    /// ```
    /// use cpdf_core::DenseND;
    ///
    /// let tensor = DenseND::<f64>::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    /// assert_eq!(tensor.get(&[0, 1]), Some(&2.0));
    /// assert_eq!(tensor.get(&[2, 0]), None);
    /// assert_eq!(tensor.get(&[0]), None);
    /// ```
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        (index.len() == self.rank())
            .then(|| self.data.get(IxDyn(index)))
            .flatten()
    }
}

impl<T> Index<&[usize]> for DenseND<T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &T {
        &self.data[IxDyn(index)]
    }
}

impl<T> IndexMut<&[usize]> for DenseND<T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut T {
        &mut self.data[IxDyn(index)]
    }
}

impl<T: fmt::Debug> fmt::Debug for DenseND<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseND")
            .field("shape", &self.data.shape())
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_checks_arity_and_bounds() {
        let tensor = DenseND::<f64>::zeros(&[2, 2, 2]);
        assert!(tensor.get(&[0, 0]).is_none());
        assert!(tensor.get(&[1, 1, 2]).is_none());
        assert_eq!(tensor.get(&[1, 1, 1]), Some(&0.0));
    }

    #[test]
    fn test_write_through_index() {
        let mut tensor = DenseND::<f64>::zeros(&[2, 3]);
        tensor[&[1, 2]] = 7.5;
        assert_eq!(tensor[&[1, 2]], 7.5);
        assert_eq!(tensor.to_vec()[5], 7.5);
    }
}
