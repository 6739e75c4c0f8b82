//! Gram matrices, their Hadamard products and column normalisation
//!
//! These feed the normal equations `A_n · V = MtKRP_n` where `V` is the
//! element-wise product of the Gram matrices of every other factor.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView2};
use scirs2_core::numeric::Float;

/// Gram matrix `Fᵀ F` of a factor matrix, shape `(R, R)`
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use cpdf_kernels::gram_matrix;
///
/// let f = array![[1.0, 0.0], [1.0, 2.0]];
/// let g = gram_matrix(&f.view());
/// assert_eq!(g, array![[2.0, 2.0], [2.0, 4.0]]);
/// ```
pub fn gram_matrix<T>(factor: &ArrayView2<T>) -> Array2<T>
where
    T: Float + 'static,
{
    factor.t().dot(factor)
}

/// Element-wise product of a set of `(R, R)` Gram matrices
///
/// Starts from an all-ones matrix, so an empty iterator of width `rank`
/// yields ones.
pub fn gram_hadamard<'a, T, I>(grams: I, rank: usize) -> KernelResult<Array2<T>>
where
    T: Float + 'a,
    I: IntoIterator<Item = &'a Array2<T>>,
{
    let mut acc = Array2::<T>::ones((rank, rank));
    for (idx, gram) in grams.into_iter().enumerate() {
        if gram.dim() != (rank, rank) {
            return Err(KernelError::rank_mismatch(
                "gram_hadamard",
                rank,
                gram.ncols(),
                idx,
            ));
        }
        acc.zip_mut_with(gram, |a, &g| *a = *a * g);
    }
    Ok(acc)
}

/// Scale every column of `factor` to unit 2-norm, returning the norms
///
/// A zero column is left untouched and reports a norm of zero.
pub fn normalize_columns<T>(factor: &mut Array2<T>) -> Array1<T>
where
    T: Float,
{
    let mut norms = Array1::<T>::zeros(factor.ncols());
    for (r, mut column) in factor.columns_mut().into_iter().enumerate() {
        let norm = column.iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt();
        norms[r] = norm;
        if norm > T::zero() {
            column.mapv_inplace(|v| v / norm);
        }
    }
    norms
}

/// Normalise only the columns `from..ncols`, leaving the prefix bit-identical
pub fn normalize_columns_from<T>(factor: &mut Array2<T>, from: usize) -> Array1<T>
where
    T: Float,
{
    let width = factor.ncols().saturating_sub(from);
    let mut norms = Array1::<T>::zeros(width);
    for (r, mut column) in factor.columns_mut().into_iter().skip(from).enumerate() {
        let norm = column.iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt();
        norms[r] = norm;
        if norm > T::zero() {
            column.mapv_inplace(|v| v / norm);
        }
    }
    norms
}
