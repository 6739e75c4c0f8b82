//! Khatri-Rao product (column-wise Kronecker product)
//!
//! Only reconstruction uses the full product; the ALS sweep never builds it.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{Array2, ArrayView2};
use scirs2_core::numeric::Num;

/// Compute the Khatri-Rao product of two matrices
///
/// For A (I × K) and B (J × K) the result has shape (I*J × K) and row
/// `i * J + j` holds `A[i, k] * B[j, k]`, so the first operand varies slowest.
///
/// # Panics
///
/// Panics if the column counts differ.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use cpdf_kernels::khatri_rao;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![[5.0, 6.0], [7.0, 8.0]];
/// let c = khatri_rao(&a.view(), &b.view());
/// assert_eq!(c.shape(), &[4, 2]);
/// assert_eq!(c[[1, 0]], 7.0);
/// assert_eq!(c[[2, 1]], 24.0);
/// ```
pub fn khatri_rao<T>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> Array2<T>
where
    T: Clone + Num,
{
    let (i, k1) = a.dim();
    let (j, k2) = b.dim();

    assert_eq!(
        k1, k2,
        "Number of columns must match: A has {} columns, B has {} columns",
        k1, k2
    );

    let mut result = Array2::<T>::zeros((i * j, k1));
    for col in 0..k1 {
        for (row_a, a_val) in a.column(col).iter().enumerate() {
            for (row_b, b_val) in b.column(col).iter().enumerate() {
                result[[row_a * j + row_b, col]] = a_val.clone() * b_val.clone();
            }
        }
    }

    result
}

/// Khatri-Rao product of a sequence of factors, `F0 ⊙ F1 ⊙ ... ⊙ Fn`
///
/// Rows are ordered with the first factor's index slowest, matching the
/// row-major layout of a tensor whose leading modes are those factors.
pub fn khatri_rao_all<T>(factors: &[ArrayView2<T>]) -> KernelResult<Array2<T>>
where
    T: Clone + Num,
{
    let (first, rest) = factors
        .split_first()
        .ok_or_else(|| KernelError::empty_input("khatri_rao_all", "factors"))?;

    let rank = first.ncols();
    for (idx, factor) in rest.iter().enumerate() {
        if factor.ncols() != rank {
            return Err(KernelError::rank_mismatch(
                "khatri_rao_all",
                rank,
                factor.ncols(),
                idx + 1,
            ));
        }
    }

    let mut acc = first.to_owned();
    for factor in rest {
        acc = khatri_rao(&acc.view(), factor);
    }
    Ok(acc)
}
