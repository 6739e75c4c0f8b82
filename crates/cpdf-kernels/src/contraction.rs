//! Hadamard contractions over the rank axis
//!
//! An intermediate `S(i_0, ..., i_{m-1}, r)` is stored as a row-major
//! `(Π dims, R)` matrix. Contracting axis `j` against a factor `A (d_j × R)`
//! sums `i_j` away while multiplying element-wise along `r`:
//!
//! ```text
//! S'(..., r) = Σ_{i_j} S(..., i_j, ..., r) · A(i_j, r)
//! ```
//!
//! Axes are consumed from the last one inward. The axis that must survive is
//! folded into the trailing block when it is reached, so the remaining
//! contractions broadcast the factor across it.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{Array2, ArrayView2, ArrayView3};
use scirs2_core::numeric::Float;

/// Contract the middle axis of `t` against `factor`, element-wise over rank
///
/// `t` has shape `(outer, mid, groups * R)` and `factor` has shape `(mid, R)`.
/// The result has shape `(outer, groups * R)`:
///
/// ```text
/// out[o, g*R + r] = Σ_k t[o, k, g*R + r] · factor[k, r]
/// ```
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{array, Array3};
/// use cpdf_kernels::hadamard_contract;
///
/// let t = Array3::<f64>::ones((1, 2, 2));
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let out = hadamard_contract(&t.view(), &a.view()).unwrap();
/// assert_eq!(out, array![[4.0, 6.0]]);
/// ```
pub fn hadamard_contract<T>(t: &ArrayView3<T>, factor: &ArrayView2<T>) -> KernelResult<Array2<T>>
where
    T: Float,
{
    let (outer, mid, width) = t.dim();
    let (rows, rank) = factor.dim();

    if rows != mid {
        return Err(KernelError::dimension_mismatch(
            "hadamard_contract",
            vec![mid, rank],
            vec![rows, rank],
            "factor rows must equal the contracted extent",
        ));
    }
    if rank == 0 || width % rank != 0 {
        return Err(KernelError::rank_mismatch("hadamard_contract", rank, width, 0));
    }

    let groups = width / rank;
    let mut out = Array2::<T>::zeros((outer, width));
    for o in 0..outer {
        for k in 0..mid {
            for g in 0..groups {
                for r in 0..rank {
                    let col = g * rank + r;
                    out[[o, col]] = out[[o, col]] + t[[o, k, col]] * factor[[k, r]];
                }
            }
        }
    }
    Ok(out)
}

/// Reduce an intermediate onto a single axis
///
/// `seed` holds `S(i_0, ..., i_{m-1}, r)` as a `(Π dims, R)` matrix. Every
/// axis except `keep` is contracted against its factor; `factors` lists one
/// matrix per contracted axis, in axis order. The result is `(dims[keep], R)`.
///
/// With a single axis the seed is returned unchanged.
///
/// # Errors
///
/// Returns a [`KernelError`] if `keep` is out of range, the factor count is
/// not `dims.len() - 1`, or any extent disagrees with `dims`.
pub fn reduce_modes<T>(
    seed: Array2<T>,
    dims: &[usize],
    keep: usize,
    factors: &[ArrayView2<T>],
) -> KernelResult<Array2<T>>
where
    T: Float,
{
    if dims.is_empty() {
        return Err(KernelError::empty_input("reduce_modes", "dims"));
    }
    if keep >= dims.len() {
        return Err(KernelError::invalid_mode("reduce_modes", keep, dims.len()));
    }
    if factors.len() + 1 != dims.len() {
        return Err(KernelError::dimension_mismatch(
            "reduce_modes",
            vec![dims.len() - 1],
            vec![factors.len()],
            "one factor per contracted axis",
        ));
    }

    let rank = seed.ncols();
    let total: usize = dims.iter().product();
    if seed.nrows() != total {
        return Err(KernelError::dimension_mismatch(
            "reduce_modes",
            vec![total, rank],
            vec![seed.nrows(), rank],
            format!("seed rows must equal the product of {:?}", dims),
        ));
    }

    for (axis, factor) in contracted_axes(dims.len(), keep).zip(factors) {
        if factor.dim() != (dims[axis], rank) {
            return Err(KernelError::dimension_mismatch(
                "reduce_modes",
                vec![dims[axis], rank],
                factor.shape().to_vec(),
                format!("factor for axis {}", axis),
            ));
        }
    }

    let mut current = seed.as_standard_layout().into_owned();
    let mut outer = total;
    let mut group = 1;
    let mut next_factor = factors.len();

    for axis in (0..dims.len()).rev() {
        let extent = dims[axis];
        outer /= extent;

        if axis == keep {
            group = extent;
            continue;
        }

        next_factor -= 1;
        let view = current
            .view()
            .into_shape_with_order((outer, extent, group * rank))
            .map_err(|e| {
                KernelError::dimension_mismatch(
                    "reduce_modes",
                    vec![outer, extent, group * rank],
                    current.shape().to_vec(),
                    e.to_string(),
                )
            })?;
        current = hadamard_contract(&view, &factors[next_factor])?;
    }

    // `current` is (1, d_keep * R) or, with no contraction at all, (d_keep, R)
    let kept = dims[keep];
    let reduced = current
        .view()
        .into_shape_with_order((kept, rank))
        .map_err(|e| {
            KernelError::dimension_mismatch(
                "reduce_modes",
                vec![kept, rank],
                current.shape().to_vec(),
                e.to_string(),
            )
        })?
        .to_owned();
    Ok(reduced)
}

fn contracted_axes(ndim: usize, keep: usize) -> impl Iterator<Item = usize> {
    (0..ndim).filter(move |&axis| axis != keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    /// Brute-force reference over a 3-axis intermediate
    fn reference_3(
        seed: &Array2<f64>,
        dims: [usize; 3],
        keep: usize,
        factors: &[Array2<f64>],
    ) -> Array2<f64> {
        let rank = seed.ncols();
        let mut out = Array2::<f64>::zeros((dims[keep], rank));
        let others: Vec<usize> = (0..3).filter(|&a| a != keep).collect();
        for i in 0..dims[0] {
            for j in 0..dims[1] {
                for k in 0..dims[2] {
                    let idx = [i, j, k];
                    let row = (i * dims[1] + j) * dims[2] + k;
                    for r in 0..rank {
                        let mut v = seed[[row, r]];
                        for (f, &axis) in factors.iter().zip(&others) {
                            v *= f[[idx[axis], r]];
                        }
                        out[[idx[keep], r]] += v;
                    }
                }
            }
        }
        out
    }

    fn filled(rows: usize, cols: usize, offset: f64) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(i, j)| {
            ((i * cols + j) as f64 * 0.37 + offset).sin()
        })
    }

    #[test]
    fn test_hadamard_contract_groups() {
        // outer = 1, mid = 2, groups = 2, rank = 1
        let t = ArrayView3::from_shape((1, 2, 2), &[1.0f64, 2.0, 3.0, 4.0][..]).unwrap();
        let a = array![[10.0], [100.0]];
        let out = hadamard_contract(&t, &a.view()).unwrap();
        assert_eq!(out, array![[310.0, 420.0]]);
    }

    #[test]
    fn test_hadamard_contract_rejects_bad_factor() {
        let t = ArrayView3::from_shape((1, 2, 3), &[0.0f64; 6][..]).unwrap();
        let a = Array2::<f64>::ones((2, 2));
        assert!(matches!(
            hadamard_contract(&t, &a.view()),
            Err(KernelError::RankMismatch { .. })
        ));
        let b = Array2::<f64>::ones((3, 3));
        assert!(hadamard_contract(&t, &b.view()).is_err());
    }

    #[test]
    fn test_reduce_modes_matches_reference_for_every_keep() {
        let dims = [2, 3, 4];
        let rank = 2;
        let seed = filled(24, rank, 0.1);
        for keep in 0..3 {
            let factors: Vec<Array2<f64>> = (0..3)
                .filter(|&a| a != keep)
                .map(|a| filled(dims[a], rank, a as f64))
                .collect();
            let views: Vec<_> = factors.iter().map(|f| f.view()).collect();
            let got = reduce_modes(seed.clone(), &dims, keep, &views).unwrap();
            let expected = reference_3(&seed, dims, keep, &factors);
            assert_eq!(got.shape(), &[dims[keep], rank]);
            for (g, e) in got.iter().zip(expected.iter()) {
                assert!((g - e).abs() < 1e-12, "keep {}: {} vs {}", keep, g, e);
            }
        }
    }

    #[test]
    fn test_reduce_modes_single_axis_is_identity() {
        let seed = filled(5, 3, 0.0);
        let got = reduce_modes(seed.clone(), &[5], 0, &[]).unwrap();
        assert_eq!(got, seed);
    }

    #[test]
    fn test_reduce_modes_validation() {
        let seed = Array2::<f64>::ones((6, 2));
        let a = Array2::<f64>::ones((3, 2));
        assert!(reduce_modes(seed.clone(), &[2, 3], 2, &[a.view()]).is_err());
        assert!(reduce_modes(seed.clone(), &[2, 3], 0, &[]).is_err());
        assert!(reduce_modes(seed.clone(), &[2, 4], 0, &[a.view()]).is_err());
        // factor for axis 1 must have 3 rows
        let wrong = Array2::<f64>::ones((2, 2));
        assert!(reduce_modes(seed, &[2, 3], 0, &[wrong.view()]).is_err());
    }
}
