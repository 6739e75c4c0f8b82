//! Solve stage for the ALS normal equations `A_n · V = MtKRP`
//!
//! `V` is symmetric, so each row `x` of the new factor satisfies `V x = m`
//! for the matching MtKRP row `m`. All rows are solved together.

use crate::error::{DfCpError, DfCpResult};
use crate::scalar::DfScalar;
use scirs2_core::ndarray_ext::Array2;

#[cfg(feature = "linalg")]
use scirs2_core::ndarray_ext::Array1;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "linalg")]
use scirs2_linalg::{lstsq, solve_multiple, svd};

/// Singular values at or below this are not inverted
pub const PINV_THRESHOLD: f64 = 1e-13;

/// Strategy the next mode update will use
///
/// Starts at `Direct`; the first failed direct solve switches the owning
/// decomposition to `PseudoInverse` for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolveMode {
    #[default]
    Direct,
    PseudoInverse,
}

/// Solve for a new factor, falling back to the pseudo-inverse when needed
///
/// With `fast_solve` off the pseudo-inverse is used without touching `mode`.
#[cfg(feature = "linalg")]
pub(crate) fn solve_factor<T: DfScalar>(
    mtkrp: &Array2<T>,
    v: &Array2<T>,
    fast_solve: bool,
    mode: &mut SolveMode,
) -> DfCpResult<Array2<T>> {
    if fast_solve && *mode == SolveMode::Direct {
        match direct_solve(mtkrp, v) {
            Ok(factor) => return Ok(factor),
            Err(reason) => {
                tracing::warn!(%reason, "direct solve failed, switching to pseudo-inverse");
                *mode = SolveMode::PseudoInverse;
            }
        }
    }

    let pinv = pseudo_inverse(v)?;
    Ok(mtkrp.dot(&pinv))
}

#[cfg(not(feature = "linalg"))]
pub(crate) fn solve_factor<T: DfScalar>(
    _mtkrp: &Array2<T>,
    _v: &Array2<T>,
    _fast_solve: bool,
    _mode: &mut SolveMode,
) -> DfCpResult<Array2<T>> {
    Err(DfCpError::MissingCapability("solving the ALS normal equations"))
}

/// Square solve of `x V = MtKRP` for all rows at once
///
/// `V` is factored a single time. Any backend error or non-finite entry is
/// a failure.
#[cfg(feature = "linalg")]
pub fn direct_solve<T: DfScalar>(mtkrp: &Array2<T>, v: &Array2<T>) -> Result<Array2<T>, String> {
    let x = solve_multiple(&v.t(), &mtkrp.t(), None).map_err(|e| e.to_string())?;
    if x.iter().any(|value| !value.is_finite()) {
        return Err("non-finite entries in the direct solution".to_string());
    }
    Ok(x.t().to_owned())
}

/// Moore-Penrose pseudo-inverse through an SVD
///
/// `V = U S Wᵀ` gives `V⁺ = W S⁺ Uᵀ`. Singular values at or below
/// [`PINV_THRESHOLD`] are passed through instead of inverted.
///
/// The SVD is only trusted when its factors are orthonormal and rebuild
/// `V`; repeated singular values can break both. Otherwise `V⁺` is
/// recovered from the inverse, or column by column from least-squares
/// solves against the identity, and checked with `V V⁺ V = V`.
///
/// # Errors
///
/// [`DfCpError::SvdFailed`] if `V` has non-finite entries, the SVD does
/// not converge, or no accurate pseudo-inverse could be recovered. There
/// is no further fallback.
#[cfg(feature = "linalg")]
pub fn pseudo_inverse<T: DfScalar>(v: &Array2<T>) -> DfCpResult<Array2<T>> {
    if v.iter().any(|value| !value.is_finite()) {
        return Err(DfCpError::SvdFailed(
            "normal-equations matrix has non-finite entries".to_string(),
        ));
    }

    let tol = accuracy_tolerance(v);
    let (u, s, wt) = svd(&v.view(), false, None).map_err(|e| DfCpError::SvdFailed(e.to_string()))?;

    if svd_is_accurate(v, &u, &s, &wt, tol) {
        let threshold = T::from_f64(PINV_THRESHOLD).unwrap_or_else(T::epsilon);
        let s_plus = s.mapv(|sigma| if sigma > threshold { T::one() / sigma } else { sigma });
        let scaled = &wt.t() * &s_plus;
        return Ok(scaled.dot(&u.t()));
    }

    tracing::debug!(rank = v.nrows(), "inaccurate SVD, recovering pseudo-inverse by least squares");
    pseudo_inverse_by_columns(v, tol)
}

/// Absolute tolerance for the accuracy checks, scaled by the size of `V`
#[cfg(feature = "linalg")]
fn accuracy_tolerance<T: DfScalar>(v: &Array2<T>) -> T {
    let scale = v.iter().fold(T::one(), |acc, x| acc.max(x.abs()));
    T::from_f64(1e-8).unwrap_or_else(T::epsilon) * scale
}

#[cfg(feature = "linalg")]
fn max_abs_diff<T: DfScalar>(a: &Array2<T>, b: &Array2<T>) -> T {
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| acc.max((x - y).abs()))
}

#[cfg(feature = "linalg")]
fn svd_is_accurate<T: DfScalar>(
    v: &Array2<T>,
    u: &Array2<T>,
    s: &Array1<T>,
    wt: &Array2<T>,
    tol: T,
) -> bool {
    let n = v.nrows();
    if u.dim() != (n, n) || wt.dim() != (n, n) || s.len() != n {
        return false;
    }
    if u.iter().chain(s.iter()).chain(wt.iter()).any(|x| !x.is_finite()) {
        return false;
    }

    let unit = T::from_f64(1e-8).unwrap_or_else(T::epsilon);
    let identity = Array2::<T>::eye(n);
    let rebuilt = (u * s).dot(wt);

    max_abs_diff(&u.t().dot(u), &identity) <= unit
        && max_abs_diff(&wt.dot(&wt.t()), &identity) <= unit
        && max_abs_diff(&rebuilt, v) <= tol
}

/// Inverse when `V` is nonsingular, otherwise minimum-norm least-squares
/// columns
#[cfg(feature = "linalg")]
fn pseudo_inverse_by_columns<T: DfScalar>(v: &Array2<T>, tol: T) -> DfCpResult<Array2<T>> {
    let n = v.nrows();
    let identity = Array2::<T>::eye(n);
    if let Ok(inverse) = solve_multiple(&v.view(), &identity.view(), None) {
        if inverse.iter().all(|x| x.is_finite())
            && max_abs_diff(&v.dot(&inverse).dot(v), v) <= tol
        {
            return Ok(inverse);
        }
    }

    let mut pinv = Array2::<T>::zeros((n, n));
    for j in 0..n {
        let mut e = Array1::<T>::zeros(n);
        e[j] = T::one();
        let column = lstsq(&v.view(), &e.view(), None)
            .map_err(|err| DfCpError::SvdFailed(err.to_string()))?;
        pinv.column_mut(j).assign(&column.x);
    }

    if pinv.iter().any(|x| !x.is_finite()) || max_abs_diff(&v.dot(&pinv).dot(v), v) > tol {
        return Err(DfCpError::SvdFailed(
            "could not recover an accurate pseudo-inverse".to_string(),
        ));
    }
    Ok(pinv)
}

#[cfg(not(feature = "linalg"))]
pub fn pseudo_inverse<T: DfScalar>(_v: &Array2<T>) -> DfCpResult<Array2<T>> {
    Err(DfCpError::MissingCapability("pseudo-inverse"))
}

#[cfg(all(test, feature = "linalg"))]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    fn spd() -> Array2<f64> {
        array![[4.0, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 2.0]]
    }

    #[test]
    fn test_pseudo_inverse_matches_direct_solve() {
        let v = spd();
        let m = array![[1.0, 2.0, 3.0], [-1.0, 0.5, 4.0]];

        let direct = direct_solve(&m, &v).unwrap();
        let pinv = m.dot(&pseudo_inverse(&v).unwrap());

        for (a, b) in direct.iter().zip(pinv.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_pseudo_inverse_of_invertible_is_inverse() {
        let v = spd();
        let product = v.dot(&pseudo_inverse(&v).unwrap());
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((product[[i, j]] - expected).abs() < 1e-10);
            }
        }
    }

    fn assert_right_inverse(v: &Array2<f64>, pinv: &Array2<f64>) {
        let product = v.dot(pinv);
        for ((i, j), &value) in product.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((value - expected).abs() < 1e-10, "V·V⁺[{}, {}] = {}", i, j, value);
        }
    }

    #[test]
    fn test_pseudo_inverse_of_identity() {
        let v = Array2::<f64>::eye(2);
        let pinv = pseudo_inverse(&v).unwrap();
        assert_right_inverse(&v, &pinv);

        let x = array![[1.0, 2.0]].dot(&pinv);
        assert!((x[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((x[[0, 1]] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pseudo_inverse_with_repeated_singular_values() {
        let eps = 1e-9;
        let v: Array2<f64> = array![[1.0, eps], [eps, 1.0]];
        assert_right_inverse(&v, &pseudo_inverse(&v).unwrap());

        let v3 = Array2::<f64>::eye(3) * 2.5;
        let pinv = pseudo_inverse(&v3).unwrap();
        assert_right_inverse(&v3, &pinv);
    }

    #[test]
    fn test_pseudo_inverse_rejects_non_finite() {
        let v: Array2<f64> = array![[1.0, f64::NAN], [0.0, 1.0]];
        assert!(matches!(pseudo_inverse(&v), Err(DfCpError::SvdFailed(_))));
    }

    #[test]
    fn test_direct_solve_all_rows() {
        let v = spd();
        let m = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [2.0, -1.0, 3.0], [0.5, 0.5, 0.5]];
        let x = direct_solve(&m, &v).unwrap();
        assert_eq!(x.dim(), (4, 3));

        let back = x.dot(&v);
        for (a, b) in back.iter().zip(m.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_singular_system_falls_back_and_sticks() {
        let v: Array2<f64> = array![[1.0, 1.0], [1.0, 1.0]];
        let m = array![[2.0, 2.0]];
        let mut mode = SolveMode::Direct;

        let x = solve_factor(&m, &v, true, &mut mode).unwrap();
        assert_eq!(mode, SolveMode::PseudoInverse);
        // Minimum-norm solution of x V = m
        assert!((x[[0, 0]] - 1.0).abs() < 1e-10);
        assert!((x[[0, 1]] - 1.0).abs() < 1e-10);

        let well_posed = spd();
        let rhs = array![[1.0, 0.0, 0.0]];
        solve_factor(&rhs, &well_posed, true, &mut mode).unwrap();
        assert_eq!(mode, SolveMode::PseudoInverse);
    }

    #[test]
    fn test_fast_solve_off_leaves_mode() {
        let mut mode = SolveMode::Direct;
        let v = spd();
        let m = array![[1.0, 1.0, 1.0]];
        solve_factor(&m, &v, false, &mut mode).unwrap();
        assert_eq!(mode, SolveMode::Direct);
    }
}
