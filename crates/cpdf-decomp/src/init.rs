//! Initial guesses and rank extension
//!
//! Random columns are drawn from N(0, 2) and normalised. Extending an
//! existing store only touches the new columns, so the first `R` columns of
//! every factor stay bit-identical.

use crate::error::{DfCpError, DfCpResult};
use crate::factors::FactorStore;
use crate::scalar::DfScalar;
use cpdf_kernels::normalize_columns_from;
use scirs2_core::ndarray_ext::{Array1, Array2};
use scirs2_core::random::{Distribution, RandNormal as Normal, Rng};

#[cfg(feature = "linalg")]
use cpdf_core::DenseND;
#[cfg(feature = "linalg")]
use cpdf_kernels::normalize_columns;
#[cfg(feature = "linalg")]
use scirs2_core::ndarray_ext::s;
#[cfg(feature = "linalg")]
use scirs2_linalg::{eigh, qr};

/// Eigenvectors overlapping an accepted one by more than this are replaced
#[cfg(feature = "linalg")]
const OVERLAP_TOL: f64 = 1e-6;

const RANDOM_STD_DEV: f64 = 2.0;

fn normal() -> DfCpResult<Normal<f64>> {
    Normal::new(0.0, RANDOM_STD_DEV)
        .map_err(|e| DfCpError::Tensor(format!("normal distribution: {}", e)))
}

/// Fill columns `from..` of `factor` with normal samples
fn fill_random<T, R>(factor: &mut Array2<T>, from: usize, dist: &Normal<f64>, rng: &mut R)
where
    T: DfScalar,
    R: Rng + ?Sized,
{
    for j in from..factor.ncols() {
        fill_column(factor, j, dist, rng);
    }
}

fn fill_column<T, R>(factor: &mut Array2<T>, j: usize, dist: &Normal<f64>, rng: &mut R)
where
    T: DfScalar,
    R: Rng + ?Sized,
{
    for i in 0..factor.nrows() {
        factor[[i, j]] = T::from_f64(dist.sample(rng)).unwrap_or_else(T::zero);
    }
}

/// Grow every representative factor to `target` columns
///
/// New columns are random and unit-norm, new weights are one. Nothing is
/// written until every mode's matrix is complete.
pub(crate) fn extend_random<T, R>(
    store: &mut FactorStore<T>,
    target: usize,
    rng: &mut R,
) -> DfCpResult<()>
where
    T: DfScalar,
    R: Rng + ?Sized,
{
    let current = store.rank();
    if target <= current {
        return Ok(());
    }
    let dist = normal()?;

    let mut extended = Vec::new();
    for mode in 0..store.ndim() {
        if !store.is_representative(mode) {
            continue;
        }
        let old = store.factor(mode);
        let mut factor = Array2::<T>::zeros((old.nrows(), target));
        for i in 0..old.nrows() {
            for j in 0..current {
                factor[[i, j]] = old[[i, j]];
            }
        }
        fill_random(&mut factor, current, &dist, rng);
        normalize_columns_from(&mut factor, current);
        extended.push(factor);
    }

    let mut weights = Array1::<T>::ones(target);
    for (r, &w) in store.weights().iter().enumerate() {
        weights[r] = w;
    }

    store.install(extended, weights);
    Ok(())
}

/// Singular-vector guess at `svd_rank` from the materialized target
///
/// Each representative mode takes the leading eigenvectors of the Gram
/// matrix of its unfolding; columns beyond the extent are random.
///
/// With repeated eigenvalues the backend may hand back duplicate vectors.
/// Those are swapped for random columns and the kept block is
/// re-orthonormalized with a QR factorization, so the seed always has
/// orthonormal leading columns.
#[cfg(feature = "linalg")]
pub(crate) fn svd_guess<T, R>(
    target: &DenseND<T>,
    store: &mut FactorStore<T>,
    svd_rank: usize,
    rng: &mut R,
) -> DfCpResult<()>
where
    T: DfScalar,
    R: Rng + ?Sized,
{
    if svd_rank == 0 {
        return Err(DfCpError::MissingInitialGuessRank);
    }
    let dist = normal()?;

    let mut factors = Vec::new();
    for mode in 0..store.ndim() {
        if !store.is_representative(mode) {
            continue;
        }
        let unfolded = target.unfold(mode)?;
        let gram = unfolded.dot(&unfolded.t());
        let (values, vectors) =
            eigh(&gram.view(), None).map_err(|e| DfCpError::EigenFailed(e.to_string()))?;

        let extent = gram.nrows();
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| {
            values[b]
                .partial_cmp(&values[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let kept = extent.min(svd_rank).min(order.len());
        let block = leading_block(&vectors, &order[..kept], &dist, rng);
        let (q, _r) = qr(&block.view(), None).map_err(|e| DfCpError::EigenFailed(e.to_string()))?;
        if q.ncols() < kept {
            return Err(DfCpError::EigenFailed(format!(
                "QR of mode {} returned {} columns, need {}",
                mode,
                q.ncols(),
                kept
            )));
        }
        let basis = q.slice(s![.., ..kept]).to_owned();
        if !is_orthonormal(&basis) {
            return Err(DfCpError::EigenFailed(format!(
                "could not build an orthonormal basis for mode {}",
                mode
            )));
        }

        let mut factor = Array2::<T>::zeros((extent, svd_rank));
        factor.slice_mut(s![.., ..kept]).assign(&basis);
        fill_random(&mut factor, kept, &dist, rng);
        normalize_columns(&mut factor);
        factors.push(factor);
    }

    store.install(factors, Array1::ones(svd_rank));
    Ok(())
}

/// Selected eigenvectors as unit columns; duplicates and non-finite vectors
/// become random columns
#[cfg(feature = "linalg")]
fn leading_block<T, R>(
    vectors: &Array2<T>,
    order: &[usize],
    dist: &Normal<f64>,
    rng: &mut R,
) -> Array2<T>
where
    T: DfScalar,
    R: Rng + ?Sized,
{
    let overlap_tol = T::from_f64(OVERLAP_TOL).unwrap_or_else(T::epsilon);
    let mut block = Array2::<T>::zeros((vectors.nrows(), order.len()));
    let mut accepted = Vec::with_capacity(order.len());

    for (j, &col) in order.iter().enumerate() {
        let candidate = vectors.column(col);
        let norm = candidate.dot(&candidate).sqrt();
        let independent = norm.is_finite()
            && norm > T::epsilon()
            && accepted
                .iter()
                .all(|&k: &usize| (block.column(k).dot(&candidate) / norm).abs() < overlap_tol);

        if independent {
            block.column_mut(j).assign(&candidate.mapv(|x| x / norm));
            accepted.push(j);
        } else {
            fill_column(&mut block, j, dist, rng);
        }
    }
    block
}

#[cfg(feature = "linalg")]
fn is_orthonormal<T: DfScalar>(basis: &Array2<T>) -> bool {
    let tol = T::from_f64(1e-8).unwrap_or_else(T::epsilon);
    let gram = basis.t().dot(basis);
    gram.indexed_iter().all(|((i, j), &g)| {
        let expected = if i == j { T::one() } else { T::zero() };
        g.is_finite() && (g - expected).abs() < tol
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::random::rngs::StdRng;
    use scirs2_core::random::SeedableRng;

    fn column_norm(f: &Array2<f64>, c: usize) -> f64 {
        f.column(c).iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    #[test]
    fn test_extend_from_empty() {
        let mut store = FactorStore::<f64>::new(&[3, 4], &[0, 1]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        extend_random(&mut store, 1, &mut rng).unwrap();

        assert_eq!(store.rank(), 1);
        assert_eq!(store.factor(1).shape(), &[4, 1]);
        assert!((column_norm(store.factor(0), 0) - 1.0).abs() < 1e-12);
        assert_eq!(store.weights()[0], 1.0);
    }

    #[test]
    fn test_extend_preserves_prefix_bitwise() {
        let mut store = FactorStore::<f64>::new(&[3, 3, 2], &[0, 0, 2]).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        extend_random(&mut store, 2, &mut rng).unwrap();
        let before: Vec<Array2<f64>> = store.factors().cloned().collect();

        extend_random(&mut store, 5, &mut rng).unwrap();
        for (old, new) in before.iter().zip(store.factors()) {
            assert_eq!(new.ncols(), 5);
            for i in 0..old.nrows() {
                for j in 0..2 {
                    assert_eq!(old[[i, j]].to_bits(), new[[i, j]].to_bits());
                }
            }
            for c in 2..5 {
                assert!((column_norm(new, c) - 1.0).abs() < 1e-12);
            }
        }
        assert_eq!(store.factor(1), store.factor(0));
    }

    #[test]
    fn test_extend_to_smaller_rank_is_noop() {
        let mut store = FactorStore::<f64>::new(&[2, 2], &[0, 1]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        extend_random(&mut store, 3, &mut rng).unwrap();
        let snapshot = store.factor(0).clone();
        extend_random(&mut store, 2, &mut rng).unwrap();
        assert_eq!(store.rank(), 3);
        assert_eq!(store.factor(0), &snapshot);
    }

    #[cfg(feature = "linalg")]
    #[test]
    fn test_svd_guess_recovers_rank_one_directions() {
        // T = u ∘ v with u = (3, 4)/5 and v = (1, 0, 0)
        let mut target = DenseND::<f64>::zeros(&[2, 3]);
        target.fill_with(|idx| {
            let u = [0.6, 0.8][idx[0]];
            let v = [1.0, 0.0, 0.0][idx[1]];
            u * v
        });
        let mut store = FactorStore::<f64>::new(&[2, 3], &[0, 1]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        svd_guess(&target, &mut store, 3, &mut rng).unwrap();

        assert_eq!(store.rank(), 3);
        let a = store.factor(0);
        assert!((a[[0, 0]].abs() - 0.6).abs() < 1e-10);
        assert!((a[[1, 0]].abs() - 0.8).abs() < 1e-10);
        let b = store.factor(1);
        assert!((b[[0, 0]].abs() - 1.0).abs() < 1e-10);
        for c in 0..3 {
            assert!((column_norm(a, c) - 1.0).abs() < 1e-12);
        }
    }

    #[cfg(feature = "linalg")]
    #[test]
    fn test_svd_guess_identity_target_is_orthonormal() {
        // Every eigenvalue of the unfolding Grams is 1
        let mut target = DenseND::<f64>::zeros(&[3, 3]);
        target.fill_with(|idx| if idx[0] == idx[1] { 1.0 } else { 0.0 });
        let mut store = FactorStore::<f64>::new(&[3, 3], &[0, 1]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        svd_guess(&target, &mut store, 3, &mut rng).unwrap();

        for mode in 0..2 {
            let f = store.factor(mode);
            let gram = f.t().dot(f);
            for ((i, j), &g) in gram.indexed_iter() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((g - expected).abs() < 1e-8, "mode {} gram[{}, {}] = {}", mode, i, j, g);
            }
        }
    }

    #[cfg(feature = "linalg")]
    #[test]
    fn test_leading_block_replaces_duplicates() {
        let v = std::f64::consts::FRAC_1_SQRT_2;
        let vectors = Array2::from_shape_vec((2, 2), vec![v, v, v, v]).unwrap();
        let dist = normal().unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let block = leading_block(&vectors, &[0, 1], &dist, &mut rng);

        assert!((block[[0, 0]] - v).abs() < 1e-12);
        assert!((block[[1, 0]] - v).abs() < 1e-12);
        assert!((block[[0, 1]] - block[[1, 1]]).abs() > 1e-6);
    }

    #[cfg(feature = "linalg")]
    #[test]
    fn test_svd_guess_rejects_zero_rank() {
        let target = DenseND::<f64>::ones(&[2, 2]);
        let mut store = FactorStore::<f64>::new(&[2, 2], &[0, 1]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            svd_guess(&target, &mut store, 0, &mut rng),
            Err(DfCpError::MissingInitialGuessRank)
        ));
        assert!(store.is_empty());
    }
}
