//! The density-fitted reference pair `(L, R)`
//!
//! `L` has shape `(X, a_1, ..., a_p)` and `R` has shape `(X, b_1, ..., b_q)`.
//! The target is `T(a_1, ..., a_p, b_1, ..., b_q) = Σ_x L(x, a..) R(x, b..)`,
//! an order `p + q` tensor whose modes are numbered left side first.

use crate::error::{DfCpError, DfCpResult};
use crate::scalar::DfScalar;
use cpdf_core::DenseND;

/// Which reference tensor a CP mode lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct ReferencePair<T> {
    left: DenseND<T>,
    right: DenseND<T>,
}

impl<T: DfScalar> ReferencePair<T> {
    /// Validate and wrap the two reference tensors
    ///
    /// Both need at least one mode besides the connecting one, equal
    /// connecting extents and contiguous storage.
    pub fn new(left: DenseND<T>, right: DenseND<T>) -> DfCpResult<Self> {
        for (name, tensor) in [("left", &left), ("right", &right)] {
            if tensor.rank() < 2 {
                return Err(DfCpError::InvalidReference(format!(
                    "{} tensor has rank {}, need at least 2",
                    name,
                    tensor.rank()
                )));
            }
            if !tensor.is_contiguous() {
                return Err(DfCpError::InvalidReference(format!(
                    "{} tensor is not contiguous",
                    name
                )));
            }
            if tensor.is_empty() {
                return Err(DfCpError::InvalidReference(format!(
                    "{} tensor has no elements",
                    name
                )));
            }
        }
        if left.extent(0) != right.extent(0) {
            return Err(DfCpError::InvalidReference(format!(
                "connecting dimensions differ: {} vs {}",
                left.extent(0),
                right.extent(0)
            )));
        }
        Ok(Self { left, right })
    }

    pub fn left(&self) -> &DenseND<T> {
        &self.left
    }

    pub fn right(&self) -> &DenseND<T> {
        &self.right
    }

    /// Connecting extent `X`
    pub fn connecting_extent(&self) -> usize {
        self.left.extent(0)
    }

    /// Number of CP modes contributed by the left tensor
    pub fn left_modes(&self) -> usize {
        self.left.rank() - 1
    }

    /// Order of the CP model
    pub fn ndim(&self) -> usize {
        self.left.rank() + self.right.rank() - 2
    }

    /// Owning side of `mode` and its axis within that side's CP modes
    pub fn locate(&self, mode: usize) -> (Side, usize) {
        let p = self.left_modes();
        if mode < p {
            (Side::Left, mode)
        } else {
            (Side::Right, mode - p)
        }
    }

    pub fn tensor(&self, side: Side) -> &DenseND<T> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Global mode indices belonging to `side`
    pub fn modes_of(&self, side: Side) -> std::ops::Range<usize> {
        let p = self.left_modes();
        match side {
            Side::Left => 0..p,
            Side::Right => p..self.ndim(),
        }
    }

    /// Extents of the target tensor's modes
    pub fn extents(&self) -> Vec<usize> {
        self.left.shape()[1..]
            .iter()
            .chain(&self.right.shape()[1..])
            .copied()
            .collect()
    }

    /// Largest extent over every axis of both tensors, connecting one included
    pub fn max_extent(&self) -> usize {
        self.left
            .shape()
            .iter()
            .chain(self.right.shape())
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Materialize `T = Lᵀ R` as a dense tensor
    pub fn materialize(&self) -> DfCpResult<DenseND<T>> {
        let l = self.left.matricize_leading()?;
        let r = self.right.matricize_leading()?;
        let product = l.t().dot(&r);
        Ok(DenseND::from_matrix(&product, &self.extents())?)
    }

    /// Frobenius norm of the target without materializing it
    ///
    /// `‖Lᵀ R‖² = Σ (L Lᵀ) ∘ (R Rᵀ)` over the `X × X` connecting Grams.
    pub fn target_norm(&self) -> DfCpResult<T> {
        let l = self.left.matricize_leading()?;
        let r = self.right.matricize_leading()?;
        let gl = l.dot(&l.t());
        let gr = r.dot(&r.t());
        let sq = gl
            .iter()
            .zip(gr.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b);
        Ok(sq.max(T::zero()).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> ReferencePair<f64> {
        let left = DenseND::from_vec((0..12).map(|i| i as f64 * 0.5).collect(), &[2, 2, 3]).unwrap();
        let right = DenseND::from_vec(vec![1.0, -1.0, 2.0, 0.5, 0.0, 3.0, 1.0, 1.0], &[2, 4])
            .unwrap();
        ReferencePair::new(left, right).unwrap()
    }

    #[test]
    fn test_mode_layout() {
        let pair = pair();
        assert_eq!(pair.ndim(), 3);
        assert_eq!(pair.extents(), vec![2, 3, 4]);
        assert_eq!(pair.locate(1), (Side::Left, 1));
        assert_eq!(pair.locate(2), (Side::Right, 0));
        assert_eq!(pair.modes_of(Side::Right), 2..3);
        assert_eq!(pair.max_extent(), 4);
    }

    #[test]
    fn test_materialize_contracts_connecting_mode() {
        let pair = pair();
        let t = pair.materialize().unwrap();
        assert_eq!(t.shape(), &[2, 3, 4]);

        let (l, r) = (pair.left(), pair.right());
        let expected: f64 = (0..2).map(|x| l[&[x, 1, 2]] * r[&[x, 3]]).sum();
        assert!((t[&[1, 2, 3]] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_target_norm_matches_materialized() {
        let pair = pair();
        let t = pair.materialize().unwrap();
        assert!((pair.target_norm().unwrap() - t.frobenius_norm()).abs() < 1e-10);
    }

    #[test]
    fn test_rejects_bad_references() {
        let vector = DenseND::<f64>::ones(&[3]);
        let matrix = DenseND::<f64>::ones(&[3, 2]);
        assert!(ReferencePair::new(vector, matrix.clone()).is_err());

        let other = DenseND::<f64>::ones(&[4, 2]);
        assert!(matches!(
            ReferencePair::new(matrix, other),
            Err(DfCpError::InvalidReference(_))
        ));
    }
}
