//! Norms and element-wise arithmetic

use super::types::DenseND;
use scirs2_core::numeric::{Float, Num};

impl<T> DenseND<T>
where
    T: Float,
{
    /// Frobenius norm: `sqrt(Σ x²)` over all elements
    ///
    /// # Examples
    ///
    /// ```
    /// use cpdf_core::DenseND;
    ///
    /// let tensor = DenseND::<f64>::ones(&[2, 3]);
    /// assert!((tensor.frobenius_norm() - 6.0_f64.sqrt()).abs() < 1e-12);
    /// ```
    pub fn frobenius_norm(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, &x| acc + x * x)
            .sqrt()
    }

    /// Frobenius norm of `self - other` without allocating the difference.
    ///
    /// # Errors
    ///
    /// Fails if the shapes differ.
    pub fn distance(&self, other: &Self) -> anyhow::Result<T> {
        if !self.same_shape(other) {
            anyhow::bail!(
                "Shape mismatch in distance: {:?} vs {:?}",
                self.shape(),
                other.shape()
            );
        }
        let sum = self
            .data
            .iter()
            .zip(other.data.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + (a - b) * (a - b));
        Ok(sum.sqrt())
    }
}

impl<'b, T> std::ops::Sub<&'b DenseND<T>> for &DenseND<T>
where
    T: Clone + Num,
{
    type Output = DenseND<T>;

    /// # Panics
    ///
    /// Panics if the shapes differ.
    fn sub(self, rhs: &'b DenseND<T>) -> Self::Output {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "Shapes must match for subtraction: {:?} vs {:?}",
            self.shape(),
            rhs.shape()
        );
        DenseND {
            data: &self.data - &rhs.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_matches_sub_norm() {
        let a = DenseND::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let b = DenseND::from_vec(vec![0.5, 2.0, 1.0, 4.0], &[2, 2]).unwrap();
        let via_sub = (&a - &b).frobenius_norm();
        let direct = a.distance(&b).unwrap();
        assert!((via_sub - direct).abs() < 1e-14);
        assert!((direct - (0.25_f64 + 4.0).sqrt()).abs() < 1e-14);
    }

    #[test]
    fn test_distance_shape_mismatch() {
        let a = DenseND::<f64>::zeros(&[2, 2]);
        let b = DenseND::<f64>::zeros(&[4]);
        assert!(a.distance(&b).is_err());
    }
}
