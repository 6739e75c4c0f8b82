//! Property-based tests for the dense container
//!
//! The decomposition engine relies on matrix views agreeing element-for-element
//! with multi-index access; these properties pin that down.

#[cfg(test)]
mod tests {
    use crate::DenseND;
    use proptest::prelude::*;

    fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..6, 2..=4)
    }

    fn iota(shape: &[usize]) -> DenseND<f64> {
        let len: usize = shape.iter().product();
        DenseND::from_vec((0..len).map(|i| i as f64).collect(), shape).unwrap()
    }

    proptest! {
        #[test]
        fn prop_leading_view_matches_index(shape in shape_strategy()) {
            let tensor = iota(&shape);
            let view = tensor.matricize_leading().unwrap();
            let cols = tensor.len() / shape[0];

            for x in 0..shape[0] {
                for c in 0..cols {
                    prop_assert_eq!(view[[x, c]], (x * cols + c) as f64);
                }
            }
        }

        #[test]
        fn prop_trailing_view_keeps_last_mode(shape in shape_strategy()) {
            let tensor = iota(&shape);
            let view = tensor.matricize_trailing().unwrap();
            let last = *shape.last().unwrap();

            prop_assert_eq!(view.ncols(), last);
            prop_assert_eq!(view.nrows() * last, tensor.len());
        }

        #[test]
        fn prop_unfold_preserves_frobenius_norm(shape in shape_strategy(), mode in 0usize..4) {
            prop_assume!(mode < shape.len());
            let tensor = iota(&shape);
            let unfolded = tensor.unfold(mode).unwrap();
            let norm_sq: f64 = unfolded.iter().map(|x| x * x).sum();

            prop_assert_eq!(unfolded.nrows(), shape[mode]);
            prop_assert!((norm_sq.sqrt() - tensor.frobenius_norm()).abs() < 1e-9);
        }
    }
}
