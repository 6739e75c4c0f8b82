//! Mode update: the MtKRP of one mode by direct contraction
//!
//! For a mode on the "near" side, the "far" reference tensor is first
//! reduced to `K (X × R)`: one GEMM contracts its last axis with that axis's
//! factor, then every remaining non-connecting axis is Hadamard-contracted
//! away. A second GEMM `B_nearᵀ · K` contracts the connecting axis and the
//! near side's other axes are Hadamard-contracted, leaving `extent(n) × R`.
//! The Khatri-Rao product of the other factors is never formed.

use crate::error::DfCpResult;
use crate::factors::FactorStore;
use crate::reference::{ReferencePair, Side};
use crate::scalar::DfScalar;
use cpdf_kernels::reduce_modes;
use scirs2_core::ndarray_ext::{Array2, ArrayView2};

/// Contract `side`'s tensor against all of its factors, leaving `(X × R)`
pub(crate) fn connecting_intermediate<T: DfScalar>(
    pair: &ReferencePair<T>,
    store: &FactorStore<T>,
    side: Side,
) -> DfCpResult<Array2<T>> {
    let tensor = pair.tensor(side);
    let modes = pair.modes_of(side);
    let last_mode = modes.end - 1;

    let trailing = tensor.matricize_trailing()?;
    let seed = trailing.dot(store.factor(last_mode));

    // Axes (X, c_1, ..., c_{m-1}); the connecting axis survives
    let dims = &tensor.shape()[..tensor.rank() - 1];
    let factors: Vec<ArrayView2<T>> = (modes.start..last_mode)
        .map(|mode| store.factor(mode).view())
        .collect();

    Ok(reduce_modes(seed, dims, 0, &factors)?)
}

/// MtKRP of `mode`: the target's mode unfolding times the Khatri-Rao product
/// of every other factor, shape `extent(mode) × R`
pub fn mtkrp<T: DfScalar>(
    pair: &ReferencePair<T>,
    store: &FactorStore<T>,
    mode: usize,
) -> DfCpResult<Array2<T>> {
    let (side, local) = pair.locate(mode);
    let far = match side {
        Side::Left => Side::Right,
        Side::Right => Side::Left,
    };

    let k = connecting_intermediate(pair, store, far)?;

    let near = pair.tensor(side);
    let leading = near.matricize_leading()?;
    let seed = leading.t().dot(&k);

    let dims = &near.shape()[1..];
    let factors: Vec<ArrayView2<T>> = pair
        .modes_of(side)
        .filter(|&other| other != mode)
        .map(|other| store.factor(other).view())
        .collect();

    Ok(reduce_modes(seed, dims, local, &factors)?)
}
