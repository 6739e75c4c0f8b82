//! Factor Store and the decomposition result
//!
//! Representative modes own their factor matrix. A mode aliased to an earlier
//! one holds only the index of its representative and resolves to the same
//! matrix, so it can never be optimized on its own.

use crate::error::{DfCpError, DfCpResult};
use crate::scalar::DfScalar;
use cpdf_core::DenseND;
use cpdf_kernels::{gram_hadamard, gram_matrix, khatri_rao_all};
use scirs2_core::ndarray_ext::{Array1, Array2};

/// Storage of one mode's factor
#[derive(Debug, Clone, PartialEq)]
pub enum FactorSlot<T> {
    /// Independently optimized factor, `extent × R`
    Owned(Array2<T>),
    /// Shares the factor of the given (earlier) representative mode
    Alias(usize),
}

/// Factor matrices of every non-connecting mode plus the weight vector
///
/// All owned matrices carry the same column count, equal to the weight
/// vector's length. A store of rank zero is empty.
#[derive(Debug, Clone)]
pub struct FactorStore<T> {
    slots: Vec<FactorSlot<T>>,
    weights: Array1<T>,
}

impl<T: DfScalar> FactorStore<T> {
    /// Empty store for modes with the given extents
    ///
    /// `symmetries[i]` must be `i` or an earlier mode. Alias chains are
    /// collapsed so every alias points straight at its representative.
    pub fn new(extents: &[usize], symmetries: &[usize]) -> DfCpResult<Self> {
        if symmetries.len() != extents.len() {
            return Err(DfCpError::SymmetryLengthMismatch {
                expected: extents.len(),
                actual: symmetries.len(),
            });
        }

        let mut representatives = Vec::with_capacity(extents.len());
        let mut slots = Vec::with_capacity(extents.len());
        for (mode, (&target, &extent)) in symmetries.iter().zip(extents).enumerate() {
            if target > mode {
                return Err(DfCpError::InvalidSymmetry { mode, target });
            }
            if target == mode {
                representatives.push(mode);
                slots.push(FactorSlot::Owned(Array2::zeros((extent, 0))));
                continue;
            }

            let rep = representatives[target];
            if extents[rep] != extent {
                return Err(DfCpError::InvalidSymmetry { mode, target });
            }
            representatives.push(rep);
            slots.push(FactorSlot::Alias(rep));
        }

        Ok(Self {
            slots,
            weights: Array1::zeros(0),
        })
    }

    /// Number of modes
    pub fn ndim(&self) -> usize {
        self.slots.len()
    }

    /// Current CP rank, zero before initialization
    pub fn rank(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rank() == 0
    }

    /// Mode whose matrix `mode` resolves to
    pub fn representative(&self, mode: usize) -> usize {
        match self.slots[mode] {
            FactorSlot::Owned(_) => mode,
            FactorSlot::Alias(rep) => rep,
        }
    }

    pub fn is_representative(&self, mode: usize) -> bool {
        self.representative(mode) == mode
    }

    pub fn slot(&self, mode: usize) -> &FactorSlot<T> {
        &self.slots[mode]
    }

    /// Factor matrix of `mode`, aliases resolved
    ///
    /// # Panics
    ///
    /// Panics if `mode >= self.ndim()`.
    pub fn factor(&self, mode: usize) -> &Array2<T> {
        match &self.slots[mode] {
            FactorSlot::Owned(matrix) => matrix,
            FactorSlot::Alias(rep) => match &self.slots[*rep] {
                FactorSlot::Owned(matrix) => matrix,
                // Construction collapses alias chains
                FactorSlot::Alias(_) => unreachable!("alias of an alias"),
            },
        }
    }

    /// Every mode's factor in mode order, aliases resolved
    pub fn factors(&self) -> impl Iterator<Item = &Array2<T>> + '_ {
        (0..self.ndim()).map(move |mode| self.factor(mode))
    }

    pub fn weights(&self) -> &Array1<T> {
        &self.weights
    }

    /// Hadamard product of the Gram matrices of every mode except `skip`
    pub fn gram_hadamard_except(&self, skip: usize) -> DfCpResult<Array2<T>> {
        let grams: Vec<Array2<T>> = (0..self.ndim())
            .filter(|&mode| mode != skip)
            .map(|mode| gram_matrix(&self.factor(mode).view()))
            .collect();
        Ok(gram_hadamard(grams.iter(), self.rank())?)
    }

    /// Replace a representative's factor and the weight vector
    pub(crate) fn set_factor(&mut self, mode: usize, factor: Array2<T>, weights: Array1<T>) {
        debug_assert!(self.is_representative(mode));
        debug_assert_eq!(factor.ncols(), weights.len());
        self.slots[mode] = FactorSlot::Owned(factor);
        self.weights = weights;
    }

    /// Install a complete set of representative factors at once
    ///
    /// `factors` holds one matrix per representative mode, in mode order.
    pub(crate) fn install(&mut self, factors: Vec<Array2<T>>, weights: Array1<T>) {
        let mut incoming = factors.into_iter();
        for slot in self.slots.iter_mut() {
            if let FactorSlot::Owned(current) = slot {
                if let Some(next) = incoming.next() {
                    debug_assert_eq!(next.ncols(), weights.len());
                    *current = next;
                }
            }
        }
        self.weights = weights;
    }

    /// Snapshot as a standalone decomposition with aliases materialized
    pub fn to_decomp(&self, iters: usize) -> DfCpResult<CpDecomp<T>> {
        if self.is_empty() {
            return Err(DfCpError::NotComputed);
        }
        Ok(CpDecomp {
            factors: self.factors().cloned().collect(),
            weights: self.weights.clone(),
            iters,
        })
    }
}

/// CP decomposition result
///
/// Represents the target as `Σᵣ λᵣ a₀ᵣ ∘ a₁ᵣ ∘ ... ∘ aₙᵣ` with unit-norm factor
/// columns and the norms collected in `weights`.
#[derive(Debug, Clone)]
pub struct CpDecomp<T> {
    /// Factor matrices, one per non-connecting mode, each `extent × R`
    pub factors: Vec<Array2<T>>,

    /// Component weights λ, length `R`
    pub weights: Array1<T>,

    /// ALS sweeps performed so far by the producing decomposition
    pub iters: usize,
}

impl<T: DfScalar> CpDecomp<T> {
    pub fn rank(&self) -> usize {
        self.weights.len()
    }

    /// Mode extents of the reconstructed tensor
    pub fn shape(&self) -> Vec<usize> {
        self.factors.iter().map(|f| f.nrows()).collect()
    }

    /// Rebuild the dense approximation
    ///
    /// The first factor is rescaled by the weights, the Khatri-Rao product of
    /// all but the last factor is formed and contracted with the last one.
    pub fn reconstruct(&self) -> DfCpResult<DenseND<T>> {
        let (last, leading) = self.factors.split_last().ok_or(DfCpError::NotComputed)?;
        let (first, middle) = leading.split_first().ok_or_else(|| {
            DfCpError::Tensor("reconstruction needs at least two modes".to_string())
        })?;

        let scaled = first * &self.weights;
        let mut views = Vec::with_capacity(leading.len());
        views.push(scaled.view());
        views.extend(middle.iter().map(|f| f.view()));

        let krp = khatri_rao_all(&views)?;
        let matrix = krp.dot(&last.t());
        Ok(DenseND::from_matrix(&matrix, &self.shape())?)
    }
}
