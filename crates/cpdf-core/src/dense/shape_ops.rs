//! Unfoldings and zero-copy matrix views
//!
//! A matrix view borrows the tensor immutably; the reference tensors are
//! never reshaped in place.

use super::types::DenseND;
use scirs2_core::ndarray_ext::{Array2, ArrayView2, IxDyn};
use scirs2_core::numeric::Num;

impl<T> DenseND<T>
where
    T: Clone + Num,
{
    /// Unfold (matricize) the tensor along `mode`.
    ///
    /// Row `i` of the result holds every element whose `mode` index is `i`,
    /// the remaining modes flattened in their original order.
    ///
    /// # Examples
    ///
    /// ```
    /// use cpdf_core::DenseND;
    ///
    /// let tensor = DenseND::<f64>::ones(&[2, 3, 4]);
    /// let unfolded = tensor.unfold(1).unwrap();
    /// assert_eq!(unfolded.shape(), &[3, 8]);
    /// ```
    pub fn unfold(&self, mode: usize) -> anyhow::Result<Array2<T>> {
        if mode >= self.rank() {
            anyhow::bail!("Mode {} out of bounds for rank {}", mode, self.rank());
        }

        let rows = self.extent(mode);
        let cols = if rows == 0 { 0 } else { self.len() / rows };

        let mut order = Vec::with_capacity(self.rank());
        order.push(mode);
        order.extend((0..self.rank()).filter(|&m| m != mode));

        let moved = self.data.view().permuted_axes(IxDyn(&order));
        let flat: Vec<T> = moved.iter().cloned().collect();
        Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| anyhow::anyhow!("Failed to unfold mode {}: {}", mode, e))
    }

    /// Borrow the storage as a `rows × cols` row-major matrix.
    ///
    /// # Errors
    ///
    /// Fails if `rows * cols` differs from the element count or if the
    /// tensor is not contiguous.
    ///
    /// # Examples
    ///
    /// ```
    /// use cpdf_core::DenseND;
    ///
    /// let tensor = DenseND::from_vec((0..6).map(f64::from).collect(), &[1, 2, 3]).unwrap();
    /// let m = tensor.as_matrix(2, 3).unwrap();
    /// assert_eq!(m[[1, 0]], 3.0);
    /// ```
    pub fn as_matrix(&self, rows: usize, cols: usize) -> anyhow::Result<ArrayView2<'_, T>> {
        if rows * cols != self.len() {
            anyhow::bail!(
                "Cannot view tensor of shape {:?} ({} elements) as a {}x{} matrix",
                self.shape(),
                self.len(),
                rows,
                cols
            );
        }
        if !self.is_contiguous() {
            anyhow::bail!("Matrix view requires a contiguous tensor");
        }
        self.data
            .view()
            .into_shape_with_order((rows, cols))
            .map_err(|e| anyhow::anyhow!("Failed to view tensor as matrix: {}", e))
    }

    /// View as `(extent(0), rest)`: the leading mode becomes the rows.
    pub fn matricize_leading(&self) -> anyhow::Result<ArrayView2<'_, T>> {
        if self.rank() == 0 {
            anyhow::bail!("Cannot matricize a rank-0 tensor");
        }
        let rows = self.extent(0);
        let cols = if rows == 0 { 0 } else { self.len() / rows };
        self.as_matrix(rows, cols)
    }

    /// View as `(rest, extent(rank - 1))`: the trailing mode becomes the columns.
    pub fn matricize_trailing(&self) -> anyhow::Result<ArrayView2<'_, T>> {
        if self.rank() == 0 {
            anyhow::bail!("Cannot matricize a rank-0 tensor");
        }
        let cols = self.extent(self.rank() - 1);
        let rows = if cols == 0 { 0 } else { self.len() / cols };
        self.as_matrix(rows, cols)
    }

    /// Build a tensor of the given shape from a matrix's row-major elements.
    pub fn from_matrix(matrix: &Array2<T>, shape: &[usize]) -> anyhow::Result<Self> {
        Self::from_vec(matrix.iter().cloned().collect(), shape)
    }
}
