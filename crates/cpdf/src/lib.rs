//! # cpdf - Density-fitted CP decomposition
//!
//! This is the **meta crate** that re-exports every component of the stack.
//!
//! ## Quick Start
//!
//! ```
//! use cpdf::prelude::*;
//!
//! let left = DenseND::<f64>::from_vec(vec![1.0, 0.0, 0.0, 1.0], &[2, 2])?;
//! let right = DenseND::<f64>::from_vec(vec![2.0, 0.0, 0.0, 1.0], &[2, 2])?;
//!
//! let mut als = DfCpAls::new(left, right)?;
//! let mut conv = NormCheck::new(1e-10);
//! let error = als.compute_rank(2, &mut conv, &AlsOptions::default().with_error(true))?;
//! assert!(error.unwrap() < 1e-8);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Components
//!
//! ### Dense Tensors ([`core`])
//!
//! Row-major tensors with zero-copy matrix views.
//!
//! ```
//! use cpdf::core::DenseND;
//!
//! let tensor = DenseND::<f64>::ones(&[4, 2, 3]);
//! assert_eq!(tensor.matricize_leading().unwrap().shape(), &[4, 6]);
//! ```
//!
//! ### Kernels ([`kernels`])
//!
//! Khatri-Rao, Gram products and Hadamard contractions.
//!
//! ```
//! use cpdf::kernels::khatri_rao;
//! use scirs2_core::ndarray_ext::Array2;
//!
//! let a = Array2::<f64>::ones((3, 2));
//! let kr = khatri_rao(&a.view(), &a.view());
//! assert_eq!(kr.shape(), &[9, 2]);
//! ```
//!
//! ### Decomposition ([`decomp`])
//!
//! Rank-growth drivers, ALS sweeps, convergence tests and the solve stage.

#![deny(warnings)]

pub use cpdf_core as core;
pub use cpdf_decomp as decomp;
pub use cpdf_kernels as kernels;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```
    //! use cpdf::prelude::*;
    //!
    //! let tensor = DenseND::<f64>::zeros(&[3, 4]);
    //! assert_eq!(tensor.extent(0), 3);
    //! ```

    pub use crate::core::DenseND;

    pub use crate::decomp::{
        AlsOptions, ConvergenceTest, CpDecomp, DfCpAls, DfCpError, DfCpResult, FitCheck,
        NormCheck, PanelOptions, SolveMode,
    };

    pub use crate::kernels::{gram_matrix, khatri_rao, reduce_modes};
}
