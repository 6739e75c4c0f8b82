//! Behaviour of the drivers when the linear-algebra backend is compiled out

#![cfg(not(feature = "linalg"))]

use cpdf_core::DenseND;
use cpdf_decomp::{pseudo_inverse, AlsOptions, DfCpAls, DfCpError, NormCheck, PanelOptions};
use scirs2_core::ndarray_ext::Array2;

fn pair() -> DfCpAls<f64> {
    DfCpAls::new(DenseND::<f64>::ones(&[2, 3]), DenseND::<f64>::ones(&[2, 2])).unwrap()
}

#[test]
fn test_drivers_report_missing_backend() {
    let mut als = pair();
    let mut conv = NormCheck::new(1e-6);

    assert!(matches!(
        als.compute_rank(2, &mut conv, &AlsOptions::default()),
        Err(DfCpError::MissingCapability(_))
    ));
    assert!(matches!(
        als.compute_error(&mut conv, 1e-3, 2, &AlsOptions::default()),
        Err(DfCpError::MissingCapability(_))
    ));
    assert!(matches!(
        als.compute_geometric(2, &mut conv, 2.0, &AlsOptions::default()),
        Err(DfCpError::MissingCapability(_))
    ));

    let mut convs = vec![NormCheck::new(1e-6)];
    assert!(matches!(
        als.paneled_tucker_build(&mut convs, &PanelOptions::default().with_panels(1)),
        Err(DfCpError::MissingCapability(_))
    ));
    assert_eq!(als.current_rank(), 0);
}

#[test]
fn test_pseudo_inverse_needs_backend() {
    let v = Array2::<f64>::eye(2);
    assert!(matches!(
        pseudo_inverse(&v),
        Err(DfCpError::MissingCapability(_))
    ));
}
