//! Unit tests for quote validation

use commotrade::models::Quote;
use commotrade::services::market_data::{validate_quote, QuoteError};

#[test]
fn test_valid_quote_passes_through() {
    let quote = Quote::new(71.2, 70.9);
    assert_eq!(validate_quote(quote).unwrap(), quote);
}

#[test]
fn test_zero_price_is_valid() {
    assert!(validate_quote(Quote::new(0.0, 70.9)).is_ok());
}

#[test]
fn test_zero_previous_close_is_integrity_error() {
    let err = validate_quote(Quote::new(71.2, 0.0)).unwrap_err();
    assert!(matches!(err, QuoteError::ZeroPreviousClose));
    assert!(err.is_data_integrity());
}

#[test]
fn test_non_finite_values_are_rejected() {
    assert!(matches!(
        validate_quote(Quote::new(f64::NAN, 70.0)),
        Err(QuoteError::InvalidPrice(_))
    ));
    assert!(matches!(
        validate_quote(Quote::new(70.0, f64::INFINITY)),
        Err(QuoteError::InvalidPreviousClose(_))
    ));
}

#[test]
fn test_transport_errors_are_not_integrity_errors() {
    assert!(!QuoteError::Timeout.is_data_integrity());
    assert!(!QuoteError::Status(503).is_data_integrity());
    assert!(!QuoteError::NoData("CL=F".into()).is_data_integrity());
}
