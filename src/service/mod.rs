//! Resource services layered on the request pipeline.
//!
//! Each service borrows the [`B2BRouterClient`](crate::B2BRouterClient) and maps
//! its operations onto a method, a path and a parameter object. Responses are
//! unwrapped from their singular envelope key (`invoice`, `tax_report`,
//! `tax_report_setting`) when present.

mod invoices;
mod tax_report_settings;
mod tax_reports;

pub use invoices::InvoiceService;
pub use tax_report_settings::TaxReportSettingService;
pub use tax_reports::TaxReportService;

use crate::{Error, Result};
use serde_json::Value;

/// Fails locally if `params` lacks a non-null `key`.
pub(crate) fn require(params: &Value, key: &str) -> Result<()> {
    match params.get(key) {
        Some(value) if !value.is_null() => Ok(()),
        _ => Err(Error::InvalidArgument(format!(
            "The \"{}\" parameter is required",
            key
        ))),
    }
}

/// Returns the value under `key`, or the whole response when it is absent.
pub(crate) fn unwrap_envelope(mut response: Value, key: &str) -> Value {
    if response.get(key).is_some_and(|inner| !inner.is_null()) {
        return response[key].take();
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require() {
        assert!(require(&json!({"invoice": {}}), "invoice").is_ok());

        for params in [json!({}), json!({"invoice": null}), Value::Null] {
            match require(&params, "invoice") {
                Err(Error::InvalidArgument(message)) => {
                    assert_eq!(message, "The \"invoice\" parameter is required")
                }
                other => panic!("Expected InvalidArgument, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_unwrap_envelope() {
        assert_eq!(
            unwrap_envelope(json!({"invoice": {"id": "inv_1"}}), "invoice"),
            json!({"id": "inv_1"})
        );
        assert_eq!(
            unwrap_envelope(json!({"valid": true}), "invoice"),
            json!({"valid": true})
        );
    }
}
