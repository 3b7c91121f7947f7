use super::{require, unwrap_envelope};
use crate::{B2BRouterClient, Collection, Result};
use http::Method;
use serde_json::Value;

/// Invoice operations.
///
/// Obtained from [`B2BRouterClient::invoices`].
///
/// # Examples
///
/// ```no_run
/// use b2brouter::B2BRouterClient;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), b2brouter::Error> {
/// let client = B2BRouterClient::new("my-api-key")?;
///
/// let invoice = client
///     .invoices()
///     .create("my-account", json!({
///         "invoice": {
///             "number": "INV-2025-001",
///             "date": "2025-01-15",
///             "contact_id": 123,
///             "invoice_lines_attributes": [
///                 {"description": "Consulting", "quantity": 1, "price": 100.0}
///             ]
///         },
///         "send_after_import": false
///     }))
///     .await?;
///
/// client.invoices().send(invoice["id"].as_str().unwrap_or_default(), json!({})).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InvoiceService<'a> {
    client: &'a B2BRouterClient,
}

impl<'a> InvoiceService<'a> {
    pub(crate) fn new(client: &'a B2BRouterClient) -> Self {
        Self { client }
    }

    /// Creates an invoice. `params` must contain an `invoice` object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) without
    /// contacting the API if `invoice` is missing.
    pub async fn create(&self, account: &str, params: Value) -> Result<Value> {
        require(&params, "invoice")?;
        let path = format!("/accounts/{}/invoices", account);
        let response = self.client.request(Method::POST, &path, &params).await?;
        Ok(unwrap_envelope(response, "invoice"))
    }

    /// Retrieves an invoice. `params` may carry `include`, `disposition` or `ack`.
    pub async fn retrieve(&self, id: &str, params: Value) -> Result<Value> {
        let path = format!("/invoices/{}", id);
        let response = self.client.request(Method::GET, &path, &params).await?;
        Ok(unwrap_envelope(response, "invoice"))
    }

    /// Updates an invoice. `params` must contain an `invoice` object.
    pub async fn update(&self, id: &str, params: Value) -> Result<Value> {
        require(&params, "invoice")?;
        let path = format!("/invoices/{}", id);
        let response = self.client.request(Method::PUT, &path, &params).await?;
        Ok(unwrap_envelope(response, "invoice"))
    }

    /// Deletes an invoice, returning the deleted record.
    pub async fn delete(&self, id: &str) -> Result<Value> {
        let path = format!("/invoices/{}", id);
        let response = self.client.request(Method::DELETE, &path, &Value::Null).await?;
        Ok(unwrap_envelope(response, "invoice"))
    }

    /// Lists an account's invoices, one page at a time.
    ///
    /// `params` is passed through as query filters: `offset`, `limit` (max 500),
    /// `type`, `date_from`, `date_to`, status flags such as `sent` or `error`, and
    /// so on.
    pub async fn list(&self, account: &str, params: Value) -> Result<Collection> {
        let path = format!("/accounts/{}/invoices", account);
        self.client.request_list(&path, "invoices", &params).await
    }

    /// Imports an invoice document into an account.
    pub async fn import(&self, account: &str, params: Value) -> Result<Value> {
        let path = format!("/accounts/{}/invoices/import", account);
        let response = self.client.request(Method::POST, &path, &params).await?;
        Ok(unwrap_envelope(response, "invoice"))
    }

    /// Marks an invoice with a new state, e.g. `{"state": "paid"}`.
    pub async fn mark_as(&self, id: &str, params: Value) -> Result<Value> {
        let path = format!("/invoices/{}/mark_as", id);
        let response = self.client.request(Method::POST, &path, &params).await?;
        Ok(unwrap_envelope(response, "invoice"))
    }

    /// Validates an invoice, returning the validation result as sent by the API.
    pub async fn validate(&self, id: &str, params: Value) -> Result<Value> {
        let path = format!("/invoices/{}/validate", id);
        self.client.request(Method::GET, &path, &params).await
    }

    /// Sends an invoice to its recipient.
    pub async fn send(&self, id: &str, params: Value) -> Result<Value> {
        let path = format!("/invoices/send_invoice/{}", id);
        self.client.request(Method::POST, &path, &params).await
    }

    /// Acknowledges a received invoice.
    pub async fn acknowledge(&self, id: &str, params: Value) -> Result<Value> {
        let path = format!("/invoices/{}/ack", id);
        self.client.request(Method::POST, &path, &params).await
    }
}
