use super::{require, unwrap_envelope};
use crate::{B2BRouterClient, Collection, Result};
use http::Method;
use serde_json::Value;

/// Tax report operations (VeriFactu, TicketBAI).
///
/// Obtained from [`B2BRouterClient::tax_reports`]. Updating a registered
/// report issues a correction and deleting one issues an annullation; both
/// produce a new linked report on the server.
#[derive(Debug, Clone, Copy)]
pub struct TaxReportService<'a> {
    client: &'a B2BRouterClient,
}

impl<'a> TaxReportService<'a> {
    pub(crate) fn new(client: &'a B2BRouterClient) -> Self {
        Self { client }
    }

    /// Lists an account's tax reports, one page at a time.
    ///
    /// Filters include `invoice_id`, `sent_at_from` and `updated_at_from`.
    pub async fn list(&self, account: &str, params: Value) -> Result<Collection> {
        let path = format!("/accounts/{}/tax_reports", account);
        self.client.request_list(&path, "tax_reports", &params).await
    }

    /// Retrieves a tax report.
    pub async fn retrieve(&self, id: &str, params: Value) -> Result<Value> {
        let path = format!("/tax_reports/{}", id);
        let response = self.client.request(Method::GET, &path, &params).await?;
        Ok(unwrap_envelope(response, "tax_report"))
    }

    /// Creates a tax report. `params` must contain a `tax_report` object.
    pub async fn create(&self, account: &str, params: Value) -> Result<Value> {
        require(&params, "tax_report")?;
        let path = format!("/accounts/{}/tax_reports", account);
        let response = self.client.request(Method::POST, &path, &params).await?;
        Ok(unwrap_envelope(response, "tax_report"))
    }

    /// Downloads the XML document of a tax report.
    pub async fn download(&self, id: &str) -> Result<String> {
        let path = format!("/tax_reports/{}/download", id);
        self.client.request_raw(&path).await
    }

    /// Updates or corrects a tax report. `params` must contain a `tax_report` object.
    pub async fn update(&self, id: &str, params: Value) -> Result<Value> {
        require(&params, "tax_report")?;
        let path = format!("/tax_reports/{}", id);
        let response = self.client.request(Method::PATCH, &path, &params).await?;
        Ok(unwrap_envelope(response, "tax_report"))
    }

    /// Annuls a tax report, returning the annullation report.
    pub async fn delete(&self, id: &str) -> Result<Value> {
        let path = format!("/tax_reports/{}", id);
        let response = self.client.request(Method::DELETE, &path, &Value::Null).await?;
        Ok(unwrap_envelope(response, "tax_report"))
    }
}
