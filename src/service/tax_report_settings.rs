use super::{require, unwrap_envelope};
use crate::client::take_items;
use crate::{B2BRouterClient, Collection, Result};
use http::Method;
use serde_json::{json, Value};

const DEFAULT_PAGE_SIZE: u64 = 25;

/// Tax report setting operations, keyed by account and tax authority code.
///
/// Obtained from [`B2BRouterClient::tax_report_settings`].
#[derive(Debug, Clone, Copy)]
pub struct TaxReportSettingService<'a> {
    client: &'a B2BRouterClient,
}

impl<'a> TaxReportSettingService<'a> {
    pub(crate) fn new(client: &'a B2BRouterClient) -> Self {
        Self { client }
    }

    /// Lists an account's tax report settings.
    ///
    /// This endpoint reports `total_count`, `offset` and `limit` at the top level
    /// of the response; they become the collection metadata.
    pub async fn list(&self, account: &str, params: Value) -> Result<Collection> {
        let path = format!("/accounts/{}/tax_report_settings", account);
        let mut response = self.client.request(Method::GET, &path, &params).await?;
        let items = take_items(&mut response, "tax_report_settings");
        let meta = page_meta(&response, items.len());
        Ok(Collection::new(items, meta))
    }

    /// Creates a tax report setting. `params` must contain a `tax_report_setting` object.
    pub async fn create(&self, account: &str, params: Value) -> Result<Value> {
        require(&params, "tax_report_setting")?;
        let path = format!("/accounts/{}/tax_report_settings", account);
        let response = self.client.request(Method::POST, &path, &params).await?;
        Ok(unwrap_envelope(response, "tax_report_setting"))
    }

    /// Retrieves the setting for one tax authority `code`.
    pub async fn retrieve(&self, account: &str, code: &str, params: Value) -> Result<Value> {
        let path = format!("/accounts/{}/tax_report_settings/{}", account, code);
        let response = self.client.request(Method::GET, &path, &params).await?;
        Ok(unwrap_envelope(response, "tax_report_setting"))
    }

    /// Updates a tax report setting. `params` must contain a `tax_report_setting` object.
    pub async fn update(&self, account: &str, code: &str, params: Value) -> Result<Value> {
        require(&params, "tax_report_setting")?;
        let path = format!("/accounts/{}/tax_report_settings/{}", account, code);
        let response = self.client.request(Method::PUT, &path, &params).await?;
        Ok(unwrap_envelope(response, "tax_report_setting"))
    }

    /// Deletes a tax report setting.
    pub async fn delete(&self, account: &str, code: &str) -> Result<Value> {
        let path = format!("/accounts/{}/tax_report_settings/{}", account, code);
        let response = self.client.request(Method::DELETE, &path, &Value::Null).await?;
        Ok(unwrap_envelope(response, "tax_report_setting"))
    }
}

/// Builds metadata from top-level pagination fields, if any are present.
fn page_meta(response: &Value, item_count: usize) -> Option<Value> {
    let field = |name: &str| response.get(name).filter(|value| !value.is_null()).cloned();
    let (total, offset, limit) = (field("total_count"), field("offset"), field("limit"));

    if total.is_none() && offset.is_none() && limit.is_none() {
        return None;
    }

    Some(json!({
        "total_count": total.unwrap_or_else(|| json!(item_count)),
        "offset": offset.unwrap_or_else(|| json!(0)),
        "limit": limit.unwrap_or_else(|| json!(DEFAULT_PAGE_SIZE)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_meta_absent() {
        assert_eq!(page_meta(&json!({"tax_report_settings": []}), 0), None);
    }

    #[test]
    fn test_page_meta_defaults() {
        let meta = page_meta(&json!({"offset": 0}), 2).unwrap();
        assert_eq!(meta, json!({"total_count": 2, "offset": 0, "limit": 25}));
    }

    #[test]
    fn test_page_meta_drives_has_more() {
        let meta = page_meta(&json!({"total_count": 30, "offset": 0, "limit": 25}), 25);
        let collection = Collection::new(vec![json!({"code": "VERIFACTU"})], meta);
        assert_eq!(collection.total(), Some(30));
        assert!(collection.has_more());
    }
}
