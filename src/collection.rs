//! A single page of list results plus its pagination metadata.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One page of results from a list endpoint.
///
/// Items keep the order the server returned them in. The collection is an
/// owned, immutable view: iterate it as many times as needed. Fetching the
/// next page is up to the caller (advance `offset` by `limit`).
///
/// # Examples
///
/// ```
/// use b2brouter::Collection;
/// use serde_json::json;
///
/// let page = Collection::new(
///     vec![json!({"id": 1}), json!({"id": 2})],
///     Some(json!({"total": 100, "offset": 0, "limit": 25})),
/// );
///
/// assert_eq!(page.count(), 2);
/// assert_eq!(page.total(), Some(100));
/// assert!(page.has_more());
/// assert_eq!(page.next_offset(), Some(25));
///
/// for item in &page {
///     println!("{}", item["id"]);
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T = Value> {
    data: Vec<T>,
    meta: Option<Value>,
}

impl<T> Collection<T> {
    /// Creates a collection from a page of items and optional metadata.
    ///
    /// The metadata is read for `total` (or `total_count`), `offset` and `limit`.
    pub fn new(data: Vec<T>, meta: Option<Value>) -> Self {
        Self { data, meta }
    }

    /// Returns the items in this page.
    pub fn all(&self) -> &[T] {
        &self.data
    }

    /// Returns the raw metadata, if the response carried any.
    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    /// Returns the total number of items across all pages, if known.
    pub fn total(&self) -> Option<u64> {
        self.meta_field("total")
            .or_else(|| self.meta_field("total_count"))
    }

    /// Returns the offset of this page, if known.
    pub fn offset(&self) -> Option<u64> {
        self.meta_field("offset")
    }

    /// Returns the page size, if known.
    pub fn limit(&self) -> Option<u64> {
        self.meta_field("limit")
    }

    /// Returns `true` if there are more results after this page.
    ///
    /// Always `false` unless total, offset and limit are all known.
    pub fn has_more(&self) -> bool {
        match (self.total(), self.offset(), self.limit()) {
            (Some(total), Some(offset), Some(limit)) => offset.saturating_add(limit) < total,
            _ => false,
        }
    }

    /// Returns the offset of the next page, if there is one.
    pub fn next_offset(&self) -> Option<u64> {
        if !self.has_more() {
            return None;
        }
        Some(self.offset()? + self.limit()?)
    }

    /// Returns the number of items in this page (not the overall total).
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Same as [`count`](Self::count).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns an iterator over the items, from the start.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Consumes the collection, returning its items.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn meta_field(&self, name: &str) -> Option<u64> {
        self.meta.as_ref()?.get(name)?.as_u64()
    }
}

impl Collection<Value> {
    /// Converts every item into `U`, keeping the metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] if any item does not match `U`.
    pub fn into_typed<U: DeserializeOwned>(self) -> Result<Collection<U>> {
        let data = self
            .data
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<U>, _>>()
            .map_err(|e| Error::DeserializationFailed(e.to_string()))?;

        Ok(Collection {
            data,
            meta: self.meta,
        })
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<T> std::ops::Index<usize> for Collection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn page(meta: Option<Value>) -> Collection {
        Collection::new(vec![json!({"id": 1}), json!({"id": 2})], meta)
    }

    #[test]
    fn test_accessors() {
        let collection = page(Some(json!({"total": 100, "offset": 25, "limit": 25})));

        assert_eq!(collection.count(), 2);
        assert_eq!(collection.total(), Some(100));
        assert_eq!(collection.offset(), Some(25));
        assert_eq!(collection.limit(), Some(25));
        assert_eq!(collection.all(), &[json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(collection.meta().unwrap()["total"], 100);
    }

    #[test]
    fn test_has_more() {
        assert!(page(Some(json!({"total": 100, "offset": 0, "limit": 25}))).has_more());
        assert!(!page(Some(json!({"total": 100, "offset": 75, "limit": 25}))).has_more());
        assert!(!page(Some(json!({"total": 100, "offset": 90, "limit": 25}))).has_more());
    }

    #[test]
    fn test_has_more_with_missing_fields() {
        assert!(!page(None).has_more());
        assert!(!page(Some(json!({"offset": 0, "limit": 25}))).has_more());
        assert!(!page(Some(json!({"total": 100, "limit": 25}))).has_more());
        assert!(!page(Some(json!({"total": 100, "offset": 0}))).has_more());
        assert!(!page(Some(json!({"total": "many", "offset": 0, "limit": 25}))).has_more());
    }

    #[test]
    fn test_total_count_spelling() {
        let collection = page(Some(json!({"total_count": 60, "offset": 0, "limit": 25})));
        assert_eq!(collection.total(), Some(60));
        assert!(collection.has_more());
    }

    #[test]
    fn test_next_offset() {
        assert_eq!(
            page(Some(json!({"total": 60, "offset": 25, "limit": 25}))).next_offset(),
            Some(50)
        );
        assert_eq!(
            page(Some(json!({"total": 50, "offset": 25, "limit": 25}))).next_offset(),
            None
        );
    }

    #[test]
    fn test_iteration_is_repeatable() {
        let collection = page(Some(json!({"total": 1000})));

        let first: Vec<_> = collection.iter().cloned().collect();
        let second: Vec<_> = (&collection).into_iter().cloned().collect();

        assert_eq!(first, second);
        assert_eq!(first, vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(collection.count(), 2);
    }

    #[test]
    fn test_empty_collection() {
        let collection: Collection = Collection::new(Vec::new(), None);

        assert!(collection.is_empty());
        assert_eq!(collection.count(), 0);
        assert_eq!(collection.iter().count(), 0);
        assert_eq!(collection.total(), None);
        assert_eq!(collection.offset(), None);
        assert_eq!(collection.limit(), None);
        assert!(collection.meta().is_none());
    }

    #[test]
    fn test_into_typed() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Item {
            id: u32,
        }

        let typed = page(Some(json!({"total": 2}))).into_typed::<Item>().unwrap();
        assert_eq!(typed.all(), &[Item { id: 1 }, Item { id: 2 }]);
        assert_eq!(typed.total(), Some(2));

        let result = Collection::new(vec![json!({"id": "x"})], None).into_typed::<Item>();
        assert!(matches!(result, Err(Error::DeserializationFailed(_))));
    }
}
