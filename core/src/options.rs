//! Query parameters attached to a request.

use url::Url;

/// Page size applied to list operations unless the caller sets one.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Query parameters for a single request.
///
/// Setting a key that is already present replaces its value, so later calls
/// win over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    params: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-based page index.
    pub fn page(self, page: u32) -> Self {
        self.parameter("page", page.to_string())
    }

    pub fn per_page(self, per_page: u32) -> Self {
        self.parameter("per_page", per_page.to_string())
    }

    /// Wrap list results in a page object with `start`, `limit` and `total`.
    pub fn include_totals(self, include: bool) -> Self {
        self.parameter("include_totals", include.to_string())
    }

    /// Checkpoint pagination: start after this id.
    pub fn from_checkpoint(self, checkpoint: &str) -> Self {
        self.parameter("from", checkpoint)
    }

    /// Checkpoint pagination: number of entries to return.
    pub fn take(self, take: u32) -> Self {
        self.parameter("take", take.to_string())
    }

    /// Only return the named fields.
    pub fn include_fields(self, fields: &[&str]) -> Self {
        self.parameter("fields", fields.join(","))
            .parameter("include_fields", "true")
    }

    /// Return everything except the named fields.
    pub fn exclude_fields(self, fields: &[&str]) -> Self {
        self.parameter("fields", fields.join(","))
            .parameter("include_fields", "false")
    }

    /// Search query.
    pub fn query(self, q: &str) -> Self {
        self.parameter("q", q)
    }

    pub fn parameter(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `per_page=50&include_totals=true`, overridden by anything the caller set.
    pub fn with_list_defaults(&self) -> Self {
        let mut merged = RequestOptions::new()
            .per_page(DEFAULT_PER_PAGE)
            .include_totals(true);
        for (key, value) in &self.params {
            merged = merged.parameter(key, value.as_str());
        }
        merged
    }

    pub(crate) fn apply(&self, url: &mut Url) {
        if self.params.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(self.params.iter());
    }
}
