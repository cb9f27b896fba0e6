//! Query parameters for list and get requests

use compact_str::{format_compact, CompactString};

/// Pagination, filtering, sorting and projection options.
///
/// Zero and empty values mean "leave it to the server" and are not sent.
/// Filter and sort expressions are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamsList {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub size: u32,
    pub filters: CompactString,
    /// Comma separated fields, `-` prefix for descending
    pub sort: CompactString,
    pub expand: CompactString,
    pub fields: CompactString,
}

impl ParamsList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_filters(mut self, filters: impl Into<CompactString>) -> Self {
        self.filters = filters.into();
        self
    }

    pub fn with_sort(mut self, sort: impl Into<CompactString>) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn with_expand(mut self, expand: impl Into<CompactString>) -> Self {
        self.expand = expand.into();
        self
    }

    pub fn with_fields(mut self, fields: impl Into<CompactString>) -> Self {
        self.fields = fields.into();
        self
    }

    /// Query pairs for a list request
    pub fn list_query(&self) -> Vec<(&'static str, CompactString)> {
        let mut query = Vec::with_capacity(6);

        if self.page > 0 {
            query.push(("page", format_compact!("{}", self.page)));
        }
        if self.size > 0 {
            query.push(("perPage", format_compact!("{}", self.size)));
        }
        if !self.filters.is_empty() {
            query.push(("filter", self.filters.clone()));
        }
        if !self.sort.is_empty() {
            query.push(("sort", self.sort.clone()));
        }
        query.extend(self.one_query());

        query
    }

    /// Query pairs for a single-record request; only `expand` and `fields` apply
    pub fn one_query(&self) -> Vec<(&'static str, CompactString)> {
        let mut query = Vec::with_capacity(2);

        if !self.expand.is_empty() {
            query.push(("expand", self.expand.clone()));
        }
        if !self.fields.is_empty() {
            query.push(("fields", self.fields.clone()));
        }

        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(query: &[(&'static str, CompactString)]) -> Vec<&'static str> {
        query.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_default_params_send_nothing() {
        assert!(ParamsList::new().list_query().is_empty());
        assert!(ParamsList::new().one_query().is_empty());
    }

    #[test]
    fn test_zero_page_and_size_are_omitted() {
        let params = ParamsList::new().with_filters("status = true").with_sort("-created");
        let query = params.list_query();

        assert_eq!(keys(&query), vec!["filter", "sort"]);
        assert_eq!(query[0].1, "status = true");
        assert_eq!(query[1].1, "-created");
    }

    #[test]
    fn test_full_list_query() {
        let params = ParamsList::new()
            .with_page(2)
            .with_size(50)
            .with_filters("a > 1")
            .with_sort("+name")
            .with_expand("author")
            .with_fields("id,name");

        let query = params.list_query();
        assert_eq!(keys(&query), vec!["page", "perPage", "filter", "sort", "expand", "fields"]);
        assert_eq!(query[0].1, "2");
        assert_eq!(query[1].1, "50");
    }

    #[test]
    fn test_one_query_ignores_list_options() {
        let params = ParamsList::new().with_page(3).with_filters("x").with_fields("id");
        assert_eq!(keys(&params.one_query()), vec!["fields"]);
    }
}
