//! Query string parameters of list endpoints.
//!
//! Filters may repeat (`?status=new&status=qualified`), so these are parsed
//! with `serde_html_form` rather than `web::Query`.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct CustomerListParams {
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct LeadListParams {
    #[serde(default)]
    pub status: Vec<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct DealListParams {
    #[serde(default)]
    pub stage: Vec<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct AuditListParams {
    pub resource: Option<String>,
    pub page: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_statuses_are_collected() {
        let params: LeadListParams =
            serde_html_form::from_str("status=new&status=qualified&page=2").expect("valid query");
        assert_eq!(params.status, vec!["new", "qualified"]);
        assert_eq!(params.page, Some(2));
    }

    #[test]
    fn empty_query_uses_defaults() {
        let params: DealListParams = serde_html_form::from_str("").expect("valid query");
        assert_eq!(params, DealListParams::default());
    }
}
