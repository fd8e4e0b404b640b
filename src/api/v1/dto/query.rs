use serde::Deserialize;

/// Query parameters shared by every list-shaped response.
///
/// `page` stays a raw string on purpose: the pagination contract is lenient
/// (absent, non-numeric and non-positive all mean page 1), so
/// deserialization must never reject the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
}
