use crate::util::api_request;

pub async fn run(api_url: &str) -> i32 {
    api_request(api_url, reqwest::Method::GET, "/health", None).await
}

/// The server's field type catalogue.
pub async fn field_types(api_url: &str) -> i32 {
    api_request(api_url, reqwest::Method::GET, "/v1/field-types", None).await
}
