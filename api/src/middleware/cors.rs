use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

const DEFAULT_ORIGINS: &str = "http://localhost:5173";

/// CORS for the form frontends listed in `FORMSG_CORS_ORIGINS`
/// (comma-separated). Submissions are anonymous, so no credentials.
pub fn build_cors_layer() -> CorsLayer {
    let origins_str =
        std::env::var("FORMSG_CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string());

    CorsLayer::new()
        .allow_origin(parse_origins(&origins_str))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([HeaderName::from_static("content-type")])
        .max_age(std::time::Duration::from_secs(3600))
}

fn parse_origins(origins: &str) -> Vec<HeaderValue> {
    let mut parsed: Vec<HeaderValue> = Vec::new();
    for origin in origins.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        match origin.parse::<HeaderValue>() {
            Ok(value) if !parsed.contains(&value) => parsed.push(value),
            Ok(_) => {}
            Err(_) => tracing::warn!(origin, "ignoring invalid CORS origin"),
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_dedupes_origins() {
        let origins =
            parse_origins(" https://form.gov.sg, ,https://form.gov.sg,http://localhost:5173");
        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("https://form.gov.sg"),
                HeaderValue::from_static("http://localhost:5173"),
            ]
        );
    }
}
