use axum::extract::State;
use axum::{Json, Router, routing::get};
use formsg_core::registry::FieldTypeInfo;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/field-types", get(list_field_types))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FieldTypesResponse {
    pub field_types: Vec<FieldTypeInfo>,
}

/// Field type catalogue
///
/// Every field type the server knows, with whether its answers arrive as an
/// array and whether it is submitted at all.
#[utoipa::path(
    get,
    path = "/v1/field-types",
    responses(
        (status = 200, description = "Field type catalogue", body = FieldTypesResponse)
    ),
    tag = "forms"
)]
pub async fn list_field_types(State(state): State<AppState>) -> Json<FieldTypesResponse> {
    Json(FieldTypesResponse {
        field_types: state.registry.entries(),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use formsg_core::config::SubmissionConfig;
    use formsg_core::registry::FieldTypeRegistry;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn lists_every_field_type() {
        let state = AppState::new(FieldTypeRegistry::standard(), SubmissionConfig::default());
        let app = router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/field-types")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("body is json");
        let field_types = json["field_types"].as_array().expect("array");
        assert_eq!(field_types.len(), 20);
        assert_eq!(field_types[0]["fieldType"], "section");
    }
}
