//! Error envelope integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::{Value, json};

    use crate::{http_client, item_url, items_url, url};

    async fn assert_error(resp: reqwest::Response, status: StatusCode) -> String {
        assert_eq!(resp.status(), status);
        let body: Value = resp.json().await.expect("error body is JSON");
        assert!(body["data"].is_null());
        body["errorMessage"]
            .as_str()
            .expect("errorMessage is a string")
            .to_owned()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_malformed_json_with_422() {
        let client = http_client();
        let resp = client
            .post(items_url())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{\"description\":")
            .send()
            .await
            .expect("post");
        assert_error(resp, StatusCode::UNPROCESSABLE_ENTITY).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_missing_field_with_400() {
        let client = http_client();
        let resp = client
            .post(items_url())
            .json(&json!({ "description": "box", "quantity": 3 }))
            .send()
            .await
            .expect("post");
        let message = assert_error(resp, StatusCode::BAD_REQUEST).await;
        assert_eq!(message, "missing required field: location");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_require_id_for_delete() {
        let client = http_client();
        let resp = client.delete(items_url()).send().await.expect("delete");
        assert_error(resp, StatusCode::BAD_REQUEST).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unsupported_method_with_405() {
        let client = http_client();
        let resp = client.patch(item_url("1")).send().await.expect("patch");
        assert_error(resp, StatusCode::METHOD_NOT_ALLOWED).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_foreign_path_with_404() {
        let client = http_client();
        let resp = client.get(url("/widgets")).send().await.expect("get");
        assert_error(resp, StatusCode::NOT_FOUND).await;
    }
}
