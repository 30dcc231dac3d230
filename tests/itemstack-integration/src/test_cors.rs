//! CORS and health integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::Value;

    use crate::{http_client, item_url, items_url, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_answer_preflight() {
        let client = http_client();
        let resp = client
            .request(reqwest::Method::OPTIONS, item_url("any"))
            .send()
            .await
            .expect("preflight");
        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(
            headers["access-control-allow-methods"],
            "OPTIONS, POST, GET, PUT, DELETE"
        );
        assert_eq!(headers["access-control-max-age"], "3600");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
        assert!(headers.contains_key("access-control-allow-origin"));
        assert!(resp.bytes().await.expect("body").is_empty());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_set_cors_headers_on_errors() {
        let client = http_client();
        let resp = client
            .request(reqwest::Method::PATCH, items_url())
            .send()
            .await
            .expect("patch");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(resp.headers().contains_key("access-control-allow-origin"));
        assert_eq!(resp.headers()["access-control-allow-headers"], "Content-Type");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_health() {
        let client = http_client();
        let resp = client.get(url("/_health")).send().await.expect("health");
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.expect("JSON body");
        assert_eq!(body["status"], "running");
        assert!(body["version"].is_string());
    }
}
