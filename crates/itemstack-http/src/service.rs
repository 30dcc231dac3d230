//! Item HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;

use itemstack_model::error::ItemError;
use itemstack_model::operations::ItemOperation;

use crate::body::ItemResponseBody;
use crate::dispatch::{ItemHandler, dispatch_operation};
use crate::response::{apply_cors_headers, error_to_response, preflight_response};
use crate::router::ItemRouter;

/// Configuration for the item HTTP service.
#[derive(Debug, Clone)]
pub struct ItemHttpConfig {
    /// Value of `Access-Control-Allow-Origin` on every response.
    pub allowed_origin: String,
    /// Resource path segment serving the item collection.
    pub resource_path: String,
}

impl Default for ItemHttpConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_owned(),
            resource_path: "items".to_owned(),
        }
    }
}

/// Hyper `Service` implementation for the item API.
///
/// Wraps an [`ItemHandler`] and routes incoming HTTP requests to it.
/// Preflight, unsupported methods and foreign paths are answered here
/// without reaching the handler.
#[derive(Debug)]
pub struct ItemHttpService<H: ItemHandler> {
    handler: Arc<H>,
    router: Arc<ItemRouter>,
    allowed_origin: http::HeaderValue,
}

impl<H: ItemHandler> ItemHttpService<H> {
    /// Create a new `ItemHttpService`.
    ///
    /// # Errors
    ///
    /// Fails when the configured origin is not a valid header value.
    pub fn new(
        handler: Arc<H>,
        config: &ItemHttpConfig,
    ) -> Result<Self, http::header::InvalidHeaderValue> {
        Ok(Self {
            handler,
            router: Arc::new(ItemRouter::new(&config.resource_path)),
            allowed_origin: http::HeaderValue::from_str(&config.allowed_origin)?,
        })
    }

    /// Process one request through the full pipeline and decorate the
    /// response with the CORS headers.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<ItemResponseBody>
    where
        B: http_body::Body<Data = Bytes> + Send,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let mut response = process_request(req, self.handler.as_ref(), &self.router).await;
        apply_cors_headers(response.headers_mut(), &self.allowed_origin);
        response
    }
}

impl<H: ItemHandler> Clone for ItemHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            router: Arc::clone(&self.router),
            allowed_origin: self.allowed_origin.clone(),
        }
    }
}

impl<H: ItemHandler> hyper::service::Service<http::Request<Incoming>> for ItemHttpService<H> {
    type Response = http::Response<ItemResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let svc = self.clone();
        Box::pin(async move { Ok(svc.handle(req).await) })
    }
}

/// Route, read the body if the operation needs one, and dispatch.
async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    router: &ItemRouter,
) -> http::Response<ItemResponseBody>
where
    H: ItemHandler,
    B: http_body::Body<Data = Bytes> + Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let (parts, incoming) = req.into_parts();

    // 1. Route: method first, then path shape.
    let ctx = match router.resolve(&parts.method, parts.uri.path()) {
        Ok(ctx) => ctx,
        Err(err) => return log_and_render(&err),
    };

    // 2. Preflight never reaches the handler.
    if ctx.operation == ItemOperation::Preflight {
        return preflight_response();
    }

    // 3. Collect body for operations that decode one.
    let body = if ctx.operation.has_body() {
        match collect_body(incoming).await {
            Ok(body) => body,
            Err(err) => return log_and_render(&err),
        }
    } else {
        Bytes::new()
    };

    // 4. Dispatch to handler.
    match dispatch_operation(handler, ctx.operation, ctx.id, body).await {
        Ok(response) => response,
        Err(err) => log_and_render(&err),
    }
}

/// Collect the incoming body into a single `Bytes` buffer.
async fn collect_body<B>(incoming: B) -> Result<Bytes, ItemError>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    incoming
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| ItemError::internal_error().with_source(e))
}

fn log_and_render(err: &ItemError) -> http::Response<ItemResponseBody> {
    if err.status_code.is_server_error() {
        tracing::error!(
            code = %err.code,
            source = ?err.source,
            "item request failed",
        );
    } else {
        tracing::debug!(code = %err.code, message = %err.message, "item request rejected");
    }
    error_to_response(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    use crate::dispatch::NotImplementedHandler;

    fn service() -> ItemHttpService<NotImplementedHandler> {
        let config = ItemHttpConfig {
            allowed_origin: "https://app.example.com".to_owned(),
            ..ItemHttpConfig::default()
        };
        ItemHttpService::new(Arc::new(NotImplementedHandler), &config).unwrap()
    }

    fn request(method: http::Method, path: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn assert_cors(resp: &http::Response<ItemResponseBody>) {
        assert_eq!(
            resp.headers()
                .get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://app.example.com"
        );
        assert_eq!(
            resp.headers()
                .get(http::header::ACCESS_CONTROL_ALLOW_HEADERS)
                .unwrap(),
            "Content-Type"
        );
    }

    #[tokio::test]
    async fn test_should_answer_preflight_without_handler() {
        let resp = service()
            .handle(request(http::Method::OPTIONS, "/items/42"))
            .await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert!(
            resp.headers()
                .contains_key(http::header::ACCESS_CONTROL_ALLOW_METHODS)
        );
        assert_cors(&resp);
    }

    #[tokio::test]
    async fn test_should_reject_unsupported_method() {
        let resp = service()
            .handle(request(http::Method::PATCH, "/items/42"))
            .await;
        assert_eq!(resp.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&resp);
    }

    #[tokio::test]
    async fn test_should_reject_foreign_path() {
        let resp = service().handle(request(http::Method::GET, "/users")).await;
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert_cors(&resp);
    }

    #[tokio::test]
    async fn test_should_surface_handler_failure_as_internal_error() {
        let resp = service().handle(request(http::Method::GET, "/items")).await;
        assert_eq!(resp.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&resp);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["errorMessage"], "Internal Server Error");
    }

    #[test]
    fn test_should_reject_invalid_origin() {
        let config = ItemHttpConfig {
            allowed_origin: "bad\norigin".to_owned(),
            ..ItemHttpConfig::default()
        };
        assert!(ItemHttpService::new(Arc::new(NotImplementedHandler), &config).is_err());
    }
}
