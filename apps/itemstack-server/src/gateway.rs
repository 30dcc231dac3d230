//! Gateway service in front of the item API.
//!
//! Health-check endpoints (`/_health`, `/health`) are answered here and never
//! reach the item service; everything else is forwarded to it.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use hyper::body::Incoming;
use hyper::service::Service;

use itemstack_http::body::ItemResponseBody;
use itemstack_http::dispatch::ItemHandler;
use itemstack_http::service::ItemHttpService;

/// Gateway wrapping the item HTTP service.
#[derive(Debug)]
pub struct GatewayService<H: ItemHandler> {
    items: ItemHttpService<H>,
    version: &'static str,
}

impl<H: ItemHandler> GatewayService<H> {
    /// Create a gateway reporting `version` on the health endpoint.
    pub fn new(items: ItemHttpService<H>, version: &'static str) -> Self {
        Self { items, version }
    }
}

impl<H: ItemHandler> Clone for GatewayService<H> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            version: self.version,
        }
    }
}

impl<H: ItemHandler> Service<http::Request<Incoming>> for GatewayService<H> {
    type Response = http::Response<ItemResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            let resp = health_check_response(self.version);
            return Box::pin(async { Ok(resp) });
        }

        let items = self.items.clone();
        Box::pin(async move { Ok(items.handle(req).await) })
    }
}

/// Check if the request targets a health endpoint.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/health")
}

/// Produce the health check response.
fn health_check_response(version: &str) -> http::Response<ItemResponseBody> {
    let body = serde_json::json!({ "status": "running", "version": version });
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(ItemResponseBody::from_json(body.to_string().into_bytes()))
        .expect("static health response should be valid")
}
