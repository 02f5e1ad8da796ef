//! Request builders and response readers for `tower::ServiceExt::oneshot` tests.

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response, header};
use serde_json::Value;

use crate::auth::MockAuth;

/// Build a request with optional identity and JSON body.
pub fn build(method: Method, uri: &str, auth: Option<&MockAuth>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        for (name, value) in auth.headers().iter() {
            builder = builder.header(name, value);
        }
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Collect a response body and parse it as JSON.
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as UTF-8 text.
pub async fn text_body(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
