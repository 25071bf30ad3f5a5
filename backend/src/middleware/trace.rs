//! Request correlation for the bank API.
//!
//! Every request runs inside a [`TraceId`] scope. A caller may supply its own
//! identifier in the `trace-id` header; malformed values are replaced with a
//! fresh one. The identifier is echoed on the response and stamped on any
//! domain error body raised while the request is handled.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Reuse the caller's identifier when it parses, otherwise mint one.
fn inbound_trace_id(req: &ServiceRequest) -> TraceId {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or_else(TraceId::generate)
}

/// Middleware that scopes each request to a [`TraceId`].
///
/// Handlers read the identifier with [`TraceId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use bloodbank::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = inbound_trace_id(&req);
        let method = req.method().clone();
        let path = req.path().to_owned();
        let started = Instant::now();
        let fut = self.service.call(req);
        Box::pin(TraceId::scope(trace_id, async move {
            let mut res = fut.await?;
            // A hyphenated UUID is always a valid header value.
            if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
                res.response_mut()
                    .headers_mut()
                    .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
            }
            let status = res.status().as_u16();
            let elapsed_ms = started.elapsed().as_millis();
            if res.status().is_server_error() {
                warn!(%trace_id, %method, path, status, elapsed_ms, "request failed");
            } else {
                debug!(%trace_id, %method, path, status, elapsed_ms, "request completed");
            }
            Ok(res)
        }))
    }
}
