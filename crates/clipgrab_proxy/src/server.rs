use std::future::Future;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{HeaderName, CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use axum::response::Response;
use axum::Router;
use session_logging::{session_debug, session_info, session_warn};
use tokio::net::TcpListener;

use crate::{rewrite_path, target_url, ProxyConfig, ProxyError};

#[derive(Clone)]
pub struct ProxyState {
    config: Arc<ProxyConfig>,
    client: reqwest::Client,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        // No overall timeout: extraction can take long and errors are not translated.
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| ProxyError::Client(err.to_string()))?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

/// Every request lands in `forward`; paths outside the prefix answer 404 there.
pub fn router(state: ProxyState) -> Router {
    Router::new().fallback(forward).with_state(state)
}

/// Serves the proxy on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, config: ProxyConfig, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = ProxyState::new(config).map_err(std::io::Error::other)?;
    if let Ok(addr) = listener.local_addr() {
        session_info!(
            "Proxy listening on http://{} ({}/* -> {})",
            addr,
            state.config.prefix,
            state.config.backend_origin
        );
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn forward(State(state): State<ProxyState>, request: Request) -> Result<Response, ProxyError> {
    let path = request.uri().path().to_string();
    let rewritten = rewrite_path(&path, &state.config.prefix)
        .ok_or_else(|| ProxyError::OutsidePrefix(path.clone()))?;
    let target = target_url(&state.config.backend_origin, &rewritten, request.uri().query());
    session_debug!("{} {} -> {}", request.method(), path, target);

    let (parts, body) = request.into_parts();
    let body = to_bytes(body, state.config.body_limit)
        .await
        .map_err(|err| ProxyError::Body(err.to_string()))?;

    let mut upstream = state.client.request(parts.method, &target);
    for (name, value) in parts.headers.iter() {
        // The client derives Host from the target (change-origin) and sets the length itself.
        if name == HOST || name == CONTENT_LENGTH || is_hop_by_hop(name) {
            continue;
        }
        upstream = upstream.header(name, value);
    }
    if !body.is_empty() {
        upstream = upstream.body(body);
    }

    let upstream = upstream.send().await.map_err(|err| {
        session_warn!("Forward to {} failed: {}", target, err);
        ProxyError::Upstream(err.to_string())
    })?;

    let status = upstream.status();
    session_debug!("{} <- {}", target, status);
    let mut response = Response::builder().status(status);
    for (name, value) in upstream.headers() {
        if is_hop_by_hop(name) {
            continue;
        }
        response = response.header(name, value);
    }
    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|err| ProxyError::Response(err.to_string()))
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == CONNECTION || name == TRANSFER_ENCODING || name.as_str() == "keep-alive"
}
