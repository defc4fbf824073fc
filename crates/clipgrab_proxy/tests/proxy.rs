use std::net::SocketAddr;

use clipgrab_engine::{Backend, ClientSettings, ReqwestBackend, WorkflowError};
use clipgrab_proxy::{ProxyConfig, DEFAULT_PREFIX};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const URL: &str = "https://tiktok.com/@a/video/1";

struct RunningProxy {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
}

impl RunningProxy {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn start_proxy(backend_origin: String) -> RunningProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let config = ProxyConfig {
        listen_addr: addr,
        backend_origin,
        ..ProxyConfig::default()
    };
    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async move {
            let _ = stopped.await;
        };
        clipgrab_proxy::serve(listener, config, shutdown)
            .await
            .expect("proxy serve");
    });
    RunningProxy {
        addr,
        stop: Some(stop),
    }
}

#[tokio::test]
async fn metadata_request_is_forwarded_without_prefix() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .and(query_param("url", URL))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"title":"Cat video"}"#, "application/json"),
        )
        .expect(1)
        .mount(&backend)
        .await;
    let proxy = start_proxy(backend.uri()).await;

    let response = reqwest::Client::new()
        .get(proxy.url(
            "/api/metadata?url=https%3A%2F%2Ftiktok.com%2F%40a%2Fvideo%2F1",
        ))
        .send()
        .await
        .expect("send");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok()),
        Some("application/json")
    );
    assert_eq!(response.text().await.expect("body"), r#"{"title":"Cat video"}"#);
}

#[tokio::test]
async fn post_body_and_headers_pass_through() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .and(header("content-type", "application/json"))
        .and(header("x-client", "clipgrab"))
        .and(body_json(serde_json::json!({ "url": URL })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clip-bytes".to_vec()))
        .expect(1)
        .mount(&backend)
        .await;
    let proxy = start_proxy(backend.uri()).await;

    let response = reqwest::Client::new()
        .post(proxy.url("/api/download"))
        .header("content-type", "application/json")
        .header("x-client", "clipgrab")
        .body(serde_json::json!({ "url": URL }).to_string())
        .send()
        .await
        .expect("send");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.bytes().await.expect("body").as_ref(), b"clip-bytes");
}

#[tokio::test]
async fn upstream_error_status_is_not_translated() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found\n"))
        .mount(&backend)
        .await;
    let proxy = start_proxy(backend.uri()).await;

    let response = reqwest::get(proxy.url("/api/metadata?url=x"))
        .await
        .expect("send");

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(response.text().await.expect("body"), "not found\n");
}

#[tokio::test]
async fn paths_outside_prefix_are_not_forwarded() {
    let backend = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;
    let proxy = start_proxy(backend.uri()).await;

    for outside in ["/metadata", "/apix/metadata", "/"] {
        let response = reqwest::get(proxy.url(outside)).await.expect("send");
        assert_eq!(response.status().as_u16(), 404, "{outside}");
    }
}

#[tokio::test]
async fn bare_prefix_forwards_to_backend_root() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("root"))
        .expect(1)
        .mount(&backend)
        .await;
    let proxy = start_proxy(backend.uri()).await;

    let response = reqwest::get(proxy.url(DEFAULT_PREFIX)).await.expect("send");
    assert_eq!(response.text().await.expect("body"), "root");
}

#[tokio::test]
async fn unreachable_backend_is_a_bad_gateway() {
    let closed = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let origin = format!("http://{}", closed.local_addr().expect("addr"));
    drop(closed);
    let proxy = start_proxy(origin).await;

    let response = reqwest::get(proxy.url("/api/metadata?url=x"))
        .await
        .expect("send");
    assert_eq!(response.status().as_u16(), 502);
}

#[tokio::test]
async fn client_backend_works_through_the_proxy() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .and(query_param("url", URL))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"title":"Cat video","thumbnail":"","original_url":"https://tiktok.com/@a/video/1"}"#,
            "application/json",
        ))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(500).set_body_string("yt-dlp failed\n"))
        .mount(&backend)
        .await;
    let proxy = start_proxy(backend.uri()).await;

    let client = ReqwestBackend::new(ClientSettings {
        backend_base: proxy.url("/api"),
        ..ClientSettings::default()
    })
    .expect("client backend");

    let metadata = client.metadata(URL).await.expect("metadata");
    assert_eq!(metadata.title, "Cat video");
    assert_eq!(metadata.thumbnail_url, None);

    let err = client.download(URL).await.unwrap_err();
    assert_eq!(
        err,
        WorkflowError::Http {
            status: 500,
            body: "yt-dlp failed".to_string()
        }
    );
}
