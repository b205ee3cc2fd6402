use chart_sync::ChartSyncError;
use chart_sync::core::DataPoint;
use chart_sync::live::{HttpPointSource, PointSource};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one HTTP response and hands back the raw request head.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let read = socket.read(&mut buf).await.expect("read");
            if read == 0 {
                break;
            }
            head.extend_from_slice(&buf[..read]);
        }
        let response = format!(
            concat!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n",
                "content-length: {len}\r\nconnection: close\r\n\r\n{body}"
            ),
            status = status,
            len = body.len(),
            body = body,
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.expect("shutdown");
        String::from_utf8_lossy(&head).into_owned()
    });
    (base, handle)
}

#[tokio::test]
async fn fetch_appends_from_and_decodes_pairs() {
    let (base, server) = serve_once("200 OK", "[[5001, 0.5], [5002, 0.75]]").await;
    let source = HttpPointSource::default()
        .with_base_url(&base)
        .expect("base url");

    let points = source
        .fetch_since("/program/p/run/3/metric?name=cpu", Some(5000.0))
        .await
        .expect("fetch");

    assert_eq!(
        points,
        vec![DataPoint::new(5001.0, 0.5), DataPoint::new(5002.0, 0.75)]
    );
    let request = server.await.expect("server");
    let request_line = request.lines().next().expect("request line");
    assert_eq!(
        request_line,
        "GET /program/p/run/3/metric?name=cpu&from=5000 HTTP/1.1"
    );
}

#[tokio::test]
async fn first_fetch_omits_from() {
    let (base, server) = serve_once("200 OK", "[]").await;
    let source = HttpPointSource::default();

    let points = source
        .fetch_since(&format!("{base}/metric?name=mem"), None)
        .await
        .expect("fetch");

    assert!(points.is_empty());
    let request = server.await.expect("server");
    assert!(request.starts_with("GET /metric?name=mem HTTP/1.1"));
}

#[tokio::test]
async fn error_status_is_a_fetch_error() {
    let (base, server) = serve_once("500 Internal Server Error", "{}").await;
    let source = HttpPointSource::default();

    let err = source
        .fetch_since(&format!("{base}/metric"), Some(1.0))
        .await
        .expect_err("server error");

    assert!(matches!(err, ChartSyncError::Fetch(_)));
    server.await.expect("server");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (base, server) = serve_once("200 OK", r#"{"points": []}"#).await;
    let source = HttpPointSource::default();

    let err = source
        .fetch_since(&format!("{base}/metric"), None)
        .await
        .expect_err("bad body");

    assert!(matches!(err, ChartSyncError::Decode(_)));
    server.await.expect("server");
}
