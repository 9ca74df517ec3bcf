//! Server-mode grids against a local HTTP endpoint.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use datagrid_lib::Error;
use datagrid_lib::Grid;
use datagrid_lib::GridClient;
use datagrid_lib::api::FetchRequest;
use datagrid_lib::config::GridConfig;
use datagrid_lib::config::HttpConfig;
use datagrid_lib::config::HttpMethod;
use datagrid_lib::config::PostDataFormat;
use datagrid_lib::error::ApiError;
use datagrid_lib::grid::GridAction;
use datagrid_lib::grid::LoadPhase;
use datagrid_lib::model::DataType;
use datagrid_lib::query::FilterSpec;
use datagrid_lib::query::Operator;
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

/// A request as the server saw it.
#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: String,
}

struct Reply {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

impl Reply {
    fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: None,
        }
    }

    fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }
}

type Handler = Arc<dyn Fn(&Recorded) -> Reply + Send + Sync>;

struct TestServer {
    url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let io = TokioIo::new(stream);
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let handler = Arc::clone(&handler);
                        let log = Arc::clone(&log);
                        async move {
                            let recorded = record(req).await;
                            let reply = handler(&recorded);
                            log.lock().unwrap().push(recorded);
                            if let Some(delay) = reply.delay {
                                tokio::time::sleep(delay).await;
                            }
                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(reply.status)
                                    .header("Content-Type", "application/json")
                                    .body(Full::new(Bytes::from(reply.body)))
                                    .unwrap(),
                            )
                        }
                    });
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        Self {
            url: format!("http://{}/rows", addr),
            requests,
        }
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn config(&self, http: HttpConfig) -> GridConfig {
        GridConfig::new().with_endpoint(self.url.clone()).with_http(http)
    }
}

async fn record(req: Request<Incoming>) -> Recorded {
    let (parts, body) = req.into_parts();
    let body = body.collect().await.map(|b| b.to_bytes()).unwrap_or_default();
    let query = parts
        .uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let headers = parts
        .headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();

    Recorded {
        method: parts.method.to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

fn names(grid: &Grid) -> Vec<String> {
    grid.page_rows().iter().map(|r| r.value("name").to_string()).collect()
}

#[tokio::test]
async fn test_get_sends_query_and_headers() {
    let server = TestServer::start(|req| match req.query.get("continuationToken") {
        None => Reply::ok(r#"{"Items":[{"name":"r1"}],"ContinuationToken":"tok1","HasMore":true,"Count":10}"#),
        Some(_) => Reply::ok(r#"{"items":[{"name":"r2"}],"hasMore":false,"count":10}"#),
    })
    .await;

    let http = HttpConfig::default()
        .with_bearer_token("secret")
        .with_api_key("k1")
        .with_header("X-Tenant", "acme");
    let mut grid = Grid::new(server.config(http)).unwrap();

    grid.load().await;
    assert_eq!(grid.state().phase, LoadPhase::Success);
    assert_eq!(names(&grid), vec!["r1"]);
    assert_eq!(grid.pagination().total_records, 10);

    grid.apply(GridAction::NavigateNext).await;
    assert_eq!(names(&grid), vec!["r2"]);
    assert_eq!(grid.state().cursor.history, vec![None]);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);

    let first = &requests[0];
    assert_eq!(first.method, "GET");
    assert_eq!(first.query["page"], "1");
    assert_eq!(first.query["pageSize"], "10");
    assert_eq!(first.query["search"], "");
    assert_eq!(first.query["filters"], "[]");
    assert!(!first.query.contains_key("continuationToken"));
    assert_eq!(first.headers["authorization"], "Bearer secret");
    assert_eq!(first.headers["x-api-key"], "k1");
    assert_eq!(first.headers["x-tenant"], "acme");
    assert_eq!(first.headers["accept"], "application/json");

    let second = &requests[1];
    assert_eq!(second.query["page"], "2");
    assert_eq!(second.query["continuationToken"], "tok1");
}

#[tokio::test]
async fn test_post_json_body() {
    let server = TestServer::start(|_| Reply::ok(r#"[{"name":"Amy","age":31}]"#)).await;
    let http = HttpConfig::default().with_method(HttpMethod::Post);
    let mut grid = Grid::new(server.config(http).with_server_page_size(25)).unwrap();

    grid.apply(GridAction::SetSearchTerm("amy".into())).await;
    grid.apply(GridAction::AddFilter(FilterSpec::new(
        "age",
        Operator::Gt,
        30i64,
        DataType::Number,
    )))
    .await;
    assert_eq!(names(&grid), vec!["Amy"]);

    let last = server.requests().pop().unwrap();
    assert_eq!(last.method, "POST");
    assert!(last.query.is_empty());
    assert!(last.headers["content-type"].starts_with("application/json"));

    let body: serde_json::Value = serde_json::from_str(&last.body).unwrap();
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 25);
    assert_eq!(body["search"], "amy");
    assert_eq!(body["filters"][0]["column"], "age");
    assert_eq!(body["filters"][0]["operator"], "gt");
    assert_eq!(body["filters"][0]["label"], "age gt \"30\"");
    assert!(body.get("continuationToken").is_none());
}

#[tokio::test]
async fn test_post_form_body() {
    let server = TestServer::start(|_| Reply::ok(r#"{"data":[]}"#)).await;
    let http = HttpConfig::default()
        .with_method(HttpMethod::Post)
        .with_post_data_format(PostDataFormat::Form);
    let mut grid = Grid::new(server.config(http)).unwrap();

    grid.apply(GridAction::SetSearchTerm("a b".into())).await;

    let last = server.requests().pop().unwrap();
    assert!(last.headers["content-type"].starts_with("application/x-www-form-urlencoded"));
    let form: HashMap<String, String> = url::form_urlencoded::parse(last.body.as_bytes()).into_owned().collect();
    assert_eq!(form["search"], "a b");
    assert_eq!(form["page"], "1");
}

#[tokio::test]
async fn test_http_error_then_refresh() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let server = TestServer::start(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Reply::status(503, "")
        } else {
            Reply::ok(r#"{"items":[{"name":"back"}]}"#)
        }
    })
    .await;
    let mut grid = Grid::new(server.config(HttpConfig::default())).unwrap();

    grid.load().await;
    assert_eq!(grid.state().phase, LoadPhase::Error);
    assert_eq!(grid.error(), Some("HTTP 503: Service Unavailable"));
    assert!(!grid.is_loading());

    grid.apply(GridAction::Refresh).await;
    assert_eq!(grid.state().phase, LoadPhase::Success);
    assert_eq!(grid.error(), None);
    assert_eq!(names(&grid), vec!["back"]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_timeout_becomes_error_state() {
    let server = TestServer::start(|_| Reply {
        delay: Some(Duration::from_secs(5)),
        ..Reply::ok("[]")
    })
    .await;
    let http = HttpConfig::default().with_timeout(Duration::from_millis(200));
    let mut grid = Grid::new(server.config(http)).unwrap();

    grid.load().await;
    assert_eq!(grid.state().phase, LoadPhase::Error);
    assert!(grid.error().is_some_and(|e| e.starts_with("Timeout")));
}

#[tokio::test]
async fn test_unparseable_and_unrecognized_bodies() {
    let server = TestServer::start(|req| match req.query.get("search").map(String::as_str) {
        Some("broken") => Reply::ok("not json"),
        _ => Reply::ok(r#"{"error":"nothing here"}"#),
    })
    .await;
    let mut grid = Grid::new(server.config(HttpConfig::default())).unwrap();

    grid.load().await;
    assert_eq!(grid.state().phase, LoadPhase::Success);
    assert!(grid.page_rows().is_empty());
    assert!(!grid.pagination().has_next);

    grid.apply(GridAction::SetSearchTerm("broken".into())).await;
    assert_eq!(grid.state().phase, LoadPhase::Error);
    assert!(grid.error().is_some_and(|e| e.starts_with("Response parse error")));
}

#[tokio::test]
async fn test_client_fetch_directly() {
    let server = TestServer::start(|_| Reply::status(404, "no such table")).await;
    let client = GridClient::builder().endpoint(server.url.clone()).build().unwrap();

    let request = FetchRequest {
        page: 1,
        page_size: 10,
        search: String::new(),
        filters: Vec::new(),
        continuation_token: None,
    };
    let err = client.fetch(&request).await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert!(matches!(err, ApiError::Http { ref message, .. } if message == "no such table"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_invalid_endpoint_rejected() {
    let result = Grid::new(GridConfig::new().with_endpoint("ftp://example.com/rows"));
    assert!(matches!(result, Err(Error::Config(_))));
}
