#![allow(dead_code)]

pub mod test_server {
    use movies_api::middleware::CorsMiddleware;
    use movies_api::movie::Movie;
    use movies_api::server::{AppService, HttpServer, ServerHandle};
    use movies_api::store::MovieStore;
    use serde_json::json;
    use std::net::{SocketAddr, TcpListener};
    use std::sync::{Arc, Once};

    use super::tracing_util::TestTracing;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub const TEST_STACK_SIZE: usize = 0x8000;

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(TEST_STACK_SIZE);
        });
    }

    /// The single-record catalogue used by most tests.
    pub fn title_a() -> Movie {
        serde_json::from_value(json!({
            "id": "1",
            "title": "Title A",
            "year": 1999,
            "director": "Director A",
            "duration": 136,
            "rating": 8.7,
            "poster": "http://posters.example/title-a.jpg",
            "genre": ["Drama"]
        }))
        .unwrap()
    }

    /// Server on an ephemeral port, stopped on drop.
    pub struct TestServer {
        _tracing: TestTracing,
        handle: Option<ServerHandle>,
        addr: SocketAddr,
        pub store: Arc<MovieStore>,
    }

    impl TestServer {
        pub fn new() -> Self {
            Self::with_seed(vec![title_a()])
        }

        pub fn with_seed(movies: Vec<Movie>) -> Self {
            Self::with_seed_and_cors(movies, CorsMiddleware::default())
        }

        pub fn with_seed_and_cors(movies: Vec<Movie>, cors: CorsMiddleware) -> Self {
            setup_may_runtime();
            let tracing = TestTracing::init();

            let store = Arc::new(MovieStore::from_seed(movies).unwrap());
            let service =
                AppService::with_store(Arc::clone(&store), cors, TEST_STACK_SIZE).unwrap();

            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let handle = HttpServer(service).start(addr).unwrap();
            handle.wait_ready().unwrap();

            Self {
                _tracing: tracing,
                handle: Some(handle),
                addr,
                store,
            }
        }

        pub fn addr(&self) -> SocketAddr {
            self.addr
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.stop();
            }
        }
    }
}

pub mod tracing_util {
    /// Routes log output of the current test thread to the test harness.
    pub struct TestTracing {
        _guard: tracing::subscriber::DefaultGuard,
    }

    impl TestTracing {
        pub fn init() -> Self {
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_test_writer()
                .finish();
            Self {
                _guard: tracing::subscriber::set_default(subscriber),
            }
        }
    }
}

pub mod http {
    use serde_json::Value;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// A parsed HTTP/1.1 response.
    #[derive(Debug)]
    pub struct TestResponse {
        pub status: u16,
        /// Header lines in order, names as sent
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl TestResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> Value {
            serde_json::from_str(&self.body)
                .unwrap_or_else(|e| panic!("body is not JSON ({e}): {:?}", self.body))
        }
    }

    fn read_timeout() -> Duration {
        // Slower CI runners need a longer read window
        if std::env::var("CI").is_ok() {
            Duration::from_millis(3000)
        } else {
            Duration::from_millis(1000)
        }
    }

    /// Write `raw` and read one response, using `Content-Length` to find its end.
    pub fn send_raw(addr: &SocketAddr, raw: &str) -> TestResponse {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(read_timeout())).unwrap();
        stream.write_all(raw.as_bytes()).unwrap();

        let mut buf = Vec::new();
        let mut tmp = [0u8; 4096];
        let header_end = loop {
            if let Some(pos) = find_header_end(&buf) {
                break pos;
            }
            let n = stream.read(&mut tmp).expect("response headers");
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&tmp[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
        let mut lines = head.split("\r\n");
        let status = lines
            .next()
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|s| s.parse().ok())
            .expect("status line");
        let headers: Vec<(String, String)> = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        let content_length: usize = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);

        let body_start = header_end + 4;
        while buf.len() < body_start + content_length {
            let n = stream.read(&mut tmp).expect("response body");
            assert!(n > 0, "connection closed before body was complete");
            buf.extend_from_slice(&tmp[..n]);
        }
        let body =
            String::from_utf8_lossy(&buf[body_start..body_start + content_length]).into_owned();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    /// Send a request with optional extra header lines and JSON body.
    pub fn request(
        addr: &SocketAddr,
        method: &str,
        path: &str,
        extra_headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> TestResponse {
        let mut raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n");
        for (name, value) in extra_headers {
            raw.push_str(&format!("{name}: {value}\r\n"));
        }
        if let Some(body) = body {
            raw.push_str("Content-Type: application/json\r\n");
            raw.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
        } else {
            raw.push_str("\r\n");
        }
        send_raw(addr, &raw)
    }

    pub fn get(addr: &SocketAddr, path: &str) -> TestResponse {
        request(addr, "GET", path, &[], None)
    }

    pub fn post(addr: &SocketAddr, path: &str, body: &Value) -> TestResponse {
        request(addr, "POST", path, &[], Some(&body.to_string()))
    }

    pub fn patch(addr: &SocketAddr, path: &str, body: &Value) -> TestResponse {
        request(addr, "PATCH", path, &[], Some(&body.to_string()))
    }

    pub fn delete(addr: &SocketAddr, path: &str) -> TestResponse {
        request(addr, "DELETE", path, &[], None)
    }
}
