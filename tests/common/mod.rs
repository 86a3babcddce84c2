#![allow(dead_code)]

pub mod test_server {
    use sprint::logger::MemoryLogger;
    use sprint::module::RouteTable;
    use sprint::runtime_config::RuntimeConfig;
    use sprint::server::{Server, ServerHandle};
    use std::net::SocketAddr;
    use std::sync::{Arc, Once};

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }

    /// A running server on an ephemeral port, stopped on drop
    pub struct TestServer {
        handle: Option<ServerHandle>,
        pub addr: SocketAddr,
        pub logger: Arc<MemoryLogger>,
    }

    impl TestServer {
        pub fn start(table: &RouteTable, mut config: RuntimeConfig) -> Self {
            setup_may_runtime();
            config.host = "127.0.0.1".to_string();
            config.port = 0;
            let logger = Arc::new(MemoryLogger::new());
            let handle = Server::new(config, logger.clone())
                .start(table)
                .expect("server should bind an ephemeral port");
            handle.wait_ready().expect("server should accept connections");
            Self {
                addr: handle.local_addr(),
                handle: Some(handle),
                logger,
            }
        }

        pub fn echo(config: RuntimeConfig) -> Self {
            let table = sprint::echo::route_table(&sprint::logger::NoopLogger)
                .expect("demo module graph is valid");
            Self::start(&table, config)
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

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// A response split the way the server writes it (LF-only)
    #[derive(Debug, Clone)]
    pub struct RawResponse {
        pub status_line: String,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl RawResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Write `request` verbatim and read until the server closes
    pub fn send_raw(addr: SocketAddr, request: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set read timeout");
        stream.write_all(request).expect("write request");
        let mut out = Vec::new();
        stream.read_to_end(&mut out).expect("read response");
        String::from_utf8_lossy(&out).into_owned()
    }

    pub fn parse_response(raw: &str) -> RawResponse {
        let (head, body) = raw.split_once("\n\n").unwrap_or((raw, ""));
        let mut lines = head.lines();
        let status_line = lines.next().unwrap_or_default().to_string();
        let headers = lines
            .filter_map(|line| line.split_once(": "))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RawResponse {
            status_line,
            headers,
            body: body.to_string(),
        }
    }

    pub fn request(addr: SocketAddr, request: &[u8]) -> RawResponse {
        parse_response(&send_raw(addr, request))
    }
}
