// tests/integration/test_helpers.rs

//! Test helpers and utilities for integration tests

use ftserve::client::{self, ClientConfig, Request, Transfer};
use ftserve::config::Config;
use ftserve::core::FtServeError;
use ftserve::core::protocol::transport;
use ftserve::core::state::ServerState;
use ftserve::server;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Largest reply the raw helpers will read.
const MAX_TEST_MESSAGE: usize = 16 * 1024 * 1024;

/// A running server bound to an ephemeral loopback port, serving a private
/// temporary directory. The accept loop is stopped when the value is dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
    pub root: TempDir,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Starts a server over an empty directory.
    pub async fn new() -> Self {
        Self::with_files(&[]).await
    }

    /// Starts a server over a directory holding `files`.
    pub async fn with_files(files: &[(&str, &[u8])]) -> Self {
        Self::with_config(files, |_| {}).await
    }

    /// Starts a server over `files`, letting the caller adjust the configuration.
    pub async fn with_config(files: &[(&str, &[u8])], customize: impl FnOnce(&mut Config)) -> Self {
        init_tracing();

        let root = TempDir::new().expect("Failed to create temporary root");
        for (name, contents) in files {
            std::fs::write(root.path().join(name), contents).expect("Failed to write fixture file");
        }

        let mut config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            root: root.path().to_path_buf(),
            linger_timeout_ms: 200,
            ..Config::default()
        };
        customize(&mut config);

        let ctx = server::bind(config).await.expect("Failed to bind test server");
        let addr = ctx.local_addr().expect("Failed to read test server address");
        let state = ctx.state.clone();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server::serve(ctx, async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            addr,
            state,
            root,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// A client configuration pointed at this server.
    pub fn client(&self, data_port: u16) -> ClientConfig {
        ClientConfig::new("127.0.0.1", self.addr.port(), data_port)
    }

    /// Executes a request on a fresh data port.
    pub async fn request(&self, request: Request) -> Result<Transfer, FtServeError> {
        client::execute(&self.client(free_port()), &request).await
    }

    pub async fn list(&self) -> Result<Transfer, FtServeError> {
        self.request(Request::List).await
    }

    pub async fn get(&self, filename: &str) -> Result<Transfer, FtServeError> {
        self.request(Request::Get {
            filename: filename.to_string(),
        })
        .await
    }

    /// Opens a bare control connection for tests that speak the wire format directly.
    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr)
            .await
            .expect("Failed to connect to test server")
    }

    /// Stops the accept loop and waits for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.expect("Server task panicked");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Initializes tracing once for the whole test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("warn"))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Returns a loopback port that was free a moment ago.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to reserve a port");
    listener
        .local_addr()
        .expect("Failed to read reserved port")
        .port()
}

/// Connects to a data port, retrying while the server has not bound it yet.
pub async fn connect_data(port: u16) -> TcpStream {
    for _ in 0..200 {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", port)).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Data listener on port {port} never became reachable");
}

/// Sends a command token and data port on a raw control connection.
pub async fn send_command(control: &mut TcpStream, token: &[u8], data_port: u32) {
    transport::send_frame(control, token).await.unwrap();
    transport::send_length(control, data_port).await.unwrap();
}

/// Reads one length-prefixed message from a raw connection.
pub async fn read_frame(conn: &mut TcpStream) -> Result<bytes::Bytes, FtServeError> {
    transport::receive_frame(conn, MAX_TEST_MESSAGE).await
}

/// Polls `condition` until it holds or roughly two seconds pass.
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
