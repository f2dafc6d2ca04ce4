//! Shared utilities for the integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use gatekeeper::{GatekeeperConfig, GatekeeperServer, Shutdown};

/// A User-Agent no signature matches.
pub const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// A running gatekeeper on ephemeral ports.
pub struct TestGatekeeper {
    pub addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestGatekeeper {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    #[allow(dead_code)]
    pub fn admin_url(&self, path: &str) -> String {
        format!("http://{}{}", self.admin_addr, path)
    }
}

/// Start a gatekeeper with the given configuration on ephemeral ports.
pub async fn spawn_gatekeeper(mut config: GatekeeperConfig) -> TestGatekeeper {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let admin_addr = admin_listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();
    config.admin.bind_address = admin_addr.to_string();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = GatekeeperServer::new(config);

    tokio::spawn(async move {
        let _ = server
            .run(listener, Some(admin_listener), server_shutdown)
            .await;
    });

    // Wait for the listeners to start serving.
    tokio::time::sleep(Duration::from_millis(200)).await;

    TestGatekeeper {
        addr,
        admin_addr,
        shutdown,
    }
}

/// Client presenting a browser User-Agent, so the bot detector admits it.
pub fn browser_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(BROWSER_UA)
        .no_proxy()
        .build()
        .unwrap()
}

/// Client sending no User-Agent at all.
#[allow(dead_code)]
pub fn anonymous_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Admin client; the admin listener sits outside the admission chain, so no
/// User-Agent is needed.
#[allow(dead_code)]
pub fn admin_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
