#![allow(dead_code)]

use std::{net::TcpListener as StdTcpListener, sync::Mutex, time::Duration};

use spotauth::{
    error::{AuthError, Result},
    spotify::{Browser, TokenExchanger},
    types::{Credentials, TokenBundle},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

pub fn bundle(access_token: &str, refresh_token: Option<&str>, issued_at: i64) -> TokenBundle {
    TokenBundle {
        access_token: access_token.to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        refresh_token: refresh_token.map(str::to_string),
        scope: "playlist-modify-public".to_string(),
        issued_at,
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("id", "secret")
}

/// A loopback port that was free a moment ago.
pub fn free_port() -> u16 {
    StdTcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Sends GET requests for `paths` one after another, returning each response
/// body (or the error text).
pub fn send_requests(base: String, paths: Vec<&'static str>) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let client = http_client();
        let mut bodies = Vec::new();
        for path in paths {
            let body = match client.get(format!("{base}{path}")).send().await {
                Ok(response) => {
                    assert_eq!(response.status(), 200);
                    response.text().await.unwrap_or_default()
                }
                Err(e) => format!("request failed: {e}"),
            };
            bodies.push(body);
        }
        bodies
    })
}

/// One-shot HTTP stub for the token endpoint. Answers the first request with
/// `status` and `body` and yields the raw request it received.
pub async fn stub_token_endpoint(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/api/token", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];

        let head_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            raw.extend_from_slice(&chunk[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&raw[..head_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|v| v.trim().parse::<usize>().unwrap())
            .unwrap_or(0);
        while raw.len() < head_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
        }

        let reason = if status < 300 { "OK" } else { "Bad Request" };
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();

        String::from_utf8_lossy(&raw).into_owned()
    });

    (url, handle)
}

/// Body of a raw HTTP request.
pub fn request_body(raw: &str) -> &str {
    raw.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
}

/// Token endpoint double. A `None` response makes the exchange fail with a
/// 400 `invalid_grant`.
#[derive(Default)]
pub struct FakeExchanger {
    pub code_response: Option<TokenBundle>,
    pub refresh_response: Option<TokenBundle>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeExchanger {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(response: &Option<TokenBundle>) -> Result<TokenBundle> {
        response.clone().ok_or_else(|| AuthError::AuthServer {
            status: 400,
            body: r#"{"error":"invalid_grant"}"#.to_string(),
        })
    }
}

impl TokenExchanger for &FakeExchanger {
    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
        _credentials: &Credentials,
    ) -> Result<TokenBundle> {
        self.calls.lock().unwrap().push(format!("code:{code}"));
        FakeExchanger::answer(&self.code_response)
    }

    async fn exchange_refresh(
        &self,
        refresh_token: &str,
        _credentials: &Credentials,
    ) -> Result<TokenBundle> {
        self.calls.lock().unwrap().push(format!("refresh:{refresh_token}"));
        FakeExchanger::answer(&self.refresh_response)
    }
}

/// Browser double that plays the authorization server: when asked to open a
/// URL it fires the given redirect requests at the callback port.
pub struct RedirectingBrowser {
    pub callback_base: String,
    pub paths: Vec<&'static str>,
    pub opened: Mutex<Vec<String>>,
}

impl RedirectingBrowser {
    pub fn new(port: u16, paths: Vec<&'static str>) -> Self {
        RedirectingBrowser {
            callback_base: format!("http://127.0.0.1:{port}"),
            paths,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Browser for &RedirectingBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        send_requests(self.callback_base.clone(), self.paths.clone());
        Ok(())
    }
}
