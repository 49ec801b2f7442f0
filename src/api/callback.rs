use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::types::AuthorizationResult;

const MAX_REQUEST_HEAD: usize = 16 * 1024;

const SUCCESS_PAGE: &str = "<html><head><title>spotauth</title></head><body>\
<h2>Authentication successful.</h2><p>You may now close this window.</p></body></html>";

const FAILURE_PAGE: &str = "<html><head><title>spotauth</title></head><body>\
<h4>Error: Authentication failed.</h4></body></html>";

/// Serves one HTTP exchange on an accepted callback connection.
///
/// The browser always gets a `200` answer before this returns, whatever the
/// outcome; the caller decides afterwards whether to keep listening.
pub async fn callback<S>(
    stream: &mut S,
    expected_state: Option<&str>,
    read_timeout: Duration,
) -> AuthorizationResult
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let head = match tokio::time::timeout(read_timeout, read_request_head(stream)).await {
        Ok(Ok(head)) => head,
        Ok(Err(e)) => return AuthorizationResult::Error(format!("failed to read request: {e}")),
        Err(_) => return AuthorizationResult::Error("no request received".to_string()),
    };

    let Some((method, target)) = request_line(&head) else {
        let _ = respond(stream, FAILURE_PAGE, true).await;
        return AuthorizationResult::Error("malformed request line".to_string());
    };

    if method.eq_ignore_ascii_case("HEAD") {
        let _ = respond(stream, SUCCESS_PAGE, false).await;
        return AuthorizationResult::Error("HEAD request carries no code".to_string());
    }

    let result = parse_callback(target, expected_state);
    let page = match result {
        AuthorizationResult::Code(_) => SUCCESS_PAGE,
        AuthorizationResult::Error(_) => FAILURE_PAGE,
    };
    // The captured code stays valid even if the browser hung up early.
    let _ = respond(stream, page, true).await;
    result
}

/// Extracts the authorization outcome from a redirect request target such as
/// `/?code=...&state=...` or `/callback?error=access_denied`.
pub fn parse_callback(target: &str, expected_state: Option<&str>) -> AuthorizationResult {
    let url = if target.starts_with('/') {
        reqwest::Url::parse(&format!("http://localhost{target}"))
    } else {
        reqwest::Url::parse(target)
    };
    let url = match url {
        Ok(url) => url,
        Err(e) => return AuthorizationResult::Error(format!("invalid request target: {e}")),
    };

    let mut code = None::<String>;
    let mut state = None::<String>;
    let mut error = None::<String>;
    let mut error_description = None::<String>;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return AuthorizationResult::Error(match error_description {
            Some(description) => format!("authorization denied: {error} ({description})"),
            None => format!("authorization denied: {error}"),
        });
    }

    let Some(code) = code.filter(|c| !c.is_empty()) else {
        return AuthorizationResult::Error("missing code parameter".to_string());
    };

    if let Some(expected) = expected_state {
        if state.as_deref() != Some(expected) {
            return AuthorizationResult::Error("state mismatch".to_string());
        }
    }

    AuthorizationResult::Code(code)
}

async fn read_request_head<S: AsyncRead + Unpin>(stream: &mut S) -> std::io::Result<String> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }

    if buffer.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed before a request was sent",
        ));
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn request_line(head: &str) -> Option<(&str, &str)> {
    let mut parts = head.lines().next()?.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    Some((method, target))
}

async fn respond<S: AsyncWrite + Unpin>(
    stream: &mut S,
    page: &str,
    with_body: bool,
) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        page.len()
    );
    stream.write_all(head.as_bytes()).await?;
    if with_body {
        stream.write_all(page.as_bytes()).await?;
    }
    stream.flush().await?;
    stream.shutdown().await
}
