use std::{io::ErrorKind, net::SocketAddr, time::Duration};

use tokio::net::{TcpListener, lookup_host};

use crate::{
    api,
    error::{AuthError, Result},
    types::AuthorizationResult,
};

/// How long an accepted connection may stay silent before it is dropped.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Single-use loopback listener that waits for the authorization redirect.
///
/// The socket is owned by the value; [`CallbackListener::run`] consumes it, so
/// the port is released on every way out of the flow.
pub struct CallbackListener {
    listener: TcpListener,
    expected_state: Option<String>,
    read_timeout: Duration,
}

impl CallbackListener {
    /// Binds `addr` (e.g. `127.0.0.1:8000`). The address must resolve to
    /// loopback only; anything else is a configuration error. A port held by
    /// someone else fails immediately with [`AuthError::PortInUse`].
    pub async fn bind(addr: &str) -> Result<Self> {
        let addrs: Vec<SocketAddr> = lookup_host(addr)
            .await
            .map_err(|e| {
                AuthError::Configuration(format!("cannot resolve callback address {addr}: {e}"))
            })?
            .collect();

        if addrs.is_empty() || addrs.iter().any(|a| !a.ip().is_loopback()) {
            return Err(AuthError::Configuration(format!(
                "callback address {addr} is not a loopback address"
            )));
        }

        let listener = TcpListener::bind(addrs.as_slice())
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AddrInUse => AuthError::PortInUse(addr.to_string()),
                _ => AuthError::Listener(e),
            })?;

        Ok(CallbackListener {
            listener,
            expected_state: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Requires redirects to carry this `state` value.
    pub fn expect_state(mut self, state: Option<String>) -> Self {
        self.expected_state = state;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(AuthError::Listener)
    }

    /// Accepts up to `max_attempts` requests, stopping at the first one that
    /// yields a code. Requests without a code (favicon fetches, denied
    /// consents, stray pre-connects) each use up one attempt.
    pub async fn run(self, max_attempts: u32) -> Result<AuthorizationResult> {
        let mut last_error = None::<String>;

        for _ in 0..max_attempts {
            let (mut stream, _) = self.listener.accept().await.map_err(AuthError::Listener)?;

            match api::callback(
                &mut stream,
                self.expected_state.as_deref(),
                self.read_timeout,
            )
            .await
            {
                AuthorizationResult::Code(code) => return Ok(AuthorizationResult::Code(code)),
                AuthorizationResult::Error(reason) => last_error = Some(reason),
            }
        }

        Ok(AuthorizationResult::Error(match last_error {
            Some(reason) => format!("no code after {max_attempts} attempts (last: {reason})"),
            None => format!("no code after {max_attempts} attempts"),
        }))
    }
}
