use crate::{
    error::{AuthError, Result},
    info,
    management::TokenCache,
    server::CallbackListener,
    spotify::token::{DEFAULT_TOKEN_URL, HttpTokenExchanger, TokenExchanger},
    types::{AuthorizationRequest, Credentials, TokenBundle},
    utils::{self, Clock, SystemClock},
    warning,
};

pub const DEFAULT_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize/";

/// Requests accepted on the callback port before giving up on a code.
pub const MAX_CALLBACK_ATTEMPTS: u32 = 5;

/// Opens the authorization URL for the user.
pub trait Browser {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// The platform's default web browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        webbrowser::open(url)
    }
}

/// Which path produced the token handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    /// A fresh bundle was already cached; no network traffic happened.
    Cache,
    /// A stale bundle was renewed with its refresh token.
    Refreshed,
    /// The user went through the browser authorization.
    Authorized,
}

#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub bundle: TokenBundle,
    pub origin: TokenOrigin,
}

/// What the cache (plus a refresh, if one was possible) could provide.
#[derive(Debug)]
pub enum CachedToken {
    Ready(ResolvedToken),
    /// A browser login is needed. Carries the refresh failure, if any.
    NeedsLogin(Option<AuthError>),
}

/// Produces a usable access token for a single local user.
///
/// Decision order on every call: a fresh cached bundle is returned as-is; a
/// stale one with a refresh token is refreshed; anything else (including a
/// failed refresh) goes through the browser redirect flow. Results of both
/// exchanges are written back to the cache.
pub struct OAuth2Client<X = HttpTokenExchanger, B = SystemBrowser, C = SystemClock> {
    request: AuthorizationRequest,
    credentials: Credentials,
    cache: TokenCache,
    authorize_url: String,
    callback_address: Option<String>,
    max_attempts: u32,
    exchanger: X,
    browser: B,
    clock: C,
}

impl OAuth2Client {
    /// Client talking to the Spotify accounts service with the system browser
    /// and wall clock.
    pub fn new(
        request: AuthorizationRequest,
        credentials: Credentials,
        cache: TokenCache,
    ) -> Result<Self> {
        Ok(OAuth2Client {
            request,
            credentials,
            cache,
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            callback_address: None,
            max_attempts: MAX_CALLBACK_ATTEMPTS,
            exchanger: HttpTokenExchanger::new(DEFAULT_TOKEN_URL)?,
            browser: SystemBrowser,
            clock: SystemClock,
        })
    }
}

impl<X, B, C> OAuth2Client<X, B, C> {
    pub fn with_exchanger<X2>(self, exchanger: X2) -> OAuth2Client<X2, B, C> {
        OAuth2Client {
            request: self.request,
            credentials: self.credentials,
            cache: self.cache,
            authorize_url: self.authorize_url,
            callback_address: self.callback_address,
            max_attempts: self.max_attempts,
            exchanger,
            browser: self.browser,
            clock: self.clock,
        }
    }

    pub fn with_browser<B2>(self, browser: B2) -> OAuth2Client<X, B2, C> {
        OAuth2Client {
            request: self.request,
            credentials: self.credentials,
            cache: self.cache,
            authorize_url: self.authorize_url,
            callback_address: self.callback_address,
            max_attempts: self.max_attempts,
            exchanger: self.exchanger,
            browser,
            clock: self.clock,
        }
    }

    pub fn with_clock<C2>(self, clock: C2) -> OAuth2Client<X, B, C2> {
        OAuth2Client {
            request: self.request,
            credentials: self.credentials,
            cache: self.cache,
            authorize_url: self.authorize_url,
            callback_address: self.callback_address,
            max_attempts: self.max_attempts,
            exchanger: self.exchanger,
            browser: self.browser,
            clock,
        }
    }

    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    /// Overrides the `host:port` bound for the redirect; by default it is
    /// taken from `redirect_uri`.
    pub fn with_callback_address(mut self, addr: impl Into<String>) -> Self {
        self.callback_address = Some(addr.into());
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// The browser-facing authorization URL for this client.
    pub fn authorization_url(&self) -> Result<String> {
        utils::build_authorize_url(&self.authorize_url, &self.request)
    }

    fn redirect_uri(&self) -> Result<&str> {
        self.request
            .redirect_uri
            .as_deref()
            .ok_or_else(|| AuthError::missing("redirect_uri"))
    }
}

impl<X, B, C> OAuth2Client<X, B, C>
where
    X: TokenExchanger,
    B: Browser,
    C: Clock,
{
    /// Returns a bare access token, prompting the user only when needed.
    pub async fn access_token(&self) -> Result<String> {
        Ok(self.resolve().await?.bundle.access_token)
    }

    pub async fn resolve(&self) -> Result<ResolvedToken> {
        match self.cached_token().await? {
            CachedToken::Ready(resolved) => Ok(resolved),
            CachedToken::NeedsLogin(refresh_error) => {
                if let Some(e) = refresh_error {
                    warning!("Token refresh failed, authorizing again: {}", e);
                }
                self.login().await
            }
        }
    }

    /// Returns the cached token if it is fresh, or refreshes a stale one.
    /// Never opens the browser and prints nothing.
    pub async fn cached_token(&self) -> Result<CachedToken> {
        let Some(cached) = self.cache.load().await? else {
            return Ok(CachedToken::NeedsLogin(None));
        };

        if utils::is_fresh(&cached, self.clock.now()) {
            return Ok(CachedToken::Ready(ResolvedToken {
                bundle: cached,
                origin: TokenOrigin::Cache,
            }));
        }

        let Some(refresh_token) = cached.refresh_token.as_deref() else {
            return Ok(CachedToken::NeedsLogin(None));
        };

        match self.refresh(refresh_token).await {
            Ok(bundle) => {
                self.cache.save(&bundle).await?;
                Ok(CachedToken::Ready(ResolvedToken {
                    bundle,
                    origin: TokenOrigin::Refreshed,
                }))
            }
            Err(e) => Ok(CachedToken::NeedsLogin(Some(e))),
        }
    }

    /// Drops whatever is cached and runs the browser flow.
    pub async fn login(&self) -> Result<ResolvedToken> {
        self.cache.invalidate().await?;
        let bundle = self.authorize().await?;
        Ok(ResolvedToken {
            bundle,
            origin: TokenOrigin::Authorized,
        })
    }

    /// Runs the browser redirect flow unconditionally and caches the result.
    pub async fn authorize(&self) -> Result<TokenBundle> {
        let url = self.authorization_url()?;
        let redirect_uri = self.redirect_uri()?;
        let address = match &self.callback_address {
            Some(addr) => addr.clone(),
            None => utils::callback_address(redirect_uri)?,
        };

        let listener = CallbackListener::bind(&address)
            .await?
            .expect_state(self.request.state.clone());

        info!("Waiting for the authorization redirect on {}", address);
        if let Err(e) = self.browser.open(&url) {
            warning!(
                "Failed to open browser ({}). Please navigate to the following URL manually:\n{}",
                e,
                url
            );
        }

        let code = listener.run(self.max_attempts).await?.into_code()?;
        let bundle = self
            .exchanger
            .exchange_code(&code, redirect_uri, &self.credentials)
            .await?;

        self.cache.save(&bundle).await?;
        Ok(bundle)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle> {
        let mut bundle = self
            .exchanger
            .exchange_refresh(refresh_token, &self.credentials)
            .await?;

        // Refresh responses may omit the refresh token; the old one stays valid.
        if bundle.refresh_token.is_none() {
            bundle.refresh_token = Some(refresh_token.to_string());
        }
        Ok(bundle)
    }
}
