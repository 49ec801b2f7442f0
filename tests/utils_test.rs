use spotauth::error::AuthError;
use spotauth::types::{AuthorizationRequest, Credentials, TokenBundle};
use spotauth::utils::*;

const BASE: &str = "https://accounts.spotify.com/authorize/";

// Helper function to create a token bundle issued at `issued_at`
fn create_test_bundle(issued_at: i64, expires_in: u64) -> TokenBundle {
    TokenBundle {
        access_token: "T1".to_string(),
        token_type: "Bearer".to_string(),
        expires_in,
        refresh_token: None,
        scope: String::new(),
        issued_at,
    }
}

fn full_request() -> AuthorizationRequest {
    AuthorizationRequest::new("abc", "http://127.0.0.1:8000")
        .with_state("xyz")
        .with_scope("playlist-modify-public playlist-modify-private")
        .with_show_dialog(true)
}

#[test]
fn test_build_authorize_url_full() {
    let url = build_authorize_url(BASE, &full_request()).unwrap();

    assert_eq!(
        url,
        "https://accounts.spotify.com/authorize/?client_id=abc&response_type=code\
         &redirect_uri=http%3A%2F%2F127.0.0.1%3A8000&state=xyz\
         &scope=playlist-modify-public%20playlist-modify-private&show_dialog=true"
    );
}

#[test]
fn test_build_authorize_url_is_deterministic() {
    let request = full_request();
    assert_eq!(
        build_authorize_url(BASE, &request).unwrap(),
        build_authorize_url(BASE, &request).unwrap()
    );
}

#[test]
fn test_build_authorize_url_parameter_order() {
    let url = build_authorize_url(BASE, &full_request()).unwrap();
    let (_, query) = url.split_once('?').unwrap();
    let keys: Vec<&str> = query
        .split('&')
        .map(|pair| pair.split('=').next().unwrap())
        .collect();

    assert_eq!(
        keys,
        vec![
            "client_id",
            "response_type",
            "redirect_uri",
            "state",
            "scope",
            "show_dialog"
        ]
    );
}

#[test]
fn test_build_authorize_url_omits_absent_optionals() {
    let request = AuthorizationRequest::new("abc", "http://127.0.0.1:8000");
    let url = build_authorize_url(BASE, &request).unwrap();

    assert_eq!(
        url,
        "https://accounts.spotify.com/authorize/?client_id=abc&response_type=code\
         &redirect_uri=http%3A%2F%2F127.0.0.1%3A8000"
    );
    assert!(!url.contains("state"));
    assert!(!url.contains("scope"));
    assert!(!url.contains("show_dialog"));

    // Only scope present: keeps its slot relative to the required keys
    let url = build_authorize_url(BASE, &request.clone().with_scope("user-read-email")).unwrap();
    assert!(url.ends_with("redirect_uri=http%3A%2F%2F127.0.0.1%3A8000&scope=user-read-email"));
}

#[test]
fn test_build_authorize_url_missing_required() {
    let mut missing_client = full_request();
    missing_client.client_id = None;
    let mut missing_type = full_request();
    missing_type.response_type = None;
    let mut missing_redirect = full_request();
    missing_redirect.redirect_uri = None;

    for (request, field) in [
        (missing_client, "client_id"),
        (missing_type, "response_type"),
        (missing_redirect, "redirect_uri"),
    ] {
        match build_authorize_url(BASE, &request) {
            Err(AuthError::Configuration(msg)) => assert!(msg.contains(field), "{msg}"),
            other => panic!("expected configuration error for {field}, got {other:?}"),
        }
    }
}

#[test]
fn test_build_authorize_url_base_with_query() {
    let request = AuthorizationRequest::new("abc", "http://127.0.0.1:8000");
    let url = build_authorize_url("https://auth.example/authorize?tenant=1", &request).unwrap();
    assert!(url.starts_with("https://auth.example/authorize?tenant=1&client_id=abc&"));
}

#[test]
fn test_is_fresh_boundary() {
    let bundle = create_test_bundle(0, 3600);

    assert!(is_fresh(&bundle, 100));
    assert!(is_fresh(&bundle, 3599));
    // Strict inequality: expiry instant itself is stale
    assert!(!is_fresh(&bundle, 3600));
    assert!(!is_fresh(&bundle, 10_000));
}

#[test]
fn test_is_fresh_zero_lifetime() {
    let bundle = create_test_bundle(500, 0);
    assert!(!is_fresh(&bundle, 500));
    assert!(is_fresh(&bundle, 499));
}

#[test]
fn test_basic_authorization() {
    let header = basic_authorization(&Credentials::new("id", "secret"));
    // base64("id:secret")
    assert_eq!(header, "Basic aWQ6c2VjcmV0");
}

#[test]
fn test_callback_address() {
    assert_eq!(
        callback_address("http://127.0.0.1:8000").unwrap(),
        "127.0.0.1:8000"
    );
    assert_eq!(
        callback_address("http://localhost:8888/callback").unwrap(),
        "localhost:8888"
    );
    assert_eq!(callback_address("http://127.0.0.1/cb").unwrap(), "127.0.0.1:80");
    assert!(matches!(
        callback_address("not a url"),
        Err(AuthError::Configuration(_))
    ));
}

#[test]
fn test_mask_token() {
    assert_eq!(mask_token("BQDxyz123456"), "BQDxyz…");
    assert_eq!(mask_token("abc"), "***");
}

#[test]
fn test_closure_clock() {
    let clock = || 42_i64;
    assert_eq!(clock.now(), 42);
    assert!(SystemClock.now() > 1_600_000_000);
}

#[test]
fn test_build_authorize_url_encodes_reserved_state() {
    let request = AuthorizationRequest::new("abc", "http://127.0.0.1:8000").with_state("a&b=c");
    let url = build_authorize_url(BASE, &request).unwrap();

    assert!(url.contains("&state=a%26b%3Dc"), "{url}");
    assert!(url.starts_with(&format!("{BASE}?client_id=abc&")));
}
