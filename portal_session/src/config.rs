//! Central configuration for the portal-session crate

use std::sync::LazyLock;
use std::time::Duration;

/// Base URL of the portal REST backend
/// Default: "http://localhost:5000/api"
pub static PORTAL_API_BASE_URL: LazyLock<String> = LazyLock::new(read_api_base_url);

/// Where the OAuth provider sends the browser back to once the handshake ends
pub static PORTAL_OAUTH_REDIRECT_URI: LazyLock<String> = LazyLock::new(read_oauth_redirect_uri);

pub static PORTAL_HTTP_TIMEOUT: LazyLock<Duration> = LazyLock::new(read_http_timeout);

/// How long the OAuth callback view shows an error before going back to login
pub static OAUTH_ERROR_REDIRECT_DELAY: LazyLock<Duration> =
    LazyLock::new(read_oauth_error_redirect_delay);

/// How long the OAuth callback view shows success before dispatching
pub static OAUTH_SUCCESS_REDIRECT_DELAY: LazyLock<Duration> =
    LazyLock::new(read_oauth_success_redirect_delay);

/// Tokens expiring within this many seconds are dropped at bootstrap
pub static TOKEN_EXPIRY_LEEWAY_SECS: LazyLock<i64> = LazyLock::new(read_token_expiry_leeway_secs);

fn read_api_base_url() -> String {
    std::env::var("PORTAL_API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000/api".to_string())
}

fn read_oauth_redirect_uri() -> String {
    std::env::var("PORTAL_OAUTH_REDIRECT_URI")
        .unwrap_or_else(|_| "http://localhost:3000/auth/callback".to_string())
}

fn read_http_timeout() -> Duration {
    Duration::from_secs(read_u64("PORTAL_HTTP_TIMEOUT_SECS", 30))
}

fn read_oauth_error_redirect_delay() -> Duration {
    Duration::from_millis(read_u64("PORTAL_OAUTH_ERROR_REDIRECT_DELAY_MS", 3000))
}

fn read_oauth_success_redirect_delay() -> Duration {
    Duration::from_millis(read_u64("PORTAL_OAUTH_SUCCESS_REDIRECT_DELAY_MS", 1500))
}

/// Saturates at `i64::MAX` instead of wrapping.
fn read_token_expiry_leeway_secs() -> i64 {
    i64::try_from(read_u64("PORTAL_TOKEN_EXPIRY_LEEWAY_SECS", 30)).unwrap_or(i64::MAX)
}

fn read_u64(var: &str, default: u64) -> u64 {
    parse_u64(std::env::var(var).ok().as_deref(), default)
}

fn parse_u64(value: Option<&str>, default: u64) -> u64 {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
