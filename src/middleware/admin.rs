use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::{
    net::SocketAddr,
    sync::OnceLock,
    time::{Duration, Instant},
};
use tracing::{error, warn};

// Recently accepted tokens are remembered so the comparison and logging only
// run on the first request of a burst of admin calls.
static TOKEN_CACHE: OnceLock<DashMap<String, Instant>> = OnceLock::new();

const TOKEN_CACHE_DURATION: Duration = Duration::from_secs(300);

fn get_token_cache() -> &'static DashMap<String, Instant> {
    TOKEN_CACHE.get_or_init(DashMap::new)
}

/// Gate for /api/admin routes: requires `Authorization: Bearer <token>` to
/// match ADMIN_API_TOKEN. ADMIN_AUTH_BYPASS=true disables the check for
/// local development.
pub async fn admin_auth_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if std::env::var("ADMIN_AUTH_BYPASS").unwrap_or_default() == "true" {
        tracing::info!("Admin auth bypassed for development");
        return Ok(next.run(request).await);
    }

    let secret = std::env::var("ADMIN_API_TOKEN").unwrap_or_else(|_| {
        error!("ADMIN_API_TOKEN environment variable not set");
        String::new()
    });

    if secret.is_empty() {
        error!("Admin token is empty - consider setting ADMIN_AUTH_BYPASS=true for development");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let token = match headers.get(axum::http::header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(value) => match value.strip_prefix("Bearer ") {
                Some(token) => token,
                None => {
                    warn!("Malformed Authorization header on admin request");
                    return Err(StatusCode::UNAUTHORIZED);
                }
            },
            Err(_) => {
                warn!("Invalid Authorization header encoding on admin request");
                return Err(StatusCode::BAD_REQUEST);
            }
        },
        None => {
            warn!("Missing Authorization header on admin request");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let now = Instant::now();
    let token_cache = get_token_cache();
    if let Some(cached_time) = token_cache.get(token) {
        if now.duration_since(*cached_time) < TOKEN_CACHE_DURATION {
            return Ok(next.run(request).await);
        } else {
            token_cache.remove(token);
        }
    }

    if constant_time_eq(token.as_bytes(), secret.as_bytes()) {
        let client_ip = extract_client_ip(&headers, addr);
        tracing::info!(
            "Admin access granted: {} {} from {}",
            request.method(),
            request.uri().path(),
            client_ip
        );
        token_cache.insert(token.to_string(), now);
        Ok(next.run(request).await)
    } else {
        warn!(
            "Admin auth failed from {}",
            extract_client_ip(&headers, addr)
        );
        Err(StatusCode::UNAUTHORIZED)
    }
}

// Length leaks; token contents do not.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn extract_client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    if let Some(forwarded_for) = headers.get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            // Take the first IP in the chain
            if let Some(first_ip) = forwarded_str.split(',').next() {
                return first_ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("X-Real-IP") {
        if let Ok(real_ip_str) = real_ip.to_str() {
            return real_ip_str.to_string();
        }
    }

    addr.ip().to_string()
}
