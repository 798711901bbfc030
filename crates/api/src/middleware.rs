use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderName, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use gatehouse_auth::{CredentialRequest, SessionValidator};
use gatehouse_core::Locale;

use crate::app::errors::ApiError;
use crate::context::SessionContext;

const FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

#[derive(Clone)]
pub struct SessionState {
    pub sessions: Arc<SessionValidator>,
    pub trust_forwarded_for: bool,
}

/// Validates the caller's session and attaches a [`SessionContext`].
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    // The body is not `Sync`: nothing borrowed from `req` may cross the await.
    let (authorization, user_agent, accept_language, origin) = {
        let headers = req.headers();
        (
            header_str(headers, &header::AUTHORIZATION).map(str::to_owned),
            header_str(headers, &header::USER_AGENT).map(str::to_owned),
            header_str(headers, &header::ACCEPT_LANGUAGE).map(str::to_owned),
            origin_address(
                headers,
                req.extensions().get::<ConnectInfo<SocketAddr>>(),
                state.trust_forwarded_for,
            ),
        )
    };

    let credentials = CredentialRequest {
        authorization: authorization.as_deref(),
        user_agent: user_agent.as_deref(),
        origin,
        accept_language: accept_language.as_deref(),
    };

    let session = match state.sessions.validate(&credentials, Utc::now()).await {
        Ok(session) => session,
        Err(err) => {
            tracing::debug!(error = %err, path = %req.uri().path(), "session rejected");
            let locale = Locale::from_accept_language(accept_language.as_deref());
            return ApiError::from(err).respond(locale);
        }
    };

    req.extensions_mut().insert(SessionContext::from(session));
    next.run(req).await
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The socket peer, or the first hop of `X-Forwarded-For` when the server
/// sits behind a trusted proxy.
fn origin_address(
    headers: &HeaderMap,
    peer: Option<&ConnectInfo<SocketAddr>>,
    trust_forwarded_for: bool,
) -> Option<IpAddr> {
    let forwarded = || {
        header_str(headers, &FORWARDED_FOR)
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
    };
    trust_forwarded_for
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn peer_address_is_used_unless_proxy_is_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        let peer = ConnectInfo("127.0.0.1:5000".parse::<SocketAddr>().unwrap());

        assert_eq!(origin_address(&headers, Some(&peer), false), Some("127.0.0.1".parse().unwrap()));
        assert_eq!(origin_address(&headers, None, false), None);
    }

    #[test]
    fn trusted_proxy_forwards_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        let peer = ConnectInfo("127.0.0.1:5000".parse::<SocketAddr>().unwrap());

        assert_eq!(origin_address(&headers, Some(&peer), true), Some("203.0.113.9".parse().unwrap()));
        assert_eq!(origin_address(&HeaderMap::new(), Some(&peer), true), Some("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn blank_headers_count_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("   "));
        assert_eq!(header_str(&headers, &header::USER_AGENT), None);
    }
}
