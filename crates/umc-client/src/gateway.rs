//! Authenticated request gateway
//!
//! Every backend call goes through [`Gateway::execute`]. The gateway
//! attaches the bearer credential held in the [`SessionStore`] and, when
//! the backend answers 401, refreshes the access token once and replays
//! the original request.
//!
//! The retry is modelled as a small state machine so the "at most one
//! replay" rule is visible in the transitions:
//!
//! ```text
//! Initial --401--> AwaitingRefresh --refreshed--> Replaying --> Done
//!    |                   |
//!    +--other----------> +--refresh failed (logout)---------> Done
//! ```
//!
//! Concurrent calls are not coordinated: two requests that both hit 401
//! each run their own refresh and the last session write wins.

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use umc_shared::constants::REFRESH_PATH;
use umc_shared::utils::mask_token;
use umc_store::SessionStore;

use crate::error::{ApiFailure, ApiResult};
use crate::request::ApiRequest;
use crate::transport::Transport;

#[derive(Debug)]
enum Phase {
    Initial,
    AwaitingRefresh { original: ApiFailure },
    Replaying,
    Done(ApiResult),
}

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Sends `request`, recovering once from an expired access token.
    ///
    /// Returns the transport outcome unchanged unless it is a 401. After a
    /// successful refresh the replay's outcome is returned whatever it is;
    /// after a failed refresh the session is cleared and the original 401
    /// is returned.
    pub async fn execute(&self, request: impl Into<ApiRequest>) -> ApiResult {
        let request = request.into();
        let mut phase = Phase::Initial;

        loop {
            phase = match phase {
                Phase::Initial => match self.send(&request).await {
                    Err(failure) if failure.is_unauthorized() => {
                        warn!("Unauthorized request to {}, refreshing token", request.path);
                        Phase::AwaitingRefresh { original: failure }
                    }
                    outcome => Phase::Done(outcome),
                },
                Phase::AwaitingRefresh { original } => match self.refresh().await {
                    Some(access_token) => {
                        info!("Access token refreshed ({})", mask_token(&access_token));
                        let refreshed = self.session.session().refreshed(access_token);
                        self.session.set_user(refreshed);
                        Phase::Replaying
                    }
                    None => {
                        warn!("Token refresh failed, clearing session");
                        self.session.logout();
                        Phase::Done(Err(original))
                    }
                },
                Phase::Replaying => {
                    debug!("Replaying {} {}", request.method, request.path);
                    Phase::Done(self.send(&request).await)
                }
                Phase::Done(outcome) => return outcome,
            };
        }
    }

    /// Prepares against the current session and hands off to the transport.
    async fn send(&self, request: &ApiRequest) -> ApiResult {
        let session = self.session.session();
        let prepared = prepare(request, session.access_token());
        self.transport.send(&prepared).await
    }

    /// New access token from the refresh endpoint, or `None` on any failure.
    async fn refresh(&self) -> Option<String> {
        let session = self.session.session();
        let body = match session.refresh_token() {
            Some(token) => json!({ "refresh_token": token }),
            None => json!({}),
        };
        let request = ApiRequest::post(REFRESH_PATH).json(body);

        match self.send(&request).await {
            Ok(payload) => {
                let token = payload
                    .get("data")
                    .and_then(|data| data.get(0))
                    .and_then(Value::as_str)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string);
                if token.is_none() {
                    warn!("Refresh response carried no access token");
                }
                token
            }
            Err(e) => {
                debug!("Refresh call failed: {}", e);
                None
            }
        }
    }
}

/// Applies header rules to a copy of `request`:
/// multipart bodies lose any caller `Content-Type` so the transport can set
/// the boundary, everything else is forced to JSON, and a non-empty access
/// token becomes a bearer `Authorization` header.
pub fn prepare(request: &ApiRequest, access_token: Option<&str>) -> ApiRequest {
    let mut prepared = request.clone();

    if prepared.body.is_multipart() {
        prepared.headers.remove(CONTENT_TYPE);
    } else {
        prepared
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    if let Some(token) = access_token.filter(|t| !t.is_empty()) {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                prepared.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Access token is not a valid header value, sending without it"),
        }
    }

    prepared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{FilePart, MultipartBody};
    use crate::transport::MockTransport;
    use mockall::Sequence;
    use umc_core::{AuthSession, SessionUser, TokenPair};

    fn unauthorized() -> ApiFailure {
        ApiFailure::Http { status: 401, body: json!({ "message": "jwt expired" }) }
    }

    fn user() -> SessionUser {
        SessionUser {
            user_id: "u-1".into(),
            email: "jane@example.com".into(),
            first_name: "Jane".into(),
            role: "admin".into(),
            last_name: None,
            profile_image: None,
        }
    }

    fn logged_in_store() -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::in_memory());
        store.set_user(AuthSession::new(
            Some(user()),
            Some(TokenPair { access_token: "old-access".into(), refresh_token: "refresh-1".into() }),
        ));
        store
    }

    fn bearer(request: &ApiRequest) -> Option<String> {
        request
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[test]
    fn test_prepare_forces_json_content_type() {
        let request = ApiRequest::post("/auth/login/")
            .json(json!({}))
            .header("Content-Type", "text/plain")
            .header("X-Request-Id", "abc");
        let prepared = prepare(&request, None);

        assert_eq!(prepared.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(prepared.headers.get("x-request-id").unwrap(), "abc");
        assert!(prepared.headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_prepare_strips_content_type_for_multipart() {
        let body = MultipartBody::new().text("firstName", "Jane").file(FilePart {
            field: "profileImage".into(),
            file_name: "me.png".into(),
            mime: Some("image/png".into()),
            bytes: vec![1, 2, 3],
        });
        let request = ApiRequest::put("/users/u-1")
            .multipart(body)
            .header("Content-Type", "application/json");
        let prepared = prepare(&request, Some("tok"));

        assert!(prepared.headers.get(CONTENT_TYPE).is_none());
        assert_eq!(bearer(&prepared).as_deref(), Some("Bearer tok"));
    }

    #[test]
    fn test_prepare_skips_empty_token() {
        let prepared = prepare(&ApiRequest::get("/users/"), Some(""));
        assert!(prepared.headers.get(AUTHORIZATION).is_none());
        assert_eq!(prepared.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_non_401_outcome_passes_through() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(ApiFailure::Http { status: 500, body: json!({ "message": "boom" }) }));

        let store = logged_in_store();
        let gateway = Gateway::new(Arc::new(transport), store.clone());
        let result = gateway.execute("/users/").await;

        assert_eq!(result.unwrap_err().status(), Some(500));
        assert_eq!(store.session().access_token(), Some("old-access"));
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| bearer(req).as_deref() == Some("Bearer old-access"))
            .times(1)
            .returning(|_| Ok(json!({ "data": { "id": "u-1" } })));

        let gateway = Gateway::new(Arc::new(transport), logged_in_store());
        let result = gateway.execute("/users/profile/").await.unwrap();
        assert_eq!(result["data"]["id"], "u-1");
    }

    #[tokio::test]
    async fn test_refresh_then_replay_with_new_token() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.path == "/users/profile/" && bearer(req).as_deref() == Some("Bearer old-access"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(unauthorized()));
        transport
            .expect_send()
            .withf(|req| {
                req.path == REFRESH_PATH
                    && req.method == reqwest::Method::POST
                    && req.body == crate::request::RequestBody::Json(json!({ "refresh_token": "refresh-1" }))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({ "data": ["new-access-token"] })));
        transport
            .expect_send()
            .withf(|req| req.path == "/users/profile/" && bearer(req).as_deref() == Some("Bearer new-access-token"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({ "data": { "id": "u-1" } })));

        let store = logged_in_store();
        let gateway = Gateway::new(Arc::new(transport), store.clone());
        let result = gateway.execute("/users/profile/").await.unwrap();

        assert_eq!(result["data"]["id"], "u-1");
        let session = store.session();
        assert_eq!(session.user, Some(user()));
        assert_eq!(
            session.token,
            Some(TokenPair { access_token: "new-access-token".into(), refresh_token: "refresh-1".into() })
        );
    }

    #[tokio::test]
    async fn test_replay_failure_is_returned_without_second_refresh() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(unauthorized()));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({ "data": ["new-access-token"] })));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ApiFailure::Http { status: 401, body: json!({ "message": "still no" }) }));

        let store = logged_in_store();
        let gateway = Gateway::new(Arc::new(transport), store.clone());
        let failure = gateway.execute("/users/").await.unwrap_err();

        assert_eq!(failure.message(), "still no");
        // The replay's 401 does not log the user out.
        assert_eq!(store.session().access_token(), Some("new-access-token"));
    }

    #[tokio::test]
    async fn test_failed_refresh_logs_out_and_returns_original() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(unauthorized()));
        transport
            .expect_send()
            .withf(|req| req.path == REFRESH_PATH)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ApiFailure::Http { status: 401, body: json!({ "message": "refresh expired" }) }));

        let store = logged_in_store();
        let listed: umc_core::ManagedUser = serde_json::from_value(json!({
            "id": "u-2",
            "firstName": "Bob",
            "email": "bob@corp.com",
            "role": "user",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }))
        .unwrap();
        store.set_all_users(vec![listed]);
        store.cache_response("listAllUsers()", json!({ "data": [] }), vec![umc_core::CacheTag::Users]);
        assert_eq!(store.users().len(), 1);

        let gateway = Gateway::new(Arc::new(transport), store.clone());
        let failure = gateway.execute("/users/").await.unwrap_err();

        assert_eq!(failure, unauthorized());
        assert!(store.session().is_empty());
        assert!(store.users().is_empty());
        assert_eq!(store.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_refresh_without_token_in_payload_counts_as_failure() {
        let mut transport = MockTransport::new();
        let mut seq = Sequence::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(unauthorized()));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({ "data": [] })));

        let store = logged_in_store();
        let gateway = Gateway::new(Arc::new(transport), store.clone());
        assert_eq!(gateway.execute("/users/").await.unwrap_err(), unauthorized());
        assert!(store.session().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_profile_request_logs_out() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.path == "/users/profile/" && bearer(req).is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(unauthorized()));
        transport
            .expect_send()
            .withf(|req| req.path == REFRESH_PATH && req.body == crate::request::RequestBody::Json(json!({})))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ApiFailure::Http { status: 400, body: Value::Null }));

        let store = Arc::new(SessionStore::in_memory());
        let mut rx = store.subscribe();
        let gateway = Gateway::new(Arc::new(transport), store.clone());

        let failure = gateway.execute(ApiRequest::get("/users/profile/")).await.unwrap_err();
        assert_eq!(failure.status(), Some(401));
        assert!(rx.has_changed().unwrap(), "logout should have been dispatched");
        assert!(rx.borrow_and_update().is_empty());
    }
}
