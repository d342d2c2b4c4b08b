//! Integration Test: console session flows
//!
//! Login persisted to disk, rehydrated by a second store, then user
//! administration with cache invalidation and logout.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use umc_client::{HttpTransport, SessionFlows};
use umc_core::access::{Access, RouteGuard};
use umc_core::forms::{LoginForm, UserAdminForm};
use umc_core::ListUsersQuery;
use umc_shared::constants::PERSIST_KEY;
use umc_store::{FileStorage, SessionStore};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn flows_for(server: &MockServer, store: Arc<SessionStore>) -> SessionFlows {
    let transport = HttpTransport::new(format!("{}/api", server.uri()), Duration::from_secs(5))
        .expect("http client");
    SessionFlows::new(Arc::new(transport), store)
}

fn users_page() -> serde_json::Value {
    json!({
        "data": [{
            "id": "u-2",
            "firstName": "Bob",
            "lastName": "Stone",
            "email": "bob@corp.com",
            "role": "user",
            "isEmailVerified": true,
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-02T10:00:00Z"
        }]
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({ "email": "admin@corp.com", "password": "password123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "user": {
                    "id": "u-1",
                    "email": "admin@corp.com",
                    "firstName": "Ada",
                    "role": "admin"
                },
                "tokens": { "accessToken": "acc-1", "refreshToken": "ref-1" }
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_survives_restart() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let dir = tempfile::tempdir()?;

    let store = Arc::new(SessionStore::open(Arc::new(FileStorage::new(dir.path())), PERSIST_KEY));
    let flows = flows_for(&server, store);
    flows
        .login(&LoginForm { email: "admin@corp.com".into(), password: "password123".into() })
        .await?;

    let reopened = SessionStore::open(Arc::new(FileStorage::new(dir.path())), PERSIST_KEY);
    let session = reopened.session();
    assert_eq!(session.access_token(), Some("acc-1"));
    assert_eq!(session.role(), Some("admin"));
    assert_eq!(RouteGuard::roles(["admin"]).evaluate(&session), Access::Allow);

    flows.logout();
    let reopened = SessionStore::open(Arc::new(FileStorage::new(dir.path())), PERSIST_KEY);
    assert!(reopened.session().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_user_admin_invalidates_list_cache() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "10"))
        .and(query_param("sortBy", "createdAt"))
        .and(query_param("sortOrder", "DESC"))
        .and(header("authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_page()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/users/u-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "updated" })))
        .expect(1)
        .mount(&server)
        .await;

    let flows = flows_for(&server, Arc::new(SessionStore::in_memory()));
    flows
        .login(&LoginForm { email: "admin@corp.com".into(), password: "password123".into() })
        .await?;

    let query = ListUsersQuery::default();
    let users = flows.load_users(&query).await?;
    assert_eq!(users[0].full_name(), "Bob Stone");
    assert_eq!(users[0].status(), "active");

    // Served from cache, no second request yet.
    flows.load_users(&query).await?;

    flows
        .edit_user(
            "u-2",
            UserAdminForm {
                first_name: "Bobby".into(),
                last_name: "Stone".into(),
                email: "bob@corp.com".into(),
                role: "user".into(),
                language: "en".into(),
                designation: Some("Engineer".into()),
            },
        )
        .await?;

    // Edit invalidated the list, so this one goes to the server.
    flows.load_users(&query).await?;
    assert_eq!(flows.store().users().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_logout_clears_cached_responses() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/users/u-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": users_page()["data"][0] })))
        .expect(1)
        .mount(&server)
        .await;

    let flows = flows_for(&server, Arc::new(SessionStore::in_memory()));
    flows
        .login(&LoginForm { email: "admin@corp.com".into(), password: "password123".into() })
        .await?;
    let details = flows.user_details("u-2").await?;
    assert_eq!(details.email, "bob@corp.com");
    assert_eq!(flows.store().cache_len(), 1);

    flows.logout();
    assert_eq!(flows.store().cache_len(), 0);
    assert_eq!(flows.guard(&RouteGuard::Authenticated), Access::Redirect("/login"));
    Ok(())
}
