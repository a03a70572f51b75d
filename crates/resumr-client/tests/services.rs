//! Integration tests for the domain services and their session handling.

use std::time::Duration;

use resumr_client::types::{Registration, ResumeDraft, UserStatus};
use resumr_client::{
    AdminAuthService, AdminService, ApiClient, ApiClientOptions, AuthService, RequestError,
    ResumeService, RetryPolicy, UserService,
};
use resumr_core::{Namespace, SessionRecord, SessionStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, session: &SessionStore, namespace: Namespace) -> ApiClient {
    ApiClient::new(
        &server.uri(),
        session.clone(),
        namespace,
        ApiClientOptions {
            timeout: Duration::from_secs(2),
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(5),
            },
            user_agent: "resumr-test/0.1".to_owned(),
        },
    )
    .expect("failed to build test ApiClient")
}

fn seed(session: &SessionStore, namespace: Namespace, token: &str, refresh: Option<&str>) {
    session
        .replace(
            namespace,
            SessionRecord {
                token: token.to_owned(),
                refresh_token: refresh.map(str::to_owned),
                profile: Some(json!({"id": "u1", "name": "Ada"})),
                role: None,
            },
        )
        .unwrap();
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_stores_user_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t1",
            "refreshToken": "r1",
            "user": {"id": "u1", "name": "Ada", "email": "ada@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let auth = AuthService::new(client_for(&server, &session, Namespace::User));
    auth.login("ada@example.com", "pw").await.unwrap();

    assert!(auth.is_authenticated());
    assert_eq!(session.get("token").as_deref(), Some("t1"));
    assert_eq!(session.get("refreshToken").as_deref(), Some("r1"));
    assert_eq!(session.profile(Namespace::User).unwrap()["name"], "Ada");
    assert!(session.token(Namespace::Admin).is_none());
}

#[tokio::test]
async fn login_replaces_previous_session_without_merging() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "fresh"})))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "old", Some("old-refresh"));
    let auth = AuthService::new(client_for(&server, &session, Namespace::User));
    auth.login("ada@example.com", "pw").await.unwrap();

    assert_eq!(session.token(Namespace::User).as_deref(), Some("fresh"));
    assert!(session.refresh_token(Namespace::User).is_none());
    assert!(session.profile(Namespace::User).is_none());
}

#[tokio::test]
async fn failed_login_clears_session_on_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "old", None);
    let auth = AuthService::new(client_for(&server, &session, Namespace::User));
    let err = auth.login("ada@example.com", "nope").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn failed_register_clears_session_on_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "old", Some("old-refresh"));
    let auth = AuthService::new(client_for(&server, &session, Namespace::User));
    let registration = Registration {
        name: "Grace".to_owned(),
        email: "grace@example.com".to_owned(),
        password: "hunter22".to_owned(),
    };
    let err = auth.register(&registration).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "You are not authorized to perform this action."
    );
    assert!(!auth.is_authenticated());
    assert!(session.refresh_token(Namespace::User).is_none());
    assert!(session.profile(Namespace::User).is_none());
}

#[tokio::test]
async fn register_signs_the_new_account_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "new-user",
            "user": {"id": "u9"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let auth = AuthService::new(client_for(&server, &session, Namespace::User));
    auth.register(&Registration {
        name: "Grace".to_owned(),
        email: "grace@example.com".to_owned(),
        password: "pw".to_owned(),
    })
    .await
    .unwrap();
    assert_eq!(session.token(Namespace::User).as_deref(), Some("new-user"));
}

#[tokio::test]
async fn refresh_sends_refresh_token_and_keeps_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "r-old"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t-new"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "t-old", Some("r-old"));
    let auth = AuthService::new(client_for(&server, &session, Namespace::User));
    auth.refresh().await.unwrap();

    assert_eq!(session.token(Namespace::User).as_deref(), Some("t-new"));
    assert_eq!(
        session.refresh_token(Namespace::User).as_deref(),
        Some("r-old")
    );
    assert_eq!(session.profile(Namespace::User).unwrap()["name"], "Ada");
}

#[tokio::test]
async fn refresh_without_stored_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let auth = AuthService::new(client_for(&server, &session, Namespace::User));
    let err = auth.refresh().await.unwrap_err();
    assert!(matches!(err, RequestError::NoRefreshToken(Namespace::User)));
}

#[tokio::test]
async fn logout_clears_locally_even_when_server_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "t1", Some("r1"));
    seed(&session, Namespace::Admin, "admin", None);
    let auth = AuthService::new(client_for(&server, &session, Namespace::User));
    auth.logout().await.unwrap();

    assert!(session.token(Namespace::User).is_none());
    assert!(session.get("refreshToken").is_none());
    assert!(session.get("user").is_none());
    assert_eq!(session.token(Namespace::Admin).as_deref(), Some("admin"));
}

#[tokio::test]
async fn logout_without_session_skips_server_call() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let auth = AuthService::new(client_for(&server, &session, Namespace::User));
    auth.logout().await.unwrap();
}

// ---------------------------------------------------------------------------
// 401 handling in data services
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_resume_list_clears_user_session_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resumes"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "expired", Some("r"));
    seed(&session, Namespace::Admin, "admin", None);
    let resumes = ResumeService::new(client_for(&server, &session, Namespace::User));
    let err = resumes.list().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(session.token(Namespace::User).is_none());
    assert!(session.refresh_token(Namespace::User).is_none());
    assert_eq!(session.token(Namespace::Admin).as_deref(), Some("admin"));
}

#[tokio::test]
async fn non_401_errors_keep_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "t", None);
    let users = UserService::new(client_for(&server, &session, Namespace::User));
    let err = users.profile().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(session.is_authenticated(Namespace::User));
}

// ---------------------------------------------------------------------------
// ResumeService
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resume_crud_round_trip() {
    let server = MockServer::start().await;
    let resume = json!({
        "_id": "r1",
        "title": "Platform Engineer",
        "template": "modern",
        "data": {"summary": "Builds things"},
        "updatedAt": "2026-10-01T12:00:00Z"
    });

    Mock::given(method("POST"))
        .and(path("/resumes"))
        .and(body_json(json!({
            "title": "Platform Engineer",
            "template": "modern",
            "data": {"summary": "Builds things"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&resume))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/resumes/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&resume))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/resumes/r1"))
        .and(body_json(json!({"title": "Staff Engineer"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r1", "title": "Staff Engineer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/resumes/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "t", None);
    let service = ResumeService::new(client_for(&server, &session, Namespace::User));

    let created = service
        .create(&ResumeDraft {
            title: "Platform Engineer".to_owned(),
            template: Some("modern".to_owned()),
            data: json!({"summary": "Builds things"}),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "r1");
    assert_eq!(created.updated_at.as_deref(), Some("2026-10-01T12:00:00Z"));

    let fetched = service.get("r1").await.unwrap();
    assert_eq!(fetched, created);

    let renamed = service.rename("r1", "Staff Engineer").await.unwrap();
    assert_eq!(renamed.title, "Staff Engineer");
    assert!(renamed.data.is_null());

    service.delete("r1").await.unwrap();
}

#[tokio::test]
async fn download_pdf_omits_template_when_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resumes/r1/pdf"))
        .and(query_param_is_missing("template"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let service = ResumeService::new(client_for(&server, &session, Namespace::User));
    let bytes = service.download_pdf("r1", None).await.unwrap();
    assert_eq!(bytes, b"%PDF");
}

#[tokio::test]
async fn download_401_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resumes/r1/pdf"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "t", None);
    let service = ResumeService::new(client_for(&server, &session, Namespace::User));
    let err = service.download_pdf("r1", Some("classic")).await.unwrap_err();
    assert!(matches!(err, RequestError::Download { status: 401 }));
    assert!(!session.is_authenticated(Namespace::User));
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_login_stores_role_from_user_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "adm",
            "refreshToken": "adm-r",
            "user": {"id": "a1", "role": "superadmin"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let admin_auth = AdminAuthService::new(client_for(&server, &session, Namespace::Admin));
    admin_auth.login("root@example.com", "pw").await.unwrap();

    assert_eq!(session.get("adminToken").as_deref(), Some("adm"));
    assert_eq!(session.get("adminRefreshToken").as_deref(), Some("adm-r"));
    assert_eq!(admin_auth.role().as_deref(), Some("superadmin"));
    assert!(session.token(Namespace::User).is_none());
}

#[tokio::test]
async fn admin_list_users_sends_paging_and_omits_missing_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(header("authorization", "Bearer adm"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "25"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "u1", "name": "Ada", "email": "ada@example.com", "status": "active"}],
            "total": 26,
            "page": 2,
            "limit": 25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::Admin, "adm", None);
    let admin = AdminService::new(client_for(&server, &session, Namespace::Admin));
    let page = admin.list_users(2, 25, None).await.unwrap();

    assert_eq!(page.total, 26);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].status.as_deref(), Some("active"));
}

#[tokio::test]
async fn admin_set_user_status_and_stats() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/admin/users/u1/status"))
        .and(body_json(json!({"status": "suspended"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1", "name": "Ada", "email": "ada@example.com", "status": "suspended"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalUsers": 10, "activeUsers": 8, "totalResumes": 31
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::Admin, "adm", None);
    let admin = AdminService::new(client_for(&server, &session, Namespace::Admin));

    let user = admin
        .set_user_status("u1", UserStatus::Suspended)
        .await
        .unwrap();
    assert_eq!(user.status.as_deref(), Some("suspended"));

    let stats = admin.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_users, 10);
    assert_eq!(stats.resumes_this_month, 0);
}

#[tokio::test]
async fn admin_401_clears_admin_session_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/stats"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::User, "usr", None);
    seed(&session, Namespace::Admin, "adm", None);
    let admin = AdminService::new(client_for(&server, &session, Namespace::Admin));
    admin.dashboard_stats().await.unwrap_err();

    assert!(session.token(Namespace::Admin).is_none());
    assert_eq!(session.token(Namespace::User).as_deref(), Some("usr"));
}

#[tokio::test]
async fn admin_export_is_a_single_attempt_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users/export"))
        .and(query_param("format", "csv"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    seed(&session, Namespace::Admin, "adm", None);
    let admin = AdminService::new(client_for(&server, &session, Namespace::Admin));
    let err = admin.export_users_csv().await.unwrap_err();
    assert!(matches!(err, RequestError::Download { status: 502 }));
}
