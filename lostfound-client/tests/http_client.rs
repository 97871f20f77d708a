use lostfound_client::{
    AuthUser, Category, ClientConfig, ImageFile, LostFoundClientHttp, LostFoundClientTrait,
    LostFoundError, NewPost, Session, Status,
};
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON: &str = "anon-key";
const USER_ID: &str = "0d6f3b8e-2f55-4b8e-8d43-6c2a0b1c9e77";

fn config(server: &MockServer, dir: &TempDir) -> ClientConfig {
    ClientConfig::new(server.uri(), ANON).with_session_file(dir.path().join("session.json"))
}

fn session() -> Session {
    Session {
        access_token: "user-token".into(),
        refresh_token: Some("refresh".into()),
        expires_in: Some(3600),
        token_type: "bearer".into(),
        user: AuthUser {
            id: Uuid::parse_str(USER_ID).unwrap(),
            email: Some("ana@example.com".into()),
        },
    }
}

async fn signed_in_client(server: &MockServer, dir: &TempDir) -> LostFoundClientHttp {
    let mut client = LostFoundClientHttp::connect(config(server, dir)).await.unwrap();
    client.set_session(session()).unwrap();
    client
}

#[tokio::test]
async fn list_posts_selects_profiles_newest_first() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/posts"))
        .and(query_param("select", "*,profiles(full_name)"))
        .and(query_param("order", "date_posted.desc"))
        .and(header("apikey", ANON))
        .and(header("authorization", format!("Bearer {ANON}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "8f0c6f0e-6d8c-4d5e-9a43-1f6c1a0c8b11",
            "title": "Found umbrella",
            "description": "Blue, left on bus 12",
            "category": "found",
            "status": "closed",
            "contact_info": "Sign in to view contact information",
            "location": null,
            "image_url": null,
            "date_posted": "2024-05-02T10:15:00+00:00",
            "date_lost_found": null,
            "user_id": USER_ID,
            "profiles": null
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();
    let posts = client.list_posts().await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].category, Category::Found);
    assert_eq!(posts[0].status, Status::Closed);
    assert!(posts[0].is_contact_masked());
}

#[tokio::test]
async fn list_failure_surfaces_backend_message() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/posts"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "relation \"posts\" does not exist" })),
        )
        .mount(&server)
        .await;

    let mut client = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();
    match client.list_posts().await {
        Err(LostFoundError::Http { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "relation \"posts\" does not exist");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn sign_in_persists_the_session_and_sign_out_clears_it() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_json(json!({ "email": "ana@example.com", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh",
            "user": { "id": USER_ID, "email": "ana@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();
    client
        .sign_in(" ana@example.com ".into(), "hunter22".into())
        .await
        .unwrap();

    // A fresh client picks the saved session up from disk.
    let mut reopened = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();
    assert_eq!(reopened.session().map(|s| s.user_id().to_string()), Some(USER_ID.to_string()));

    reopened.sign_out().await.unwrap();
    assert!(reopened.session().is_none());
    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn bad_credentials_are_reported() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let mut client = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();
    let err = client
        .sign_in("ana@example.com".into(), "nope".into())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid login credentials");
    assert!(client.session().is_none());
}

#[tokio::test]
async fn sign_up_awaiting_confirmation_returns_no_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": USER_ID,
            "email": "ana@example.com",
            "confirmation_sent_at": "2024-05-02T10:15:00Z"
        })))
        .mount(&server)
        .await;

    let mut client = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();
    let session = client
        .sign_up("ana@example.com".into(), "hunter22".into(), Some("Ana".into()))
        .await
        .unwrap();
    assert!(session.is_none());
    assert!(client.session().is_none());
}

#[tokio::test]
async fn create_post_inserts_a_single_row_with_the_user_token() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/rest/v1/posts"))
        .and(header("authorization", "Bearer user-token"))
        .and(header("prefer", "return=minimal"))
        .and(body_json(json!([{
            "user_id": USER_ID,
            "title": "Found keys",
            "description": "Three keys on a ring",
            "category": "found",
            "location": null,
            "contact_info": "5550100",
            "date_lost_found": null,
            "image_url": null
        }])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = signed_in_client(&server, &dir).await;
    client
        .create_post(NewPost {
            user_id: Uuid::parse_str(USER_ID).unwrap(),
            title: "Found keys".into(),
            description: "Three keys on a ring".into(),
            category: Category::Found,
            location: None,
            contact_info: "5550100".into(),
            date_lost_found: None,
            image_url: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn writes_require_a_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut client = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();

    let image = ImageFile::new("a.png", vec![1]).unwrap();
    assert!(matches!(
        client.upload_image("u/1.png", &image).await,
        Err(LostFoundError::Unauthorized)
    ));
    assert!(matches!(
        client.delete_post(Uuid::new_v4()).await,
        Err(LostFoundError::Unauthorized)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_returns_the_public_url() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let object = format!("{USER_ID}/1717000000000.png");

    Mock::given(method("POST"))
        .and(path(format!("/storage/v1/object/lost-found-images/{object}")))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": object })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = signed_in_client(&server, &dir).await;
    let image = ImageFile::new("cat.png", vec![137, 80, 78, 71]).unwrap();
    let url = client.upload_image(&object, &image).await.unwrap();

    assert_eq!(
        url,
        format!(
            "{}/storage/v1/object/public/lost-found-images/{object}",
            server.uri()
        )
    );
    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, vec![137, 80, 78, 71]);
}

#[tokio::test]
async fn deleting_nothing_is_not_found() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/posts"))
        .and(query_param("id", format!("eq.{id}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut client = signed_in_client(&server, &dir).await;
    assert!(matches!(
        client.delete_post(id).await,
        Err(LostFoundError::NotFound)
    ));
}

#[tokio::test]
async fn deleting_an_own_post_succeeds() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/posts"))
        .and(header("prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": id }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = signed_in_client(&server, &dir).await;
    client.delete_post(id).await.unwrap();
}

fn stale_session() -> Session {
    Session {
        access_token: "stale".into(),
        ..session()
    }
}

async fn mount_expired_feed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/posts"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "JWT expired" })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn expired_token_is_refreshed_and_saved() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_expired_feed(&server).await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({ "refresh_token": "refresh" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "refresh_token": "refresh-2",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": { "id": USER_ID, "email": "ana@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/posts"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();
    client.set_session(stale_session()).unwrap();

    assert!(client.list_posts().await.unwrap().is_empty());
    assert_eq!(client.session().unwrap().access_token, "fresh");

    // The refreshed session survives a restart.
    let reopened = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();
    assert_eq!(reopened.session().unwrap().refresh_token.as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn failed_refresh_falls_back_to_anonymous_reads() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_expired_feed(&server).await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error_description": "Invalid Refresh Token" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/posts"))
        .and(header("authorization", format!("Bearer {ANON}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = LostFoundClientHttp::connect(config(&server, &dir)).await.unwrap();
    client.set_session(stale_session()).unwrap();

    assert!(client.list_posts().await.unwrap().is_empty());
    assert!(client.session().is_none());
    assert!(!dir.path().join("session.json").exists());
}
