mod common;

use common::{account_body, ScriptedHttpClient, API_URL, AUTH_URL, MEDIA_URL, STORE_URL};
use http_types::StatusCode;
use playlist_client::{AppConfig, AppServices, LoginForm, PlaylistError, RegistrationForm};
use serde_json::json;

fn config() -> AppConfig {
    AppConfig::new()
        .with_api_url(API_URL)
        .with_firebase_api_key("test-key")
        .with_firebase_base_urls(AUTH_URL, STORE_URL)
        .with_media_base_url(MEDIA_URL)
}

fn start(http: &ScriptedHttpClient) -> AppServices {
    AppServices::start(config(), http.shared()).unwrap()
}

fn profile_document(name: &str, bio: &str, photo: Option<&str>) -> serde_json::Value {
    let photo = match photo {
        Some(url) => json!({"stringValue": url}),
        None => json!({"nullValue": null}),
    };
    json!({
        "name": "projects/playlist-61bf3/databases/(default)/documents/users/uid-1",
        "fields": {
            "name": {"stringValue": name},
            "bio": {"stringValue": bio},
            "photo": photo
        }
    })
}

#[tokio::test]
async fn test_registration_uploads_then_signs_up_then_writes_profile() {
    let http = ScriptedHttpClient::new()
        .respond(
            StatusCode::Ok,
            json!({"secure_url": "https://img.test/ana.jpg", "public_id": "ana"}),
        )
        .respond(StatusCode::Ok, account_body("uid-1", "ana@example.com"))
        .respond(StatusCode::Ok, profile_document("Ana", "Samba", Some("https://img.test/ana.jpg")));
    let services = start(&http);

    let form = RegistrationForm::new("ana@example.com", "secret", "Ana")
        .with_bio("Samba")
        .with_photo(vec![0xFF, 0xD8, 0xFF]);
    let session = services.register(&form).await.unwrap();

    assert_eq!(session.uid, "uid-1");
    assert_eq!(services.current_user().map(|s| s.uid), Some("uid-1".to_string()));

    let requests = http.requests();
    assert_eq!(requests.len(), 3);

    let upload = &requests[0];
    assert_eq!(upload.line(), "POST /v1_1/dqzebwdjf/image/upload");
    assert_eq!(upload.json()["file"], "data:image/jpg;base64,/9j/");
    assert_eq!(upload.json()["upload_preset"], "preset_publico");

    let sign_up = &requests[1];
    assert_eq!(sign_up.line(), "POST /v1/accounts:signUp");
    assert_eq!(sign_up.query.as_deref(), Some("key=test-key"));
    assert_eq!(sign_up.json()["returnSecureToken"], true);

    let write = &requests[2];
    assert_eq!(
        write.line(),
        "PATCH /v1/projects/playlist-61bf3/databases/(default)/documents/users/uid-1"
    );
    assert_eq!(write.authorization.as_deref(), Some("Bearer id-token-uid-1"));
    assert_eq!(
        write.json()["fields"],
        json!({
            "bio": {"stringValue": "Samba"},
            "name": {"stringValue": "Ana"},
            "photo": {"stringValue": "https://img.test/ana.jpg"}
        })
    );
}

#[tokio::test]
async fn test_registration_without_photo_stores_null_photo() {
    let http = ScriptedHttpClient::new()
        .respond(StatusCode::Ok, account_body("uid-1", "ana@example.com"))
        .respond(StatusCode::Ok, profile_document("Ana", "", None));
    let services = start(&http);

    services
        .register(&RegistrationForm::new("ana@example.com", "secret", "Ana"))
        .await
        .unwrap();

    let requests = http.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].json()["fields"]["photo"], json!({"nullValue": null}));
}

#[tokio::test]
async fn test_rejected_upload_aborts_registration() {
    let http = ScriptedHttpClient::new().respond(
        StatusCode::BadRequest,
        json!({"error": {"message": "Upload preset not found"}}),
    );
    let services = start(&http);

    let form = RegistrationForm::new("ana@example.com", "secret", "Ana").with_photo(vec![1, 2, 3]);
    let result = services.register(&form).await;

    assert!(matches!(result, Err(PlaylistError::Upload(msg)) if msg == "Upload preset not found"));
    assert_eq!(http.requests().len(), 1);
    assert!(services.current_user().is_none());
}

#[tokio::test]
async fn test_wrong_password_is_an_auth_failure() {
    let http = ScriptedHttpClient::new().respond(
        StatusCode::BadRequest,
        json!({"error": {"code": 400, "message": "INVALID_LOGIN_CREDENTIALS"}}),
    );
    let services = start(&http);

    let result = services
        .login(&LoginForm::new("ana@example.com", "wrong"))
        .await;

    assert!(matches!(result, Err(PlaylistError::Auth(msg)) if msg == "INVALID_LOGIN_CREDENTIALS"));
    assert!(services.current_user().is_none());
}

#[tokio::test]
async fn test_login_with_empty_email_sends_nothing() {
    let http = ScriptedHttpClient::new();
    let services = start(&http);

    let result = services.login(&LoginForm::new("", "secret")).await;

    assert!(matches!(result, Err(PlaylistError::Validation(_))));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_missing_api_key_is_a_configuration_error() {
    let http = ScriptedHttpClient::new();
    let services = AppServices::start(
        config().with_firebase_api_key(""),
        http.shared(),
    )
    .unwrap();

    let result = services
        .login(&LoginForm::new("ana@example.com", "secret"))
        .await;

    assert!(matches!(result, Err(PlaylistError::Config(_))));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_password_reset_request() {
    let http = ScriptedHttpClient::new().respond(StatusCode::Ok, json!({"email": "ana@example.com"}));
    let services = start(&http);

    services
        .request_password_reset("ana@example.com")
        .await
        .unwrap();

    let request = &http.requests()[0];
    assert_eq!(request.line(), "POST /v1/accounts:sendOobCode");
    assert_eq!(
        request.json(),
        json!({"requestType": "PASSWORD_RESET", "email": "ana@example.com"})
    );
}

#[tokio::test]
async fn test_profile_load_edit_and_save() {
    let http = ScriptedHttpClient::new()
        .respond(StatusCode::Ok, account_body("uid-1", "ana@example.com"))
        .respond(StatusCode::Ok, profile_document("Ana", "", Some("https://img.test/old.jpg")))
        .respond(StatusCode::Ok, profile_document("Ana Maria", "Choro", Some("https://img.test/old.jpg")));
    let services = start(&http);
    services
        .login(&LoginForm::new("ana@example.com", "secret"))
        .await
        .unwrap();

    let mut screen = services.profile_screen();
    let loaded = screen.load().await.unwrap().cloned().unwrap();
    assert_eq!(loaded.name, "Ana");
    assert_eq!(loaded.photo.as_deref(), Some("https://img.test/old.jpg"));

    screen.begin_edit();
    assert!(screen.is_editing());
    screen.set_draft_name("Ana Maria");
    screen.set_draft_bio("Choro");
    let saved = screen.save().await.unwrap().clone();

    assert_eq!(saved.name, "Ana Maria");
    assert_eq!(saved.bio, "Choro");
    assert_eq!(saved.photo.as_deref(), Some("https://img.test/old.jpg"));
    assert!(!screen.is_editing());

    let update = &http.requests()[2];
    assert_eq!(update.method, "PATCH");
    assert_eq!(
        update.query.as_deref(),
        Some("updateMask.fieldPaths=name&updateMask.fieldPaths=bio&currentDocument.exists=true")
    );
    assert_eq!(
        update.json()["fields"],
        json!({"bio": {"stringValue": "Choro"}, "name": {"stringValue": "Ana Maria"}})
    );
}

#[tokio::test]
async fn test_missing_profile_document_is_user_not_found() {
    let http = ScriptedHttpClient::new()
        .respond(StatusCode::Ok, account_body("uid-1", "ana@example.com"))
        .respond(StatusCode::NotFound, json!({"error": {"code": 404, "status": "NOT_FOUND"}}));
    let services = start(&http);
    services
        .login(&LoginForm::new("ana@example.com", "secret"))
        .await
        .unwrap();

    let mut screen = services.profile_screen();
    assert!(screen.load().await.unwrap().is_none());
    assert!(screen.profile().is_none());
}

#[tokio::test]
async fn test_replace_photo_without_user_sends_nothing() {
    let http = ScriptedHttpClient::new();
    let services = start(&http);

    let mut screen = services.profile_screen();
    let result = screen.replace_photo(&[1, 2, 3]).await;

    assert!(matches!(result, Err(PlaylistError::Auth(_))));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_out_of_range_token_lifetime_is_an_auth_failure() {
    let mut answer = account_body("uid-1", "ana@example.com");
    answer["expiresIn"] = json!("9223372036854775807");
    let http = ScriptedHttpClient::new().respond(StatusCode::Ok, answer);
    let services = start(&http);

    let result = services
        .login(&LoginForm::new("ana@example.com", "secret"))
        .await;

    assert!(matches!(result, Err(PlaylistError::Auth(msg)) if msg.contains("expiresIn")));
    assert!(services.current_user().is_none());
}

#[tokio::test]
async fn test_replace_photo_uploads_then_merges_photo() {
    let http = ScriptedHttpClient::new()
        .respond(StatusCode::Ok, account_body("uid-1", "ana@example.com"))
        .respond(StatusCode::Ok, profile_document("Ana", "Samba", None))
        .respond(StatusCode::Ok, json!({"secure_url": "https://img.test/new.jpg"}))
        .respond(StatusCode::Ok, profile_document("Ana", "Samba", Some("https://img.test/new.jpg")));
    let services = start(&http);
    services
        .login(&LoginForm::new("ana@example.com", "secret"))
        .await
        .unwrap();

    let mut screen = services.profile_screen();
    screen.load().await.unwrap();
    let updated = screen.replace_photo(&[0xFF, 0xD8, 0xFF]).await.unwrap().clone();

    assert_eq!(updated.photo.as_deref(), Some("https://img.test/new.jpg"));
    assert_eq!(updated.name, "Ana");
    assert_eq!(updated.bio, "Samba");
    assert_eq!(screen.profile(), Some(&updated));

    let requests = http.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[2].line(), "POST /v1_1/dqzebwdjf/image/upload");

    let merge = &requests[3];
    assert_eq!(
        merge.line(),
        "PATCH /v1/projects/playlist-61bf3/databases/(default)/documents/users/uid-1"
    );
    assert_eq!(
        merge.query.as_deref(),
        Some("updateMask.fieldPaths=photo&currentDocument.exists=true")
    );
    assert_eq!(
        merge.json()["fields"],
        json!({"photo": {"stringValue": "https://img.test/new.jpg"}})
    );
    assert_eq!(merge.authorization.as_deref(), Some("Bearer id-token-uid-1"));
}
