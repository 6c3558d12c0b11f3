//! Session lifecycle tests against a mock loyalty API

use serde_json::json;
use solara_core::{CredentialStore, SessionUser, Token};
use solara_http::ApiClient;
use solara_http::types::{RegisterRequest, ServerResult};
use solara_session::{AttendOutcome, AuthConfig, SessionEvent, SessionManager, SessionPhase};
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::timeout;
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, store: &CredentialStore) -> ApiClient {
    ApiClient::new(server.uri(), store.clone()).unwrap()
}

fn cached_user(id: i64, token: &str) -> SessionUser {
    SessionUser {
        id: Some(id),
        name: Some("Ana".to_string()),
        lastname: Some("Lopez".to_string()),
        cedula: Some("123".to_string()),
        token: Token::new(token),
        email: Some("a@b.com".to_string()),
        birth_date: None,
    }
}

fn signed_in_store(id: i64, token: &str) -> CredentialStore {
    let store = CredentialStore::in_memory();
    store.set_token(&Token::new(token));
    store.set_user(&cached_user(id, token));
    store
}

fn registration() -> RegisterRequest {
    RegisterRequest {
        cedula: "456".into(),
        nombre: "Luis".into(),
        apellido: "Perez".into(),
        telefono: "55598765".into(),
        email: "luis@b.com".into(),
        password: "secret123".into(),
        birth_date: chrono::NaiveDate::from_ymd_opt(1988, 2, 3).unwrap(),
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idCliente": 1,
            "name": "Ana",
            "lastname": "Lopez",
            "cedula": "123",
            "token": "T1",
            "email": "a@b.com"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cached_profile_restores_without_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = signed_in_store(7, "T9");
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;

    let state = session.state();
    assert!(!state.loading);
    assert_eq!(state.user.unwrap().id, Some(7));
    assert_eq!(session.phase(), SessionPhase::Authenticated);
}

#[tokio::test]
async fn test_loading_flips_once_and_never_exposes_unvalidated_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/validate-token"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    store.set_token(&Token::new("T1"));
    let session = SessionManager::start(client(&server, &store));

    let mut state = session.subscribe();
    {
        let initial = state.borrow_and_update();
        assert!(initial.loading);
        assert!(initial.user.is_none());
        assert_eq!(initial.phase(), SessionPhase::Restoring);
    }

    state.changed().await.unwrap();
    let restored = state.borrow_and_update().clone();
    assert!(!restored.loading);
    assert_eq!(restored.user, Some(SessionUser::from_token(Token::new("T1"))));

    // No second transition
    assert!(
        timeout(Duration::from_millis(200), state.changed())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_validated_token_caches_minimal_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/validate-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    store.set_token(&Token::new("T3"));
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;

    assert_eq!(session.phase(), SessionPhase::Authenticated);
    assert_eq!(store.user(), Some(SessionUser::from_token(Token::new("T3"))));
    assert_eq!(store.token(), Some(Token::new("T3")));
}

#[tokio::test]
async fn test_rejected_token_falls_back_to_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/validate-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    store.set_token(&Token::new("T4"));
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;

    assert_eq!(session.phase(), SessionPhase::Anonymous);
    assert!(session.current_user().is_none());
    assert!(store.token().is_none());
}

#[tokio::test]
async fn test_validation_failure_clears_token_without_escalating() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/validate-token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    store.set_token(&Token::new("T5"));
    let session = SessionManager::start(client(&server, &store));
    let mut events = session.events();
    session.ready().await;

    assert_eq!(session.phase(), SessionPhase::Anonymous);
    assert!(store.token().is_none());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_no_token_starts_anonymous_without_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;

    assert_eq!(session.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_login_round_trip() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let store = CredentialStore::in_memory();
    let session = SessionManager::start(client(&server, &store));
    let mut events = session.events();

    assert!(session.login("a@b.com", "secret").await);

    let expected = SessionUser {
        id: Some(1),
        name: Some("Ana".to_string()),
        lastname: Some("Lopez".to_string()),
        cedula: Some("123".to_string()),
        token: Token::new("T1"),
        email: Some("a@b.com".to_string()),
        birth_date: None,
    };
    assert_eq!(session.current_user(), Some(expected.clone()));
    assert_eq!(store.token(), Some(Token::new("T1")));
    assert_eq!(store.user(), Some(expected));
    assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedIn);
}

#[tokio::test]
async fn test_login_accepts_datetime_birth_date() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idCliente": 1,
            "name": "Ana",
            "lastname": "Lopez",
            "cedula": "123",
            "token": "T1",
            "email": "a@b.com",
            "fechaNacimiento": "1990-05-17T00:00:00"
        })))
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = SessionManager::start(client(&server, &store));

    assert!(session.login("a@b.com", "secret").await);
    assert_eq!(store.token(), Some(Token::new("T1")));
    assert_eq!(
        session.current_user().and_then(|user| user.birth_date),
        chrono::NaiveDate::from_ymd_opt(1990, 5, 17)
    );
}

#[tokio::test]
async fn test_failed_login_leaves_session_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = SessionManager::start(client(&server, &store));
    let mut events = session.events();

    assert!(!session.login("a@b.com", "wrong").await);
    assert_eq!(session.phase(), SessionPhase::Anonymous);
    assert!(store.token().is_none());
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_login_with_unreachable_server_returns_false() {
    let store = CredentialStore::in_memory();
    let client = ApiClient::builder()
        .base_url("http://127.0.0.1:9")
        .timeout(Duration::from_millis(200))
        .credentials(store.clone())
        .build()
        .unwrap();
    let session = SessionManager::start(client);

    assert!(!session.login("a@b.com", "secret").await);
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_logout_twice_is_harmless() {
    let server = MockServer::start().await;
    let store = signed_in_store(7, "T9");
    let session = SessionManager::start(client(&server, &store));
    let mut events = session.events();
    session.ready().await;

    session.logout().await;
    session.logout().await;

    assert!(session.current_user().is_none());
    assert!(store.token().is_none());
    assert!(store.user().is_none());
    assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedOut);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_registration_does_not_touch_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Registro exitoso",
            "idCliente": 12
        })))
        .mount(&server)
        .await;

    let store = signed_in_store(7, "T9");
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;
    let before = session.state();

    let result = session.register(&registration()).await;

    assert!(result.success);
    assert_eq!(result.message.as_deref(), Some("Registro exitoso"));
    assert_eq!(result.extra["idCliente"], 12);
    assert_eq!(session.state(), before);
    assert_eq!(store.token(), Some(Token::new("T9")));
    assert_eq!(store.user(), Some(cached_user(7, "T9")));
}

#[tokio::test]
async fn test_registration_while_anonymous_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;

    assert!(session.register(&registration()).await.success);
    assert!(session.current_user().is_none());
    assert!(store.token().is_none());
    assert!(store.user().is_none());
}

#[tokio::test]
async fn test_registration_error_body_is_returned_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "La cédula ya está registrada",
            "field": "cedula"
        })))
        .mount(&server)
        .await;

    let session = SessionManager::start(client(&server, &CredentialStore::in_memory()));
    let result = session.register(&registration()).await;

    assert!(!result.success);
    assert_eq!(
        result.message.as_deref(),
        Some("La cédula ya está registrada")
    );
    assert_eq!(result.extra["field"], "cedula");
}

#[tokio::test]
async fn test_registration_field_errors_are_not_replaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": ["cedula taken", "email taken"]
        })))
        .mount(&server)
        .await;

    let session = SessionManager::start(client(&server, &CredentialStore::in_memory()));
    let result = session.register(&registration()).await;

    assert!(!result.success);
    assert_ne!(result, ServerResult::unexpected());
    assert_eq!(
        result.extra["message"],
        json!(["cedula taken", "email taken"])
    );
}

#[tokio::test]
async fn test_registration_without_error_body_is_synthesized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let session = SessionManager::start(client(&server, &CredentialStore::in_memory()));
    let result = session.register(&registration()).await;

    assert_eq!(result, ServerResult::unexpected());
}

#[tokio::test]
async fn test_unauthorized_escalates_from_any_endpoint() {
    for endpoint in ["/api/eventos", "/api/tarjetas/by-guid"] {
        let server = MockServer::start().await;
        Mock::given(path(endpoint))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = signed_in_store(7, "T9");
        let session = SessionManager::start(client(&server, &store));
        let mut events = session.events();
        session.ready().await;

        let api = session.api();
        let error = if endpoint == "/api/eventos" {
            api.list_events().await.unwrap_err()
        } else {
            api.get_card("7").await.unwrap_err()
        };

        assert!(error.is_unauthorized(), "{endpoint}");
        assert!(store.token().is_none(), "{endpoint}");
        assert!(store.user().is_none(), "{endpoint}");
        assert!(session.current_user().is_none(), "{endpoint}");
        assert_eq!(
            timeout(Duration::from_secs(1), events.recv())
                .await
                .unwrap()
                .unwrap(),
            SessionEvent::Expired {
                notice: AuthConfig::SESSION_EXPIRED_NOTICE.to_string(),
                redirect_to: AuthConfig::LOGIN_ROUTE,
            },
            "{endpoint}"
        );
    }
}

#[tokio::test]
async fn test_concurrent_unauthorized_responses_collapse() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(50)))
        .mount(&server)
        .await;

    let store = signed_in_store(7, "T9");
    let session = SessionManager::start(client(&server, &store));
    let mut events = session.events();
    session.ready().await;

    let api = session.api();
    let (events_result, card_result, event_result) =
        tokio::join!(api.list_events(), api.get_card("7"), api.get_event("ev-1"));

    assert!(events_result.unwrap_err().is_unauthorized());
    assert!(card_result.unwrap_err().is_unauthorized());
    assert!(event_result.unwrap_err().is_unauthorized());

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Expired { .. }
    ));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert!(session.escalation().has_fired());
    assert!(store.token().is_none());
    assert!(store.user().is_none());
}

#[tokio::test]
async fn test_generic_failures_do_not_escalate() {
    let server = MockServer::start().await;
    Mock::given(path("/api/eventos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = signed_in_store(7, "T9");
    let session = SessionManager::start(client(&server, &store));
    let mut events = session.events();
    session.ready().await;

    let error = session.api().list_events().await.unwrap_err();

    assert!(!error.is_unauthorized());
    assert_eq!(store.token(), Some(Token::new("T9")));
    assert_eq!(session.phase(), SessionPhase::Authenticated);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_escalation_rearms_after_new_login() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(path("/api/eventos"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = CredentialStore::in_memory();
    let session = SessionManager::start(client(&server, &store));
    let mut events = session.events();

    assert!(session.login("a@b.com", "secret").await);
    assert!(session.api().list_events().await.is_err());
    assert!(session.login("a@b.com", "secret").await);
    assert!(session.api().list_events().await.is_err());

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    let expired = received
        .iter()
        .filter(|e| matches!(e, SessionEvent::Expired { .. }))
        .count();
    assert_eq!(expired, 2);
    assert_eq!(received.first(), Some(&SessionEvent::SignedIn));
}

#[tokio::test]
async fn test_attendance_uses_wrapped_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/asistencias"))
        .and(header("authorization", "Bearer T9"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Asistencia registrada"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in_store(7, "T9");
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;

    let user_id = session.current_user().and_then(|u| u.id).unwrap();
    let result = session.api().add_attendance("ev-1", user_id).await.unwrap();
    assert_eq!(result.message.as_deref(), Some("Asistencia registrada"));
}

#[tokio::test]
async fn test_escalated_session_is_not_restored_on_restart() {
    let server = MockServer::start().await;
    Mock::given(path("/api/eventos"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(path("/api/auth/validate-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let store = signed_in_store(7, "T9");
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;
    assert!(session.api().list_events().await.unwrap_err().is_unauthorized());
    drop(session);

    let restarted = SessionManager::start(client(&server, &store));
    restarted.ready().await;

    assert_eq!(restarted.phase(), SessionPhase::Anonymous);
    assert!(store.token().is_none());
    assert!(store.user().is_none());
}

#[tokio::test]
async fn test_attend_skips_events_already_joined() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/eventos/by-guid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "idEvento": "ev-1",
                "nombreEvento": "Taller",
                "asistenciaEventos": [{"idCliente": 7}]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/asistencias"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let store = signed_in_store(7, "T9");
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;

    let outcome = session.api().attend("ev-1", 7).await.unwrap();
    assert_eq!(outcome, AttendOutcome::AlreadyAttending);
}

#[tokio::test]
async fn test_attend_signs_up_new_attendee() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/eventos/by-guid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"idEvento": "ev-1", "asistenciaEventos": [{"idCliente": 3}]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/asistencias"))
        .and(query_param("idEvento", "ev-1"))
        .and(query_param("idCliente", "7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Asistencia registrada"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = signed_in_store(7, "T9");
    let session = SessionManager::start(client(&server, &store));
    session.ready().await;

    match session.api().attend("ev-1", 7).await.unwrap() {
        AttendOutcome::Registered(result) => {
            assert!(result.success);
            assert_eq!(result.message.as_deref(), Some("Asistencia registrada"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}
