#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{config_for, controller_for, init_tracing, PHONE};
use mockito::{Matcher, Server};
use qogam_core::{
    content::{ContentApi, ProfileUpdate},
    locale::Locale,
    store::{InMemoryKeyValueStore, KeyValueStore, AUTH_TOKEN_KEY, AUTH_USER_KEY},
    QogamError,
};
use serde_json::json;

fn authenticated(server: &Server) -> Arc<ContentApi> {
    ContentApi::new(config_for(&server.url()), Some("tok".to_string())).unwrap()
}

#[tokio::test]
async fn test_public_courses_without_token() {
    init_tracing();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/public/courses")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(
            json!([
                {
                    "id": 1,
                    "lessons_count": 3,
                    "img": "/storage/c1.png",
                    "title": "Финансовая грамотность",
                    "description": "Основы",
                    "translations": [
                        {"id": 1, "locale": "kk", "title": "Қаржылық сауаттылық", "description": "Негіздер", "img": ""}
                    ]
                },
                {"id": 2, "title": "Налоги"}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let api = ContentApi::new(config_for(&server.url()), None).unwrap();
    assert!(!api.is_authenticated());
    let courses = api.courses().await.unwrap();

    mock.assert_async().await;
    assert_eq!(courses.len(), 2);
    let kazakh = courses[0].localized(Locale::Kk);
    assert_eq!(kazakh.title, "Қаржылық сауаттылық");
    assert_eq!(kazakh.img, "/storage/c1.png");
    assert!(courses[1].translations.is_empty());
}

#[tokio::test]
async fn test_bearer_endpoints_require_token() {
    let server = Server::new_async().await;
    let api = ContentApi::new(config_for(&server.url()), None).unwrap();

    assert!(matches!(
        api.user_info().await,
        Err(QogamError::Unauthenticated)
    ));
    assert!(matches!(
        api.complete_lesson(3).await,
        Err(QogamError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_user_info_sends_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/user-info")
        .match_header("authorization", "Bearer tok")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(
            json!({
                "id": 42,
                "name": "Асель",
                "phone": PHONE,
                "email": null,
                "role_id": 2,
                "role": {"id": 2, "name": "Клиент", "translations": []},
                "region_id": 1,
                "district_id": 4,
                "points": 120,
                "districts": [],
                "certificate": null
            })
            .to_string(),
        )
        .create_async()
        .await;

    let profile = authenticated(&server).user_info().await.unwrap();

    mock.assert_async().await;
    assert_eq!(profile.id, 42);
    assert_eq!(profile.points, 120);
    assert_eq!(profile.role.map(|role| role.name).as_deref(), Some("Клиент"));
}

#[tokio::test]
async fn test_get_is_retried_on_server_errors() {
    init_tracing();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/materials/7")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let err = authenticated(&server).materials(7).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        QogamError::NetworkError {
            status: Some(503),
            ..
        }
    ));
}

#[tokio::test]
async fn test_complete_lesson_is_sent_once() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("POST", "/lessons/7/complete")
        .with_status(503)
        .with_body(r#"{"message": "Попробуйте позже"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = authenticated(&server).complete_lesson(7).await.unwrap_err();

    failing.assert_async().await;
    assert_eq!(err.to_string(), "Попробуйте позже");
}

#[tokio::test]
async fn test_complete_lesson_returns_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/lessons/7/complete")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"status": true, "message": "Урок пройден"}"#)
        .create_async()
        .await;

    let completion = authenticated(&server).complete_lesson(7).await.unwrap();

    mock.assert_async().await;
    assert!(completion.status);
    assert_eq!(completion.message, "Урок пройден");
}

#[tokio::test]
async fn test_lesson_and_material_urls() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/client/lesson/7")
        .with_status(200)
        .with_body(
            json!({
                "lesson": {
                    "id": 7,
                    "title": "Кредиты",
                    "description": "Как не попасть в долговую яму",
                    "video": "https://youtu.be/credit",
                    "course_id": 1,
                    "translations": [],
                    "course": {"lessons": [{"id": 7, "title": "Кредиты"}]},
                    "materials": [
                        {"id": 1, "lesson_id": 7, "title": "Памятка", "content": "storage/memo.pdf"},
                        {"id": 2, "lesson_id": 7, "title": "Калькулятор", "file_url": "https://cdn.example.com/calc.xlsx"},
                        {"id": 3, "lesson_id": 7, "title": "Пусто"}
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let api = authenticated(&server);
    let lesson = api.lesson(7).await.unwrap();

    assert!(!lesson.favourite);
    assert!(lesson.next_lesson.is_none());
    assert_eq!(lesson.course_lessons.len(), 1);
    let urls: Vec<Option<String>> = lesson
        .materials
        .into_iter()
        .map(|material| api.material_url(material))
        .collect();
    assert_eq!(
        urls,
        vec![
            Some(format!("{}/storage/memo.pdf", server.url())),
            Some("https://cdn.example.com/calc.xlsx".to_string()),
            None,
        ]
    );
}

#[tokio::test]
async fn test_lesson_without_payload_is_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/client/lesson/99")
        .with_status(200)
        .with_body(r#"{"status": false, "message": "Урок недоступен"}"#)
        .create_async()
        .await;

    let err = authenticated(&server).lesson(99).await.unwrap_err();

    assert!(matches!(err, QogamError::Rejected { ref message } if message == "Урок недоступен"));
}

#[tokio::test]
async fn test_check_availability() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/client/check-available/lesson/8/1")
        .with_status(200)
        .with_body(r#"{"status": false}"#)
        .create_async()
        .await;

    assert!(!authenticated(&server).check_availability(8, 1).await.unwrap());
}

#[tokio::test]
async fn test_certificates_wraps_single_certificate() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/my-application-data")
        .with_status(200)
        .with_body(
            json!({
                "certificate": {
                    "id": 9,
                    "name": "Сертификат",
                    "created_at": "2025-01-10",
                    "url": "https://qogamfin.kz/cert/9.pdf"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let certificates = authenticated(&server).certificates().await.unwrap();

    assert_eq!(certificates.len(), 1);
    assert_eq!(certificates[0].id, 9);
}

#[tokio::test]
async fn test_update_user_info_validates_before_sending() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/personal/account/update/42")
        .expect(0)
        .create_async()
        .await;

    let err = authenticated(&server)
        .update_user_info(
            42,
            ProfileUpdate {
                name: "  ".to_string(),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, QogamError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_update_user_info_posts_trimmed_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/personal/account/update/42")
        .match_header("authorization", "Bearer tok")
        .match_body(Matcher::PartialJson(json!({
            "name": "Асель",
            "email": "asel@example.kz",
            "password": "secret1",
            "password_confirmation": "secret1"
        })))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create_async()
        .await;

    authenticated(&server)
        .update_user_info(
            42,
            ProfileUpdate {
                name: " Асель ".to_string(),
                email: Some("asel@example.kz ".to_string()),
                password: Some("secret1".to_string()),
                password_confirmation: Some("secret1".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_refresh_user_after_registration() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/user-info")
        .match_header("authorization", "Bearer tok-new")
        .with_status(200)
        .with_body(json!({"id": 77, "name": "Новый", "phone": PHONE}).to_string())
        .create_async()
        .await;

    let store = Arc::new(InMemoryKeyValueStore::with_entries([(AUTH_TOKEN_KEY, "tok-new")]));
    let controller = controller_for(&server.url(), &store);
    assert!(controller.state().user.is_none());
    assert!(controller.content_api().is_authenticated());

    let user = controller.refresh_user().await.unwrap();

    assert_eq!(user.id, 77);
    assert_eq!(controller.state().user, Some(user));
    let persisted = store.get(AUTH_USER_KEY.to_string()).unwrap().unwrap();
    assert!(persisted.contains("\"id\":77"));
}

#[tokio::test]
async fn test_refresh_user_requires_session() {
    let server = Server::new_async().await;
    let store = Arc::new(InMemoryKeyValueStore::new());
    let controller = controller_for(&server.url(), &store);

    assert!(!controller.content_api().is_authenticated());
    assert!(matches!(
        controller.refresh_user().await,
        Err(QogamError::Unauthenticated)
    ));
}
