mod common;

use axum::http::StatusCode;

async fn create_event(server: &axum_test::TestServer, event_url: &str) -> serde_json::Value {
    let response = server
        .post("/events")
        .json(&serde_json::json!({
            "title": "London Education Fair",
            "eventURL": event_url,
            "eventStartDate": "2025-04-10",
            "eventStartTime": "10:00",
            "eventEndDate": "2025-04-10",
            "eventEndTime": "17:00",
            "place": "ExCeL London",
            "imageGallery": ["https://cdn.studylane.test/hall.jpg"]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn create_and_fetch_event_by_id_and_url() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let created = create_event(&server, "london-fair").await;
    assert_eq!(
        created["message"].as_str(),
        Some("Event created successfully")
    );
    let id = created["event"]["_id"]["$oid"].as_str().unwrap();

    let by_id: serde_json::Value = server.get(&format!("/events/{id}")).await.json();
    assert_eq!(by_id["eventURL"].as_str(), Some("london-fair"));

    let by_url: serde_json::Value = server.get("/events/url/london-fair").await.json();
    assert_eq!(by_url["title"].as_str(), Some("London Education Fair"));

    let all: Vec<serde_json::Value> = server.get("/events").await.json();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn create_event_requires_dates_and_times() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    let response = server
        .post("/events")
        .json(&serde_json::json!({
            "title": "London Education Fair",
            "eventURL": "london-fair"
        }))
        .await;
    response.assert_status_bad_request();

    let body: serde_json::Value = response.json();
    assert_eq!(
        body["error"].as_str(),
        Some("Start and End date & time are required.")
    );
}

#[tokio::test]
async fn check_event_url_is_200_either_way() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    create_event(&server, "london-fair").await;

    let body: serde_json::Value = server.get("/events/check-url/london-fair").await.json();
    assert_eq!(body["exists"].as_bool(), Some(true));
    assert_eq!(body["message"].as_str(), Some("URL already taken"));

    let body: serde_json::Value = server.get("/events/check-url/sydney-fair").await.json();
    assert_eq!(body["exists"].as_bool(), Some(false));
    assert_eq!(body["message"].as_str(), Some("URL available"));
}

#[tokio::test]
async fn update_replaces_gallery_unless_append_requested() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let created = create_event(&server, "london-fair").await;
    let id = created["event"]["_id"]["$oid"].as_str().unwrap().to_string();

    let response = server
        .patch(&format!("/events/{id}"))
        .json(&serde_json::json!({
            "imageGallery": ["https://cdn.studylane.test/stage.jpg"]
        }))
        .await;
    let body: serde_json::Value = response.json();
    let gallery = body["imageGallery"].as_array().unwrap();
    assert_eq!(gallery.len(), 1);
    assert_eq!(
        gallery[0].as_str(),
        Some("https://cdn.studylane.test/stage.jpg")
    );

    let response = server
        .patch(&format!("/events/{id}"))
        .add_query_param("append", "true")
        .json(&serde_json::json!({
            "imageGallery": ["https://cdn.studylane.test/crowd.jpg"]
        }))
        .await;
    let body: serde_json::Value = response.json();
    let gallery = body["imageGallery"].as_array().unwrap();
    assert_eq!(gallery.len(), 2);
    assert_eq!(
        gallery[1].as_str(),
        Some("https://cdn.studylane.test/crowd.jpg")
    );
}

#[tokio::test]
async fn event_url_is_lowercased_on_create() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let created = create_event(&server, "Sydney-Fair").await;
    assert_eq!(created["event"]["eventURL"].as_str(), Some("sydney-fair"));

    server.get("/events/url/sydney-fair").await.assert_status_ok();
}

#[tokio::test]
async fn delete_event_then_404() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    let created = create_event(&server, "london-fair").await;
    let id = created["event"]["_id"]["$oid"].as_str().unwrap().to_string();

    let response = server.delete(&format!("/events/{id}")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"].as_str(), Some("Event deleted successfully"));

    server.get(&format!("/events/{id}")).await.assert_status_not_found();
    server.delete(&format!("/events/{id}")).await.assert_status_not_found();
}
