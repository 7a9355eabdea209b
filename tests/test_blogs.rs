mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn create_blog_returns_created_document() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    env.create_category(&server, "Visas", "visas").await;
    let response = env.create_blog(&server, "student-visa-basics", "visas").await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"].as_str(), Some("Blog created successfully"));
    assert_eq!(body["data"]["blogURL"].as_str(), Some("student-visa-basics"));
    assert_eq!(body["data"]["version"].as_str(), Some("1.0"));
    assert_eq!(body["data"]["versionHistory"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["status"].as_str(), Some("notPublished"));
}

#[tokio::test]
async fn create_blog_with_unknown_category_lists_missing_slugs() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    env.create_category(&server, "Visas", "visas").await;

    let response = server
        .post("/blogs")
        .json(&serde_json::json!({
            "title": "Student visas",
            "blogURL": "student-visas",
            "categories": ["visas", "ufo-sightings"],
            "img": "https://cdn.studylane.test/cover.jpg",
            "author": "Editorial Team",
            "summary": "A short summary.",
            "mainContent": "<p>Body copy.</p>"
        }))
        .await;
    response.assert_status_bad_request();

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("Unknown category slugs"));
    assert_eq!(body["details"][0].as_str(), Some("ufo-sightings"));
}

#[tokio::test]
async fn create_blog_duplicate_url_rejected() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    env.create_category(&server, "Visas", "visas").await;
    env.create_blog(&server, "student-visa-basics", "visas").await;

    let response = env.create_blog(&server, "student-visa-basics", "visas").await;
    response.assert_status_bad_request();

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("Blog URL already exists"));
}

#[tokio::test]
async fn update_bumps_version_and_appends_one_history_entry() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    env.create_category(&server, "Visas", "visas").await;
    env.create_blog(&server, "student-visa-basics", "visas").await;

    let response = server
        .patch("/blogs/student-visa-basics")
        .json(&serde_json::json!({ "summary": "Refreshed for the new intake." }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"].as_str(), Some("Blog updated successfully"));
    assert_eq!(body["updatedBlog"]["version"].as_str(), Some("2.0"));
    let history = body["updatedBlog"]["versionHistory"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["version"].as_str(), Some("1.0"));

    // The bump is persisted, not just echoed
    let stored: serde_json::Value = server.get("/blogs/student-visa-basics").await.json();
    assert_eq!(stored["blog"]["version"].as_str(), Some("2.0"));
    assert_eq!(
        stored["blog"]["summary"].as_str(),
        Some("Refreshed for the new intake.")
    );
}

#[tokio::test]
async fn list_filters_by_status_and_category_slug() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    env.create_category(&server, "Visas", "visas").await;
    env.create_category(&server, "Housing", "housing").await;

    server
        .post("/blogs")
        .json(&serde_json::json!({
            "title": "Published visa guide",
            "blogURL": "published-visa-guide",
            "categories": ["visas"],
            "img": "https://cdn.studylane.test/cover.jpg",
            "author": "Editorial Team",
            "summary": "A short summary.",
            "mainContent": "<p>Body copy.</p>",
            "status": "publish"
        }))
        .await;
    env.create_blog(&server, "draft-housing-guide", "housing").await;

    let response = server
        .get("/blogs")
        .add_query_param("status", "publish")
        .add_query_param("category", "visas")
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["pageInfo"]["total"].as_u64(), Some(1));
    assert_eq!(
        body["items"][0]["blog"]["blogURL"].as_str(),
        Some("published-visa-guide")
    );

    // Unknown category slugs are a 404, not an empty page
    let response = server
        .get("/blogs")
        .add_query_param("category", "ufo-sightings")
        .await;
    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("Category not found"));
}

#[tokio::test]
async fn per_page_all_returns_everything_in_one_page() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    env.create_category(&server, "Visas", "visas").await;
    for i in 1..=3 {
        env.create_blog(&server, &format!("visa-guide-{i}"), "visas").await;
    }

    let response = server
        .get("/blogs")
        .add_query_param("perPage", "all")
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
    assert_eq!(body["pageInfo"]["mode"].as_str(), Some("all"));
    assert_eq!(body["pageInfo"]["totalPages"].as_u64(), Some(1));
    assert_eq!(body["pageInfo"]["hasNext"].as_bool(), Some(false));
    assert_eq!(body["pageInfo"]["hasPrev"].as_bool(), Some(false));
}

#[tokio::test]
async fn blog_detail_carries_slim_ancestor_chain() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    env.create_category(&server, "Visas", "visas").await;
    let root: serde_json::Value = env
        .create_blog(&server, "series-root", "visas")
        .await
        .json();
    let root_id = root["data"]["_id"]["$oid"].as_str().unwrap().to_string();

    server
        .post("/blogs")
        .json(&serde_json::json!({
            "title": "Series part one",
            "blogURL": "series-part-1",
            "categories": ["visas"],
            "img": "https://cdn.studylane.test/cover.jpg",
            "author": "Editorial Team",
            "summary": "A short summary.",
            "mainContent": "<p>Body copy.</p>",
            "parentBlog": root_id
        }))
        .await;

    let body: serde_json::Value = server.get("/blogs/series-part-1").await.json();
    let ancestors = body["ancestors"].as_array().unwrap();
    assert_eq!(ancestors.len(), 1);
    assert_eq!(ancestors[0]["blogURL"].as_str(), Some("series-root"));
    assert_eq!(ancestors[0]["title"].as_str(), Some("Post series-root"));
    // Slim references only
    assert!(ancestors[0].get("mainContent").is_none());
}

#[tokio::test]
async fn delete_blocked_by_children_then_trash_flow() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    env.create_category(&server, "Visas", "visas").await;
    let root: serde_json::Value = env
        .create_blog(&server, "series-root", "visas")
        .await
        .json();
    let root_id = root["data"]["_id"]["$oid"].as_str().unwrap().to_string();

    server
        .post("/blogs")
        .json(&serde_json::json!({
            "title": "Series part one",
            "blogURL": "series-part-1",
            "categories": ["visas"],
            "img": "https://cdn.studylane.test/cover.jpg",
            "author": "Editorial Team",
            "summary": "A short summary.",
            "mainContent": "<p>Body copy.</p>",
            "parentBlog": root_id
        }))
        .await;

    let response = server.delete("/blogs/series-root").await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["details"][0].as_str(), Some("series-part-1"));

    // Removing the child unblocks the parent; both end up in the trash
    server.delete("/blogs/series-part-1").await.assert_status_ok();
    server.delete("/blogs/series-root").await.assert_status_ok();

    let trash: serde_json::Value = server.get("/blogs/trash").await.json();
    assert_eq!(trash["count"].as_u64(), Some(2));

    server.get("/blogs/series-root").await.assert_status_not_found();
}

#[tokio::test]
async fn check_url_reports_format_and_availability() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    env.create_category(&server, "Visas", "visas").await;
    env.create_blog(&server, "student-visa-basics", "visas").await;

    let response = server.get("/blogs/check-url/student-visa-basics").await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["isUnique"].as_bool(), Some(false));

    let response = server.get("/blogs/check-url/fresh-slug").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["isUnique"].as_bool(), Some(true));

    let response = server.get("/blogs/check-url/Not-A-Slug").await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid blog URL format"));
}

#[tokio::test]
async fn latest_clamps_bad_limits() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    env.create_category(&server, "Visas", "visas").await;
    for i in 1..=3 {
        env.create_blog(&server, &format!("visa-guide-{i}"), "visas").await;
    }

    let body: serde_json::Value = server.get("/blogs/latest/2").await.json();
    assert_eq!(body["count"].as_u64(), Some(2));

    // Unparseable limits fall back to ten
    let body: serde_json::Value = server.get("/blogs/latest/abc").await.json();
    assert_eq!(body["count"].as_u64(), Some(3));
}
