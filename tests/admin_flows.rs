mod common;

use axum::http::{header, Method, StatusCode};
use serde_json::json;

use common::{entry, record_ids, TestApp, ADMIN_PASSWORD, USER_PASSWORD};

#[tokio::test]
async fn admin_user_crud_round() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let op_id = app
        .create_user(&admin, "op", "GATE_OPERATOR", &["CP-1"], None)
        .await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/v1/admin/users/{op_id}"),
            Some(&admin),
            Some(json!({"allowed_checkpoints": ["CP-1", "CP-2"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed_checkpoints"], json!(["CP-1", "CP-2"]));
    assert!(body.get("password_hash").is_none());

    let (status, body) = app.get("/api/v1/admin/users", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/admin/users/{op_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/admin/users/{op_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_user(&admin, "op", "GATE_OPERATOR", &[], None).await;

    let (status, _) = app
        .post(
            "/api/v1/admin/users",
            &admin,
            json!({"username": "op", "password": USER_PASSWORD, "role": "SUPERVISOR"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn weak_password_on_create_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/api/v1/admin/users",
            &admin,
            json!({"username": "weakling", "password": "abc", "role": "GATE_OPERATOR"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn admin_cannot_delete_itself() {
    let app = TestApp::new().await;
    let pair = app.login_pair("admin", ADMIN_PASSWORD).await;
    let admin = pair["access_token"].as_str().unwrap();
    let admin_id = pair["user"]["user_id"].as_str().unwrap();

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/v1/admin/users/{admin_id}"), Some(admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot delete your own account");
}

#[tokio::test]
async fn deleting_supervisor_detaches_its_operators() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let sup_id = app
        .create_user(&admin, "sup", "SUPERVISOR", &[], None)
        .await;
    let east_id = app
        .create_user(&admin, "op_east", "GATE_OPERATOR", &["CP-E"], Some(&sup_id))
        .await;

    let (_, users) = app.get("/api/v1/admin/users", &admin).await;
    let sup = users["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["user_id"] == sup_id.as_str())
        .unwrap()
        .clone();
    assert_eq!(sup["managed_operators"], json!([east_id]));

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/admin/users/{sup_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, users) = app.get("/api/v1/admin/users", &admin).await;
    let east = users["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["user_id"] == east_id.as_str())
        .unwrap()
        .clone();
    assert!(east["supervisor_id"].is_null());
}

#[tokio::test]
async fn supervisor_link_must_point_at_a_supervisor() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let other_op = app
        .create_user(&admin, "other", "GATE_OPERATOR", &[], None)
        .await;

    let (status, _) = app
        .post(
            "/api/v1/admin/users",
            &admin,
            json!({
                "username": "op",
                "password": USER_PASSWORD,
                "role": "GATE_OPERATOR",
                "supervisor_id": other_op,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkpoint_create_list_and_edit() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_checkpoint(&admin, "CP-1").await;

    let (status, _) = app
        .post(
            "/api/v1/admin/checkpoints",
            &admin,
            json!({"checkpoint_id": "CP-1", "name": "Again"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/v1/admin/checkpoints/CP-1",
            Some(&admin),
            Some(json!({"location": "North perimeter"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "North perimeter");
    assert_eq!(body["name"], "Gate CP-1");

    let (_, body) = app.get("/api/v1/admin/checkpoints", &admin).await;
    assert_eq!(body["count"], 1);

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/v1/admin/checkpoints/CP-404",
            Some(&admin),
            Some(json!({"name": "Ghost"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn supervisor_cannot_reach_admin_routes() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_user(&admin, "sup", "SUPERVISOR", &[], None).await;
    let sup = app.login("sup", USER_PASSWORD).await;

    let (status, body) = app.get("/api/v1/admin/users", &sup).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");
}

#[tokio::test]
async fn supervisor_entries_and_export() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let sup_id = app
        .create_user(&admin, "sup", "SUPERVISOR", &[], None)
        .await;
    let east_id = app
        .create_user(&admin, "op_east", "GATE_OPERATOR", &["CP-E", "CP-N"], Some(&sup_id))
        .await;
    let west_id = app
        .create_user(&admin, "op_west", "GATE_OPERATOR", &["CP-W"], None)
        .await;

    let east = app.login("op_east", USER_PASSWORD).await;
    let west = app.login("op_west", USER_PASSWORD).await;
    app.post(
        "/api/v1/sync/push",
        &east,
        json!({"entries": [entry("e1", "CP-E", &east_id), entry("e2", "CP-N", &east_id)]}),
    )
    .await;
    app.post("/api/v1/sync/push", &west, json!({"entries": [entry("w1", "CP-W", &west_id)]}))
        .await;

    let sup = app.login("sup", USER_PASSWORD).await;
    let (status, body) = app.get("/api/v1/supervisor/entries", &sup).await;
    assert_eq!(status, StatusCode::OK);
    let mut ids = record_ids(&body);
    ids.sort();
    assert_eq!(ids, vec!["e1", "e2"]);

    let (_, body) = app
        .get("/api/v1/supervisor/entries?checkpoint_id=CP-N", &sup)
        .await;
    assert_eq!(record_ids(&body), vec!["e2"]);

    let raw = app
        .raw(Method::GET, "/api/v1/supervisor/export", Some(&sup), None)
        .await;
    assert_eq!(raw.status, StatusCode::OK);
    assert!(raw.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let disposition = raw.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"gatekeeper_entries_"));
    assert!(disposition.ends_with(".csv\""));

    let csv = String::from_utf8(raw.body.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Record ID,Entry Type,Checkpoint ID,Logging User ID,Created At,Client Timestamp,Status,Payload"
    );
    assert_eq!(lines.count(), 2);
    assert!(!csv.contains("w1"));

    let (status, _) = app.get("/api/v1/supervisor/entries", &west).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn weak_reset_password_changes_nothing() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let sup_id = app
        .create_user(&admin, "sup", "SUPERVISOR", &[], None)
        .await;
    let op_id = app
        .create_user(&admin, "op", "GATE_OPERATOR", &[], Some(&sup_id))
        .await;
    let sup = app.login("sup", USER_PASSWORD).await;

    let (status, _) = app
        .post(
            "/api/v1/supervisor/reset-password",
            &sup,
            json!({"user_id": op_id, "new_password": "abc"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // old password still works
    app.login("op", USER_PASSWORD).await;
}

#[tokio::test]
async fn supervisor_resets_only_managed_operators() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let sup_id = app
        .create_user(&admin, "sup", "SUPERVISOR", &[], None)
        .await;
    let mine = app
        .create_user(&admin, "mine", "GATE_OPERATOR", &[], Some(&sup_id))
        .await;
    let theirs = app
        .create_user(&admin, "theirs", "GATE_OPERATOR", &[], None)
        .await;
    let sup = app.login("sup", USER_PASSWORD).await;

    let (status, body) = app
        .post(
            "/api/v1/supervisor/reset-password",
            &sup,
            json!({"user_id": mine, "new_password": "n3wPassword"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successfully");
    app.login("mine", "n3wPassword").await;

    let (status, _) = app
        .post(
            "/api/v1/supervisor/reset-password",
            &sup,
            json!({"user_id": theirs, "new_password": "n3wPassword"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
