mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use abroad_admission_api::database::Store;
use common::{Part, TestApp};

fn profile() -> Value {
    json!({
        "full_name": "Rafiq Islam",
        "phone": "+8801912345678",
        "whatsapp": "+8801912345678",
        "address": "House 12, Road 4, Dhanmondi",
        "occupation": "Education consultant",
        "experience": true,
        "exp_description": "Five years placing students in the UK",
        "initial_refffer": "Facebook",
        "no_of_deal": 40,
        "student_country": "Bangladesh",
        "student_destination_country": "United Kingdom",
    })
}

fn scan(file_name: &str) -> Part<'_> {
    Part::File {
        name: "nid_passport_file",
        file_name,
        content_type: "application/pdf",
        data: b"%PDF-1.4 nid",
    }
}

#[tokio::test]
async fn admins_approve_agents() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;
    let pending = app.user("pending", false, false).await?;
    let other_admin = app.user("root2", true, true).await?;

    let (status, body) = app.get("/users/agents", Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    let agents = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0]["username"], "pending");

    let (status, _) = app.get(&format!("/users/agents/{}", other_admin.id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/users/agents/{}", pending.id);
    let (status, body) = app.patch(&uri, Some(&admin), json!({ "is_verified": true })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_verified"], true);

    let (status, body) = app.patch(&uri, Some(&admin), json!({ "is_verified": false })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_verified"], false);
    Ok(())
}

#[tokio::test]
async fn agents_cannot_manage_accounts() -> Result<()> {
    let app = TestApp::new();
    let (agent, token) = app.agent("rafi").await?;

    let (status, _) = app.get("/users/agents", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .patch(&format!("/users/agents/{}", agent.id), Some(&token), json!({ "is_verified": true }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(
            "/users/admin/register",
            Some(&token),
            json!({ "username": "sneaky", "email": "sneaky@example.com", "password": "pw" }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admins_register_and_remove_other_admins() -> Result<()> {
    let app = TestApp::new();
    let root = app.user("admin", true, true).await?;
    let token = app.token_for(&root)?;

    let (status, body) = app
        .post(
            "/users/admin/register",
            Some(&token),
            json!({ "username": "deputy", "email": "deputy@example.com", "password": "pw-deputy" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["is_admin"], true);
    let deputy = body["data"]["id"].as_i64().unwrap_or_default();

    let (status, body) = app.delete(&format!("/users/admin/{}", root.id), Some(&token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete yourself");

    let (status, _) = app.delete(&format!("/users/admin/{}", deputy), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&format!("/users/admin/{}", deputy), Some(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_removes_their_profile() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;
    let (agent, token) = app.agent("rafi").await?;
    let uri = format!("/users/{}/profile", agent.id);
    let (status, _) = app.post(&uri, Some(&token), profile()).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.delete(&format!("/users/{}", agent.id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(app.store.get_user(agent.id).await?.is_none());
    assert!(app.store.get_profile(agent.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn agents_keep_their_own_profile() -> Result<()> {
    let app = TestApp::new();
    let (rafi, token) = app.agent("rafi").await?;
    let (mina, mina_token) = app.agent("mina").await?;
    let uri = format!("/users/{}/profile", rafi.id);

    let (status, body) = app.post(&uri, Some(&token), profile()).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user_id"], rafi.id);
    assert_eq!(body["data"]["initial_referrer"], "Facebook");
    assert_eq!(body["data"]["office"], false);

    let (status, body) = app.post(&uri, Some(&token), profile()).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Profile already exists");

    let (status, body) = app.patch(&uri, Some(&token), json!({ "office": true, "office_address": "Banani" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["office_address"], "Banani");
    assert_eq!(body["data"]["full_name"], "Rafiq Islam");

    let (status, body) = app.patch(&uri, Some(&token), json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No valid fields to update");

    // Reading is open to any signed-in user, writing is not
    let (status, _) = app.get(&uri, Some(&mina_token)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.patch(&uri, Some(&mina_token), json!({ "phone": "0" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(&format!("/users/{}/profile", mina.id), Some(&token), profile())
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&uri, Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let admin = app.admin_token().await?;
    let (status, _) = app.delete(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&uri, Some(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn profile_for_a_missing_user_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token().await?;

    let (status, _) = app.post("/users/999/profile", Some(&admin), profile()).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn profile_scan_is_replaced_and_cleared() -> Result<()> {
    let app = TestApp::new();
    let (agent, token) = app.agent("rafi").await?;
    app.post(&format!("/users/{}/profile", agent.id), Some(&token), profile())
        .await?;
    let uri = format!("/users/{}/profile/upload-file", agent.id);

    let (status, body) = app.multipart(&uri, Some(&token), &[scan("nid.pdf")]).await?;
    assert_eq!(status, StatusCode::OK);
    let first = body["data"]["nid_passport_file"].as_str().unwrap_or_default().to_string();
    assert!(first.starts_with("media/documents/nid_passport_"));
    assert!(app.media_root.join(first.trim_start_matches("media/")).exists());

    let (status, body) = app.multipart(&uri, Some(&token), &[scan("passport.pdf")]).await?;
    assert_eq!(status, StatusCode::OK);
    let second = body["data"]["nid_passport_file"].as_str().unwrap_or_default().to_string();
    assert_ne!(first, second);
    assert!(!app.media_root.join(first.trim_start_matches("media/")).exists());

    let (status, body) = app.delete(&uri, Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["nid_passport_file"].is_null());
    assert!(!app.media_root.join(second.trim_start_matches("media/")).exists());
    Ok(())
}

#[tokio::test]
async fn oversized_profile_scan_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let (agent, token) = app.agent("rafi").await?;
    app.post(&format!("/users/{}/profile", agent.id), Some(&token), profile())
        .await?;

    let big = vec![0u8; 4 * 1024 * 1024 + 1];
    let file = Part::File {
        name: "nid_passport_file",
        file_name: "scan.pdf",
        content_type: "application/pdf",
        data: &big,
    };
    let uri = format!("/users/{}/profile/upload-file", agent.id);
    let (status, body) = app.multipart(&uri, Some(&token), &[file]).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "File size must be less than 4MB");
    Ok(())
}
