mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn template_names_are_unique_per_scope() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_templates"));
    let name = common::unique("follow-up");

    let res = api
        .post(
            "/api/emails/templates",
            &json!({
                "name": name,
                "subject": "Great meeting you",
                "body": "Hi {{firstName}}, it was great to meet at {{event}}.",
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let template = res.json::<serde_json::Value>().await?;
    assert_eq!(template["data"]["isDefault"], false);
    let id = template["data"]["id"].as_i64().unwrap();

    // Same name again in the same scope is a conflict
    let res = api
        .post(
            "/api/emails/templates",
            &json!({ "name": name, "subject": "x", "body": "y" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "An email template with this name already exists");

    // Partial update keeps the body
    let res = api
        .put(
            &format!("/api/emails/templates/{id}"),
            &json!({ "subject": "Following up" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["subject"], "Following up");
    assert!(body["data"]["body"].as_str().unwrap().contains("{{firstName}}"));

    let res = api.delete(&format!("/api/emails/templates/{id}")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn draft_lifecycle_walks_the_status_machine() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_drafts"));

    let res = api
        .post("/api/contacts", &json!({ "fullName": "Recipient" }))
        .await?;
    let contact_id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_i64()
        .unwrap();

    let res = api
        .post(
            "/api/emails/drafts",
            &json!({
                "contactId": contact_id,
                "subject": "Hello",
                "body": "Nice to meet you at the expo.",
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let draft = res.json::<serde_json::Value>().await?;
    assert_eq!(draft["data"]["status"], "draft");
    // Detailed shape embeds the recipient
    assert_eq!(draft["data"]["contact"]["id"].as_i64(), Some(contact_id));
    let id = draft["data"]["id"].as_i64().unwrap();

    // draft -> sent directly is not a legal move
    let res = api
        .post(
            &format!("/api/emails/drafts/{id}/status"),
            &json!({ "status": "sent" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // draft -> sent_to_gmail -> sent, stamping timestamps on the way
    let res = api
        .post(
            &format!("/api/emails/drafts/{id}/status"),
            &json!({ "status": "sent_to_gmail" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "sent_to_gmail");
    assert!(body["data"]["sentToGmailAt"].is_string());

    // Content is frozen once the draft has left `draft`
    let res = api
        .put(
            &format!("/api/emails/drafts/{id}"),
            &json!({ "subject": "Too late" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = api
        .post(
            &format!("/api/emails/drafts/{id}/status"),
            &json!({ "status": "sent" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "sent");
    assert!(body["data"]["sentAt"].is_string());

    // sent is terminal
    let res = api
        .post(
            &format!("/api/emails/drafts/{id}/status"),
            &json!({ "status": "failed" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn draft_requires_an_owned_contact() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let alice = common::Api::new(server, &common::unique("user_alice_dr"));
    let bob = common::Api::new(server, &common::unique("user_bob_dr"));

    let res = alice
        .post("/api/contacts", &json!({ "fullName": "Alice Contact" }))
        .await?;
    let contact_id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_i64()
        .unwrap();

    let res = bob
        .post(
            "/api/emails/drafts",
            &json!({ "contactId": contact_id, "subject": "s", "body": "b" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["details"][0]["field"], "contactId");
    Ok(())
}

#[tokio::test]
async fn gmail_connection_is_one_per_user_and_never_leaks_tokens() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_gmail"));

    // Nothing connected yet
    let res = api.get("/api/emails/gmail").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = api
        .post(
            "/api/emails/gmail",
            &json!({
                "email": "me@gmail.example",
                "accessToken": "ya29.secret-access",
                "refreshToken": "1//refresh-secret",
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["email"], "me@gmail.example");
    assert_eq!(body["data"]["isActive"], true);
    assert!(body["data"].get("accessToken").is_none());
    assert!(body["data"].get("refreshToken").is_none());
    let text = body.to_string();
    assert!(!text.contains("ya29.secret-access"));
    assert!(!text.contains("1//refresh-secret"));

    // Reconnecting replaces, not duplicates
    let res = api
        .post(
            "/api/emails/gmail",
            &json!({ "email": "new@gmail.example", "accessToken": "ya29.other" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["email"], "new@gmail.example");

    let res = api.delete("/api/emails/gmail").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = api.get("/api/emails/gmail").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
