mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn contact_round_trip_with_event_join() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_contacts"));

    let res = api
        .post("/api/events", &json!({ "name": "Expo", "location": "Hall 4" }))
        .await?;
    let event_id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_i64()
        .unwrap();

    let email = format!("{}@techcorp.example", common::unique("ada"));
    let res = api
        .post(
            "/api/contacts",
            &json!({
                "fullName": "Ada Lovelace",
                "company": "Tech Corp",
                "title": "Engineer",
                "email": email,
                "eventId": event_id,
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<serde_json::Value>().await?;
    let contact = &created["data"];
    assert_eq!(contact["fullName"], "Ada Lovelace");
    // Create returns the joined shape, same as get-by-id
    assert_eq!(contact["event"]["id"].as_i64(), Some(event_id));
    assert_eq!(contact["event"]["name"], "Expo");
    let id = contact["id"].as_i64().unwrap();

    let res = api.get(&format!("/api/contacts/{id}")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = res.json::<serde_json::Value>().await?;
    assert_eq!(fetched["data"], *contact);

    // Partial update keeps everything not mentioned
    let res = api
        .put(&format!("/api/contacts/{id}"), &json!({ "title": "CTO" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<serde_json::Value>().await?;
    assert_eq!(updated["data"]["title"], "CTO");
    assert_eq!(updated["data"]["fullName"], "Ada Lovelace");
    assert_eq!(updated["data"]["company"], "Tech Corp");
    assert_eq!(updated["data"]["event"]["id"].as_i64(), Some(event_id));
    Ok(())
}

#[tokio::test]
async fn contact_email_is_unique_per_scope() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_contacts_uq"));
    let email = format!("{}@dup.example", common::unique("dup"));

    let res = api
        .post("/api/contacts", &json!({ "fullName": "First", "email": email }))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = api
        .post("/api/contacts", &json!({ "fullName": "Second", "email": email }))
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "A contact with this email already exists");
    Ok(())
}

#[tokio::test]
async fn search_is_case_insensitive_substring() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_search"));

    let res = api
        .post(
            "/api/contacts",
            &json!({ "fullName": "Grace Hopper", "company": "Tech Corp" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_i64()
        .unwrap();
    let res = api
        .post(
            "/api/contacts",
            &json!({ "fullName": "Unrelated Person", "company": "Bakery" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    for query in ["tech", "Corp", "TECH CORP", "grace"] {
        let res = api.get(&format!("/api/contacts/search?q={query}")).await?;
        assert_eq!(res.status(), StatusCode::OK, "query {query}");
        let body = res.json::<serde_json::Value>().await?;
        let hits = body["data"].as_array().unwrap();
        assert!(
            hits.iter().any(|c| c["id"].as_i64() == Some(id)),
            "query {query} missed the contact"
        );
        assert!(
            hits.iter().all(|c| c["fullName"] != "Unrelated Person"),
            "query {query} matched the wrong contact"
        );
    }

    // Missing or empty q short-circuits
    let res = api.get("/api/contacts/search?q=").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Search query is required");

    let res = api.get("/api/contacts/search").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn contacts_are_invisible_across_identities() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let alice = common::Api::new(server, &common::unique("user_alice_ct"));
    let bob = common::Api::new(server, &common::unique("user_bob_ct"));

    let res = alice
        .post("/api/contacts", &json!({ "fullName": "Hidden Friend" }))
        .await?;
    let id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_i64()
        .unwrap();

    let res = bob.get(&format!("/api/contacts/{id}")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Contact not found");

    let res = bob.get("/api/contacts/search?q=Hidden").await?;
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["data"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn contact_refs_must_be_owned() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let alice = common::Api::new(server, &common::unique("user_alice_ref"));
    let bob = common::Api::new(server, &common::unique("user_bob_ref"));

    let res = alice
        .post("/api/events", &json!({ "name": "Alice Only" }))
        .await?;
    let event_id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_i64()
        .unwrap();

    // Bob cannot attach his contact to Alice's event
    let res = bob
        .post(
            "/api/contacts",
            &json!({ "fullName": "Chancer", "eventId": event_id }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["details"][0]["field"], "eventId");
    Ok(())
}

#[tokio::test]
async fn verifying_a_contact_stamps_the_reviewer() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let user_id = common::unique("user_verify_ct");
    let api = common::Api::new(server, &user_id);

    let res = api
        .post("/api/contacts", &json!({ "fullName": "To Review" }))
        .await?;
    let id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_i64()
        .unwrap();

    let res = api
        .post(&format!("/api/contacts/{id}/verify"), &json!({}))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["isVerified"], true);
    assert_eq!(body["data"]["verifiedBy"], user_id.as_str());
    assert!(body["data"]["verifiedAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn deleting_a_contact_removes_it_and_its_drafts() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_delete_ct"));

    let res = api
        .post("/api/contacts", &json!({ "fullName": "Short Lived" }))
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
                "body": "Nice to meet you",
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let draft_id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_i64()
        .unwrap();

    let res = api.delete(&format!("/api/contacts/{contact_id}")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Contact deleted successfully");

    // The draft went with the contact
    let res = api.get(&format!("/api/emails/drafts/{draft_id}")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
