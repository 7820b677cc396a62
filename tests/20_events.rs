mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn event_crud_round_trip() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_events"));

    // Create
    let res = api
        .post(
            "/api/events",
            &json!({
                "name": "Tech Conference 2024",
                "description": "Annual industry meetup",
                "location": "Convention Center",
                "startDate": "2024-03-15",
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<serde_json::Value>().await?;
    let event = &created["data"];
    assert_eq!(event["name"], "Tech Conference 2024");
    assert_eq!(event["location"], "Convention Center");
    assert_eq!(event["startDate"], "2024-03-15");
    let id = event["id"].as_i64().unwrap();

    // Fetch-by-id returns a value deep-equal to the create response
    let res = api.get(&format!("/api/events/{id}")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = res.json::<serde_json::Value>().await?;
    assert_eq!(fetched["data"], *event);

    // Partial update retains omitted fields and bumps updatedAt
    let res = api
        .put(&format!("/api/events/{id}"), &json!({ "location": "Moved Venue" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<serde_json::Value>().await?;
    assert_eq!(updated["data"]["name"], "Tech Conference 2024");
    assert_eq!(updated["data"]["description"], "Annual industry meetup");
    assert_eq!(updated["data"]["location"], "Moved Venue");
    assert_ne!(updated["data"]["updatedAt"], event["updatedAt"]);

    // Delete, then the id reads as gone
    let res = api.delete(&format!("/api/events/{id}")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Event deleted successfully");

    let res = api.get(&format!("/api/events/{id}")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Event not found");
    Ok(())
}

#[tokio::test]
async fn event_validation_reports_every_field() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_events_val"));

    let res = api
        .post(
            "/api/events",
            &json!({ "startDate": "not-a-date", "bogus": true }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    let details = body["details"].as_array().unwrap();
    // missing name, malformed startDate, unknown field
    assert_eq!(details.len(), 3);

    // endDate before startDate is rejected
    let res = api
        .post(
            "/api/events",
            &json!({
                "name": "Expo",
                "startDate": "2024-03-15",
                "endDate": "2024-03-10",
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Ownership fields are never accepted from the body
    let res = api
        .post("/api/events", &json!({ "name": "Expo", "userId": "user_x" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_event_id_is_a_bad_request() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_events_badid"));

    let res = api.get("/api/events/abc").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Invalid event id");
    Ok(())
}

#[tokio::test]
async fn events_are_invisible_across_identities() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let alice = common::Api::new(server, &common::unique("user_alice_ev"));
    let bob = common::Api::new(server, &common::unique("user_bob_ev"));

    let res = alice
        .post("/api/events", &json!({ "name": "Private Salon" }))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<serde_json::Value>().await?["data"]["id"]
        .as_i64()
        .unwrap();

    // Foreign ids behave exactly like nonexistent ids
    let res = bob.get(&format!("/api/events/{id}")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Event not found");

    let res = bob
        .put(&format!("/api/events/{id}"), &json!({ "name": "Hijacked" }))
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = bob.delete(&format!("/api/events/{id}")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = bob.get("/api/events").await?;
    let body = res.json::<serde_json::Value>().await?;
    let listed = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["id"].as_i64() == Some(id));
    assert!(!listed);

    // Alice still owns it
    let res = alice.get(&format!("/api/events/{id}")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn events_list_orders_by_start_date_descending() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let api = common::Api::new(server, &common::unique("user_events_order"));

    for (name, date) in [
        ("Earlier", Some("2024-01-10")),
        ("Later", Some("2024-06-01")),
        ("Undated", None),
    ] {
        let mut body = json!({ "name": name });
        if let Some(date) = date {
            body["startDate"] = json!(date);
        }
        let res = api.post("/api/events", &body).await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = api.get("/api/events").await?;
    let body = res.json::<serde_json::Value>().await?;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Later", "Earlier", "Undated"]);
    Ok(())
}
