mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "OK");
    Ok(())
}

#[tokio::test]
async fn root_banner_is_public() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let client = reqwest::Client::new();

    let res = client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["name"], "LinkUp API");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/events", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert!(body["error"].is_string());

    // A garbage token is just as unauthorized
    let res = client
        .get(format!("{}/api/events", server.base_url))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn profile_reflects_the_token_identity() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let user_id = common::unique("user_profile");
    let api = common::Api::new(server, &user_id);

    let res = api.get("/api/auth/profile").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["id"], user_id.as_str());
    assert_eq!(body["data"]["email"], format!("{user_id}@test.local"));
    Ok(())
}
