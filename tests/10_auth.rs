mod common;

use anyhow::Result;
use chrono::Duration;
use reqwest::StatusCode;
use serde_json::Value;

use todo_api::auth::TokenService;
use todo_api::database::models::User;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = &server.client;

    let requests = [
        client.get(server.url("/user")),
        client.get(server.url("/user/todo")),
        client.put(server.url("/user")).json(&serde_json::json!({ "username": "x" })),
        client.delete(server.url("/user")),
        client.post(server.url("/todo")).json(&serde_json::json!({ "text": "x" })),
        client.delete(server.url("/todo/00000000-0000-0000-0000-000000000000")),
    ];

    for request in requests {
        let res = request.send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body = res.json::<Value>().await?;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn public_routes_do_not_require_token() -> Result<()> {
    let server = common::spawn_server().await?;

    for path in ["/users", "/todo"] {
        let res = server.client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "GET {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn non_bearer_schemes_are_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let (_, token) = server.sign_up("alice").await?;

    for header in [format!("Basic {}", token), token.clone(), "Bearer ".to_string()] {
        let res = server
            .client
            .get(server.url("/user"))
            .header("Authorization", header)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
    Ok(())
}

#[tokio::test]
async fn tampered_token_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let (_, token) = server.sign_up("alice").await?;

    let (head, sig) = token.rsplit_once('.').expect("three-part token");
    let replacement = if sig.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{}.{}{}", head, replacement, &sig[1..]);

    let res = server.client.get(server.url("/user")).bearer_auth(&tampered).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.get(server.url("/user")).bearer_auth("garbage").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let user: User = serde_json::from_value(server.register("alice").await?)?;

    // Same secret, lifetime already elapsed at issue time
    let tokens = TokenService::new(server.config.security.jwt_secret.as_bytes(), Duration::seconds(-60))?;
    let expired = tokens.issue(&user)?.token;

    let res = server.client.get(server.url("/user")).bearer_auth(&expired).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<Value>().await?;
    assert!(body["error"].as_str().unwrap_or_default().contains("expired"), "{}", body);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let user: User = serde_json::from_value(server.register("alice").await?)?;

    let forger = TokenService::new(b"not-the-server-secret", Duration::hours(1))?;
    let forged = forger.issue(&user)?.token;

    let res = server.client.get(server.url("/user")).bearer_auth(&forged).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let (_, token) = server.sign_up("alice").await?;

    let res = server.client.delete(server.url("/user")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.client.get(server.url("/user")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unsupported_method_on_shared_path_is_not_allowed() -> Result<()> {
    let server = common::spawn_server().await?;

    for path in ["/todo", "/user", "/users"] {
        let res = server.client.patch(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "PATCH {}", path);
    }

    let res = server.client.put(server.url("/todo")).send().await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}
