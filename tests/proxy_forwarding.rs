//! End-to-end forwarding through the proxy routes.

mod common;

use bff_gateway::config::RouteConfig;
use common::{MockResponse, RecordedRequest};
use reqwest::StatusCode;

#[tokio::test]
async fn api_prefix_is_stripped_and_query_kept() {
    let backend = common::start_fixed_backend("mentors").await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    let res = common::client()
        .get(gateway.url("/api/mentors/12?tab=reviews&page=2"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "mentors");

    let seen = backend.last_request();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.target, "/mentors/12?tab=reviews&page=2");
}

#[tokio::test]
async fn bare_prefix_maps_to_backend_root() {
    let backend = common::start_fixed_backend("root").await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    for path in ["/api", "/api/"] {
        let res = common::client().get(gateway.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(backend.last_request().target, "/");
    }
}

#[tokio::test]
async fn forwarding_headers_are_injected() {
    let backend = common::start_fixed_backend("ok").await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    common::client()
        .get(gateway.url("/api/profile"))
        .header("host", "frontend.example.com")
        .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
        .header("authorization", "Bearer t0ken")
        .send()
        .await
        .unwrap();

    let seen = backend.last_request();
    assert_eq!(seen.header("x-forwarded-host"), Some("frontend.example.com"));
    assert_eq!(seen.header("x-forwarded-proto"), Some("http"));
    assert_eq!(seen.header("x-real-ip"), Some("198.51.100.4"));
    assert_eq!(seen.header("authorization"), Some("Bearer t0ken"));
    assert_eq!(seen.header("host"), Some(backend.addr.to_string().as_str()));
}

#[tokio::test]
async fn real_ip_falls_back_to_peer_address() {
    let backend = common::start_fixed_backend("ok").await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    common::client()
        .get(gateway.url("/api/profile"))
        .send()
        .await
        .unwrap();

    assert_eq!(backend.last_request().header("x-real-ip"), Some("127.0.0.1"));
}

#[tokio::test]
async fn set_cookie_is_bound_to_the_gateway_host() {
    let backend = common::start_backend(|_| {
        MockResponse::ok("logged in")
            .with_header("Set-Cookie", "token=abc; Domain=backend.internal; SameSite=None")
            .with_header("Set-Cookie", "refresh=r1; Path=/; HttpOnly")
    })
    .await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    let res = common::client()
        .post(gateway.url("/api/login"))
        .header("host", "frontend.example.com")
        .send()
        .await
        .unwrap();

    let cookies: Vec<_> = res
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(
        cookies,
        vec![
            "token=abc; Domain=frontend.example.com; SameSite=None; Secure".to_string(),
            "refresh=r1; Path=/; HttpOnly; Secure".to_string(),
        ]
    );
}

#[tokio::test]
async fn json_body_is_reserialized() {
    let backend = common::start_fixed_backend("{}").await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    let res = common::client()
        .post(gateway.url("/api/posts"))
        .header("content-type", "application/json; charset=utf-8")
        .body("{ \"title\" : \"hello\",\n  \"tags\": [ \"a\", \"b\" ] }")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let seen = backend.last_request();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.body_text(), r#"{"title":"hello","tags":["a","b"]}"#);
    assert_eq!(seen.header("content-type"), Some("application/json"));
    assert_eq!(seen.header("content-length"), Some("34"));
}

#[tokio::test]
async fn malformed_json_is_rejected_before_forwarding() {
    let backend = common::start_fixed_backend("{}").await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    let res = common::client()
        .post(gateway.url("/api/posts"))
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn non_json_body_passes_through_unchanged() {
    let backend = common::start_fixed_backend("ok").await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    common::client()
        .put(gateway.url("/api/notes/3"))
        .header("content-type", "text/plain")
        .body("  keep   spacing  ")
        .send()
        .await
        .unwrap();

    let seen = backend.last_request();
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.body_text(), "  keep   spacing  ");
}

#[tokio::test]
async fn api_route_follows_redirects() {
    let backend = common::start_backend(|req: &RecordedRequest| match req.target.as_str() {
        "/old" => MockResponse::redirect(302, "/new?from=old"),
        "/new?from=old" => MockResponse::ok("moved here"),
        _ => MockResponse::status(404),
    })
    .await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    let res = common::client().get(gateway.url("/api/old")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "moved here");
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn post_becomes_get_after_302_but_survives_307() {
    let backend = common::start_backend(|req: &RecordedRequest| match req.target.as_str() {
        "/found" => MockResponse::redirect(302, "/landing"),
        "/temporary" => MockResponse::redirect(307, "/landing"),
        _ => MockResponse::ok(req.method.clone()),
    })
    .await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;
    let client = common::client();

    let res = client
        .post(gateway.url("/api/found"))
        .header("content-type", "text/plain")
        .body("payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "GET");
    assert!(backend.last_request().body.is_empty());

    let res = client
        .post(gateway.url("/api/temporary"))
        .header("content-type", "text/plain")
        .body("payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "POST");
    assert_eq!(backend.last_request().body_text(), "payload");
}

#[tokio::test]
async fn redirect_loop_is_a_proxy_error() {
    let backend = common::start_backend(|_| MockResponse::redirect(302, "/again")).await;
    let mut config = common::config_for(&backend.url());
    config.limits.max_redirects = 3;
    let gateway = common::start_gateway(config).await;

    let res = common::client().get(gateway.url("/api/again")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), "Proxy error");
    assert_eq!(backend.requests().len(), 4);
}

#[tokio::test]
async fn named_route_relays_redirects() {
    let backend = common::start_backend(|req: &RecordedRequest| match req.target.as_str() {
        "/auth/logout" => MockResponse::redirect(302, "/login"),
        _ => MockResponse::ok("unexpected"),
    })
    .await;
    let mut config = common::config_for(&backend.url());
    config.routes.push(RouteConfig {
        name: "auth".into(),
        path: "/auth".into(),
        target: format!("{}/auth", backend.url()),
        follow_redirects: false,
    });
    let gateway = common::start_gateway(config).await;

    let res = common::client().get(gateway.url("/auth/logout")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/login");
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn longest_prefix_wins() {
    let api = common::start_fixed_backend("api").await;
    let uploads = common::start_fixed_backend("uploads").await;

    let mut config = common::config_for(&api.url());
    config.routes.push(RouteConfig {
        name: "uploads".into(),
        path: "/api/uploads".into(),
        target: uploads.url(),
        follow_redirects: false,
    });
    let gateway = common::start_gateway(config).await;
    let client = common::client();

    let res = client.get(gateway.url("/api/uploads/a.png")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "uploads");
    assert_eq!(uploads.last_request().target, "/a.png");

    let res = client.get(gateway.url("/api/uploadsx")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "api");
    assert_eq!(api.last_request().target, "/uploadsx");
}

#[tokio::test]
async fn upstream_status_and_headers_pass_through() {
    let backend = common::start_backend(|_| {
        MockResponse::status(422)
            .with_header("Content-Type", "application/json")
            .with_header("X-Trace", "abc123")
            .with_body(r#"{"error":"invalid"}"#)
    })
    .await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;

    let res = common::client().get(gateway.url("/api/x")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.headers()["x-trace"], "abc123");
    assert!(res.headers().get("connection").is_none());
    assert_eq!(res.text().await.unwrap(), r#"{"error":"invalid"}"#);
}

#[tokio::test]
async fn repeated_gets_are_forwarded_identically() {
    let backend = common::start_fixed_backend("same").await;
    let gateway = common::start_gateway(common::config_for(&backend.url())).await;
    let client = common::client();

    for _ in 0..3 {
        let res = client.get(gateway.url("/api/feed?page=1")).send().await.unwrap();
        assert_eq!(res.text().await.unwrap(), "same");
    }

    let targets: Vec<_> = backend.requests().into_iter().map(|r| r.target).collect();
    assert_eq!(targets, vec!["/feed?page=1"; 3]);
}
