//! End-to-end admission pipeline tests: rate limiting and bot detection.

use gatekeeper::config::GatekeeperConfig;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;

mod common;

#[tokio::test]
async fn rate_limit_denies_after_capacity() {
    let mut config = GatekeeperConfig::default();
    config.rate_limit.max_requests = 3;
    let gk = common::spawn_gatekeeper(config).await;
    let client = common::browser_client();

    for _ in 0..3 {
        let res = client.get(gk.url("/rate-limit-test")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client.get(gk.url("/rate-limit-test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.text().await.unwrap(), "Rate limit exceeded\n");

    gk.shutdown.trigger();
}

#[tokio::test]
async fn saturating_one_client_never_denies_another() {
    let mut config = GatekeeperConfig::default();
    config.rate_limit.max_requests = 2;
    let gk = common::spawn_gatekeeper(config).await;
    let client = common::browser_client();

    for _ in 0..2 {
        let res = client
            .get(gk.url("/rate-limit-test"))
            .header("X-Forwarded-For", "10.0.0.1")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
    let res = client
        .get(gk.url("/rate-limit-test"))
        .header("X-Forwarded-For", "10.0.0.1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different forwarded identity still has its whole window.
    let res = client
        .get(gk.url("/rate-limit-test"))
        .header("X-Forwarded-For", "10.0.0.2")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    gk.shutdown.trigger();
}

#[tokio::test]
async fn concurrent_saturation_never_over_admits() {
    let mut config = GatekeeperConfig::default();
    config.rate_limit.max_requests = 10;
    let gk = common::spawn_gatekeeper(config).await;
    let client = common::browser_client();

    let mut handles = Vec::new();
    for _ in 0..30 {
        let client = client.clone();
        let url = gk.url("/rate-limit-test");
        handles.push(tokio::spawn(async move {
            client
                .get(url)
                .header("X-Forwarded-For", "172.16.0.9")
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    let mut admitted = 0;
    let mut denied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => admitted += 1,
            StatusCode::TOO_MANY_REQUESTS => denied += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(admitted, 10);
    assert_eq!(denied, 20);

    gk.shutdown.trigger();
}

#[tokio::test]
async fn bot_user_agents_are_blocked() {
    let gk = common::spawn_gatekeeper(GatekeeperConfig::default()).await;
    let client = common::anonymous_client();

    let res = client
        .get(gk.url("/rate-limit-test"))
        .header(USER_AGENT, "curl/8.4.0")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.text().await.unwrap(), "Bot detected and blocked\n");

    // Absent User-Agent is suspicious by default.
    let res = client.get(gk.url("/rate-limit-test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Both rejections are visible on the bot counter.
    let admin = common::admin_client();
    let res = admin
        .get(gk.admin_url("/admin/bot-count"))
        .bearer_auth("CHANGE_ME_IN_PRODUCTION")
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["botDetectionCount"], 2);

    gk.shutdown.trigger();
}

#[tokio::test]
async fn disabled_toggles_admit_everything() {
    let mut config = GatekeeperConfig::default();
    config.rate_limit.enabled = false;
    config.rate_limit.max_requests = 1;
    config.bot_detection.enabled = false;
    let gk = common::spawn_gatekeeper(config).await;
    let client = common::anonymous_client();

    // A scraping User-Agent hammering far past the configured capacity.
    for _ in 0..10 {
        let res = client
            .get(gk.url("/rate-limit-test"))
            .header(USER_AGENT, "Scrapy/2.11.0")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    gk.shutdown.trigger();
}

#[tokio::test]
async fn rejections_never_reach_the_request_metrics() {
    let mut config = GatekeeperConfig::default();
    config.rate_limit.max_requests = 2;
    let gk = common::spawn_gatekeeper(config).await;
    let client = common::browser_client();

    // Two admitted requests, then one rate-limited, then one bot-blocked.
    for _ in 0..2 {
        client.get(gk.url("/rate-limit-test")).send().await.unwrap();
    }
    let res = client.get(gk.url("/rate-limit-test")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    // A fresh forwarded identity, so the saturated window does not mask the
    // bot check.
    let res = common::anonymous_client()
        .get(gk.url("/rate-limit-test"))
        .header("X-Forwarded-For", "10.9.9.9")
        .header(USER_AGENT, "wget/1.21")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let admin = common::admin_client();
    let res = admin
        .get(gk.admin_url("/admin/metrics"))
        .bearer_auth("CHANGE_ME_IN_PRODUCTION")
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();

    // Only the two admitted requests were recorded; the rejections surface
    // through the bot counter and the exposition layer instead.
    assert_eq!(body["totalRequests"], 2);
    assert_eq!(body["successfulRequests"], 2);
    assert_eq!(body["failedRequests"], 0);
    assert_eq!(body["botsDetected"], 1);

    gk.shutdown.trigger();
}
