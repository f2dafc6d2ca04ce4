//! End-to-end tests for the gateway-protected application endpoints.

use gatekeeper::config::GatekeeperConfig;
use reqwest::StatusCode;

mod common;

#[tokio::test]
async fn login_accepts_demo_credentials_and_rejects_injection() {
    let gk = common::spawn_gatekeeper(GatekeeperConfig::default()).await;
    let client = common::browser_client();

    let res = client
        .post(gk.url("/login"))
        .form(&[("username", "admin"), ("password", "admin123")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Welcome, admin\n");

    let res = client
        .post(gk.url("/login"))
        .form(&[("username", "admin"), ("password", "nope")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // The classic payload dies at the username validator, not in any query.
    let res = client
        .post(gk.url("/login"))
        .form(&[("username", "admin' OR '1'='1"), ("password", "x")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    gk.shutdown.trigger();
}

#[tokio::test]
async fn search_escapes_reflected_input_and_sets_csp() {
    let gk = common::spawn_gatekeeper(GatekeeperConfig::default()).await;
    let client = common::browser_client();

    let res = client
        .post(gk.url("/search"))
        .form(&[("query", "<script>alert('x')</script>")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res
        .headers()
        .get("content-security-policy")
        .is_some_and(|v| v.to_str().unwrap().contains("default-src 'self'")));
    assert_eq!(
        res.text().await.unwrap(),
        "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; - Search result"
    );

    gk.shutdown.trigger();
}

#[tokio::test]
async fn view_log_serves_contained_files_and_rejects_traversal() {
    let log_dir = tempfile::tempdir().unwrap();
    std::fs::write(log_dir.path().join("app.log"), "line one\nline two\n").unwrap();

    let mut config = GatekeeperConfig::default();
    config.gateway.log_dir = log_dir.path().to_string_lossy().into_owned();
    let gk = common::spawn_gatekeeper(config).await;
    let client = common::browser_client();

    let res = client
        .get(gk.url("/view-log"))
        .query(&[("filename", "app.log")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "line one\nline two\n");

    // Traversal is a rejection, not a missing file.
    let res = client
        .get(gk.url("/view-log"))
        .query(&[("filename", "../../etc/passwd")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A contained-but-missing file is folded into the same rejection.
    let res = client
        .get(gk.url("/view-log"))
        .query(&[("filename", "ghost.log")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    gk.shutdown.trigger();
}

#[tokio::test]
async fn upload_enforces_filename_and_size_guards() {
    let upload_dir = tempfile::tempdir().unwrap();

    let mut config = GatekeeperConfig::default();
    config.gateway.upload_dir = upload_dir.path().to_string_lossy().into_owned();
    config.gateway.max_upload_bytes = 16;
    let gk = common::spawn_gatekeeper(config).await;
    let client = common::browser_client();

    let res = client
        .post(gk.url("/upload"))
        .header("X-Filename", "notes.txt")
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "File uploaded: notes.txt\n");
    assert_eq!(
        std::fs::read_to_string(upload_dir.path().join("notes.txt")).unwrap(),
        "hello"
    );

    // Oversized body.
    let res = client
        .post(gk.url("/upload"))
        .header("X-Filename", "big.bin")
        .body(vec![0u8; 32])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // Traversal material in the filename.
    let res = client
        .post(gk.url("/upload"))
        .header("X-Filename", "../escape.txt")
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Missing filename header.
    let res = client
        .post(gk.url("/upload"))
        .body("x")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Empty body.
    let res = client
        .post(gk.url("/upload"))
        .header("X-Filename", "empty.txt")
        .body("")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    gk.shutdown.trigger();
}

#[tokio::test]
async fn register_requires_all_fields_valid() {
    let gk = common::spawn_gatekeeper(GatekeeperConfig::default()).await;
    let client = common::browser_client();

    let res = client
        .post(gk.url("/register"))
        .form(&[
            ("email", "user@example.com"),
            ("password", "abc12345"),
            ("username", "new_user"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Registered user: new_user\n");

    for (email, password, username) in [
        ("not-an-email", "abc12345", "new_user"),
        ("user@example.com", "abcdefgh", "new_user"),
        ("user@example.com", "abc12345", "ab"),
    ] {
        let res = client
            .post(gk.url("/register"))
            .form(&[
                ("email", email),
                ("password", password),
                ("username", username),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.text().await.unwrap(), "Invalid input format\n");
    }

    gk.shutdown.trigger();
}
