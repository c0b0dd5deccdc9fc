//! Integration tests for the mirror
//!
//! These tests use wiremock to serve a small frameset manual and run the
//! full crawl, convert and manifest cycle end-to-end.

use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wsm_mirror::config::Config;
use wsm_mirror::crawler::mirror;
use wsm_mirror::MirrorError;

const INDEX: &str = r#"<html><head><title>WSM</title></head>
<frameset rows="10%,90%">
    <frame name="main_menu" src="menu/main_menu.html">
    <frame name="srvc_menu" src="srvc/menu.html">
</frameset></html>"#;

const MAIN_MENU: &str = r##"<html><body><table><tr><td>
    <font color="#ffffff">CX-5</font>
</td></tr></table></body></html>"##;

const SERVICE_MENU: &str = r#"<html><head><script>
LeftMenuList[0] = "../sec1/left_menu_1.html";
LeftMenuList[1] = "../sec2/left_menu_2.html";
</script></head><body><select>
    <option>Section One</option>
    <option>Section Two</option>
</select></body></html>"#;

const LEFT_MENU_1: &str = r#"<html><body>
    <a href="docA.html" target="main">Doc A</a>
</body></html>"#;

const LEFT_MENU_2: &str = r#"<html><body>
    <a href="docB.html" target="main">Doc B</a>
</body></html>"#;

const DOC_A: &str = r#"<html><body>
    <h1>Doc A</h1>
    <p>See <a href="../sec2/docB.html#top">Doc B</a>.</p>
    <img src="../img/pic.png">
    <table>
        <tr><td>Torque</td><td>25 N·m</td></tr>
    </table>
</body></html>"#;

const DOC_B: &str = r#"<html><body>
    <h1>Doc B</h1>
    <p>Back to <a href="../sec1/docA.html">Doc A</a>.</p>
</body></html>"#;

/// Mounts the sample manual under `/wsm/SITE1/`
async fn mount_site(server: &MockServer, left_menu_1: &str) {
    let pages: [(&str, &str); 7] = [
        ("/wsm/SITE1/index.html", INDEX),
        ("/wsm/SITE1/menu/main_menu.html", MAIN_MENU),
        ("/wsm/SITE1/srvc/menu.html", SERVICE_MENU),
        ("/wsm/SITE1/sec1/left_menu_1.html", left_menu_1),
        ("/wsm/SITE1/sec2/left_menu_2.html", LEFT_MENU_2),
        ("/wsm/SITE1/sec1/docA.html", DOC_A),
        ("/wsm/SITE1/sec2/docB.html", DOC_B),
    ];

    for (route, body) in pages {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/wsm/SITE1/img/pic.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .mount(server)
        .await;
}

/// Creates a test configuration for the mock site
fn create_test_config(server: &MockServer, root: &Path) -> Config {
    let mut config: Config = toml::from_str(&format!(
        r#"
[site]
start-url = "{}/wsm/SITE1/index.html"
site-id = "SITE1"

[crawler]
workers = 2
retry-budget = 3
retry-delay = 0
"#,
        server.uri()
    ))
    .expect("test config parses");
    config.output.root = root.to_path_buf();
    config
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e))
}

#[tokio::test]
async fn test_full_mirror() {
    let server = MockServer::start().await;
    mount_site(&server, LEFT_MENU_1).await;

    let out = tempfile::tempdir().unwrap();
    let report = mirror(create_test_config(&server, out.path()))
        .await
        .expect("mirror should succeed");

    assert_eq!(report.model, "CX-5");
    assert!(report.is_clean(), "unexpected failures: {:?}", report.failures);

    let site = out.path().join("SITE1");
    let doc_a = read(&site.join("docs/section-one/doc-a/docA.md"));
    assert!(doc_a.starts_with("[Section One](../left_menu_1.md) ➭ [Doc A](docA.md)"));
    assert!(doc_a.contains("(../../section-two/doc-b/docB.md#top)"));
    assert!(doc_a.contains("(../../images/pic.png)"));
    assert!(doc_a.contains("| Torque | 25 N·m |"));

    let doc_b = read(&site.join("docs/section-two/doc-b/docB.md"));
    assert!(doc_b.contains("[Doc A](../../section-one/doc-a/docA.md)"));

    let left_menu = read(&site.join("docs/section-one/left_menu_1.md"));
    assert!(left_menu.contains("[Doc A](doc-a/docA.md)"));

    assert!(site.join("docs/images/pic.png").exists());
    assert!(site.join("cache/sec1/docA.html").exists());

    let manifest = read(&site.join("mkdocs.yml"));
    assert!(manifest.contains("Mazda WSM // CX-5 (SITE1)"));
    assert!(manifest.contains("section-one/left_menu_1.md"));
    assert!(manifest.contains("Doc A: section-one/doc-a/docA.md"));
}

#[tokio::test]
async fn test_second_run_is_served_from_cache_and_keeps_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wsm/SITE1/sec1/docA.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DOC_A))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_site(&server, LEFT_MENU_1).await;

    let out = tempfile::tempdir().unwrap();
    let first = mirror(create_test_config(&server, out.path())).await.unwrap();
    assert!(first.is_clean());

    let doc_a = out.path().join("SITE1/docs/section-one/doc-a/docA.md");
    std::fs::write(&doc_a, "edited").unwrap();

    let second = mirror(create_test_config(&server, out.path())).await.unwrap();
    assert!(second.is_clean());
    assert_eq!(second.converted, first.converted);
    assert_eq!(read(&doc_a), "edited");

    let mut forced = create_test_config(&server, out.path());
    forced.output.force = true;
    mirror(forced).await.unwrap();
    assert!(read(&doc_a).contains("(../../images/pic.png)"));
}

#[tokio::test]
async fn test_missing_service_menu_frame_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wsm/SITE1/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><frameset><frame name="main_menu" src="menu/main_menu.html"></frameset></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wsm/SITE1/menu/main_menu.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MAIN_MENU))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let result = mirror(create_test_config(&server, out.path())).await;

    assert!(matches!(result, Err(MirrorError::Topology(_))));
    assert!(!out.path().join("SITE1/mkdocs.yml").exists());
}

#[tokio::test]
async fn test_off_site_navigation_aborts() {
    let server = MockServer::start().await;
    mount_site(
        &server,
        r#"<html><body>
            <a href="https://elsewhere.example/doc.html" target="main">Away</a>
        </body></html>"#,
    )
    .await;

    let out = tempfile::tempdir().unwrap();
    let result = mirror(create_test_config(&server, out.path())).await;

    assert!(matches!(result, Err(MirrorError::PermissionViolation { .. })));
}

#[tokio::test]
async fn test_missing_page_is_reported_not_fatal() {
    let server = MockServer::start().await;
    mount_site(
        &server,
        r#"<html><body>
            <a href="docA.html" target="main">Doc A</a>
            <a href="gone.html" target="main">Gone</a>
        </body></html>"#,
    )
    .await;

    let out = tempfile::tempdir().unwrap();
    let report = mirror(create_test_config(&server, out.path())).await.unwrap();

    let failed: Vec<&str> = report.failures.iter().map(|(unit, _)| unit.as_str()).collect();
    assert_eq!(failed, vec!["gone.md", "left_menu_1.md"]);
    assert_eq!(report.failures[1].1, "Unresolved link: gone.md");

    let site = out.path().join("SITE1");
    assert!(!site.join("docs/section-one/left_menu_1.md").exists());

    let doc_a = read(&site.join("docs/section-one/doc-a/docA.md"));
    assert!(doc_a.starts_with("Section One ➭ [Doc A](docA.md)\n"));

    let manifest = read(&site.join("mkdocs.yml"));
    assert!(!manifest.contains("left_menu_1.md"));
    assert!(manifest.contains("Doc A: section-one/doc-a/docA.md"));
}

#[tokio::test]
async fn test_shared_targets_are_fetched_once() {
    let server = MockServer::start().await;

    let doc = |name: &str| {
        format!(
            r#"<html><body>
                <p>{name} refers to <a href="docShared.html" target="main">Shared</a>.</p>
                <img src="../img/pic.png">
            </body></html>"#
        )
    };
    let routes = [
        ("/wsm/SITE1/sec1/docA.html", doc("Doc A")),
        ("/wsm/SITE1/sec1/docC.html", doc("Doc C")),
        (
            "/wsm/SITE1/sec1/docShared.html",
            "<html><body><p>Shared body</p></body></html>".to_string(),
        ),
    ];
    for (route, body) in routes {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .with_priority(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/wsm/SITE1/img/pic.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_site(
        &server,
        r#"<html><body>
            <a href="docA.html" target="main">Doc A</a>
            <a href="docC.html" target="main">Doc C</a>
        </body></html>"#,
    )
    .await;

    let out = tempfile::tempdir().unwrap();
    let report = mirror(create_test_config(&server, out.path())).await.unwrap();
    assert!(report.is_clean(), "unexpected failures: {:?}", report.failures);

    let docs = out.path().join("SITE1/docs");
    assert!(docs.join("section-one/doc-a/shared/docShared.md").exists());
    assert!(!docs.join("section-one/doc-c/shared/docShared.md").exists());

    let doc_c = read(&docs.join("section-one/doc-c/docC.md"));
    assert!(doc_c.contains("[Shared](../doc-a/shared/docShared.md)"));
    assert!(doc_c.contains("(../../images/pic.png)"));

    let manifest = read(&out.path().join("SITE1/mkdocs.yml"));
    assert_eq!(manifest.matches("docShared.md").count(), 1);
}
