//! End-to-end: sheets served by wiremock, loaded through the store, rendered
//! as a page.

use std::sync::Arc;

use portfolio_lib::config::{FileConfig, PortfolioConfig};
use portfolio_lib::{
    render_page, Aggregator, LoadState, PageContext, PortfolioStore, Section, Templates,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_sheet(server: &MockServer, id: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/spreadsheets/d/{}/export", id)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer) -> PortfolioConfig {
    let file = FileConfig::parse(&format!(
        r#"
        sheets_base_url = "{}"

        [sheets]
        basicInfo = "basic"
        awards = "awards"
        patents = "patents"
        contactMe = "contact"
        "#,
        server.uri()
    ))
    .unwrap();
    PortfolioConfig::resolve(file, |_| None).unwrap()
}

#[tokio::test]
async fn page_renders_after_background_load() {
    let server = MockServer::start().await;
    mount_sheet(
        &server,
        "basic",
        200,
        "Full Name,Designation,Department,About\nDr. Mohit Konduri,Professor,CSE,Teaches distributed systems.\n",
    )
    .await;
    mount_sheet(
        &server,
        "awards",
        200,
        "Award,Year,Certificate\nBest Teacher,2023,https://certs.example.org/1\n",
    )
    .await;
    mount_sheet(&server, "patents", 503, "unavailable").await;
    mount_sheet(&server, "contact", 200, "Mail,GitHub\nmohit@uni.edu,https://github.com/mk\n").await;

    let config = config_for(&server);
    let registry = config.registry();
    let aggregator = Aggregator::new(Arc::new(config.sheets_client()), registry.clone());
    let store = Arc::new(PortfolioStore::new());

    let templates = Templates::new().unwrap();
    let ctx = PageContext {
        fallback_email: config.fallback_email.clone(),
        banner: None,
        year: 2026,
    };

    let loading = render_page(&templates, &store.state(), &registry, &ctx).unwrap();
    assert!(loading.contains("Loading Portfolio..."));

    store.spawn_load(aggregator).unwrap().await.unwrap();
    let state = store.wait_settled().await;
    let data = match &state {
        LoadState::Ready(data) => Arc::clone(data),
        other => panic!("expected ready, got {:?}", other),
    };
    assert_eq!(data.rows(Section::Patents).len(), 0);
    assert_eq!(
        data.first(Section::ContactMe).and_then(|r| r.get("mail")),
        Some("mohit@uni.edu")
    );

    let html = render_page(&templates, &state, &registry, &ctx).unwrap();
    assert!(html.contains("<h1>Dr. Mohit Konduri</h1>"));
    assert!(html.contains("View Link"));
    assert!(!html.contains(r#"<section id="patents""#));
    assert!(html.contains("mohit@uni.edu"));
    assert!(html.contains("https://github.com/mk"));
}
