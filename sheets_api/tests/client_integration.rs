use sheets_api::{Client, Error};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[tokio::test]
async fn get_rows_success() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("basic_info.csv");

    Mock::given(method("GET"))
        .and(path("/spreadsheets/d/sheet-basic/export"))
        .and(query_param("format", "csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let rows = client.get_rows("sheet-basic").await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Full Name"), Some("Dr. Mohit Konduri"));
    assert_eq!(
        rows[0].get("About"),
        Some("Researcher in distributed systems, teaching since 2012.")
    );
}

#[tokio::test]
async fn get_rows_keeps_invalid_records_and_skips_blank_lines() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("journal_publications.csv");

    Mock::given(method("GET"))
        .and(path("/spreadsheets/d/sheet-journals/export"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let rows = client.get_rows("sheet-journals").await.unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows.iter().filter(|r| r.is_valid()).count(), 2);
    assert_eq!(rows[1].get("Title"), Some("Gossip at Scale"));
}

#[tokio::test]
async fn get_csv_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/d/missing/export"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let result = client.get_csv("missing").await;
    match result {
        Err(Error::HttpStatus { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn get_rows_empty_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/d/blank/export"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let result = client.get_rows("blank").await;
    assert!(matches!(result, Err(Error::Parse(_))));
}

#[tokio::test]
async fn unreachable_host_is_request_failed() {
    // Port 9 (discard) on localhost is not served by anything in the test environment.
    let client = Client::with_base_url("http://127.0.0.1:9");
    let result = client.get_csv("anything").await;
    assert!(matches!(result, Err(Error::RequestFailed)));
}
