//! Country details, photos and currency conversion against mocked APIs.


use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::{
    countries_where, globalize_with, mount_json, mount_signed_in, write_config, write_session,
};

const OPEN_DETAILS: &str = "details_require_sign_in = false\n";

#[tokio::test]
async fn test_details_require_login_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alpha/FRA"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let home = tempdir().unwrap();

    globalize_with(home.path(), &server)
        .args(["show", "FRA"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Log in to view country details"));
}

#[tokio::test]
async fn test_signed_in_user_sees_details() {
    let server = MockServer::start().await;
    mount_signed_in(&server).await;
    mount_json(&server, "/alpha/FRA", countries_where(&["FRA"])).await;
    let home = tempdir().unwrap();
    write_session(home.path());

    globalize_with(home.path(), &server)
        .args(["show", "FRA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("France (FRA)"))
        .stdout(predicate::str::contains("French Republic"))
        .stdout(predicate::str::contains("Euro (EUR, €)"))
        .stdout(predicate::str::contains("551,695 km²"));
}

#[tokio::test]
async fn test_details_list_photos_when_key_is_set() {
    let server = MockServer::start().await;
    mount_json(&server, "/alpha/JPN", countries_where(&["JPN"])).await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", "Japan"))
        .and(header("Authorization", "Client-ID photo-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"urls": {"small": "https://img.example/tokyo.jpg"}}]
        })))
        .mount(&server)
        .await;
    let home = tempdir().unwrap();
    write_config(home.path(), OPEN_DETAILS);

    globalize_with(home.path(), &server)
        .env("UNSPLASH_ACCESS_KEY", "photo-key")
        .args(["show", "jpn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Japan (JPN)"))
        .stdout(predicate::str::contains("https://img.example/tokyo.jpg"));
}

#[tokio::test]
async fn test_missing_photo_key_skips_photos() {
    let server = MockServer::start().await;
    mount_json(&server, "/alpha/JPN", countries_where(&["JPN"])).await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let home = tempdir().unwrap();
    write_config(home.path(), OPEN_DETAILS);

    globalize_with(home.path(), &server)
        .args(["show", "JPN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Japan (JPN)"))
        .stdout(predicate::str::contains("Photos:").not());
}

#[tokio::test]
async fn test_details_include_encyclopedia_summary() {
    let server = MockServer::start().await;
    mount_json(&server, "/alpha/JPN", countries_where(&["JPN"])).await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts"))
        .and(query_param("titles", "Japan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": {"15573": {
                "title": "Japan",
                "extract": "Japan is an island country in East Asia."
            }}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let home = tempdir().unwrap();
    write_config(home.path(), OPEN_DETAILS);

    globalize_with(home.path(), &server)
        .args(["show", "JPN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("About:"))
        .stdout(predicate::str::contains("Japan is an island country in East Asia."));
}

#[tokio::test]
async fn test_summary_outage_still_shows_details() {
    let server = MockServer::start().await;
    mount_json(&server, "/alpha/JPN", countries_where(&["JPN"])).await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    let home = tempdir().unwrap();
    write_config(home.path(), OPEN_DETAILS);

    globalize_with(home.path(), &server)
        .args(["show", "JPN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Japan (JPN)"))
        .stdout(predicate::str::contains("About:").not());
}

#[tokio::test]
async fn test_unknown_code_prints_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alpha/XXX"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"status": 404})))
        .mount(&server)
        .await;
    let home = tempdir().unwrap();
    write_config(home.path(), OPEN_DETAILS);

    globalize_with(home.path(), &server)
        .args(["show", "xxx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Country not found: XXX"));
}

#[tokio::test]
async fn test_convert_uses_first_currency() {
    let server = MockServer::start().await;
    mount_json(&server, "/alpha/JPN", countries_where(&["JPN"])).await;
    mount_json(
        &server,
        "/v4/latest/JPY",
        json!({"base": "JPY", "rates": {"USD": 0.0067, "EUR": 0.0062}}),
    )
    .await;
    let home = tempdir().unwrap();

    globalize_with(home.path(), &server)
        .args(["convert", "JPN", "--amount", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1000.00 JPY = 6.70 USD"));

    globalize_with(home.path(), &server)
        .args(["convert", "JPN", "--to", "xyz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exchange rate from JPY to XYZ."));
}

#[tokio::test]
async fn test_convert_degrades_when_rates_unavailable() {
    let server = MockServer::start().await;
    mount_json(&server, "/alpha/JPN", countries_where(&["JPN"])).await;
    Mock::given(method("GET"))
        .and(path("/v4/latest/JPY"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let home = tempdir().unwrap();

    globalize_with(home.path(), &server)
        .args(["convert", "JPN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exchange rates are unavailable"));
}
