//! End-to-end export against a mock Skritter API

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use skritter_export::export::HEADER;
use skritter_export::{ApiClient, Error, ExportStyle};
use std::collections::BTreeSet;
use tempfile::tempdir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ITEMS_MARKER: &str = "api/v0/items";
const BANNED_MARKER: &str = r#""sort":"banned""#;
const LOOKUP_MARKER: &str = r#""ids":"#;

async fn mount_simptrad(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/simptradmap"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simptrad_table()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_export_writes_anki_file() {
    let server = MockServer::start().await;

    mount_job(
        &server,
        "100",
        ITEMS_MARKER,
        1,
        vec![
            done_request("100-r1", items_page(&["1-zh-没关系-2-rune", "1-zh-没关系-2-defn"])),
            done_request("100-r2", items_page(&["1-zh-几-2-rune", "1-zh-立-0-rune", "1-zh-几-2-rune"])),
        ],
    )
    .await;
    mount_job(
        &server,
        "200",
        BANNED_MARKER,
        0,
        vec![done_request(
            "200-r1",
            vocabs_page(vec![vocab("zh-立-0", "both", "立", "li4", "stand")]),
        )],
    )
    .await;

    // only the two remaining vocabs are looked up, in id order
    Mock::given(method("POST"))
        .and(path("/batch"))
        .and(body_string_contains(r#""ids":"zh-几-2|zh-没关系-2""#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope("300", 1, vec![pending_request("300-r1")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_status(&server, "300", "300-r1", 2).await;
    Mock::given(method("GET"))
        .and(path("/batch/300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "300",
            0,
            vec![
                done_request("300-r1", serde_json::json!("")),
                done_request(
                    "300-r2",
                    vocabs_page(vec![
                        vocab("zh-没关系-2", "simp", "没关系", "mei2guan1xi5", "it doesn't matter"),
                        vocab("zh-几-2", "both", "几", "ji3", "how\nmany"),
                    ]),
                ),
            ],
        )))
        .mount(&server)
        .await;
    mount_simptrad(&server).await;

    let dir = tempdir().unwrap();
    let mut config = test_config(&server);
    config.export.output_dir = dir.path().to_path_buf();

    let path = skritter_export::run_export(&config).await.unwrap();

    assert_eq!(path.parent().unwrap(), dir.path());
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("anki_import-") && name.ends_with(".tsv"), "{name}");

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        format!("{HEADER}沒關係\t没关系\tméiguānxi\tit doesn't matter\n几\t\tjǐ\thow; many\n")
    );
}

#[tokio::test]
async fn test_skritter_style_file_name() {
    let server = MockServer::start().await;

    mount_job(&server, "100", ITEMS_MARKER, 0, vec![done_request("100-r1", items_page(&[]))]).await;
    mount_job(&server, "200", BANNED_MARKER, 0, vec![done_request("200-r1", vocabs_page(vec![]))]).await;
    mount_simptrad(&server).await;

    let dir = tempdir().unwrap();
    let mut config = test_config(&server);
    config.export.output_dir = dir.path().to_path_buf();
    config.export.style = ExportStyle::Skritter;

    let path = skritter_export::run_export(&config).await.unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("skritter_export-"), "{name}");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}

#[tokio::test]
async fn test_vocab_lookup_is_chunked() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/batch"))
        .and(body_string_contains(LOOKUP_MARKER))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope("300", 1, vec![pending_request("300-r1")])),
        )
        .expect(3)
        .mount(&server)
        .await;
    mount_status(&server, "300", "300-r1", 0).await;
    Mock::given(method("GET"))
        .and(path("/batch/300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "300",
            0,
            vec![done_request(
                "300-r1",
                vocabs_page(vec![vocab("zh-一-0", "both", "一", "yi1", "one")]),
            )],
        )))
        .expect(3)
        .mount(&server)
        .await;

    let client = ApiClient::new(&test_config(&server)).unwrap();
    let ids: BTreeSet<String> = (0..250).map(|i| format!("zh-{i}-0")).collect();

    let vocabs = client.get_vocabs(&ids).await.unwrap();
    assert_eq!(vocabs.len(), 3);
}

#[tokio::test]
async fn test_duplicate_banned_vocab_aborts_export() {
    let server = MockServer::start().await;

    mount_job(
        &server,
        "100",
        ITEMS_MARKER,
        0,
        vec![done_request("100-r1", items_page(&["1-zh-几-2-rune"]))],
    )
    .await;
    mount_job(
        &server,
        "200",
        BANNED_MARKER,
        0,
        vec![
            done_request("200-r1", vocabs_page(vec![vocab("zh-立-0", "both", "立", "li4", "stand")])),
            done_request("200-r2", vocabs_page(vec![vocab("zh-立-0", "both", "立", "li4", "stand")])),
        ],
    )
    .await;

    let dir = tempdir().unwrap();
    let mut config = test_config(&server);
    config.export.output_dir = dir.path().to_path_buf();

    let err = skritter_export::run_export(&config).await.unwrap_err();
    assert!(matches!(err, Error::Invariant(_)), "{err:?}");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_banned_vocabs_map_has_every_entry() {
    let server = MockServer::start().await;
    let banned: Vec<_> = ["A", "B", "C", "D", "E"]
        .iter()
        .map(|id| vocab(&format!("zh-{id}-0"), "both", id, "a1", id))
        .collect();

    mount_job(&server, "200", BANNED_MARKER, 1, vec![done_request("200-r1", vocabs_page(banned))]).await;

    let client = ApiClient::new(&test_config(&server)).unwrap();
    let map = client.get_banned_vocabs().await.unwrap();
    assert_eq!(map.len(), 5);
    assert!(map.contains_key("zh-E-0"));
}

#[tokio::test]
async fn test_malformed_item_id_aborts_export() {
    let server = MockServer::start().await;

    mount_job(
        &server,
        "100",
        ITEMS_MARKER,
        0,
        vec![done_request("100-r1", items_page(&["1-zh-几-2-rune", "bogus-rune"]))],
    )
    .await;

    let mut config = test_config(&server);
    config.export.output_dir = tempdir().unwrap().path().to_path_buf();

    let err = skritter_export::run_export(&config).await.unwrap_err();
    assert!(matches!(err, Error::Format { .. }), "{err:?}");
    assert!(err.to_string().contains("bogus-rune"), "{err}");
}
