use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wordlens_engine::{
    AnalysisApi, ApiSettings, MarkParams, MarkRecord, NounRecord, RemoteJobState, ReqwestApi,
    TransportFailure,
};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn upload_sends_multipart_file_and_returns_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("filename=\"report.pdf\""))
        .and(body_string_contains("%PDF-1.7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"job_id":"X"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("report.pdf");
    std::fs::write(&file, b"%PDF-1.7 fake").unwrap();

    let job_id = api_for(&server).upload(&file).await.unwrap();
    assert_eq!(job_id, "X");
}

#[tokio::test]
async fn upload_of_unreadable_file_is_an_io_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let err = api_for(&server)
        .upload(&dir.path().join("missing.pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, TransportFailure::Io);
}

#[tokio::test]
async fn status_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/X/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"state":"running","progress":40,"message":"extracting"}"#,
        ))
        .mount(&server)
        .await;

    let status = api_for(&server).job_status("X").await.unwrap();
    assert_eq!(status.state, RemoteJobState::Running);
    assert_eq!(status.progress, 40);
    assert_eq!(status.message, "extracting");
}

#[tokio::test]
async fn terms_pass_query_and_sort() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/X/nouns"))
        .and(query_param("query", "猫"))
        .and(query_param("sort", "alpha"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"noun":"猫","count":3,"in_dict":false,"maybe_wrong":true}]"#,
        ))
        .mount(&server)
        .await;

    let terms = api_for(&server)
        .terms("X", Some("猫"), "alpha")
        .await
        .unwrap();
    assert_eq!(
        terms,
        vec![NounRecord {
            noun: "猫".to_string(),
            count: 3,
            in_dict: false,
            maybe_wrong: true,
        }]
    );
}

#[tokio::test]
async fn occurrences_percent_encode_the_term() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/X/nouns/%E8%88%B9/occurrences"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"page":2,"line":5,"sentence":"大船出海。"}]"#,
        ))
        .mount(&server)
        .await;

    let occurrences = api_for(&server).occurrences("X", "船").await.unwrap();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].page, 2);
    assert_eq!(occurrences[0].sentence, "大船出海。");
}

#[tokio::test]
async fn toggle_and_list_marks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jobs/X/marks/toggle"))
        .and(query_param("noun", "船"))
        .and(query_param("page", "2"))
        .and(query_param("line", "5"))
        .and(query_param("sentence", "大船出海。"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"added":true,"removed":false,"id":"2:5:船:大船出海。"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/X/marks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"id":"2:5:船:大船出海。","page":2,"line":5,"noun":"船","sentence":"大船出海。"}]"#,
        ))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let reply = api
        .toggle_mark(
            "X",
            &MarkParams {
                noun: "船".to_string(),
                page: 2,
                line: 5,
                sentence: "大船出海。".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(reply.added && !reply.removed);

    let marks = api.marks("X").await.unwrap();
    assert_eq!(
        marks,
        vec![MarkRecord {
            id: "2:5:船:大船出海。".to_string(),
            page: 2,
            line: 5,
            noun: "船".to_string(),
            sentence: "大船出海。".to_string(),
        }]
    );
}

#[tokio::test]
async fn dictionary_word_management() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dict/add"))
        .and(query_param("word", "狗"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"added":false}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dict/words"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"words":["狗","猫"]}"#))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/dict/words"))
        .and(query_param("word", "猫"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"removed":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert!(!api.add_word("狗").await.unwrap());
    assert_eq!(api.words().await.unwrap(), vec!["狗", "猫"]);
    api.remove_word("猫").await.unwrap();
}

#[tokio::test]
async fn error_detail_becomes_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/dict/words"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"word not found"}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/gone/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api.remove_word("猫").await.unwrap_err();
    assert_eq!(err.kind, TransportFailure::HttpStatus(404));
    assert_eq!(err.message, "word not found");

    let err = api.job_status("gone").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message, "HTTP 500");
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/X/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"state":"paused"}"#))
        .mount(&server)
        .await;

    let err = api_for(&server).job_status("X").await.unwrap_err();
    assert_eq!(err.kind, TransportFailure::Decode);
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dict/words"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string(r#"{"words":[]}"#),
        )
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::default()
    })
    .unwrap();
    let err = api.words().await.unwrap_err();
    assert_eq!(err.kind, TransportFailure::Timeout);
}

#[tokio::test]
async fn dictionary_download_respects_size_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dict"))
        .respond_with(ResponseTemplate::new(200).set_body_string("狗\n猫\n"))
        .mount(&server)
        .await;

    let bytes = api_for(&server).download_dictionary().await.unwrap();
    assert_eq!(bytes, "狗\n猫\n".as_bytes());

    let api = ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        max_download_bytes: 4,
        ..ApiSettings::default()
    })
    .unwrap();
    let err = api.download_dictionary().await.unwrap_err();
    assert_eq!(err.kind, TransportFailure::TooLarge { max_bytes: 4 });
}

#[tokio::test]
async fn dictionary_replace_posts_the_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dict"))
        .and(body_string_contains("filename=\"custom_dict.txt\""))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("custom_dict.txt");
    std::fs::write(&file, "狗\n").unwrap();
    api_for(&server).replace_dictionary(&file).await.unwrap();
}
