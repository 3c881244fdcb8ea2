//! Integration tests for the TEI and chat-completions clients using wiremock HTTP mocks.

use mrdb_retrieval::{ChatClient, LanguageModel, RetrievalError, TeiClient};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn tei_embeds_in_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embed"))
        .and(body_partial_json(serde_json::json!({ "inputs": ["first", "second"] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([[0.1, 0.2], [0.3, 0.4]])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = TeiClient::new(&server.uri(), 5).expect("client construction should not fail");
    let vectors = client
        .embed_texts(&["first", "second"])
        .await
        .expect("embed should succeed");
    assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
}

#[tokio::test]
async fn tei_batches_large_inputs() {
    let server = MockServer::start().await;
    let batch: Vec<Vec<f32>> = vec![vec![1.0]; 64];
    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&batch))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[2.0]])))
        .expect(1)
        .mount(&server)
        .await;

    let texts: Vec<String> = (0..65).map(|i| format!("text {i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let client = TeiClient::new(&server.uri(), 5).expect("client construction should not fail");
    let vectors = client.embed_texts(&refs).await.expect("embed should succeed");
    assert_eq!(vectors.len(), 65);
    assert_eq!(vectors[64], vec![2.0]);
}

#[tokio::test]
async fn tei_count_mismatch_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[0.1]])))
        .mount(&server)
        .await;

    let client = TeiClient::new(&server.uri(), 5).expect("client construction should not fail");
    let err = client.embed_texts(&["a", "b"]).await.unwrap_err();
    assert!(matches!(err, RetrievalError::Tei(ref m) if m.contains("1 embeddings for 2 inputs")), "{err}");
}

#[tokio::test]
async fn chat_returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "messages": [{ "role": "user", "content": "hello?" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "{\"report\": \"hi\"}" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::new(
        &format!("{}/v1", server.uri()),
        "test-model",
        0.1,
        Some("sk-test".to_string()),
        5,
    )
    .expect("client construction should not fail");
    let reply = client.complete("hello?").await.expect("chat should succeed");
    assert_eq!(reply, "{\"report\": \"hi\"}");
}

#[tokio::test]
async fn chat_error_status_is_an_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = ChatClient::new(&server.uri(), "m", 0.1, None, 5)
        .expect("client construction should not fail");
    let err = client.chat("q").await.unwrap_err();
    assert!(matches!(err, RetrievalError::Llm(ref m) if m.contains("429") && m.contains("slow down")), "{err}");
}

#[tokio::test]
async fn chat_without_choices_is_an_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = ChatClient::new(&server.uri(), "m", 0.1, None, 5)
        .expect("client construction should not fail");
    let err = client.chat("q").await.unwrap_err();
    assert!(matches!(err, RetrievalError::Llm(_)), "{err}");
}
