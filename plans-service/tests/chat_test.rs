mod common;

use axum::http::StatusCode;
use common::{chat_store, TestApp, AURORA, SINDINAPI};
use plans_service::services::providers::mock::ScriptedTextProvider;
use serde_json::json;

const CLARIFICATION: &str = "Não consegui identificar sobre qual de nossas operadoras parceiras (Aurora Saúde, SINDINAPI) você está perguntando. Poderia especificar?";

#[tokio::test]
async fn unidentified_carrier_gets_clarification_without_second_call() {
    let provider = ScriptedTextProvider::new([r#"{"operadora": "Nenhuma"}"#]);
    let app = TestApp::spawn(&[], chat_store(), provider).await;

    let (status, body) = app
        .post_chat(r#"{"message": "qual o melhor plano para mim?"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": CLARIFICATION }));
    assert_eq!(app.provider.call_count(), 1);
    assert!(app.store.lookups().is_empty());
    assert!(app.store.conversations().is_empty());
}

#[tokio::test]
async fn identified_carrier_is_looked_up_once_and_logged_once() {
    let provider = ScriptedTextProvider::new([
        r#"{"operadora": "Aurora Saúde"}"#,
        "Para 18 anos o plano A200 custa R$ 127,62.",
    ]);
    let app = TestApp::spawn(&[], chat_store(), provider).await;

    let (status, body) = app
        .post_chat(r#"{"message": "Quanto custa o A200 da Aurora para 18 anos?"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "reply": "Para 18 anos o plano A200 custa R$ 127,62." })
    );
    assert_eq!(app.store.lookups(), vec![AURORA.to_string()]);

    let conversations = app.store.conversations();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].empresa, AURORA);
    assert_eq!(
        conversations[0].pergunta_usuario,
        "Quanto custa o A200 da Aurora para 18 anos?"
    );
    assert_eq!(
        conversations[0].resposta_ia,
        "Para 18 anos o plano A200 custa R$ 127,62."
    );
}

#[tokio::test]
async fn stages_use_structured_then_grounded_prompts() {
    let provider = ScriptedTextProvider::new([r#"{"operadora": "Aurora Saúde"}"#, "ok"]);
    let app = TestApp::spawn(&[], chat_store(), provider).await;

    app.post_chat(r#"{"message": "preço do A200 para 20 anos"}"#)
        .await;

    let calls = app.provider.calls();
    assert_eq!(calls.len(), 2);

    assert!(calls[0].structured);
    assert!(calls[0].prompt.contains("- Aurora Saúde\n- SINDINAPI"));

    assert!(!calls[1].structured);
    assert!(calls[1].prompt.contains("chamada 'Aurora Saúde'"));
    assert!(calls[1].prompt.contains(
        "Preços por faixa etária:\n- 00 a 18 anos: R$ 127.62\n- 19 a 23 anos: R$ 153.15\n- 59+ anos: R$ 759,69\n"
    ));
    assert!(calls[1].prompt.contains("Plano: \"A100 AMBULATORIAL\"\nAcomodação: N/A\n"));
}

#[tokio::test]
async fn fallback_matches_first_word_when_model_is_unresolved() {
    let provider = ScriptedTextProvider::new(["Nenhuma", "Não tenho essa informação."]);
    let app = TestApp::spawn(&[], chat_store(), provider).await;

    let (status, body) = app
        .post_chat(r#"{"message": "e a sindinapi, quanto fica?"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": "Não tenho essa informação." }));
    assert_eq!(app.store.lookups(), vec![SINDINAPI.to_string()]);

    // No document for this carrier.
    let calls = app.provider.calls();
    assert!(calls[1]
        .prompt
        .contains("Nenhuma informação de preço encontrada."));
    assert_eq!(app.store.conversations()[0].empresa, SINDINAPI);
}

#[tokio::test]
async fn missing_or_invalid_message_is_a_bad_request() {
    let app = TestApp::spawn(&[], chat_store(), ScriptedTextProvider::default()).await;

    for body in [
        "{}",
        r#"{"message": ""}"#,
        r#"{"message": 42}"#,
        r#"{"message": null}"#,
        "isto nao e json",
    ] {
        let (status, response) = app.post_chat(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response, json!({ "error": "A mensagem é obrigatória" }));
    }

    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn model_failure_is_a_generic_server_error() {
    let provider = ScriptedTextProvider::new([r#"{"operadora": "Aurora Saúde"}"#])
        .then_fail("quota exceeded");
    let app = TestApp::spawn(&[], chat_store(), provider).await;

    let (status, body) = app.post_chat(r#"{"message": "A200 da aurora"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Ocorreu um erro ao processar a requisição." })
    );
    assert!(app.store.conversations().is_empty());
}

#[tokio::test]
async fn logging_failure_still_returns_the_reply() {
    let provider = ScriptedTextProvider::new([r#"{"operadora": "SINDINAPI"}"#, "Olá!"]);
    let app = TestApp::spawn(&[], chat_store().with_failing_log(), provider).await;

    let (status, body) = app.post_chat(r#"{"message": "oi, SINDINAPI"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": "Olá!" }));
}
