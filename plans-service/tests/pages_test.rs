mod common;

use axum::http::StatusCode;
use common::{aurora_document, TestApp};

async fn app_with_two_carriers() -> TestApp {
    let document = aurora_document().to_string();
    TestApp::with_files(&[
        ("processados/aurora_saude/aurora_saude.json", &document),
        ("processados/sindinapi/sindinapi.json", r#"{"empresa": "SINDINAPI", "planos": []}"#),
    ])
    .await
}

#[tokio::test]
async fn first_carrier_is_selected_by_default() {
    let app = app_with_two_carriers().await;

    let (status, html) = app.get_text("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"<a class="item active" href="/?operadora=aurora_saude">Aurora Saude</a>"#));
    assert!(html.contains("Planos de Aurora Saúde"));
    assert!(html.contains("A200 AMB. + HOSP. ENFERMARIA"));
    assert!(html.contains("Selecione um plano para ver os detalhes"));
    assert!(html.contains("Olá! Como posso ajudar você hoje?"));
}

#[tokio::test]
async fn selected_plan_shows_prices_in_age_order() {
    let app = app_with_two_carriers().await;

    let (status, html) = app
        .get_text("/?operadora=aurora_saude&plano=A200%20AMB.%20%2B%20HOSP.%20ENFERMARIA")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Acomodação: Enfermaria"));

    let first = html.find(r#"data-faixa="00-18""#).unwrap();
    let second = html.find(r#"data-faixa="19-23""#).unwrap();
    let last = html.find(r#"data-faixa="59+""#).unwrap();
    assert!(first < second && second < last);
    assert!(html.contains(r#"<td class="valor">759,69</td>"#));
}

#[tokio::test]
async fn plan_without_price_table_says_so() {
    let app = app_with_two_carriers().await;

    let (_, html) = app
        .get_text("/?operadora=aurora_saude&plano=A100%20AMBULATORIAL")
        .await;

    assert!(html.contains("Dados de preço não disponíveis."));
}

#[tokio::test]
async fn unknown_carrier_in_query_falls_back_to_the_first() {
    let app = app_with_two_carriers().await;

    let (_, html) = app.get_text("/?operadora=nao_existe").await;

    assert!(html.contains("Planos de Aurora Saúde"));
}

#[tokio::test]
async fn empty_storage_renders_an_empty_page() {
    let app = TestApp::with_files(&[]).await;

    let (status, html) = app.get_text("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Planos de ..."));
}

#[tokio::test]
async fn explicit_nulls_in_the_document_still_render() {
    let app = TestApp::with_files(&[(
        "processados/aurora/aurora.json",
        r#"{"empresa": "Aurora", "planos": [{
            "produto": "A100",
            "acomodacao": null,
            "acomodacao_preco": { "nenhum": null, "enfermaria": [{ "00-18": 99.5 }] }
        }]}"#,
    )])
    .await;

    let (status, html) = app.get_text("/?operadora=aurora&plano=A100").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!html.contains("Falha ao buscar os detalhes do plano no servidor."));
    assert!(html.contains("<h1>A100</h1>"));
    assert!(html.contains(r#"<td class="valor">99.5</td>"#));
}

#[tokio::test]
async fn storage_failure_is_reported_inside_the_page() {
    let app = TestApp::with_files(&[("processados", "nao e uma pasta")]).await;

    let (status, html) = app.get_text("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"<p class="notice">Falha ao buscar dados no S3</p>"#));
    assert!(html.contains("Selecione um plano para ver os detalhes"));
}
