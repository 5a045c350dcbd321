//! Server-rendered price table page.
//!
//! The carrier and plan selection travel in the query string; the page
//! script only handles local cell edits and the chat widget.

use crate::models::{Accommodation, Carrier, Plan};
use crate::startup::AppState;
use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use service_core::error::AppError;

use super::carriers::LIST_CARRIERS_ERROR;
use super::plans::FETCH_PLANS_ERROR;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub operadora: Option<String>,
    pub plano: Option<String>,
}

pub struct PriceRowView {
    pub faixa: String,
    pub valor: String,
}

pub struct PlanView {
    pub produto: String,
    pub acomodacao: String,
    pub rows: Vec<PriceRowView>,
}

impl PlanView {
    fn from_plan(plan: &Plan) -> Self {
        let rows = plan
            .prices(&Accommodation::DISPLAY_PRIORITY)
            .map(|table| {
                table
                    .sorted_rows()
                    .into_iter()
                    .map(|row| PriceRowView {
                        valor: row.amount(),
                        faixa: row.faixa,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            produto: plan.produto.clone(),
            acomodacao: plan.acomodacao.clone(),
            rows,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub carriers: Vec<Carrier>,
    pub selected_carrier: String,
    pub company: String,
    pub plans: Vec<String>,
    pub selected_plan: Option<PlanView>,
    pub error: Option<&'static str>,
}

/// `GET /`
///
/// Defaults to the first carrier. Storage failures are shown in the page
/// rather than failing the whole render.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let mut error = None;

    let carriers = match state.catalog.list_carriers().await {
        Ok(carriers) => carriers,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list carriers for page");
            error = Some(LIST_CARRIERS_ERROR);
            Vec::new()
        }
    };

    let selected_carrier = query
        .operadora
        .filter(|key| carriers.iter().any(|c| &c.value == key))
        .or_else(|| carriers.first().map(|c| c.value.clone()))
        .unwrap_or_default();

    let document = if selected_carrier.is_empty() {
        None
    } else {
        match state.catalog.fetch_carrier_plans(&selected_carrier).await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(carrier = %selected_carrier, error = %e, "Failed to load plans for page");
                error = Some(FETCH_PLANS_ERROR);
                None
            }
        }
    };
    let document = document.unwrap_or_default();

    let selected_plan = query
        .plano
        .as_deref()
        .and_then(|produto| document.plan(produto))
        .map(PlanView::from_plan);

    let template = IndexTemplate {
        carriers,
        selected_carrier,
        company: document.empresa.clone(),
        plans: document.planos.iter().map(|p| p.produto.clone()).collect(),
        selected_plan,
        error,
    };

    template
        .render()
        .map(Html)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to render page: {}", e)))
}
