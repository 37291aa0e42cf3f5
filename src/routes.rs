// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app_router(app_state: AppState) -> Router {
    // Tudo que está aqui exige Bearer token
    let protected_routes = Router::new()
        // Cobranças
        .route(
            "/api/accounts",
            get(handlers::accounts::list_accounts).post(handlers::accounts::create_account),
        )
        .route("/api/accounts/summary", get(handlers::accounts::accounts_summary))
        .route("/api/accounts/{id}", get(handlers::accounts::get_account))
        .route("/api/accounts/{id}/settle", post(handlers::accounts::settle_account))
        // Ações
        .route(
            "/api/accounts/{id}/actions",
            post(handlers::actions::record_action).get(handlers::actions::list_actions),
        )
        .route("/api/actions/reconcile", post(handlers::actions::reconcile_actions))
        // Quadro
        .route("/api/board", get(handlers::board::get_board))
        .route("/api/board/{account_id}", put(handlers::board::move_account))
        // Distribuição (admin)
        .route("/api/distribution/agents", get(handlers::distribution::list_agents))
        .route("/api/distribution/agents/{id}/load", get(handlers::distribution::agent_load))
        .route("/api/distribution/assign", post(handlers::distribution::assign_batch))
        .route("/api/distribution/redistribute", post(handlers::distribution::redistribute))
        // Importação (admin)
        .route("/api/import/google-sheets", post(handlers::import::import_google_sheet))
        // Automação
        .route(
            "/api/automation-rules",
            get(handlers::automation::list_rules).post(handlers::automation::create_rule),
        )
        .route(
            "/api/automation-rules/{id}",
            put(handlers::automation::update_rule).delete(handlers::automation::delete_rule),
        )
        .route("/api/automation-rules/{id}/active", patch(handlers::automation::toggle_rule))
        .route(
            "/api/automation-rules/matches/{account_id}",
            get(handlers::automation::matching_rules),
        )
        // Régua de cobrança
        .route(
            "/api/cadence",
            get(handlers::cadence::list_messages).post(handlers::cadence::create_message),
        )
        .route(
            "/api/cadence/{id}",
            put(handlers::cadence::update_message).delete(handlers::cadence::delete_message),
        )
        .route("/api/cadence/{id}/active", patch(handlers::cadence::toggle_message))
        // Produtividade
        .route("/api/daily-metrics", get(handlers::metrics::list_metrics))
        .route(
            "/api/daily-metrics/{date}",
            get(handlers::metrics::get_day).put(handlers::metrics::update_day),
        )
        .route("/api/daily-metrics/{date}/contacts", post(handlers::metrics::adjust_contacts))
        .route("/api/daily-metrics/records/{id}", delete(handlers::metrics::delete_metric))
        // PIX
        .route(
            "/api/pix",
            get(handlers::pix::list_charges).post(handlers::pix::create_charge),
        )
        .route("/api/pix/{id}", delete(handlers::pix::delete_charge))
        .route("/api/pix/{id}/status", put(handlers::pix::set_charge_status))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
