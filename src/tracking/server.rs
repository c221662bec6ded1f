use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{any, get},
};
use serde::Serialize;
use serde_json::json;

use std::net::SocketAddr;

use crate::{
    config::Config,
    tracking::{
        AppState,
        error::{Result, TrackingError},
        middleware::{observability, request_id},
        params::{Shipment, ShipmentQuery},
    },
};

pub const NEXT_TRACKING_NUMBER_PATH: &str = "/next-tracking-number";

#[derive(Debug, Serialize)]
pub struct TrackingNumberResponse {
    pub tracking_number: String,
    #[serde(flatten)]
    pub shipment: Shipment,
}

pub struct TrackingServer {
    config: Config,
}

impl TrackingServer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn start(&self) -> Result<()> {
        let app_state: AppState = self
            .config
            .clone()
            .try_into()
            .inspect_err(|err| tracing::error!(%err, "failed to open tracking number store"))?;
        let issued = app_state.issuer.store().count()?;
        tracing::info!(
            path = %self.config.storage.path.display(),
            issued,
            "tracking number store ready"
        );

        let app = Self::router(app_state);

        let addr = self.config.server.address.parse::<SocketAddr>()?;
        tracing::info!("Server listening on {}", addr);

        axum_server::bind(addr)
            .serve(app.into_make_service())
            .await?;

        Ok(())
    }

    pub fn router(app_state: AppState) -> Router {
        Router::new()
            .route(NEXT_TRACKING_NUMBER_PATH, get(Self::next_tracking_number))
            .route("/health", any(Self::health))
            .fallback(any(Self::fallback))
            .with_state(app_state)
            .layer(middleware::from_fn(observability))
            .layer(middleware::from_fn(request_id))
    }

    async fn next_tracking_number(
        State(state): State<AppState>,
        query: std::result::Result<Query<ShipmentQuery>, QueryRejection>,
    ) -> Result<Json<TrackingNumberResponse>> {
        let Query(query) =
            query.map_err(|rejection| TrackingError::Validation(rejection.body_text()))?;
        let shipment = query
            .validate()
            .inspect_err(|err| tracing::debug!(%err, "rejected tracking number request"))?;

        let issuer = state.issuer.clone();
        let attributes = shipment.clone();
        let tracking_number =
            tokio::task::spawn_blocking(move || issuer.issue(attributes.hash_inputs())).await??;

        tracing::info!(
            tracking_number = %tracking_number,
            customer_id = %shipment.customer_id,
            "issued tracking number"
        );

        Ok(Json(TrackingNumberResponse {
            tracking_number,
            shipment,
        }))
    }

    async fn fallback() -> impl IntoResponse {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
    }

    async fn health() -> impl IntoResponse {
        (StatusCode::OK, "ok")
    }
}
