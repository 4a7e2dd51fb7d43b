//! Endpoint raíz y sonda de conectividad a la base.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use tracing::error;

use crate::shared::state::AppState;

pub async fn raiz() -> &'static str {
    "API móvil de Tickets corriendo correctamente 🚀"
}

/// Única operación que devuelve el detalle crudo del error de la base al
/// cliente; el resto de endpoints responde con mensajes genéricos.
pub async fn test_db(State(state): State<Arc<AppState>>) -> Response {
    match fecha_servidor(&state) {
        Ok(fecha) => Json(serde_json::json!({
            "conexion": "exitosa",
            "fecha_servidor": fecha,
        }))
        .into_response(),
        Err(e) => {
            error!("Error de conexión: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "No se pudo conectar a la base de datos",
                    "detalle": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

fn fecha_servidor(state: &AppState) -> anyhow::Result<NaiveDateTime> {
    let mut conn = state.conn.get()?;
    let fecha = diesel::select(diesel::dsl::now).get_result::<NaiveDateTime>(&mut conn)?;
    Ok(fecha)
}
