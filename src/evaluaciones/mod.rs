use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::shared::error::{campo_numerico, ApiError};
use crate::shared::models::{EstadoTicket, NuevaEvaluacion, ROL_EVALUADOR_USUARIO};
use crate::shared::schema::{tbl_evaluaciones, tbl_tickets};
use crate::shared::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegistrarEvaluacionRequest {
    pub id_ticket: Option<i32>,
    pub id_usuario: Option<i32>,
    pub calificacion: Option<i32>,
    pub comentario: Option<String>,
}

/// Registra la evaluación de un ticket cerrado. Dos pasos dependientes:
/// primero se confirma que el ticket pertenece al usuario y está "Cerrado",
/// solo entonces se inserta.
pub async fn registrar_evaluacion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegistrarEvaluacionRequest>,
) -> Result<Json<Value>, ApiError> {
    let id_ticket = campo_numerico(req.id_ticket)?;
    let id_usuario = campo_numerico(req.id_usuario)?;
    let calificacion = campo_numerico(req.calificacion)?;
    let comentario = req.comentario.filter(|s| !s.is_empty());

    let mut conn = state.conn.get().map_err(|e| {
        error!("Error al registrar evaluación: {e}");
        ApiError::Database("Error al registrar la evaluación".to_string())
    })?;

    let estado = tbl_tickets::table
        .filter(tbl_tickets::id_ticket.eq(id_ticket))
        .filter(tbl_tickets::id_usuario.eq(id_usuario))
        .select(tbl_tickets::estado)
        .first::<String>(&mut conn)
        .optional()
        .map_err(|e| {
            error!("Error al registrar evaluación: {e}");
            ApiError::Database("Error al registrar la evaluación".to_string())
        })?;

    confirmar_evaluable(estado)?;

    let nueva = NuevaEvaluacion {
        id_ticket,
        id_usuario,
        rol_evaluador: ROL_EVALUADOR_USUARIO,
        calificacion,
        comentario: comentario.as_deref(),
    };

    diesel::insert_into(tbl_evaluaciones::table)
        .values(&nueva)
        .execute(&mut conn)
        .map_err(|e| {
            error!("Error al registrar evaluación: {e}");
            ApiError::Database("Error al registrar la evaluación".to_string())
        })?;

    Ok(Json(json!({ "mensaje": "Evaluación registrada correctamente" })))
}

/// Compuerta previa al insert: sin fila para ese ticket y usuario no hay
/// evaluación posible, y solo un ticket "Cerrado" se puede evaluar.
fn confirmar_evaluable(estado: Option<String>) -> Result<(), ApiError> {
    let estado = estado.ok_or_else(|| {
        ApiError::NotFound("Ticket no encontrado o no pertenece al usuario".to_string())
    })?;

    if estado != EstadoTicket::Cerrado.as_str() {
        return Err(ApiError::Validation(
            "Solo se pueden evaluar tickets cerrados".to_string(),
        ));
    }

    Ok(())
}

/// Consulta consultiva previa al envío de una evaluación. Se degrada a
/// `evaluado: false` ante cualquier fallo para no bloquear a la app.
pub async fn verificar_evaluacion(
    State(state): State<Arc<AppState>>,
    Path((id_ticket, id_usuario)): Path<(i32, i32)>,
) -> Json<Value> {
    let evaluado = ya_evaluado(&state, id_ticket, id_usuario).unwrap_or_else(|e| {
        error!("Error al verificar evaluación: {e:#}");
        false
    });

    Json(json!({ "evaluado": evaluado }))
}

fn ya_evaluado(state: &AppState, id_ticket: i32, id_usuario: i32) -> anyhow::Result<bool> {
    let mut conn = state.conn.get()?;
    let total: i64 = tbl_evaluaciones::table
        .filter(tbl_evaluaciones::id_ticket.eq(id_ticket))
        .filter(tbl_evaluaciones::id_usuario.eq(id_usuario))
        .filter(tbl_evaluaciones::rol_evaluador.eq(ROL_EVALUADOR_USUARIO))
        .count()
        .get_result(&mut conn)?;
    Ok(total > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_con_comentario_opcional() {
        let req: RegistrarEvaluacionRequest =
            serde_json::from_str(r#"{"id_ticket":4,"id_usuario":2,"calificacion":5}"#).unwrap();
        assert_eq!(req.id_ticket, Some(4));
        assert_eq!(req.calificacion, Some(5));
        assert!(req.comentario.is_none());
    }

    #[test]
    fn test_request_completo() {
        let req: RegistrarEvaluacionRequest = serde_json::from_str(
            r#"{"id_ticket":4,"id_usuario":2,"calificacion":3,"comentario":"tardó mucho"}"#,
        )
        .unwrap();
        assert_eq!(req.comentario.as_deref(), Some("tardó mucho"));
    }

    #[test]
    fn test_ticket_ajeno_o_inexistente_no_es_evaluable() {
        // Sin fila para ese ticket y usuario se corta antes de insertar.
        assert!(matches!(
            confirmar_evaluable(None),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_solo_tickets_cerrados_son_evaluables() {
        assert!(matches!(
            confirmar_evaluable(Some("En proceso".to_string())),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            confirmar_evaluable(Some("Cancelado".to_string())),
            Err(ApiError::Validation(_))
        ));
        assert!(confirmar_evaluable(Some("Cerrado".to_string())).is_ok());
    }

    #[test]
    fn test_calificacion_cero_cuenta_como_faltante() {
        let req: RegistrarEvaluacionRequest =
            serde_json::from_str(r#"{"id_ticket":4,"id_usuario":2,"calificacion":0}"#).unwrap();
        assert!(campo_numerico(req.calificacion).is_err());
    }
}
