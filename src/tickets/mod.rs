use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::shared::error::{campo_numerico, ApiError};
use crate::shared::models::{EstadoTicket, NuevoTicket};
use crate::shared::schema::{tbl_areas, tbl_tickets, tbl_usuarios};
use crate::shared::state::AppState;

#[derive(Debug, Serialize)]
pub struct TicketResumen {
    pub id: i32,
    pub titulo: String,
    pub descripcion: String,
    pub estado: String,
    pub prioridad: String,
    pub fecha_creacion: DateTime<Utc>,
}

/// Fila del listado de un técnico: el resumen más los datos del usuario
/// que abrió el ticket y su área (puede no tener área asignada).
#[derive(Debug, Serialize)]
pub struct TicketAsignado {
    pub id: i32,
    pub titulo: String,
    pub descripcion: String,
    pub estado: String,
    pub prioridad: String,
    pub fecha_creacion: DateTime<Utc>,
    pub id_usuario: i32,
    pub nombre_usuario: String,
    pub apellido_usuario: String,
    pub area_usuario: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CrearTicketRequest {
    pub id_usuario: Option<i32>,
    pub id_area: Option<i32>,
    pub titulo: Option<String>,
    pub descripcion_problema: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CambiarEstadoRequest {
    #[serde(rename = "nuevoEstado")]
    pub nuevo_estado: Option<String>,
}

pub async fn tickets_por_usuario(
    State(state): State<Arc<AppState>>,
    Path(id_usuario): Path<i32>,
) -> Result<Json<Vec<TicketResumen>>, ApiError> {
    let mut conn = state.conn.get().map_err(|e| {
        error!("Error al obtener tickets del usuario: {e}");
        ApiError::Database("Error al obtener tickets".to_string())
    })?;

    let filas = tbl_tickets::table
        .filter(tbl_tickets::id_usuario.eq(id_usuario))
        .order(tbl_tickets::fecha_creacion.desc())
        .select((
            tbl_tickets::id_ticket,
            tbl_tickets::titulo,
            tbl_tickets::descripcion_problema,
            tbl_tickets::estado,
            tbl_tickets::prioridad,
            tbl_tickets::fecha_creacion,
        ))
        .load::<(i32, String, String, String, String, DateTime<Utc>)>(&mut conn)
        .map_err(|e| {
            error!("Error al obtener tickets del usuario: {e}");
            ApiError::Database("Error al obtener tickets".to_string())
        })?;

    let tickets = filas
        .into_iter()
        .map(
            |(id, titulo, descripcion, estado, prioridad, fecha_creacion)| TicketResumen {
                id,
                titulo,
                descripcion,
                estado,
                prioridad,
                fecha_creacion,
            },
        )
        .collect();

    Ok(Json(tickets))
}

pub async fn tickets_por_tecnico(
    State(state): State<Arc<AppState>>,
    Path(id_tecnico): Path<i32>,
) -> Result<Json<Vec<TicketAsignado>>, ApiError> {
    let mut conn = state.conn.get().map_err(|e| {
        error!("Error al obtener tickets del técnico: {e}");
        ApiError::Database("Error al obtener tickets del técnico".to_string())
    })?;

    let filas = tbl_tickets::table
        .inner_join(tbl_usuarios::table.left_join(tbl_areas::table))
        .filter(tbl_tickets::id_tecnico.eq(id_tecnico))
        .order(tbl_tickets::fecha_creacion.desc())
        .select((
            tbl_tickets::id_ticket,
            tbl_tickets::titulo,
            tbl_tickets::descripcion_problema,
            tbl_tickets::estado,
            tbl_tickets::prioridad,
            tbl_tickets::fecha_creacion,
            tbl_usuarios::id_usuario,
            tbl_usuarios::nombre,
            tbl_usuarios::apellido,
            tbl_areas::nombre_area.nullable(),
        ))
        .load::<(
            i32,
            String,
            String,
            String,
            String,
            DateTime<Utc>,
            i32,
            String,
            String,
            Option<String>,
        )>(&mut conn)
        .map_err(|e| {
            error!("Error al obtener tickets del técnico: {e}");
            ApiError::Database("Error al obtener tickets del técnico".to_string())
        })?;

    let tickets = filas
        .into_iter()
        .map(
            |(
                id,
                titulo,
                descripcion,
                estado,
                prioridad,
                fecha_creacion,
                id_usuario,
                nombre_usuario,
                apellido_usuario,
                area_usuario,
            )| TicketAsignado {
                id,
                titulo,
                descripcion,
                estado,
                prioridad,
                fecha_creacion,
                id_usuario,
                nombre_usuario,
                apellido_usuario,
                area_usuario,
            },
        )
        .collect();

    Ok(Json(tickets))
}

pub async fn crear_ticket(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CrearTicketRequest>,
) -> Result<Json<Value>, ApiError> {
    let id_usuario = campo_numerico(req.id_usuario)?;
    let id_area = campo_numerico(req.id_area)?;
    let titulo = req
        .titulo
        .filter(|s| !s.is_empty())
        .ok_or_else(ApiError::faltan_campos)?;
    let descripcion = req
        .descripcion_problema
        .filter(|s| !s.is_empty())
        .ok_or_else(ApiError::faltan_campos)?;

    // La clasificación nunca falla hacia aquí: cualquier error del servicio
    // externo ya resolvió en Baja dentro del clasificador.
    let prioridad = state.clasificador.clasificar(&descripcion).await;

    let mut conn = state.conn.get().map_err(|e| {
        error!("Error al crear ticket: {e}");
        ApiError::Database("Error al crear el ticket".to_string())
    })?;

    let nuevo = NuevoTicket::para(id_usuario, id_area, &titulo, &descripcion, prioridad);

    diesel::insert_into(tbl_tickets::table)
        .values(&nuevo)
        .execute(&mut conn)
        .map_err(|e| {
            error!("Error al crear ticket: {e}");
            ApiError::Database("Error al crear el ticket".to_string())
        })?;

    Ok(Json(json!({
        "mensaje": "Ticket creado correctamente",
        "prioridad_asignada": prioridad.as_str(),
    })))
}

/// Cambia el estado de un ticket. "Cerrado" fija la fecha de cierre;
/// cualquier otra transición la limpia a NULL.
pub async fn actualizar_estado(
    State(state): State<Arc<AppState>>,
    Path(id_ticket): Path<i32>,
    Json(req): Json<CambiarEstadoRequest>,
) -> Result<Json<Value>, ApiError> {
    let estado = req
        .nuevo_estado
        .as_deref()
        .and_then(EstadoTicket::parse)
        .ok_or_else(|| ApiError::Validation("Estado inválido".to_string()))?;

    let mut conn = state.conn.get().map_err(|e| {
        error!("Error al actualizar estado del ticket: {e}");
        ApiError::Database("Error al actualizar el estado del ticket".to_string())
    })?;

    let afectadas = diesel::update(tbl_tickets::table.filter(tbl_tickets::id_ticket.eq(id_ticket)))
        .set((
            tbl_tickets::estado.eq(estado.as_str()),
            tbl_tickets::fecha_cierre.eq(fecha_cierre_para(estado)),
        ))
        .execute(&mut conn)
        .map_err(|e| {
            error!("Error al actualizar estado del ticket: {e}");
            ApiError::Database("Error al actualizar el estado del ticket".to_string())
        })?;

    if afectadas == 0 {
        return Err(ApiError::NotFound("Ticket no encontrado".to_string()));
    }

    Ok(Json(json!({
        "mensaje": format!("Ticket actualizado a estado: {}", estado.as_str()),
    })))
}

/// Solo "Cerrado" lleva fecha de cierre; reabrir o cancelar la deja en NULL.
fn fecha_cierre_para(estado: EstadoTicket) -> Option<DateTime<Utc>> {
    if estado == EstadoTicket::Cerrado {
        Some(Utc::now())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cambiar_estado_usa_nombre_del_contrato() {
        let req: CambiarEstadoRequest =
            serde_json::from_str(r#"{"nuevoEstado":"Cerrado"}"#).unwrap();
        assert_eq!(req.nuevo_estado.as_deref(), Some("Cerrado"));
    }

    #[test]
    fn test_crear_ticket_request_con_campos_faltantes() {
        let req: CrearTicketRequest =
            serde_json::from_str(r#"{"id_usuario":1,"titulo":"No enciende"}"#).unwrap();
        assert_eq!(req.id_usuario, Some(1));
        assert!(req.id_area.is_none());
        assert!(req.descripcion_problema.is_none());
    }

    #[test]
    fn test_cerrado_fija_fecha_de_cierre() {
        assert!(fecha_cierre_para(EstadoTicket::Cerrado).is_some());
    }

    #[test]
    fn test_otras_transiciones_limpian_fecha_de_cierre() {
        assert!(fecha_cierre_para(EstadoTicket::EnProceso).is_none());
        assert!(fecha_cierre_para(EstadoTicket::Cancelado).is_none());
    }

    #[test]
    fn test_crear_ticket_ids_cero_cuentan_como_faltantes() {
        let req: CrearTicketRequest = serde_json::from_str(
            r#"{"id_usuario":0,"id_area":3,"titulo":"t","descripcion_problema":"d"}"#,
        )
        .unwrap();
        assert!(campo_numerico(req.id_usuario).is_err());
        assert!(campo_numerico(req.id_area).is_ok());
    }

    #[test]
    fn test_ticket_resumen_serializa_contrato() {
        let ticket = TicketResumen {
            id: 7,
            titulo: "No enciende el monitor".into(),
            descripcion: "El monitor no enciende desde ayer".into(),
            estado: "En proceso".into(),
            prioridad: "Alta".into(),
            fecha_creacion: Utc::now(),
        };
        let valor = serde_json::to_value(&ticket).unwrap();
        assert_eq!(valor["id"], 7);
        assert_eq!(valor["estado"], "En proceso");
        assert!(valor.get("fecha_creacion").is_some());
    }

    #[test]
    fn test_ticket_asignado_area_nula() {
        let ticket = TicketAsignado {
            id: 1,
            titulo: "t".into(),
            descripcion: "d".into(),
            estado: "Cerrado".into(),
            prioridad: "Baja".into(),
            fecha_creacion: Utc::now(),
            id_usuario: 3,
            nombre_usuario: "Ana".into(),
            apellido_usuario: "Paredes".into(),
            area_usuario: None,
        };
        let valor = serde_json::to_value(&ticket).unwrap();
        assert!(valor["area_usuario"].is_null());
    }
}
