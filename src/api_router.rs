//! Router central: todas las rutas del API móvil en un solo lugar.

use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;

use crate::shared::state::AppState;

pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(crate::health::raiz))
        .route("/movil/login", post(crate::auth::login))
        .route(
            "/movil/tickets/usuario/:id_usuario",
            get(crate::tickets::tickets_por_usuario),
        )
        .route(
            "/movil/tickets/tecnico/:id_tecnico",
            get(crate::tickets::tickets_por_tecnico),
        )
        .route("/movil/tickets", post(crate::tickets::crear_ticket))
        .route(
            "/movil/tickets/:id_ticket/estado",
            put(crate::tickets::actualizar_estado),
        )
        .route(
            "/movil/usuario/:id_usuario",
            put(crate::auth::actualizar_usuario),
        )
        .route("/movil/test-db", get(crate::health::test_db))
        .route(
            "/movil/evaluaciones",
            post(crate::evaluaciones::registrar_evaluacion),
        )
        .route(
            "/movil/evaluaciones/verificar/:id_ticket/:id_usuario",
            get(crate::evaluaciones::verificar_evaluacion),
        )
}
