use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::ClasificadorPrioridad;
use crate::shared::utils::DbPool;

/// Estado compartido entre peticiones: el pool de conexiones, la
/// configuración cargada al arranque y el cliente del clasificador.
/// No hay más estado mutable compartido entre peticiones.
pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub clasificador: Arc<ClasificadorPrioridad>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            config: self.config.clone(),
            clasificador: Arc::clone(&self.clasificador),
        }
    }
}
