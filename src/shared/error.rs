use axum::{response::IntoResponse, Json};

/// Errores de las operaciones del API móvil. El cuerpo de error siempre es
/// `{"error": <mensaje>}` con el mensaje en español que espera la app.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl ApiError {
    /// Campos obligatorios ausentes o vacíos; se rechaza antes de tocar la base.
    pub fn faltan_campos() -> ApiError {
        ApiError::Validation("Faltan campos obligatorios".to_string())
    }
}

/// Campo numérico obligatorio del contrato móvil: ausente o cero cuenta
/// como faltante (la app nunca envía identificadores ni calificaciones 0).
pub fn campo_numerico(valor: Option<i32>) -> Result<i32, ApiError> {
    valor
        .filter(|v| *v != 0)
        .ok_or_else(ApiError::faltan_campos)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_codigos_de_estado() {
        let casos = [
            (ApiError::faltan_campos(), StatusCode::BAD_REQUEST),
            (
                ApiError::NotFound("Ticket no encontrado".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Unauthorized("Contraseña incorrecta".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Database("Error en el servidor".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, esperado) in casos {
            assert_eq!(error.into_response().status(), esperado);
        }
    }

    #[test]
    fn test_campo_numerico_presente() {
        assert_eq!(campo_numerico(Some(5)).unwrap(), 5);
        assert_eq!(campo_numerico(Some(-1)).unwrap(), -1);
    }

    #[test]
    fn test_campo_numerico_ausente_o_cero() {
        assert!(matches!(campo_numerico(None), Err(ApiError::Validation(_))));
        assert!(matches!(
            campo_numerico(Some(0)),
            Err(ApiError::Validation(_))
        ));
    }
}
