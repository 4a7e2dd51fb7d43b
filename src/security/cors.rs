use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// Decide si un origen declarado puede usar el API: lista fija de orígenes
/// permitidos más un sufijo de dominio de confianza (la zona de subdominios
/// de la plataforma cloud). Las peticiones sin cabecera `Origin` pasan
/// siempre (clientes nativos o mismo origen).
#[derive(Debug, Clone)]
pub struct OriginValidator {
    allowed_origins: Vec<String>,
    trusted_suffix: String,
}

impl OriginValidator {
    pub fn new(allowed_origins: Vec<String>, trusted_suffix: impl Into<String>) -> Self {
        Self {
            allowed_origins,
            trusted_suffix: trusted_suffix.into(),
        }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        if self.allowed_origins.iter().any(|o| o == origin) {
            return true;
        }
        if let Some(host) = extract_host(origin) {
            if host.ends_with(&self.trusted_suffix) {
                return true;
            }
        }
        false
    }
}

fn extract_host(origin: &str) -> Option<&str> {
    let without_scheme = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))?;

    Some(without_scheme.split(':').next().unwrap_or(without_scheme))
}

/// Cabeceras CORS de las respuestas permitidas: métodos y cabeceras que usa
/// la app móvil, con credenciales habilitadas.
pub fn create_cors_layer(validator: OriginValidator) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts| {
                origin
                    .to_str()
                    .map(|o| validator.is_allowed(o))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Corta las peticiones de orígenes no permitidos antes de llegar a
/// cualquier handler, registrando el origen rechazado.
pub async fn origin_gate(validator: OriginValidator, req: Request, next: Next) -> Response {
    let Some(origin) = req.headers().get(header::ORIGIN) else {
        return next.run(req).await;
    };

    let permitido = origin
        .to_str()
        .map(|o| validator.is_allowed(o))
        .unwrap_or(false);

    if permitido {
        next.run(req).await
    } else {
        warn!("CORS bloqueado para origen: {:?}", origin);
        (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "CORS no permitido" })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> OriginValidator {
        OriginValidator::new(
            vec!["http://localhost:8100".to_string()],
            ".azurewebsites.net",
        )
    }

    #[test]
    fn test_origen_en_lista_permitida() {
        assert!(validator().is_allowed("http://localhost:8100"));
    }

    #[test]
    fn test_sufijo_de_confianza() {
        let v = validator();
        assert!(v.is_allowed("https://mi-app.azurewebsites.net"));
        assert!(v.is_allowed("https://otra.azurewebsites.net:8443"));
    }

    #[test]
    fn test_origen_desconocido_rechazado() {
        let v = validator();
        assert!(!v.is_allowed("https://evil.com"));
        assert!(!v.is_allowed("http://localhost:4200"));
        // El sufijo aplica al host, no a cualquier parte del origen.
        assert!(!v.is_allowed("https://azurewebsites.net.evil.com"));
    }

    #[test]
    fn test_extract_host() {
        assert_eq!(
            extract_host("https://mi-app.azurewebsites.net"),
            Some("mi-app.azurewebsites.net")
        );
        assert_eq!(extract_host("http://localhost:8100"), Some("localhost"));
        assert_eq!(extract_host("sin-esquema"), None);
    }

    #[test]
    fn test_build_cors_layer() {
        let _layer = create_cors_layer(validator());
    }
}
