use tracing::warn;

/// Coste de bcrypt usado al re-encriptar contraseñas (las filas existentes
/// fueron generadas con 10 rondas de sal).
const BCRYPT_COST: u32 = 10;

/// Compara una contraseña candidata con el valor almacenado. Las filas
/// nuevas llevan hash bcrypt (`$2b$`/`$2a$`); las heredadas guardan la
/// contraseña en claro y se comparan por igualdad, camino inseguro que se
/// conserva por compatibilidad. Nunca propaga errores: un hash ilegible
/// cuenta como no coincidencia.
pub fn verify_password(candidata: &str, almacenada: &str) -> bool {
    if almacenada.starts_with("$2b$") || almacenada.starts_with("$2a$") {
        bcrypt::verify(candidata, almacenada).unwrap_or_else(|e| {
            warn!("hash bcrypt ilegible: {e}");
            false
        })
    } else {
        candidata == almacenada
    }
}

pub fn hash_password(contrasena: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(contrasena, BCRYPT_COST)
}
