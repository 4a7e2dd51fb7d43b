use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use serde_json::Value;
use tracing::error;

use crate::config::ClasificadorConfig;
use crate::shared::models::Prioridad;

/// Instrucción fija del sistema: una sola palabra de salida, o la frase de
/// rechazo para entradas no técnicas. El rechazo no se expone al caller:
/// la normalización lo resuelve en Baja como el resto de salidas sin
/// palabra clave.
const PROMPT_SISTEMA: &str = "Eres un asistente que clasifica incidencias técnicas.\n\
Responde con una sola palabra: Alta, Media o Baja.\n\
Si el texto no describe un problema técnico, responde \"Entrada inválida\".";

const TITULO_APP: &str = "Sistema de Tickets";

/// Cliente del servicio externo de clasificación de prioridades. Se crea
/// una vez al arranque y se comparte vía `AppState`.
pub struct ClasificadorPrioridad {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    referer: String,
}

impl ClasificadorPrioridad {
    pub fn new(config: &ClasificadorConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("no se pudo crear el cliente HTTP del clasificador")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            referer: config.referer.clone(),
        })
    }

    /// Clasifica una descripción de problema. Nunca falla hacia el caller:
    /// cualquier error de transporte, timeout o respuesta malformada se
    /// registra y resuelve en `Baja`.
    pub async fn clasificar(&self, descripcion: &str) -> Prioridad {
        match self.completar(descripcion).await {
            Ok(respuesta) => Prioridad::desde_respuesta(&respuesta),
            Err(e) => {
                error!("Error al clasificar con IA: {e:#}");
                Prioridad::Baja
            }
        }
    }

    async fn completar(&self, descripcion: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": PROMPT_SISTEMA },
                { "role": "user", "content": format!("Problema: {descripcion}") }
            ],
            "temperature": 0,
            "max_tokens": 10,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", TITULO_APP)
            .json(&body)
            .send()
            .await
            .context("fallo de transporte hacia el clasificador")?
            .error_for_status()
            .context("el clasificador devolvió un estado de error")?;

        let result: Value = response
            .json()
            .await
            .context("respuesta del clasificador no es JSON")?;

        let contenido = result["choices"][0]["message"]["content"]
            .as_str()
            .context("respuesta del clasificador sin contenido")?;

        Ok(contenido.to_string())
    }
}
