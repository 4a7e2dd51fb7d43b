use std::fmt;

use diesel::prelude::*;

use crate::shared::schema::{tbl_evaluaciones, tbl_tickets};

/// Prioridad sugerida por el clasificador al crear un ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prioridad {
    Alta,
    Media,
    Baja,
}

impl Prioridad {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prioridad::Alta => "Alta",
            Prioridad::Media => "Media",
            Prioridad::Baja => "Baja",
        }
    }

    /// Normaliza la respuesta cruda del modelo: minúsculas, sin puntuación,
    /// y búsqueda por contención en el orden alta, media, baja. Cualquier
    /// respuesta sin palabra clave (incluida la frase de rechazo
    /// "Entrada inválida") resuelve en Baja.
    pub fn desde_respuesta(respuesta: &str) -> Prioridad {
        let limpio: String = respuesta
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        if limpio.contains("alta") {
            Prioridad::Alta
        } else if limpio.contains("media") {
            Prioridad::Media
        } else if limpio.contains("baja") {
            Prioridad::Baja
        } else {
            Prioridad::Baja
        }
    }
}

impl fmt::Display for Prioridad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ciclo de vida de un ticket. Estado inicial siempre "En proceso".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstadoTicket {
    EnProceso,
    Cerrado,
    Cancelado,
}

impl EstadoTicket {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoTicket::EnProceso => "En proceso",
            EstadoTicket::Cerrado => "Cerrado",
            EstadoTicket::Cancelado => "Cancelado",
        }
    }

    /// Acepta exactamente los tres estados válidos; cualquier otro valor
    /// se rechaza antes de tocar la base.
    pub fn parse(valor: &str) -> Option<EstadoTicket> {
        match valor {
            "En proceso" => Some(EstadoTicket::EnProceso),
            "Cerrado" => Some(EstadoTicket::Cerrado),
            "Cancelado" => Some(EstadoTicket::Cancelado),
            _ => None,
        }
    }
}

impl fmt::Display for EstadoTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rol fijo con el que se registran las evaluaciones en este servicio.
pub const ROL_EVALUADOR_USUARIO: &str = "Usuario";

#[derive(Debug, Clone, Queryable)]
pub struct Usuario {
    pub id_usuario: i32,
    pub nombre: String,
    pub apellido: String,
    pub usuario: String,
    pub password: String,
    pub correo: String,
    pub id_rol: i32,
    pub id_area: Option<i32>,
    pub activo: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tbl_tickets)]
pub struct NuevoTicket<'a> {
    pub id_usuario: i32,
    pub id_area: i32,
    pub titulo: &'a str,
    pub descripcion_problema: &'a str,
    pub estado: &'a str,
    pub prioridad: &'a str,
}

impl<'a> NuevoTicket<'a> {
    /// Único constructor: todo ticket nace "En proceso", con la prioridad
    /// que haya resuelto el clasificador.
    pub fn para(
        id_usuario: i32,
        id_area: i32,
        titulo: &'a str,
        descripcion_problema: &'a str,
        prioridad: Prioridad,
    ) -> NuevoTicket<'a> {
        NuevoTicket {
            id_usuario,
            id_area,
            titulo,
            descripcion_problema,
            estado: EstadoTicket::EnProceso.as_str(),
            prioridad: prioridad.as_str(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tbl_evaluaciones)]
pub struct NuevaEvaluacion<'a> {
    pub id_ticket: i32,
    pub id_usuario: i32,
    pub rol_evaluador: &'a str,
    pub calificacion: i32,
    pub comentario: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prioridad_desde_respuesta_directa() {
        assert_eq!(Prioridad::desde_respuesta("Alta"), Prioridad::Alta);
        assert_eq!(Prioridad::desde_respuesta("Media"), Prioridad::Media);
        assert_eq!(Prioridad::desde_respuesta("Baja"), Prioridad::Baja);
    }

    #[test]
    fn test_prioridad_ignora_mayusculas_y_puntuacion() {
        assert_eq!(Prioridad::desde_respuesta("ALTA."), Prioridad::Alta);
        assert_eq!(Prioridad::desde_respuesta("\"Media\"\n"), Prioridad::Media);
        assert_eq!(Prioridad::desde_respuesta("  baja!  "), Prioridad::Baja);
    }

    #[test]
    fn test_prioridad_orden_de_desempate() {
        // "alta" se comprueba primero aunque aparezcan varias palabras clave.
        assert_eq!(
            Prioridad::desde_respuesta("podría ser alta o media"),
            Prioridad::Alta
        );
        assert_eq!(
            Prioridad::desde_respuesta("media, quizá baja"),
            Prioridad::Media
        );
    }

    #[test]
    fn test_prioridad_sin_palabra_clave_resuelve_baja() {
        assert_eq!(Prioridad::desde_respuesta(""), Prioridad::Baja);
        assert_eq!(Prioridad::desde_respuesta("Entrada inválida"), Prioridad::Baja);
        assert_eq!(
            Prioridad::desde_respuesta("no puedo clasificar esto"),
            Prioridad::Baja
        );
    }

    #[test]
    fn test_estado_parse_valores_validos() {
        assert_eq!(EstadoTicket::parse("En proceso"), Some(EstadoTicket::EnProceso));
        assert_eq!(EstadoTicket::parse("Cerrado"), Some(EstadoTicket::Cerrado));
        assert_eq!(EstadoTicket::parse("Cancelado"), Some(EstadoTicket::Cancelado));
    }

    #[test]
    fn test_estado_parse_rechaza_otros_valores() {
        assert_eq!(EstadoTicket::parse("cerrado"), None);
        assert_eq!(EstadoTicket::parse("Abierto"), None);
        assert_eq!(EstadoTicket::parse(""), None);
        assert_eq!(EstadoTicket::parse("En Proceso"), None);
    }

    #[test]
    fn test_nuevo_ticket_siempre_nace_en_proceso() {
        for prioridad in [Prioridad::Alta, Prioridad::Media, Prioridad::Baja] {
            let nuevo = NuevoTicket::para(1, 2, "No enciende", "El equipo no arranca", prioridad);
            assert_eq!(nuevo.estado, "En proceso");
            assert_eq!(nuevo.prioridad, prioridad.as_str());
        }
    }

    #[test]
    fn test_estado_display_coincide_con_la_base() {
        for estado in [
            EstadoTicket::EnProceso,
            EstadoTicket::Cerrado,
            EstadoTicket::Cancelado,
        ] {
            assert_eq!(EstadoTicket::parse(estado.as_str()), Some(estado));
        }
    }
}
