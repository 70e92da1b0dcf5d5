// src/shared/shared_structs.rs

use serde::Serialize;

/// Estructura genérica para las respuestas JSON del frontend.
/// 'T' es el tipo del cuerpo de la respuesta, que puede ser opcional.
#[derive(Serialize)]
pub struct GenericResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")] // No serializa 'body' si es None
    pub body: Option<T>,
}

impl<T> GenericResponse<T> {
    pub fn exito(message: impl Into<String>, body: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            body: Some(body),
        }
    }
}
