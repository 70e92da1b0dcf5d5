// src/api/api_error.rs

use thiserror::Error;

/// Errores de las llamadas al backend y al almacenamiento.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No hubo respuesta (conexión rechazada, timeout, DNS...).
    #[error("No se pudo conectar con {endpoint}: {source}")]
    Conexion {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// El backend respondió con un estado distinto de 2xx.
    #[error("Error {status}: {cuerpo}")]
    Respuesta { status: u16, cuerpo: String },

    #[error("Respuesta inesperada de {endpoint}: {source}")]
    Decodificacion {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Usuario o contraseña incorrecta")]
    CredencialesInvalidas,

    #[error("Rol desconocido: {0}")]
    RolDesconocido(String),

    #[error("{0}")]
    NoEncontrado(String),

    #[error("{0}")]
    NoPermitido(String),

    #[error("{0}")]
    Subida(String),

    #[error("{0}")]
    Registro(String),

    /// La petición no se pudo armar (URL inválida, cabecera inválida...).
    #[error("Petición inválida: {0}")]
    Peticion(String),
}

impl ApiError {
    /// Texto para mostrar en la página: el cuerpo devuelto por el backend si
    /// lo hay, o un mensaje genérico con el estado.
    pub fn mensaje(&self) -> String {
        match self {
            ApiError::Respuesta { status, cuerpo } if cuerpo.trim().is_empty() => {
                format!("Error {status}")
            }
            ApiError::Respuesta { cuerpo, .. } => cuerpo.clone(),
            otro => otro.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Respuesta { status, .. } => Some(*status),
            _ => None,
        }
    }
}
