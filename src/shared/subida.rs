// src/shared/subida.rs

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};
use thiserror::Error;

/// Tamaño máximo aceptado para una imagen de producto (5MB).
pub const TAMANO_MAXIMO_IMAGEN: usize = 5 * 1024 * 1024;

/// Archivo recibido del navegador, listo para reenviarse al backend.
#[derive(Debug, Clone)]
pub struct ArchivoSubido {
    pub nombre: String,
    pub tipo: String,
    pub bytes: Vec<u8>,
}

/// Campos de texto y, como mucho, un archivo de un formulario multipart.
#[derive(Debug, Default)]
pub struct FormularioMultipart {
    pub campos: HashMap<String, String>,
    pub archivo: Option<ArchivoSubido>,
    /// El archivo superó el tamaño máximo y se descartó.
    pub archivo_excedido: bool,
}

impl FormularioMultipart {
    /// Error a mostrar junto al campo de imagen, si lo hay.
    pub fn error_archivo(&self) -> Option<SubidaError> {
        self.archivo_excedido
            .then_some(SubidaError::ImagenDemasiadoGrande)
    }
}

#[derive(Debug, Error)]
pub enum SubidaError {
    #[error("La imagen no debe superar los 5MB.")]
    ImagenDemasiadoGrande,
    #[error("Formulario inválido: {0}")]
    Multipart(String),
}

/// Lee todo el formulario. El campo `campo_archivo` se trata como archivo;
/// un input de archivo vacío (sin nombre o sin bytes) cuenta como ausente y
/// uno de más de 5MB se descarta marcando `archivo_excedido`.
pub async fn leer_formulario(
    mut carga: Multipart,
    campo_archivo: &str,
) -> Result<FormularioMultipart, SubidaError> {
    let mut formulario = FormularioMultipart::default();

    while let Some(campo) = carga.next().await {
        let mut campo = campo.map_err(|e| SubidaError::Multipart(e.to_string()))?;

        let disposicion = campo.content_disposition();
        let nombre = disposicion.get_name().unwrap_or_default().to_string();
        let nombre_archivo = disposicion.get_filename().map(str::to_string);
        let tipo = campo
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let limite = if nombre == campo_archivo {
            TAMANO_MAXIMO_IMAGEN
        } else {
            // Campos de texto: bastante más que cualquier descripción razonable
            64 * 1024
        };

        let mut bytes = Vec::new();
        let mut excedido = false;
        while let Some(trozo) = campo
            .try_next()
            .await
            .map_err(|e| SubidaError::Multipart(e.to_string()))?
        {
            if excedido {
                // Se sigue leyendo para llegar a los campos que vienen después
                continue;
            }
            if bytes.len() + trozo.len() > limite {
                if nombre != campo_archivo {
                    return Err(SubidaError::Multipart(format!(
                        "el campo {nombre} es demasiado largo"
                    )));
                }
                excedido = true;
                bytes = Vec::new();
                continue;
            }
            bytes.extend_from_slice(&trozo);
        }

        if nombre == campo_archivo && excedido {
            formulario.archivo_excedido = true;
        } else if nombre == campo_archivo {
            let nombre_archivo = nombre_archivo.unwrap_or_default();
            if !nombre_archivo.is_empty() && !bytes.is_empty() {
                formulario.archivo = Some(ArchivoSubido {
                    nombre: nombre_archivo,
                    tipo,
                    bytes,
                });
            }
        } else {
            let texto = String::from_utf8(bytes)
                .map_err(|_| SubidaError::Multipart(format!("el campo {nombre} no es UTF-8")))?;
            formulario.campos.insert(nombre, texto);
        }
    }

    Ok(formulario)
}
