// src/api/catalogo_cliente.rs
//
// Lecturas directas a la tabla `products` del almacenamiento administrado
// (interfaz PostgREST en `/rest/v1`). Solo se usa la clave pública.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::api_cliente::unir_url;
use super::api_error::ApiError;
use crate::productos::productos_structs::{ProductoCatalogo, ProductoResumen};

const TABLA_PRODUCTOS: &str = "/rest/v1/products";

#[derive(Clone)]
pub struct ClienteCatalogo {
    http: reqwest::Client,
    url: String,
    clave: String,
}

impl std::fmt::Debug for ClienteCatalogo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClienteCatalogo")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl ClienteCatalogo {
    pub fn new(url: &str, clave: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Conexion {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            clave: clave.to_string(),
        })
    }

    async fn consultar<T: DeserializeOwned>(
        &self,
        columnas: &str,
        orden: &str,
    ) -> Result<Vec<T>, ApiError> {
        let endpoint = format!("GET {TABLA_PRODUCTOS}?select={columnas}");
        let resp = self
            .http
            .get(unir_url(&self.url, TABLA_PRODUCTOS))
            .query(&[("select", columnas), ("order", orden)])
            .header("apikey", &self.clave)
            .bearer_auth(&self.clave)
            .send()
            .await
            .map_err(|e| ApiError::Conexion {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let cuerpo = resp.text().await.unwrap_or_default();
            tracing::warn!(%endpoint, status, "el almacenamiento respondió con error");
            return Err(ApiError::Respuesta { status, cuerpo });
        }

        resp.json().await.map_err(|e| ApiError::Decodificacion {
            endpoint,
            source: e,
        })
    }

    /// Productos del catálogo público, los más nuevos primero.
    pub async fn listar_catalogo(&self) -> Result<Vec<ProductoCatalogo>, ApiError> {
        self.consultar("id,nombre,precio_venta,imagen_url,descripcion", "id.desc")
            .await
    }

    /// Listado resumido para la administración.
    pub async fn listar_resumen(&self) -> Result<Vec<ProductoResumen>, ApiError> {
        self.consultar("id,nombre,stock,precio_venta", "id.asc").await
    }
}
