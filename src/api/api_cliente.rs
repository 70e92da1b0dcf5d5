// src/api/api_cliente.rs
//
// Cliente del backend REST. Cada página crea una copia con el token de la
// sesión (`con_token`), así el `reqwest::Client` y su pool se comparten.

use std::time::Duration;

use reqwest::{multipart, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::api_error::ApiError;
use crate::categorias::categoria_structs::{Categoria, NuevaCategoria};
use crate::inventario::inventario_structs::ActualizacionProducto;
use crate::pedidos::pedidos_structs::{CambioEstado, EstadoPedido, NuevoPedido, Pedido};
use crate::productos::productos_structs::{NuevoProducto, Producto};
use crate::shared::subida::ArchivoSubido;
use crate::usuarios::usuario_structs::{Credenciales, RespuestaLogin, Sesion};

pub const MSG_PRODUCTO_NO_ENCONTRADO: &str = "Producto no encontrado.";
pub const MSG_DELETE_NO_PERMITIDO: &str = "DELETE no permitido en backend.";
pub const MSG_REGISTRO: &str = "Error al crear cuenta";

/// Respuesta de `POST /api/storage/upload`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RespuestaSubida {
    file_download_uri: String,
}

/// Une la URL base y la ruta con exactamente una barra entre ambas.
pub fn unir_url(base: &str, ruta: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        ruta.trim_start_matches('/')
    )
}

/// Saca el mensaje de un cuerpo de error: campo `message` o `error` si es
/// JSON, o el texto tal cual. `None` si el cuerpo está vacío.
pub fn mensaje_de_cuerpo(cuerpo: &str) -> Option<String> {
    if let Ok(valor) = serde_json::from_str::<serde_json::Value>(cuerpo) {
        for campo in ["message", "error"] {
            if let Some(texto) = valor.get(campo).and_then(|v| v.as_str()) {
                if !texto.trim().is_empty() {
                    return Some(texto.to_string());
                }
            }
        }
    }
    let cuerpo = cuerpo.trim();
    (!cuerpo.is_empty()).then(|| cuerpo.to_string())
}

#[derive(Debug, Clone)]
pub struct ClienteApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ClienteApi {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Conexion {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Copia del cliente que envía `Authorization: Bearer <token>`.
    pub fn con_token(&self, token: &str) -> Self {
        Self {
            token: Some(token.to_string()).filter(|t| !t.is_empty()),
            ..self.clone()
        }
    }

    fn url(&self, ruta: &str) -> String {
        unir_url(&self.base_url, ruta)
    }

    fn autorizar(&self, peticion: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => peticion.bearer_auth(token),
            None => peticion,
        }
    }

    /// Envía la petición y convierte cualquier estado no 2xx en
    /// [`ApiError::Respuesta`] con el texto del cuerpo.
    async fn enviar(&self, endpoint: &str, peticion: RequestBuilder) -> Result<Response, ApiError> {
        let resp = self
            .autorizar(peticion)
            .send()
            .await
            .map_err(|e| ApiError::Conexion {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let cuerpo = resp.text().await.unwrap_or_default();
            tracing::warn!(endpoint, status, "el backend respondió con error");
            return Err(ApiError::Respuesta { status, cuerpo });
        }

        Ok(resp)
    }

    async fn enviar_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        peticion: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = self.enviar(endpoint, peticion).await?;
        resp.json().await.map_err(|e| ApiError::Decodificacion {
            endpoint: endpoint.into(),
            source: e,
        })
    }

    // -- Autenticación ---------------------------------------------------------

    /// `POST /api/auth/login`. Cualquier rechazo del backend se reporta como
    /// credenciales inválidas.
    pub async fn login(&self, credenciales: &Credenciales) -> Result<Sesion, ApiError> {
        let endpoint = "POST /api/auth/login";
        let peticion = self.http.post(self.url("/api/auth/login")).json(credenciales);

        let respuesta: RespuestaLogin = match self.enviar_json(endpoint, peticion).await {
            Ok(r) => r,
            Err(ApiError::Respuesta { .. }) => return Err(ApiError::CredencialesInvalidas),
            Err(e) => return Err(e),
        };

        if respuesta.token.trim().is_empty() {
            return Err(ApiError::CredencialesInvalidas);
        }
        let rol = respuesta.rol().map_err(ApiError::RolDesconocido)?;

        Ok(Sesion {
            token: respuesta.token,
            rol,
        })
    }

    /// `POST /api/auth/register`.
    pub async fn registrar(&self, credenciales: &Credenciales) -> Result<(), ApiError> {
        let endpoint = "POST /api/auth/register";
        let peticion = self.http.post(self.url("/api/auth/register")).json(credenciales);

        match self.enviar(endpoint, peticion).await {
            Ok(_) => Ok(()),
            Err(ApiError::Respuesta { cuerpo, .. }) => Err(ApiError::Registro(
                mensaje_de_cuerpo(&cuerpo).unwrap_or_else(|| MSG_REGISTRO.to_string()),
            )),
            Err(e) => Err(e),
        }
    }

    // -- Categorías --------------------------------------------------------------

    pub async fn listar_categorias(&self) -> Result<Vec<Categoria>, ApiError> {
        let peticion = self.http.get(self.url("/api/categorias"));
        self.enviar_json("GET /api/categorias", peticion).await
    }

    pub async fn crear_categoria(&self, nombre: &str) -> Result<Categoria, ApiError> {
        let cuerpo = NuevaCategoria {
            nombre: nombre.trim().to_string(),
        };
        let peticion = self.http.post(self.url("/api/categorias")).json(&cuerpo);
        self.enviar_json("POST /api/categorias", peticion).await
    }

    // -- Productos ---------------------------------------------------------------

    pub async fn listar_productos(&self) -> Result<Vec<Producto>, ApiError> {
        let peticion = self.http.get(self.url("/api/productos"));
        self.enviar_json("GET /api/productos", peticion).await
    }

    /// `POST /api/productos` con el cuerpo en snake_case.
    pub async fn crear_producto(&self, producto: &NuevoProducto) -> Result<(), ApiError> {
        let peticion = self.http.post(self.url("/api/productos")).json(producto);
        self.enviar("POST /api/productos", peticion).await?;
        Ok(())
    }

    /// `PUT /api/productos/{id}` con los campos ya combinados con el snapshot.
    pub async fn actualizar_producto(
        &self,
        id: i64,
        cambios: &ActualizacionProducto,
    ) -> Result<(), ApiError> {
        let endpoint = format!("PUT /api/productos/{id}");
        let peticion = self
            .http
            .put(self.url(&format!("/api/productos/{id}")))
            .json(cambios);
        self.enviar(&endpoint, peticion).await?;
        Ok(())
    }

    /// `DELETE /api/productos/{id}`. 404 y 405 tienen mensajes propios.
    pub async fn eliminar_producto(&self, id: i64) -> Result<(), ApiError> {
        let endpoint = format!("DELETE /api/productos/{id}");
        let peticion = self.http.delete(self.url(&format!("/api/productos/{id}")));

        match self.enviar(&endpoint, peticion).await {
            Ok(_) => Ok(()),
            Err(ApiError::Respuesta { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(ApiError::NoEncontrado(MSG_PRODUCTO_NO_ENCONTRADO.into()))
            }
            Err(ApiError::Respuesta { status, .. })
                if status == StatusCode::METHOD_NOT_ALLOWED.as_u16() =>
            {
                Err(ApiError::NoPermitido(MSG_DELETE_NO_PERMITIDO.into()))
            }
            Err(e) => Err(e),
        }
    }

    /// `POST /api/storage/upload` (multipart, campo `file`). Devuelve la URL
    /// pública de la imagen.
    pub async fn subir_imagen(&self, archivo: &ArchivoSubido) -> Result<String, ApiError> {
        let endpoint = "POST /api/storage/upload";
        let parte = multipart::Part::bytes(archivo.bytes.clone())
            .file_name(archivo.nombre.clone())
            .mime_str(&archivo.tipo)
            .map_err(|e| ApiError::Peticion(e.to_string()))?;
        let formulario = multipart::Form::new().part("file", parte);
        let peticion = self
            .http
            .post(self.url("/api/storage/upload"))
            .multipart(formulario);

        let respuesta: RespuestaSubida = match self.enviar_json(endpoint, peticion).await {
            Ok(r) => r,
            Err(ApiError::Respuesta { status, cuerpo }) => {
                return Err(ApiError::Subida(
                    mensaje_de_cuerpo(&cuerpo).unwrap_or_else(|| format!("Upload failed {status}")),
                ))
            }
            Err(e) => return Err(e),
        };

        tracing::info!(archivo = %archivo.nombre, bytes = archivo.bytes.len(), "imagen subida");
        Ok(respuesta.file_download_uri)
    }

    // -- Pedidos -----------------------------------------------------------------

    pub async fn listar_pedidos(&self) -> Result<Vec<Pedido>, ApiError> {
        let peticion = self.http.get(self.url("/api/pedidos"));
        self.enviar_json("GET /api/pedidos", peticion).await
    }

    pub async fn obtener_pedido(&self, id: i64) -> Result<Pedido, ApiError> {
        let endpoint = format!("GET /api/pedidos/{id}");
        let peticion = self.http.get(self.url(&format!("/api/pedidos/{id}")));
        self.enviar_json(&endpoint, peticion).await
    }

    pub async fn crear_pedido(&self, pedido: &NuevoPedido) -> Result<(), ApiError> {
        let peticion = self.http.post(self.url("/api/pedidos")).json(pedido);
        self.enviar("POST /api/pedidos", peticion).await?;
        Ok(())
    }

    pub async fn actualizar_estado_pedido(
        &self,
        id: i64,
        estado: EstadoPedido,
    ) -> Result<(), ApiError> {
        let endpoint = format!("PUT /api/pedidos/{id}/estado");
        let peticion = self
            .http
            .put(self.url(&format!("/api/pedidos/{id}/estado")))
            .json(&CambioEstado { estado });
        self.enviar(&endpoint, peticion).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn une_urls_sin_barras_dobles() {
        assert_eq!(unir_url("http://api:8080/", "/api/productos"), "http://api:8080/api/productos");
        assert_eq!(unir_url("http://api:8080", "api/productos"), "http://api:8080/api/productos");
    }

    #[test]
    fn mensaje_desde_json_o_texto() {
        assert_eq!(
            mensaje_de_cuerpo(r#"{"message":"Formato no soportado"}"#).as_deref(),
            Some("Formato no soportado")
        );
        assert_eq!(
            mensaje_de_cuerpo(r#"{"error":"Archivo vacío"}"#).as_deref(),
            Some("Archivo vacío")
        );
        assert_eq!(mensaje_de_cuerpo("disco lleno").as_deref(), Some("disco lleno"));
        assert_eq!(mensaje_de_cuerpo("  "), None);
    }

    #[test]
    fn con_token_ignora_token_vacio() {
        let cliente = ClienteApi::new("http://localhost:8080/", 5).unwrap();
        assert_eq!(cliente.base_url, "http://localhost:8080");
        assert!(cliente.con_token("").token.is_none());
        assert_eq!(cliente.con_token("abc").token.as_deref(), Some("abc"));
    }
}
