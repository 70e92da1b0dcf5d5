// src/lib.rs

use actix_web::web;

// Importa los módulos de la aplicación
pub mod api;        // Clientes del backend y del almacenamiento
pub mod categorias; // Módulo de categorías
pub mod config;     // Configuración desde el entorno
pub mod inventario; // Módulo de inventario
pub mod pedidos;    // Módulo de pedidos
pub mod productos;  // Módulo de productos
pub mod shared;     // Módulo shared
pub mod usuarios;   // Módulo de usuarios y sesión

use api::api_cliente::ClienteApi;
use api::api_error::ApiError;
use api::catalogo_cliente::ClienteCatalogo;
use config::config_structs::AppConfig;
use usuarios::usuario_structs::Sesion;

/// Estado compartido entre los workers. No cambia después del arranque.
pub struct AppState {
    pub config: AppConfig,
    /// Cliente sin token; cada página usa `api.con_token(..)`.
    pub api: ClienteApi,
    /// Solo existe si el almacenamiento está configurado.
    pub catalogo: Option<ClienteCatalogo>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let api = ClienteApi::new(&config.api_url, config.timeout_secs)?;
        let catalogo = match (&config.almacenamiento_url, &config.almacenamiento_clave) {
            (Some(url), Some(clave)) => Some(ClienteCatalogo::new(url, clave, config.timeout_secs)?),
            _ => None,
        };
        Ok(Self {
            config,
            api,
            catalogo,
        })
    }

    /// Cliente del backend con el token de la sesión.
    pub fn api_de(&self, sesion: &Sesion) -> ClienteApi {
        self.api.con_token(&sesion.token)
    }
}

/// Registra todas las rutas de la aplicación.
///
/// Las rutas fijas (`/nuevo`) van antes que las que llevan `{id}`.
pub fn configurar_rutas(cfg: &mut web::ServiceConfig) {
    cfg
        // Módulo de Usuarios
        .service(usuarios::usuario_router::inicio)
        .service(usuarios::usuario_router::formulario_login)
        .service(usuarios::usuario_router::login_usuario)
        .service(usuarios::usuario_router::formulario_registro)
        .service(usuarios::usuario_router::registrar_usuario)
        .service(usuarios::usuario_router::cerrar_sesion_usuario)
        .service(usuarios::usuario_router::sesion_actual)
        // Módulo de Productos
        .service(productos::productos_router::catalogo)
        .service(productos::productos_router::panel_admin)
        .service(productos::productos_router::listar_productos_admin)
        .service(productos::productos_router::asistente_nuevo)
        .service(productos::productos_router::asistente_paso)
        .service(productos::productos_router::asistente_guardar)
        .service(productos::productos_router::asistente_categoria)
        // Módulo de Categorías
        .service(categorias::categoria_router::listar_categorias)
        .service(categorias::categoria_router::crear_categoria)
        // Módulo de Inventario
        .service(inventario::inventario_router::tabla_inventario)
        .service(inventario::inventario_router::formulario_edicion)
        .service(inventario::inventario_router::guardar_edicion)
        .service(inventario::inventario_router::confirmar_eliminacion)
        .service(inventario::inventario_router::eliminar_producto)
        // Módulo de Pedidos
        .service(pedidos::pedidos_router::listar_pedidos)
        .service(pedidos::pedidos_router::formulario_pedido)
        .service(pedidos::pedidos_router::registrar_pedido)
        .service(pedidos::pedidos_router::detalle_pedido)
        .service(pedidos::pedidos_router::cambiar_estado);
}
