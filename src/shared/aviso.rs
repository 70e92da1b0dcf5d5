// src/shared/aviso.rs

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;

/// Nombre de la cookie que transporta el aviso pendiente.
pub const COOKIE_AVISO: &str = "aviso";

/// Segundos que vive un aviso antes de descartarse solo.
pub const DURACION_AVISO_SEGS: i64 = 5;

/// Avisos que se muestran una sola vez, en la página siguiente a una redirección.
///
/// La cookie guarda solo la clave (ASCII); el texto se resuelve al pintar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aviso {
    CuentaCreada,
    SesionCerrada,
    ProductoCreado,
    ProductoActualizado,
    ProductoEliminado,
    ImagenNoSubida,
    CategoriaCreada,
    PedidoCreado,
    EstadoActualizado,
}

impl Aviso {
    const TODOS: [Aviso; 9] = [
        Aviso::CuentaCreada,
        Aviso::SesionCerrada,
        Aviso::ProductoCreado,
        Aviso::ProductoActualizado,
        Aviso::ProductoEliminado,
        Aviso::ImagenNoSubida,
        Aviso::CategoriaCreada,
        Aviso::PedidoCreado,
        Aviso::EstadoActualizado,
    ];

    pub fn clave(&self) -> &'static str {
        match self {
            Aviso::CuentaCreada => "cuenta_creada",
            Aviso::SesionCerrada => "sesion_cerrada",
            Aviso::ProductoCreado => "producto_creado",
            Aviso::ProductoActualizado => "producto_actualizado",
            Aviso::ProductoEliminado => "producto_eliminado",
            Aviso::ImagenNoSubida => "imagen_no_subida",
            Aviso::CategoriaCreada => "categoria_creada",
            Aviso::PedidoCreado => "pedido_creado",
            Aviso::EstadoActualizado => "estado_actualizado",
        }
    }

    pub fn desde_clave(clave: &str) -> Option<Self> {
        Self::TODOS.into_iter().find(|a| a.clave() == clave)
    }

    pub fn mensaje(&self) -> &'static str {
        match self {
            Aviso::CuentaCreada => "Cuenta creada. Ya puedes iniciar sesión.",
            Aviso::SesionCerrada => "Sesión cerrada.",
            Aviso::ProductoCreado => "¡Producto guardado exitosamente!",
            Aviso::ProductoActualizado => "Producto actualizado.",
            Aviso::ProductoEliminado => "Producto eliminado.",
            Aviso::ImagenNoSubida => {
                "Producto actualizado, pero la imagen no se pudo subir y se conservó la anterior."
            }
            Aviso::CategoriaCreada => "Categoría creada.",
            Aviso::PedidoCreado => "¡Pedido registrado!",
            Aviso::EstadoActualizado => "Estado del pedido actualizado.",
        }
    }

    /// Cookie de vida corta que deja el aviso para la próxima página.
    pub fn cookie(&self, segura: bool) -> Cookie<'static> {
        Cookie::build(COOKIE_AVISO, self.clave())
            .path("/")
            .http_only(true)
            .secure(segura)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(DURACION_AVISO_SEGS))
            .finish()
    }
}

/// Lee el aviso pendiente de la petición, si lo hay.
pub fn tomar_aviso(req: &HttpRequest) -> Option<Aviso> {
    req.cookie(COOKIE_AVISO)
        .and_then(|c| Aviso::desde_clave(c.value()))
}

/// Cookie que borra el aviso ya mostrado.
pub fn cookie_borrar_aviso() -> Cookie<'static> {
    let mut cookie = Cookie::build(COOKIE_AVISO, "").path("/").finish();
    cookie.make_removal();
    cookie
}
