// src/usuarios/sesion.rs

use std::collections::HashMap;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponseBuilder};

use super::usuario_structs::{Rol, Sesion};

/// Clave del token en el almacén.
pub const CLAVE_TOKEN: &str = "token";
/// Clave del rol en el almacén.
pub const CLAVE_ROL: &str = "role";

/// Almacén clave-valor persistente del navegador.
pub trait AlmacenClaveValor {
    fn obtener(&self, clave: &str) -> Option<String>;
    fn guardar(&mut self, clave: &str, valor: &str);
    fn eliminar(&mut self, clave: &str);
}

/// Guarda token y rol. Un login nuevo pisa la sesión anterior.
pub fn escribir_sesion<A: AlmacenClaveValor + ?Sized>(almacen: &mut A, sesion: &Sesion) {
    almacen.guardar(CLAVE_TOKEN, &sesion.token);
    almacen.guardar(CLAVE_ROL, sesion.rol.as_str());
}

/// Lee la sesión. Sin token, o con un rol que no se reconoce, no hay sesión.
pub fn leer_sesion<A: AlmacenClaveValor + ?Sized>(almacen: &A) -> Option<Sesion> {
    let token = almacen.obtener(CLAVE_TOKEN).filter(|t| !t.is_empty())?;
    let rol = almacen.obtener(CLAVE_ROL)?.parse::<Rol>().ok()?;
    Some(Sesion { token, rol })
}

/// Borra token y rol.
pub fn cerrar_sesion<A: AlmacenClaveValor + ?Sized>(almacen: &mut A) {
    almacen.eliminar(CLAVE_TOKEN);
    almacen.eliminar(CLAVE_ROL);
}

/// Almacén en memoria.
#[derive(Debug, Default, Clone)]
pub struct AlmacenMemoria {
    valores: HashMap<String, String>,
}

impl AlmacenClaveValor for AlmacenMemoria {
    fn obtener(&self, clave: &str) -> Option<String> {
        self.valores.get(clave).cloned()
    }

    fn guardar(&mut self, clave: &str, valor: &str) {
        self.valores.insert(clave.to_string(), valor.to_string());
    }

    fn eliminar(&mut self, clave: &str) {
        self.valores.remove(clave);
    }
}

/// Almacén respaldado por las cookies del navegador.
///
/// Las lecturas salen de las cookies de la petición; las escrituras se
/// acumulan y se vuelcan en la respuesta con [`AlmacenCookies::aplicar`].
#[derive(Debug, Default)]
pub struct AlmacenCookies {
    valores: HashMap<String, String>,
    pendientes: Vec<Cookie<'static>>,
    segura: bool,
}

impl AlmacenCookies {
    pub fn desde_request(req: &HttpRequest, segura: bool) -> Self {
        let mut valores = HashMap::new();
        if let Ok(cookies) = req.cookies() {
            for cookie in cookies.iter() {
                valores.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
        Self {
            valores,
            pendientes: Vec::new(),
            segura,
        }
    }

    pub fn vacio(segura: bool) -> Self {
        Self {
            segura,
            ..Self::default()
        }
    }

    /// Escribe en la respuesta todos los cambios pendientes.
    pub fn aplicar(self, respuesta: &mut HttpResponseBuilder) {
        for cookie in self.pendientes {
            respuesta.cookie(cookie);
        }
    }
}

impl AlmacenClaveValor for AlmacenCookies {
    fn obtener(&self, clave: &str) -> Option<String> {
        self.valores.get(clave).cloned()
    }

    fn guardar(&mut self, clave: &str, valor: &str) {
        self.valores.insert(clave.to_string(), valor.to_string());
        self.pendientes.push(
            Cookie::build(clave.to_string(), valor.to_string())
                .path("/")
                .http_only(true)
                .secure(self.segura)
                .same_site(SameSite::Lax)
                .finish(),
        );
    }

    fn eliminar(&mut self, clave: &str) {
        self.valores.remove(clave);
        let mut cookie = Cookie::build(clave.to_string(), "").path("/").finish();
        cookie.make_removal();
        self.pendientes.push(cookie);
    }
}

/// Sesión de la petición, para páginas públicas que solo la muestran.
pub fn sesion_de_request(req: &HttpRequest) -> Option<Sesion> {
    leer_sesion(&AlmacenCookies::desde_request(req, false))
}
