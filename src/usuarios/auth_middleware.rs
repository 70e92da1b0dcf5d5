// src/usuarios/auth_middleware.rs

use std::marker::PhantomData;

use actix_web::{
    dev::Payload, http::header, http::StatusCode, FromRequest, HttpRequest, HttpResponse,
    ResponseError,
};
use futures::future::{ready, Ready};
use thiserror::Error;

use super::sesion::{leer_sesion, AlmacenClaveValor, AlmacenCookies};
use super::usuario_structs::{Rol, Sesion};

/// Ruta a la que se envía a quien no tiene acceso.
pub const RUTA_LOGIN: &str = "/login";

/// Indica si `rol` satisface el requisito. `None` acepta cualquier rol con sesión.
pub fn rol_permitido(rol: Rol, requeridos: Option<&[Rol]>) -> bool {
    match requeridos {
        None => true,
        Some(roles) => roles.contains(&rol),
    }
}

/// Estado de la guardia de una página.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstadoGuarda {
    /// Todavía no se ha leído la sesión; no se pinta nada del contenido.
    Verificando,
    Autorizado(Sesion),
    Redirigido(&'static str),
}

/// Guardia de ruta: decide una sola vez, al montarse, si el contenido se pinta.
///
/// Los cambios de rol posteriores no se observan mientras la guardia vive.
#[derive(Debug, Clone)]
pub struct GuardaRota {
    requeridos: Option<Vec<Rol>>,
    estado: EstadoGuarda,
}

impl GuardaRota {
    pub fn new(requeridos: Option<&[Rol]>) -> Self {
        Self {
            requeridos: requeridos.map(<[Rol]>::to_vec),
            estado: EstadoGuarda::Verificando,
        }
    }

    pub fn estado(&self) -> &EstadoGuarda {
        &self.estado
    }

    /// Lee el almacén y resuelve el estado. Solo la primera llamada decide.
    pub fn montar<A: AlmacenClaveValor + ?Sized>(&mut self, almacen: &A) -> &EstadoGuarda {
        if self.estado == EstadoGuarda::Verificando {
            self.estado = match leer_sesion(almacen) {
                Some(sesion) if rol_permitido(sesion.rol, self.requeridos.as_deref()) => {
                    EstadoGuarda::Autorizado(sesion)
                }
                _ => EstadoGuarda::Redirigido(RUTA_LOGIN),
            };
        }
        &self.estado
    }
}

/// Requisito de rol de una página, fijado en el tipo del extractor.
pub trait RequisitoRol {
    const ROLES: Option<&'static [Rol]>;
}

/// Cualquier usuario con sesión.
pub struct CualquierRol;
/// Solo administradores.
pub struct SoloAdmin;
/// Vendedores y administradores.
pub struct Gestion;

impl RequisitoRol for CualquierRol {
    const ROLES: Option<&'static [Rol]> = None;
}

impl RequisitoRol for SoloAdmin {
    const ROLES: Option<&'static [Rol]> = Some(&[Rol::Admin]);
}

impl RequisitoRol for Gestion {
    const ROLES: Option<&'static [Rol]> = Some(&[Rol::Vendedor, Rol::Admin]);
}

/// Error del extractor: se responde con una redirección al login, sin cuerpo.
#[derive(Debug, Error)]
#[error("acceso no autorizado, redirigiendo a {destino}")]
pub struct NoAutorizado {
    destino: &'static str,
}

impl ResponseError for NoAutorizado {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, self.destino))
            .finish()
    }
}

/// Sesión autorizada para el requisito `R`.
/// Se extrae de las cookies de las peticiones a páginas protegidas.
pub struct Protegido<R> {
    pub sesion: Sesion,
    requisito: PhantomData<R>,
}

impl<R: RequisitoRol> FromRequest for Protegido<R> {
    type Error = NoAutorizado;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let almacen = AlmacenCookies::desde_request(req, false);
        let mut guarda = GuardaRota::new(R::ROLES);

        match guarda.montar(&almacen).clone() {
            EstadoGuarda::Autorizado(sesion) => ready(Ok(Protegido {
                sesion,
                requisito: PhantomData,
            })),
            EstadoGuarda::Redirigido(destino) => {
                tracing::debug!(ruta = %req.path(), "acceso denegado por la guardia de rutas");
                ready(Err(NoAutorizado { destino }))
            }
            EstadoGuarda::Verificando => ready(Err(NoAutorizado {
                destino: RUTA_LOGIN,
            })),
        }
    }
}
