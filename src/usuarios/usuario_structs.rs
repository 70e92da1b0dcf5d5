// src/usuarios/usuario_structs.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Nivel de acceso de un usuario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rol {
    Cliente,
    Vendedor,
    Admin,
}

impl Rol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::Cliente => "CLIENTE",
            Rol::Vendedor => "VENDEDOR",
            Rol::Admin => "ADMIN",
        }
    }

    /// Página a la que se envía al usuario después de iniciar sesión.
    pub fn ruta_inicio(&self) -> &'static str {
        match self {
            Rol::Admin => "/admin",
            Rol::Vendedor => "/inventario",
            Rol::Cliente => "/productos",
        }
    }
}

impl fmt::Display for Rol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLIENTE" => Ok(Rol::Cliente),
            "VENDEDOR" => Ok(Rol::Vendedor),
            "ADMIN" => Ok(Rol::Admin),
            otro => Err(otro.to_string()),
        }
    }
}

/// Sesión del navegador: token opaco del backend y rol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sesion {
    pub token: String,
    pub rol: Rol,
}

/// Datos del formulario de login y de registro.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credenciales {
    pub username: String,
    pub password: String,
}

/// Respuesta del backend al login.
///
/// Según la versión del backend llega `role` (texto) o `roles` (lista con
/// prefijo `ROLE_` de Spring Security).
#[derive(Debug, Deserialize)]
pub struct RespuestaLogin {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl RespuestaLogin {
    /// Resuelve el rol principal. Sin rol, el usuario es CLIENTE.
    pub fn rol(&self) -> Result<Rol, String> {
        let crudo = self
            .role
            .as_deref()
            .or_else(|| self.roles.first().map(String::as_str));

        match crudo {
            Some(texto) => {
                let texto = texto.trim();
                texto.strip_prefix("ROLE_").unwrap_or(texto).parse()
            }
            None => Ok(Rol::Cliente),
        }
    }
}
