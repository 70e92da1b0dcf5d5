// src/config/config_structs.rs

use thiserror::Error;

/// Errores al leer la configuración del entorno.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("la variable {0} no es una URL http(s) válida: {1}")]
    UrlInvalida(String, String),
    #[error("la variable {0} tiene un valor inválido: {1}")]
    ValorInvalido(String, String),
}

/// Configuración de la aplicación.
///
/// La clave pública del almacenamiento no se imprime en los logs.
#[derive(Clone)]
pub struct AppConfig {
    /// URL base del backend REST (API_URL).
    pub api_url: String,
    /// URL del servicio de almacenamiento administrado (SUPABASE_URL).
    pub almacenamiento_url: Option<String>,
    /// Clave pública del servicio de almacenamiento (SUPABASE_ANON_KEY).
    pub almacenamiento_clave: Option<String>,
    /// Dirección donde escucha el servidor (BIND_ADDR).
    pub bind_addr: String,
    /// Marca las cookies de sesión como `Secure` (COOKIE_SEGURA).
    pub cookie_segura: bool,
    /// Timeout de las peticiones salientes, en segundos (HTTP_TIMEOUT_SECS).
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_url", &self.api_url)
            .field("almacenamiento_url", &self.almacenamiento_url)
            .field(
                "almacenamiento_clave",
                &self.almacenamiento_clave.as_ref().map(|_| "[OCULTA]"),
            )
            .field("bind_addr", &self.bind_addr)
            .field("cookie_segura", &self.cookie_segura)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Carga la configuración desde el entorno.
    ///
    /// Variables:
    /// - `API_URL` (por defecto `http://localhost:8080`)
    /// - `SUPABASE_URL` y `SUPABASE_ANON_KEY` (opcionales, van juntas)
    /// - `BIND_ADDR` (por defecto `127.0.0.1:3000`)
    /// - `COOKIE_SEGURA` (`true`/`false`, por defecto `false`)
    /// - `HTTP_TIMEOUT_SECS` (por defecto 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env_url("API_URL")?.unwrap_or_else(|| "http://localhost:8080".to_string());

        let almacenamiento_url = env_url("SUPABASE_URL")?;
        let almacenamiento_clave = std::env::var("SUPABASE_ANON_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let cookie_segura = match std::env::var("COOKIE_SEGURA") {
            Ok(v) => v
                .parse::<bool>()
                .map_err(|_| ConfigError::ValorInvalido("COOKIE_SEGURA".into(), v))?,
            Err(_) => false,
        };

        let timeout_secs = match std::env::var("HTTP_TIMEOUT_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::ValorInvalido("HTTP_TIMEOUT_SECS".into(), v))?,
            Err(_) => 30,
        };

        Ok(Self {
            api_url,
            almacenamiento_url,
            almacenamiento_clave,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            cookie_segura,
            timeout_secs,
        })
    }

    /// Configuración mínima apuntando a un backend dado, sin almacenamiento.
    pub fn para_backend(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            almacenamiento_url: None,
            almacenamiento_clave: None,
            bind_addr: "127.0.0.1:0".to_string(),
            cookie_segura: false,
            timeout_secs: 5,
        }
    }
}

// Lee una variable opcional y exige que sea una URL http(s).
fn env_url(nombre: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(nombre) {
        Ok(valor) if valor.trim().is_empty() => Ok(None),
        Ok(valor) => {
            let valor = valor.trim().to_string();
            if valor.starts_with("http://") || valor.starts_with("https://") {
                Ok(Some(valor))
            } else {
                Err(ConfigError::UrlInvalida(nombre.to_string(), valor))
            }
        }
        Err(_) => Ok(None),
    }
}
