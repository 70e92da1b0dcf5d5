// src/main.rs

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use miecommerce::config::config_structs::AppConfig;
use miecommerce::{configurar_rutas, AppState};

// Función principal de la aplicación Actix Web.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Variables de un .env, si existe
    dotenvy::dotenv().ok();

    // Logs: RUST_LOG manda; por defecto `info`
    let filtro = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filtro).init();

    let config = AppConfig::from_env().context("configuración inválida")?;
    let bind_addr = config.bind_addr.clone();
    tracing::info!(?config, "configuración cargada");
    if config.almacenamiento_url.is_none() || config.almacenamiento_clave.is_none() {
        tracing::warn!("almacenamiento no configurado; el catálogo se leerá del backend");
    }

    // Estado compartido: web::Data es un Arc, se clona en cada worker
    let app_state = web::Data::new(
        AppState::new(config).context("no se pudo crear el cliente HTTP")?,
    );

    tracing::info!(%bind_addr, "iniciando MiEcommerce");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .configure(configurar_rutas)
    })
    .bind(&bind_addr)
    .with_context(|| format!("no se pudo escuchar en {bind_addr}"))?
    .run()
    .await
    .context("el servidor terminó con error")
}
