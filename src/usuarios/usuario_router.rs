// src/usuarios/usuario_router.rs

use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Serialize;

// Structs y sesión del módulo de usuarios
use super::navegacion::{enlaces_de_sesion, Enlace};
use super::sesion::{cerrar_sesion, escribir_sesion, sesion_de_request, AlmacenCookies};
use super::usuario_structs::{Credenciales, Rol};
use crate::api::api_error::ApiError;
use crate::shared::aviso::{tomar_aviso, Aviso};
use crate::shared::shared_structs::GenericResponse;
use crate::shared::vistas::{banner_error, escapar, html_con_estado, html_ok, pagina, redireccion};
use crate::AppState;

const MSG_CAMPOS_VACIOS: &str = "Completa usuario y contraseña.";

/// Estado de la cabecera para scripts del navegador.
#[derive(Debug, Serialize)]
pub struct EstadoSesion {
    pub rol: Option<Rol>,
    pub enlaces: &'static [Enlace],
}

fn formulario_credenciales(accion: &str, boton: &str, username: &str, error: Option<&str>) -> String {
    let mut html = String::new();
    if let Some(error) = error {
        html.push_str(&banner_error(error));
    }
    html.push_str(&format!(
        concat!(
            r#"<form method="post" action="{accion}">"#,
            r#"<label>Usuario <input name="username" value="{username}" required autocomplete="username"></label>"#,
            r#"<label>Contraseña <input type="password" name="password" required></label>"#,
            r#"<button type="submit">{boton}</button></form>"#
        ),
        accion = accion,
        username = escapar(username),
        boton = boton,
    ));
    html
}

fn pagina_login(username: &str, error: Option<&str>, aviso: Option<Aviso>) -> String {
    let mut cuerpo = formulario_credenciales("/login", "Ingresar", username, error);
    cuerpo.push_str(r#"<p>¿No tienes cuenta? <a href="/registro">Regístrate</a></p>"#);
    pagina("Iniciar Sesión", None, aviso, &cuerpo)
}

fn pagina_registro(username: &str, error: Option<&str>) -> String {
    let mut cuerpo = formulario_credenciales("/registro", "Crear cuenta", username, error);
    cuerpo.push_str(r#"<p>¿Ya tienes cuenta? <a href="/login">Inicia sesión</a></p>"#);
    pagina("Crear Cuenta", None, None, &cuerpo)
}

/// Página de inicio: enlaces del rol actual o invitación a iniciar sesión.
#[get("/")]
pub async fn inicio(req: HttpRequest) -> HttpResponse {
    let sesion = sesion_de_request(&req);
    let aviso = tomar_aviso(&req);

    let cuerpo = match &sesion {
        Some(s) => {
            let mut html = format!("<p>Sesión iniciada como {}.</p><ul>", s.rol);
            for enlace in enlaces_de_sesion(Some(s)) {
                html.push_str(&format!(
                    r#"<li><a href="{}">{}</a></li>"#,
                    enlace.href,
                    escapar(enlace.etiqueta)
                ));
            }
            html.push_str("</ul>");
            html
        }
        None => concat!(
            r#"<p>Bienvenido a MiEcommerce. <a href="/productos">Ver catálogo</a></p>"#,
            r#"<p><a href="/login">Iniciar sesión</a> o <a href="/registro">crear una cuenta</a>.</p>"#
        )
        .to_string(),
    };

    html_ok(pagina("Inicio", sesion.as_ref(), aviso, &cuerpo), aviso.is_some())
}

#[get("/login")]
pub async fn formulario_login(req: HttpRequest) -> HttpResponse {
    let aviso = tomar_aviso(&req);
    html_ok(pagina_login("", None, aviso), aviso.is_some())
}

/// Rota para login: guarda la sesión y envía al usuario a la página de su rol.
#[post("/login")]
pub async fn login_usuario(
    data: web::Data<AppState>,
    formulario: web::Form<Credenciales>,
) -> HttpResponse {
    let credenciales = Credenciales {
        username: formulario.username.trim().to_string(),
        password: formulario.password.clone(),
    };

    // 1. Validar que vengan ambos campos
    if credenciales.username.is_empty() || credenciales.password.is_empty() {
        return html_con_estado(
            StatusCode::BAD_REQUEST,
            pagina_login(&credenciales.username, Some(MSG_CAMPOS_VACIOS), None),
            false,
        );
    }

    // 2. Pedir el token al backend
    let sesion = match data.api.login(&credenciales).await {
        Ok(sesion) => sesion,
        Err(e @ ApiError::CredencialesInvalidas) => {
            tracing::info!(usuario = %credenciales.username, "login rechazado");
            return html_con_estado(
                StatusCode::UNAUTHORIZED,
                pagina_login(&credenciales.username, Some(&e.mensaje()), None),
                false,
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "error al iniciar sesión");
            return html_con_estado(
                StatusCode::BAD_GATEWAY,
                pagina_login(&credenciales.username, Some(&e.mensaje()), None),
                false,
            );
        }
    };

    // 3. Guardar token y rol en las cookies y redirigir
    tracing::info!(usuario = %credenciales.username, rol = %sesion.rol, "sesión iniciada");
    let mut almacen = AlmacenCookies::vacio(data.config.cookie_segura);
    escribir_sesion(&mut almacen, &sesion);

    let mut respuesta = redireccion(sesion.rol.ruta_inicio());
    almacen.aplicar(&mut respuesta);
    respuesta.finish()
}

#[get("/registro")]
pub async fn formulario_registro() -> HttpResponse {
    html_ok(pagina_registro("", None), false)
}

/// Rota para crear una cuenta nueva en el backend.
#[post("/registro")]
pub async fn registrar_usuario(
    data: web::Data<AppState>,
    formulario: web::Form<Credenciales>,
) -> HttpResponse {
    let credenciales = Credenciales {
        username: formulario.username.trim().to_string(),
        password: formulario.password.clone(),
    };

    if credenciales.username.is_empty() || credenciales.password.is_empty() {
        return html_con_estado(
            StatusCode::BAD_REQUEST,
            pagina_registro(&credenciales.username, Some(MSG_CAMPOS_VACIOS)),
            false,
        );
    }

    match data.api.registrar(&credenciales).await {
        Ok(()) => {
            tracing::info!(usuario = %credenciales.username, "cuenta creada");
            redireccion("/login")
                .cookie(Aviso::CuentaCreada.cookie(data.config.cookie_segura))
                .finish()
        }
        Err(e) => {
            tracing::warn!(error = %e, "registro rechazado");
            html_con_estado(
                StatusCode::BAD_REQUEST,
                pagina_registro(&credenciales.username, Some(&e.mensaje())),
                false,
            )
        }
    }
}

/// Borra token y rol.
#[post("/logout")]
pub async fn cerrar_sesion_usuario(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let mut almacen = AlmacenCookies::desde_request(&req, data.config.cookie_segura);
    cerrar_sesion(&mut almacen);

    let mut respuesta = redireccion("/login");
    respuesta.cookie(Aviso::SesionCerrada.cookie(data.config.cookie_segura));
    almacen.aplicar(&mut respuesta);
    respuesta.finish()
}

/// Rol actual y sus enlaces, en JSON.
#[get("/sesion")]
pub async fn sesion_actual(req: HttpRequest) -> HttpResponse {
    let sesion = sesion_de_request(&req);
    let mensaje = match &sesion {
        Some(_) => "Sesión activa",
        None => "Sin sesión",
    };
    HttpResponse::Ok().json(GenericResponse::exito(
        mensaje,
        EstadoSesion {
            rol: sesion.as_ref().map(|s| s.rol),
            enlaces: enlaces_de_sesion(sesion.as_ref()),
        },
    ))
}
