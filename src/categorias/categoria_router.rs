// src/categorias/categoria_router.rs

use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

// Importa las structs de categoría
use super::categoria_structs::Categoria;

use crate::shared::aviso::{tomar_aviso, Aviso};
use crate::shared::vistas::{banner_error, escapar, html_con_estado, html_ok, pagina, redireccion};
use crate::usuarios::auth_middleware::{Protegido, SoloAdmin};
use crate::usuarios::usuario_structs::Sesion;
use crate::AppState;

pub const MSG_NOMBRE_CATEGORIA: &str = "El nombre de la categoría es obligatorio.";

#[derive(Debug, Deserialize)]
pub struct FormularioCategoria {
    #[serde(default)]
    pub nombre: String,
}

/// Opciones de un `<select>` de categorías, con la elegida marcada.
pub fn opciones_categoria(categorias: &[Categoria], elegida: Option<i64>) -> String {
    let mut html = String::from(r#"<option value="">Selecciona una categoría</option>"#);
    for c in categorias {
        let marcada = if Some(c.id) == elegida { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            c.id,
            marcada,
            escapar(&c.nombre)
        ));
    }
    html
}

fn pagina_categorias(
    sesion: &Sesion,
    categorias: &[Categoria],
    error: Option<&str>,
    nombre: &str,
    aviso: Option<Aviso>,
) -> String {
    let mut cuerpo = String::new();
    if let Some(error) = error {
        cuerpo.push_str(&banner_error(error));
    }
    cuerpo.push_str(&format!(
        concat!(
            r#"<form method="post" action="/admin/categorias">"#,
            r#"<label>Nueva categoría <input name="nombre" value="{}" required></label>"#,
            r#"<button type="submit">Agregar</button></form>"#
        ),
        escapar(nombre)
    ));

    if categorias.is_empty() {
        cuerpo.push_str("<p>No hay categorías registradas.</p>");
    } else {
        cuerpo.push_str("<table><thead><tr><th>ID</th><th>Nombre</th></tr></thead><tbody>");
        for c in categorias {
            cuerpo.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                c.id,
                escapar(&c.nombre)
            ));
        }
        cuerpo.push_str("</tbody></table>");
    }
    cuerpo.push_str(r#"<p><a href="/admin">Volver al panel</a></p>"#);

    pagina("Categorías", Some(sesion), aviso, &cuerpo)
}

/// Rota para listar las categorías del backend.
#[get("/admin/categorias")]
pub async fn listar_categorias(
    data: web::Data<AppState>,
    req: HttpRequest,
    acceso: Protegido<SoloAdmin>,
) -> HttpResponse {
    let aviso = tomar_aviso(&req);

    match data.api_de(&acceso.sesion).listar_categorias().await {
        Ok(categorias) => html_ok(
            pagina_categorias(&acceso.sesion, &categorias, None, "", aviso),
            aviso.is_some(),
        ),
        Err(e) => {
            tracing::error!(error = %e, "error al listar categorías");
            html_con_estado(
                StatusCode::BAD_GATEWAY,
                pagina_categorias(&acceso.sesion, &[], Some(&e.mensaje()), "", aviso),
                aviso.is_some(),
            )
        }
    }
}

/// Rota para crear una nueva categoría.
#[post("/admin/categorias")]
pub async fn crear_categoria(
    data: web::Data<AppState>,
    acceso: Protegido<SoloAdmin>,
    formulario: web::Form<FormularioCategoria>,
) -> HttpResponse {
    let api = data.api_de(&acceso.sesion);
    let nombre = formulario.nombre.trim();

    let error = if nombre.is_empty() {
        MSG_NOMBRE_CATEGORIA.to_string()
    } else {
        match api.crear_categoria(nombre).await {
            Ok(categoria) => {
                tracing::info!(id = categoria.id, nombre = %categoria.nombre, "categoría creada");
                return redireccion("/admin/categorias")
                    .cookie(Aviso::CategoriaCreada.cookie(data.config.cookie_segura))
                    .finish();
            }
            Err(e) => {
                tracing::error!(error = %e, "error al crear categoría");
                e.mensaje()
            }
        }
    };

    // Se vuelve a pintar el listado con el error y lo escrito
    let categorias = api.listar_categorias().await.unwrap_or_default();
    html_con_estado(
        StatusCode::BAD_REQUEST,
        pagina_categorias(&acceso.sesion, &categorias, Some(&error), nombre, None),
        false,
    )
}
