// src/inventario/inventario_router.rs

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpRequest, HttpResponse};

// Importa las structs del módulo de inventario
use super::inventario_structs::{
    combinar, filtrar_productos, CambioImagen, ConsultaInventario, EdicionProducto, ErroresEdicion,
};

use crate::api::api_cliente::ClienteApi;
use crate::api::api_error::ApiError;
use crate::productos::productos_structs::Producto;
use crate::shared::aviso::{tomar_aviso, Aviso};
use crate::shared::paginacion::{paginar, Pagina, TAMANO_PAGINA};
use crate::shared::subida::leer_formulario;
use crate::shared::vistas::{
    banner_error, campo_oculto, escapar, formatear_precio, html_con_estado, html_ok, pagina,
    redireccion,
};
use crate::usuarios::auth_middleware::{Gestion, Protegido};
use crate::usuarios::usuario_structs::Sesion;
use crate::AppState;

const CAMPO_IMAGEN: &str = "imagen";
const MSG_EDICION_EXPIRADA: &str = "La edición expiró. Vuelve a abrir el producto.";

/// Busca un producto en el listado del backend (no hay `GET /api/productos/{id}`).
async fn buscar_producto(api: &ClienteApi, id: i64) -> Result<Option<Producto>, ApiError> {
    let productos = api.listar_productos().await?;
    Ok(productos.into_iter().find(|p| p.id == id))
}

fn enlace_pagina(q: &str, numero: usize, texto: &str) -> String {
    let consulta: String = url::form_urlencoded::byte_serialize(q.as_bytes()).collect();
    format!(r#"<a href="/inventario?q={consulta}&amp;pagina={numero}">{texto}</a>"#)
}

fn tabla(pagina_actual: &Pagina<&Producto>, q: &str) -> String {
    if pagina_actual.items.is_empty() {
        return "<p>No se encontraron productos.</p>".to_string();
    }

    let mut html = String::from(concat!(
        "<table><thead><tr><th>Imagen</th><th>Nombre</th><th>Categoría</th><th>Stock</th>",
        "<th>Precio venta</th><th>Vencimiento</th><th>Acciones</th></tr></thead><tbody>"
    ));
    for p in &pagina_actual.items {
        let imagen = match &p.imagen_url {
            Some(url) => format!(r#"<img src="{}" alt="{}" width="64">"#, escapar(url), escapar(&p.nombre)),
            None => "—".to_string(),
        };
        html.push_str(&format!(
            concat!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
                r#"<td><a href="/inventario/{}/editar">Editar</a> <a href="/inventario/{}/eliminar">Eliminar</a></td></tr>"#
            ),
            imagen,
            escapar(&p.nombre),
            escapar(p.categoria_nombre.as_deref().unwrap_or("-")),
            p.stock.map(|s| s.to_string()).unwrap_or_else(|| "—".into()),
            formatear_precio(p.precio_venta.as_ref()),
            p.fecha_vencimiento.map(|f| f.to_string()).unwrap_or_else(|| "—".into()),
            p.id,
            p.id,
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(&format!(
        r#"<nav class="paginacion"><span>Página {} de {} ({} productos)</span>"#,
        pagina_actual.numero, pagina_actual.total_paginas, pagina_actual.total
    ));
    if pagina_actual.tiene_anterior() {
        html.push_str(&enlace_pagina(q, pagina_actual.numero - 1, "Anterior"));
    }
    if pagina_actual.tiene_siguiente() {
        html.push_str(&enlace_pagina(q, pagina_actual.numero + 1, "Siguiente"));
    }
    html.push_str("</nav>");
    html
}

/// Rota para la tabla de inventario con búsqueda y paginación local.
#[get("/inventario")]
pub async fn tabla_inventario(
    data: web::Data<AppState>,
    req: HttpRequest,
    acceso: Protegido<Gestion>,
    consulta: web::Query<ConsultaInventario>,
) -> HttpResponse {
    let aviso = tomar_aviso(&req);
    let mut cuerpo = format!(
        concat!(
            r#"<form method="get" action="/inventario" class="buscador">"#,
            r#"<input name="q" value="{}" placeholder="Buscar por nombre, categoría, precio o fecha">"#,
            r#"<button type="submit">Buscar</button></form>"#
        ),
        escapar(&consulta.q)
    );

    let productos = match data.api_de(&acceso.sesion).listar_productos().await {
        Ok(productos) => productos,
        Err(e) => {
            tracing::error!(error = %e, "error al cargar el inventario");
            cuerpo.push_str(&banner_error(&e.mensaje()));
            let doc = pagina("Inventario", Some(&acceso.sesion), aviso, &cuerpo);
            return html_con_estado(StatusCode::BAD_GATEWAY, doc, aviso.is_some());
        }
    };

    let filtrados = filtrar_productos(&productos, &consulta.q);
    let pagina_actual = paginar(filtrados, consulta.pagina.unwrap_or(1), TAMANO_PAGINA);
    cuerpo.push_str(&tabla(&pagina_actual, consulta.q.trim()));

    html_ok(
        pagina("Inventario", Some(&acceso.sesion), aviso, &cuerpo),
        aviso.is_some(),
    )
}

fn campo_texto(etiqueta: &str, nombre: &str, valor: &str, errores: &ErroresEdicion) -> String {
    let error = errores
        .get(nombre)
        .map(|m| format!(r#"<p class="error-campo">{}</p>"#, escapar(m)))
        .unwrap_or_default();
    format!(
        r#"<label>{} <input name="{}" value="{}"></label>{}"#,
        etiqueta,
        nombre,
        escapar(valor),
        error
    )
}

/// Valores iniciales del formulario: los del producto.
fn edicion_desde(p: &Producto) -> EdicionProducto {
    EdicionProducto {
        nombre: p.nombre.clone(),
        descripcion: p.descripcion.clone().unwrap_or_default(),
        categoria_nombre: p.categoria_nombre.clone().unwrap_or_default(),
        stock: p.stock.map(|s| s.to_string()).unwrap_or_default(),
        precio_compra: p.precio_compra.as_ref().map(|v| v.to_string()).unwrap_or_default(),
        precio_venta: p.precio_venta.as_ref().map(|v| v.to_string()).unwrap_or_default(),
        codigo_qr: p.codigo_qr.clone().unwrap_or_default(),
        codigo_barras: p.codigo_barras.clone().unwrap_or_default(),
        fecha_vencimiento: p.fecha_vencimiento.map(|f| f.to_string()).unwrap_or_default(),
    }
}

fn pagina_edicion(
    sesion: &Sesion,
    snapshot: &Producto,
    edicion: &EdicionProducto,
    errores: &ErroresEdicion,
    error: Option<&str>,
) -> String {
    let mut cuerpo = String::new();
    if let Some(error) = error {
        cuerpo.push_str(&banner_error(error));
    }

    let copia = serde_json::to_string(snapshot).unwrap_or_default();
    cuerpo.push_str(&format!(
        r#"<form method="post" action="/inventario/{}/editar" enctype="multipart/form-data">{}"#,
        snapshot.id,
        campo_oculto("snapshot", &copia)
    ));
    cuerpo.push_str(r#"<p class="ayuda">Los campos que dejes en blanco conservan su valor.</p>"#);
    cuerpo.push_str(&campo_texto("Nombre", "nombre", &edicion.nombre, errores));
    cuerpo.push_str(&campo_texto("Categoría", "categoria_nombre", &edicion.categoria_nombre, errores));
    cuerpo.push_str(&campo_texto("Precio de venta", "precio_venta", &edicion.precio_venta, errores));
    cuerpo.push_str(&campo_texto("Precio de compra", "precio_compra", &edicion.precio_compra, errores));
    cuerpo.push_str(&campo_texto("Stock", "stock", &edicion.stock, errores));
    cuerpo.push_str(&campo_texto(
        "Fecha de vencimiento",
        "fecha_vencimiento",
        &edicion.fecha_vencimiento,
        errores,
    ));
    cuerpo.push_str(&campo_texto("Código QR", "codigo_qr", &edicion.codigo_qr, errores));
    cuerpo.push_str(&campo_texto("Código de barras", "codigo_barras", &edicion.codigo_barras, errores));
    cuerpo.push_str(&format!(
        r#"<label>Descripción <textarea name="descripcion">{}</textarea></label>"#,
        escapar(&edicion.descripcion)
    ));

    if let Some(url) = &snapshot.imagen_url {
        cuerpo.push_str(&format!(
            r#"<img src="{}" alt="Imagen actual" width="160"><label><input type="checkbox" name="quitar_imagen" value="on"> Quitar imagen</label>"#,
            escapar(url)
        ));
    }
    cuerpo.push_str(&format!(
        r#"<label>Nueva imagen <input type="file" name="{CAMPO_IMAGEN}" accept="image/*"></label>"#
    ));
    if let Some(error) = errores.get(CAMPO_IMAGEN) {
        cuerpo.push_str(&format!(r#"<p class="error-campo">{}</p>"#, escapar(error)));
    }
    cuerpo.push_str(
        r#"<button type="submit">Guardar</button> <a href="/inventario">Cancelar</a></form>"#,
    );

    pagina(&format!("Editar: {}", snapshot.nombre), Some(sesion), None, &cuerpo)
}

fn pagina_no_encontrado(sesion: &Sesion) -> HttpResponse {
    let cuerpo = format!(
        r#"{}<p><a href="/inventario">Volver al inventario</a></p>"#,
        banner_error("Producto no encontrado.")
    );
    html_con_estado(
        StatusCode::NOT_FOUND,
        pagina("Inventario", Some(sesion), None, &cuerpo),
        false,
    )
}

/// Abre la edición y toma la copia del producto.
#[get("/inventario/{id}/editar")]
pub async fn formulario_edicion(
    data: web::Data<AppState>,
    acceso: Protegido<Gestion>,
    ruta: web::Path<i64>,
) -> HttpResponse {
    let id = ruta.into_inner();
    match buscar_producto(&data.api_de(&acceso.sesion), id).await {
        Ok(Some(producto)) => html_ok(
            pagina_edicion(
                &acceso.sesion,
                &producto,
                &edicion_desde(&producto),
                &ErroresEdicion::new(),
                None,
            ),
            false,
        ),
        Ok(None) => pagina_no_encontrado(&acceso.sesion),
        Err(e) => {
            tracing::error!(error = %e, id, "error al cargar el producto");
            let doc = pagina(
                "Inventario",
                Some(&acceso.sesion),
                None,
                &banner_error(&e.mensaje()),
            );
            html_con_estado(StatusCode::BAD_GATEWAY, doc, false)
        }
    }
}

/// Guarda la edición parcial (PUT) combinando con la copia del producto.
#[post("/inventario/{id}/editar")]
pub async fn guardar_edicion(
    data: web::Data<AppState>,
    acceso: Protegido<Gestion>,
    ruta: web::Path<i64>,
    carga: Multipart,
) -> HttpResponse {
    let id = ruta.into_inner();
    let api = data.api_de(&acceso.sesion);

    // 1. Leer el formulario y la copia tomada al abrir la edición
    let formulario = match leer_formulario(carga, CAMPO_IMAGEN).await {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(error = %e, id, "formulario de edición ilegible");
            return redireccion(&format!("/inventario/{id}/editar")).finish();
        }
    };
    let snapshot = formulario
        .campos
        .get("snapshot")
        .and_then(|s| serde_json::from_str::<Producto>(s).ok())
        .filter(|p| p.id == id);
    let Some(snapshot) = snapshot else {
        let doc = pagina(
            "Inventario",
            Some(&acceso.sesion),
            None,
            &banner_error(MSG_EDICION_EXPIRADA),
        );
        return html_con_estado(StatusCode::BAD_REQUEST, doc, false);
    };
    let edicion = EdicionProducto::desde_campos(&formulario.campos);

    if let Some(error) = formulario.error_archivo() {
        let mut errores = ErroresEdicion::new();
        errores.insert(CAMPO_IMAGEN, error.to_string());
        let doc = pagina_edicion(&acceso.sesion, &snapshot, &edicion, &errores, None);
        return html_con_estado(StatusCode::UNPROCESSABLE_ENTITY, doc, false);
    }

    // 2. Imagen: subir la nueva o quitar la actual. Si la subida falla se
    //    guarda igual sin tocar la imagen.
    let mut aviso = Aviso::ProductoActualizado;
    let quitar = formulario.campos.get("quitar_imagen").map(String::as_str) == Some("on");
    let imagen = match &formulario.archivo {
        Some(archivo) => match api.subir_imagen(archivo).await {
            Ok(url) => CambioImagen::Nueva(url),
            Err(e) => {
                tracing::warn!(error = %e, id, "no se pudo subir la imagen; se conserva la anterior");
                aviso = Aviso::ImagenNoSubida;
                CambioImagen::SinCambio
            }
        },
        None if quitar && snapshot.imagen_url.is_some() => CambioImagen::Quitar,
        None => CambioImagen::SinCambio,
    };

    // 3. Combinar con la copia y enviar
    let cambios = match combinar(&snapshot, &edicion, imagen) {
        Ok(cambios) => cambios,
        Err(errores) => {
            let doc = pagina_edicion(&acceso.sesion, &snapshot, &edicion, &errores, None);
            return html_con_estado(StatusCode::UNPROCESSABLE_ENTITY, doc, false);
        }
    };

    match api.actualizar_producto(id, &cambios).await {
        Ok(()) => {
            tracing::info!(id, "producto actualizado");
            redireccion("/inventario")
                .cookie(aviso.cookie(data.config.cookie_segura))
                .finish()
        }
        Err(e) => {
            tracing::error!(error = %e, id, "error al actualizar el producto");
            let doc = pagina_edicion(
                &acceso.sesion,
                &snapshot,
                &edicion,
                &ErroresEdicion::new(),
                Some(&e.mensaje()),
            );
            html_con_estado(StatusCode::BAD_GATEWAY, doc, false)
        }
    }
}

fn pagina_confirmacion(sesion: &Sesion, id: i64, nombre: &str, error: Option<&str>) -> String {
    let mut cuerpo = String::new();
    if let Some(error) = error {
        cuerpo.push_str(&banner_error(error));
    }
    cuerpo.push_str(&format!(
        concat!(
            "<p>¿Eliminar producto <strong>{}</strong>? Esto no se puede deshacer.</p>",
            r#"<form method="post" action="/inventario/{}/eliminar">"#,
            r#"<button type="submit">Eliminar</button> <a href="/inventario">Cancelar</a></form>"#
        ),
        escapar(nombre),
        id
    ));
    pagina("Eliminar producto", Some(sesion), None, &cuerpo)
}

/// Confirmación previa al borrado.
#[get("/inventario/{id}/eliminar")]
pub async fn confirmar_eliminacion(
    data: web::Data<AppState>,
    acceso: Protegido<Gestion>,
    ruta: web::Path<i64>,
) -> HttpResponse {
    let id = ruta.into_inner();
    match buscar_producto(&data.api_de(&acceso.sesion), id).await {
        Ok(Some(producto)) => html_ok(
            pagina_confirmacion(&acceso.sesion, id, &producto.nombre, None),
            false,
        ),
        Ok(None) => pagina_no_encontrado(&acceso.sesion),
        Err(e) => {
            tracing::error!(error = %e, id, "error al cargar el producto");
            let nombre = format!("#{id}");
            html_con_estado(
                StatusCode::BAD_GATEWAY,
                pagina_confirmacion(&acceso.sesion, id, &nombre, Some(&e.mensaje())),
                false,
            )
        }
    }
}

/// Rota para eliminar un producto.
#[post("/inventario/{id}/eliminar")]
pub async fn eliminar_producto(
    data: web::Data<AppState>,
    acceso: Protegido<Gestion>,
    ruta: web::Path<i64>,
) -> HttpResponse {
    let id = ruta.into_inner();

    match data.api_de(&acceso.sesion).eliminar_producto(id).await {
        Ok(()) => {
            tracing::info!(id, "producto eliminado");
            redireccion("/inventario")
                .cookie(Aviso::ProductoEliminado.cookie(data.config.cookie_segura))
                .finish()
        }
        Err(e) => {
            tracing::warn!(error = %e, id, "no se pudo eliminar el producto");
            let estado = match e {
                ApiError::NoEncontrado(_) => StatusCode::NOT_FOUND,
                ApiError::NoPermitido(_) => StatusCode::METHOD_NOT_ALLOWED,
                _ => StatusCode::BAD_GATEWAY,
            };
            let nombre = format!("#{id}");
            html_con_estado(
                estado,
                pagina_confirmacion(&acceso.sesion, id, &nombre, Some(&e.mensaje())),
                false,
            )
        }
    }
}
