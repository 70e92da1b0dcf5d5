// src/productos/productos_router.rs

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpRequest, HttpResponse};

// Importa las structs y el asistente del módulo de productos
use super::asistente::{AsistenteProducto, BorradorProducto, Campo, Paso};
use super::productos_structs::{FiltroCatalogo, ProductoCatalogo, ProductoResumen};

use crate::api::api_error::ApiError;
use crate::categorias::categoria_router::{opciones_categoria, MSG_NOMBRE_CATEGORIA};
use crate::categorias::categoria_structs::Categoria;
use crate::shared::aviso::{tomar_aviso, Aviso};
use crate::shared::subida::leer_formulario;
use crate::shared::vistas::{
    banner_error, campo_oculto, error_campo, escapar, formatear_precio, html_con_estado, html_ok,
    pagina, redireccion,
};
use crate::usuarios::auth_middleware::{Protegido, SoloAdmin};
use crate::usuarios::sesion::sesion_de_request;
use crate::usuarios::usuario_structs::Sesion;
use crate::AppState;

/// Nombre del campo de archivo del paso 3.
const CAMPO_IMAGEN: &str = "imagen";

// -- Catálogo -----------------------------------------------------------------

/// Lee el catálogo del almacenamiento o, si no está configurado, del backend.
async fn cargar_catalogo(
    data: &AppState,
    sesion: Option<&Sesion>,
) -> Result<Vec<ProductoCatalogo>, ApiError> {
    match &data.catalogo {
        Some(cliente_catalogo) => cliente_catalogo.listar_catalogo().await,
        None => {
            let api = match sesion {
                Some(s) => data.api_de(s),
                None => data.api.clone(),
            };
            let mut productos: Vec<ProductoCatalogo> = api
                .listar_productos()
                .await?
                .into_iter()
                .map(ProductoCatalogo::from)
                .collect();
            productos.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(productos)
        }
    }
}

fn tarjeta_producto(p: &ProductoCatalogo) -> String {
    let imagen = match &p.imagen_url {
        Some(url) => format!(r#"<img src="{}" alt="{}">"#, escapar(url), escapar(&p.nombre)),
        None => r#"<div class="sin-imagen">Sin imagen</div>"#.to_string(),
    };
    format!(
        r#"<article class="producto">{}<h2>{}</h2><p>{}</p><p class="precio">{}</p></article>"#,
        imagen,
        escapar(&p.nombre),
        escapar(p.descripcion.as_deref().unwrap_or_default()),
        formatear_precio(p.precio_venta.as_ref()),
    )
}

/// Catálogo público con filtros por nombre y rango de precio.
#[get("/productos")]
pub async fn catalogo(
    data: web::Data<AppState>,
    req: HttpRequest,
    filtro: web::Query<FiltroCatalogo>,
) -> HttpResponse {
    let sesion = sesion_de_request(&req);
    let aviso = tomar_aviso(&req);

    let mut cuerpo = format!(
        concat!(
            r#"<form method="get" action="/productos" class="filtros">"#,
            r#"<input name="q" value="{}" placeholder="Buscar por nombre">"#,
            r#"<input name="min" value="{}" inputmode="decimal" placeholder="Precio mín.">"#,
            r#"<input name="max" value="{}" inputmode="decimal" placeholder="Precio máx.">"#,
            r#"<button type="submit">Filtrar</button></form>"#
        ),
        escapar(&filtro.q),
        escapar(&filtro.min),
        escapar(&filtro.max),
    );

    let productos = match cargar_catalogo(&data, sesion.as_ref()).await {
        Ok(productos) => productos,
        Err(e) => {
            tracing::error!(error = %e, "error al cargar el catálogo");
            cuerpo.push_str(&banner_error(&e.mensaje()));
            let doc = pagina("Catálogo", sesion.as_ref(), aviso, &cuerpo);
            return html_con_estado(StatusCode::BAD_GATEWAY, doc, aviso.is_some());
        }
    };

    let visibles = filtro.aplicar(&productos);
    if visibles.is_empty() {
        let mensaje = if filtro.esta_vacio() {
            "No hay productos disponibles."
        } else {
            "Ningún producto coincide con la búsqueda."
        };
        cuerpo.push_str(&format!("<p>{mensaje}</p>"));
    } else {
        cuerpo.push_str(r#"<section class="catalogo">"#);
        for p in visibles {
            cuerpo.push_str(&tarjeta_producto(p));
        }
        cuerpo.push_str("</section>");
    }

    html_ok(pagina("Catálogo", sesion.as_ref(), aviso, &cuerpo), aviso.is_some())
}

// -- Administración ---------------------------------------------------------------

/// Panel de administración.
#[get("/admin")]
pub async fn panel_admin(req: HttpRequest, acceso: Protegido<SoloAdmin>) -> HttpResponse {
    let aviso = tomar_aviso(&req);
    let cuerpo = concat!(
        r#"<ul class="panel">"#,
        r#"<li><a href="/admin/productos">Gestionar productos</a></li>"#,
        r#"<li><a href="/admin/productos/nuevo">Agregar producto</a></li>"#,
        r#"<li><a href="/admin/categorias">Gestionar categorías</a></li>"#,
        r#"<li><a href="/inventario">Inventario</a></li>"#,
        r#"<li><a href="/pedidos">Pedidos</a></li>"#,
        "</ul>"
    );
    html_ok(
        pagina("Panel de Administración", Some(&acceso.sesion), aviso, cuerpo),
        aviso.is_some(),
    )
}

/// Rota para listar los productos (id, nombre, stock y precio).
#[get("/admin/productos")]
pub async fn listar_productos_admin(
    data: web::Data<AppState>,
    req: HttpRequest,
    acceso: Protegido<SoloAdmin>,
) -> HttpResponse {
    let aviso = tomar_aviso(&req);
    let mut cuerpo =
        String::from(r#"<p><a class="boton" href="/admin/productos/nuevo">Agregar producto</a></p>"#);

    let resultado = match &data.catalogo {
        Some(cliente_catalogo) => cliente_catalogo.listar_resumen().await,
        None => data
            .api_de(&acceso.sesion)
            .listar_productos()
            .await
            .map(|productos| productos.into_iter().map(ProductoResumen::from).collect()),
    };

    let productos = match resultado {
        Ok(productos) => productos,
        Err(e) => {
            tracing::error!(error = %e, "error al listar productos");
            cuerpo.push_str(&banner_error(&e.mensaje()));
            let doc = pagina("Productos", Some(&acceso.sesion), aviso, &cuerpo);
            return html_con_estado(StatusCode::BAD_GATEWAY, doc, aviso.is_some());
        }
    };

    if productos.is_empty() {
        cuerpo.push_str("<p>No hay productos registrados.</p>");
    } else {
        cuerpo.push_str(
            "<table><thead><tr><th>ID</th><th>Nombre</th><th>Stock</th><th>Precio</th></tr></thead><tbody>",
        );
        for p in &productos {
            cuerpo.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                p.id,
                escapar(&p.nombre),
                p.stock.map(|s| s.to_string()).unwrap_or_else(|| "—".into()),
                formatear_precio(p.precio_venta.as_ref()),
            ));
        }
        cuerpo.push_str("</tbody></table>");
    }

    html_ok(
        pagina("Productos", Some(&acceso.sesion), aviso, &cuerpo),
        aviso.is_some(),
    )
}

// -- Asistente de alta ----------------------------------------------------------------

/// Campos ocultos con todo el borrador salvo los que el paso muestra.
fn ocultos_menos(borrador: &BorradorProducto, visibles: &[&str]) -> String {
    borrador
        .como_campos()
        .into_iter()
        .filter(|(nombre, _)| !visibles.contains(nombre))
        .map(|(nombre, valor)| campo_oculto(nombre, &valor))
        .collect()
}

fn valor_de(borrador: &BorradorProducto, campo: &str) -> String {
    borrador
        .como_campos()
        .into_iter()
        .find(|(nombre, _)| *nombre == campo)
        .map(|(_, valor)| escapar(&valor))
        .unwrap_or_default()
}

fn indicador_pasos(actual: Paso) -> String {
    let mut html = String::from(r#"<ol class="pasos">"#);
    for paso in [Paso::Esenciales, Paso::InventarioPrecios, Paso::Metadatos] {
        let clase = if paso == actual { r#" class="actual""# } else { "" };
        html.push_str(&format!("<li{}>{}</li>", clase, paso.titulo()));
    }
    html.push_str("</ol>");
    html
}

fn paso_esenciales(asistente: &AsistenteProducto, categorias: &[Categoria]) -> String {
    let b = asistente.borrador();
    let visibles = ["nombre", "descripcion", "categoria_id"];
    let mut html = format!(
        concat!(
            r#"<form method="post" action="/admin/productos/nuevo">"#,
            r#"<input type="hidden" name="paso" value="1">{ocultos}"#,
            r#"<label>Nombre <input name="nombre" value="{nombre}"></label>{error_nombre}"#,
            r#"<label>Descripción <textarea name="descripcion">{descripcion}</textarea></label>"#,
            r#"<label>Categoría <select name="categoria_id">{opciones}</select></label>{error_categoria}"#,
            r#"<button type="submit" name="accion" value="siguiente">Siguiente</button></form>"#
        ),
        ocultos = ocultos_menos(b, &visibles),
        nombre = escapar(&b.nombre),
        error_nombre = error_campo(asistente.error(Campo::Nombre)),
        descripcion = escapar(&b.descripcion),
        opciones = opciones_categoria(categorias, b.categoria_id),
        error_categoria = error_campo(asistente.error(Campo::Categoria)),
    );

    // Formulario aparte para crear una categoría sin perder el borrador
    html.push_str(&format!(
        concat!(
            r#"<form method="post" action="/admin/productos/nuevo/categoria" class="nueva-categoria">"#,
            "{ocultos}",
            r#"<label>Nueva categoría <input name="nueva_categoria"></label>"#,
            r#"<button type="submit">Crear categoría</button></form>"#
        ),
        ocultos = ocultos_menos(b, &[]),
    ));
    html
}

fn paso_inventario(asistente: &AsistenteProducto) -> String {
    let b = asistente.borrador();
    let visibles = ["stock", "precio_compra", "precio_venta"];
    format!(
        concat!(
            r#"<form method="post" action="/admin/productos/nuevo">"#,
            r#"<input type="hidden" name="paso" value="2">{ocultos}"#,
            r#"<label>Stock <input name="stock" inputmode="numeric" value="{stock}"></label>{error_stock}"#,
            r#"<label>Precio de compra <input name="precio_compra" inputmode="decimal" value="{compra}"></label>"#,
            r#"<label>Precio de venta <input name="precio_venta" inputmode="decimal" value="{venta}"></label>{error_venta}"#,
            r#"<button type="submit" name="accion" value="anterior">Anterior</button>"#,
            r#"<button type="submit" name="accion" value="siguiente">Siguiente</button></form>"#
        ),
        ocultos = ocultos_menos(b, &visibles),
        stock = valor_de(b, "stock"),
        error_stock = error_campo(asistente.error(Campo::Stock)),
        compra = valor_de(b, "precio_compra"),
        venta = valor_de(b, "precio_venta"),
        error_venta = error_campo(asistente.error(Campo::PrecioVenta)),
    )
}

fn paso_metadatos(asistente: &AsistenteProducto, categorias: &[Categoria]) -> String {
    let b = asistente.borrador();
    let visibles = ["codigo_qr", "codigo_barras", "fecha_vencimiento"];
    let categoria = categorias
        .iter()
        .find(|c| Some(c.id) == b.categoria_id)
        .map(|c| c.nombre.as_str())
        .unwrap_or("—");

    format!(
        concat!(
            r#"<form method="post" action="/admin/productos/nuevo/guardar" enctype="multipart/form-data">"#,
            r#"<input type="hidden" name="paso" value="3">{ocultos}"#,
            r#"<label>Código QR <input name="codigo_qr" value="{qr}"></label>"#,
            r#"<label>Código de barras <input name="codigo_barras" value="{barras}"></label>"#,
            r#"<label>Fecha de vencimiento <input type="date" name="fecha_vencimiento" value="{fecha}"></label>{error_fecha}"#,
            r#"<label>Imagen <input type="file" name="{campo_imagen}" accept="image/*"></label>{error_imagen}"#,
            r#"<dl class="revision"><dt>Nombre</dt><dd>{nombre}</dd><dt>Categoría</dt><dd>{categoria}</dd>"#,
            r#"<dt>Stock</dt><dd>{stock}</dd><dt>Precio de venta</dt><dd>{precio}</dd></dl>"#,
            r#"<button type="submit" name="accion" value="anterior">Anterior</button>"#,
            r#"<button type="submit" name="accion" value="guardar">Guardar producto</button></form>"#
        ),
        ocultos = ocultos_menos(b, &visibles),
        qr = escapar(&b.codigo_qr),
        barras = escapar(&b.codigo_barras),
        fecha = valor_de(b, "fecha_vencimiento"),
        error_fecha = error_campo(asistente.error(Campo::FechaVencimiento)),
        campo_imagen = CAMPO_IMAGEN,
        error_imagen = error_campo(asistente.error(Campo::Imagen)),
        nombre = escapar(&b.nombre),
        categoria = escapar(categoria),
        stock = b.stock.map(|s| s.to_string()).unwrap_or_default(),
        precio = formatear_precio(b.precio_venta.as_ref()),
    )
}

/// Página completa del asistente en su paso actual.
fn pagina_asistente(
    sesion: &Sesion,
    asistente: &AsistenteProducto,
    categorias: &[Categoria],
    error: Option<&str>,
) -> String {
    let mut cuerpo = indicador_pasos(asistente.paso());
    if let Some(error) = error {
        cuerpo.push_str(&banner_error(error));
    }
    cuerpo.push_str(&format!("<h2>{}</h2>", asistente.paso().titulo()));
    cuerpo.push_str(&match asistente.paso() {
        Paso::Esenciales => paso_esenciales(asistente, categorias),
        Paso::InventarioPrecios => paso_inventario(asistente),
        Paso::Metadatos => paso_metadatos(asistente, categorias),
    });
    pagina("Nuevo Producto", Some(sesion), None, &cuerpo)
}

async fn responder_asistente(
    data: &AppState,
    sesion: &Sesion,
    asistente: &AsistenteProducto,
    error: Option<&str>,
) -> HttpResponse {
    let categorias = match data.api_de(sesion).listar_categorias().await {
        Ok(categorias) => categorias,
        Err(e) => {
            tracing::warn!(error = %e, "no se pudieron cargar las categorías");
            Vec::new()
        }
    };
    let estado = if error.is_some() || !asistente.errores().is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    html_con_estado(
        estado,
        pagina_asistente(sesion, asistente, &categorias, error),
        false,
    )
}

fn paso_del_formulario(campos: &HashMap<String, String>) -> Paso {
    let numero = campos
        .get("paso")
        .and_then(|p| p.trim().parse::<u8>().ok())
        .unwrap_or(1);
    Paso::desde_numero(numero)
}

/// Primer paso del asistente con el borrador inicial.
#[get("/admin/productos/nuevo")]
pub async fn asistente_nuevo(data: web::Data<AppState>, acceso: Protegido<SoloAdmin>) -> HttpResponse {
    responder_asistente(&data, &acceso.sesion, &AsistenteProducto::new(), None).await
}

/// Avanza o retrocede un paso (pasos 1 y 2).
#[post("/admin/productos/nuevo")]
pub async fn asistente_paso(
    data: web::Data<AppState>,
    acceso: Protegido<SoloAdmin>,
    formulario: web::Form<HashMap<String, String>>,
) -> HttpResponse {
    let campos = formulario.into_inner();
    let mut asistente = AsistenteProducto::en_paso(
        paso_del_formulario(&campos),
        BorradorProducto::desde_campos(&campos),
    );

    match campos.get("accion").map(String::as_str) {
        Some("anterior") => asistente.anterior(),
        _ => {
            asistente.siguiente();
        }
    }

    responder_asistente(&data, &acceso.sesion, &asistente, None).await
}

/// Crea una categoría desde el paso 1 y la deja elegida.
#[post("/admin/productos/nuevo/categoria")]
pub async fn asistente_categoria(
    data: web::Data<AppState>,
    acceso: Protegido<SoloAdmin>,
    formulario: web::Form<HashMap<String, String>>,
) -> HttpResponse {
    let campos = formulario.into_inner();
    let mut asistente =
        AsistenteProducto::en_paso(Paso::Esenciales, BorradorProducto::desde_campos(&campos));
    let nombre = campos
        .get("nueva_categoria")
        .map(|n| n.trim())
        .unwrap_or_default();

    if nombre.is_empty() {
        return responder_asistente(&data, &acceso.sesion, &asistente, Some(MSG_NOMBRE_CATEGORIA))
            .await;
    }

    match data.api_de(&acceso.sesion).crear_categoria(nombre).await {
        Ok(categoria) => {
            tracing::info!(id = categoria.id, nombre = %categoria.nombre, "categoría creada desde el asistente");
            asistente.borrador_mut().categoria_id = Some(categoria.id);
            responder_asistente(&data, &acceso.sesion, &asistente, None).await
        }
        Err(e) => {
            tracing::error!(error = %e, "error al crear categoría");
            responder_asistente(&data, &acceso.sesion, &asistente, Some(&e.mensaje())).await
        }
    }
}

/// Envío final (paso 3, multipart): valida todo, sube la imagen y crea el producto.
#[post("/admin/productos/nuevo/guardar")]
pub async fn asistente_guardar(
    data: web::Data<AppState>,
    acceso: Protegido<SoloAdmin>,
    carga: Multipart,
) -> HttpResponse {
    // 1. Leer campos e imagen
    let formulario = match leer_formulario(carga, CAMPO_IMAGEN).await {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(error = %e, "formulario de producto ilegible");
            let asistente = AsistenteProducto::en_paso(Paso::Metadatos, BorradorProducto::nuevo());
            return responder_asistente(&data, &acceso.sesion, &asistente, Some(&e.to_string())).await;
        }
    };

    let mut asistente = AsistenteProducto::en_paso(
        Paso::Metadatos,
        BorradorProducto::desde_campos(&formulario.campos),
    );

    if formulario.campos.get("accion").map(String::as_str) == Some("anterior") {
        asistente.anterior();
        return responder_asistente(&data, &acceso.sesion, &asistente, None).await;
    }

    if let Some(error) = formulario.error_archivo() {
        return responder_asistente(&data, &acceso.sesion, &asistente, Some(&error.to_string())).await;
    }

    // 2. Revalidar los tres pasos
    if asistente.preparar_envio(formulario.archivo.is_some()).is_err() {
        return responder_asistente(&data, &acceso.sesion, &asistente, None).await;
    }

    let api = data.api_de(&acceso.sesion);

    // 3. Subir la imagen antes de crear el producto
    let imagen_url = match &formulario.archivo {
        Some(archivo) => match api.subir_imagen(archivo).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::error!(error = %e, "error al subir la imagen");
                let mensaje = format!("Error subiendo imagen: {}", e.mensaje());
                return responder_asistente(&data, &acceso.sesion, &asistente, Some(&mensaje)).await;
            }
        },
        None => None,
    };

    // 4. Crear el producto
    let Some(nuevo) = asistente.en_nuevo_producto(imagen_url) else {
        return responder_asistente(&data, &acceso.sesion, &asistente, None).await;
    };

    match api.crear_producto(&nuevo).await {
        Ok(()) => {
            tracing::info!(nombre = %nuevo.nombre, "producto creado");
            redireccion("/admin/productos")
                .cookie(Aviso::ProductoCreado.cookie(data.config.cookie_segura))
                .finish()
        }
        Err(e) => {
            tracing::error!(error = %e, "error al crear el producto");
            responder_asistente(&data, &acceso.sesion, &asistente, Some(&e.mensaje())).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usuarios::usuario_structs::Rol;

    fn sesion() -> Sesion {
        Sesion {
            token: "t".into(),
            rol: Rol::Admin,
        }
    }

    #[test]
    fn paso2_lleva_el_resto_del_borrador_oculto() {
        let mut borrador = BorradorProducto::nuevo();
        borrador.nombre = "Café \"premium\"".into();
        let asistente = AsistenteProducto::en_paso(Paso::InventarioPrecios, borrador);

        let html = pagina_asistente(&sesion(), &asistente, &[], None);
        assert!(html.contains(r#"<input type="hidden" name="nombre" value="Café &quot;premium&quot;">"#));
        assert!(html.contains(r#"name="precio_venta""#));
        assert!(!html.contains(r#"type="hidden" name="precio_venta""#));
        assert!(html.contains(r#"value="anterior""#));
    }

    #[test]
    fn paso3_es_multipart_y_muestra_errores() {
        let mut asistente = AsistenteProducto::en_paso(Paso::Metadatos, BorradorProducto::nuevo());
        let _ = asistente.preparar_envio(false);
        // Vuelve al paso 1 porque falta el nombre
        assert_eq!(asistente.paso(), Paso::Esenciales);

        let categorias = vec![Categoria {
            id: 3,
            nombre: "Bebidas".into(),
        }];
        let html = pagina_asistente(&sesion(), &asistente, &categorias, None);
        assert!(html.contains("El nombre es obligatorio."));
        assert!(html.contains("/admin/productos/nuevo/categoria"));

        let mut en_paso3 = AsistenteProducto::en_paso(Paso::Metadatos, BorradorProducto::nuevo());
        en_paso3.borrador_mut().categoria_id = Some(3);
        let html = pagina_asistente(&sesion(), &en_paso3, &categorias, None);
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains("<dd>Bebidas</dd>"));
    }

    #[test]
    fn tarjeta_sin_imagen() {
        let html = tarjeta_producto(&ProductoCatalogo {
            id: 1,
            nombre: "Pan".into(),
            precio_venta: None,
            imagen_url: None,
            descripcion: None,
        });
        assert!(html.contains("Sin imagen"));
        assert!(html.contains("—"));
    }
}
