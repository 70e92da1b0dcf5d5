// src/pedidos/pedidos_router.rs

use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

// Importa las structs del módulo de pedidos
use super::pedidos_structs::{filtrar_pedidos, nuevo_pedido_desde_formulario, EstadoPedido, Pedido};

use crate::productos::productos_structs::Producto;
use crate::shared::aviso::{tomar_aviso, Aviso};
use crate::shared::vistas::{banner_error, escapar, formatear_precio, html_con_estado, html_ok, pagina, redireccion};
use crate::usuarios::auth_middleware::{rol_permitido, CualquierRol, Gestion, Protegido, RequisitoRol};
use crate::usuarios::usuario_structs::Sesion;
use crate::AppState;

/// Líneas de producto que ofrece el formulario de pedido.
const LINEAS_FORMULARIO: usize = 5;

#[derive(Debug, Default, Deserialize)]
pub struct BusquedaPedidos {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct FormularioEstado {
    pub estado: String,
}

fn puede_gestionar(sesion: &Sesion) -> bool {
    rol_permitido(sesion.rol, Gestion::ROLES)
}

fn etiqueta_estado(pedido: &Pedido) -> &'static str {
    pedido.estado.map(|e| e.etiqueta()).unwrap_or("—")
}

/// Rota para listar los pedidos con búsqueda por id, cliente o vendedor.
#[get("/pedidos")]
pub async fn listar_pedidos(
    data: web::Data<AppState>,
    req: HttpRequest,
    acceso: Protegido<CualquierRol>,
    busqueda: web::Query<BusquedaPedidos>,
) -> HttpResponse {
    let aviso = tomar_aviso(&req);
    let titulo = if puede_gestionar(&acceso.sesion) { "Pedidos" } else { "Mis Pedidos" };

    let mut cuerpo = format!(
        concat!(
            r#"<form method="get" action="/pedidos" class="buscador">"#,
            r#"<input name="q" value="{}" placeholder="Buscar por id, cliente o vendedor">"#,
            r#"<button type="submit">Buscar</button></form>"#
        ),
        escapar(&busqueda.q)
    );
    if puede_gestionar(&acceso.sesion) {
        cuerpo.push_str(r#"<p><a class="boton" href="/pedidos/nuevo">Nuevo pedido</a></p>"#);
    }

    let pedidos = match data.api_de(&acceso.sesion).listar_pedidos().await {
        Ok(pedidos) => pedidos,
        Err(e) => {
            tracing::error!(error = %e, "error al listar pedidos");
            cuerpo.push_str(&banner_error(&e.mensaje()));
            let doc = pagina(titulo, Some(&acceso.sesion), aviso, &cuerpo);
            return html_con_estado(StatusCode::BAD_GATEWAY, doc, aviso.is_some());
        }
    };

    let visibles = filtrar_pedidos(&pedidos, &busqueda.q);
    if visibles.is_empty() {
        cuerpo.push_str("<p>No hay pedidos.</p>");
    } else {
        cuerpo.push_str(concat!(
            "<table><thead><tr><th>ID</th><th>Cliente</th><th>Vendedor</th><th>Total</th>",
            "<th>Estado</th><th>Fecha</th></tr></thead><tbody>"
        ));
        for p in visibles {
            cuerpo.push_str(&format!(
                r#"<tr><td><a href="/pedidos/{id}">{id}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escapar(&p.nombre_cliente()),
                escapar(&p.nombre_vendedor()),
                formatear_precio(p.total.as_ref()),
                etiqueta_estado(p),
                escapar(&p.fecha_corta()),
                id = p.id,
            ));
        }
        cuerpo.push_str("</tbody></table>");
    }

    html_ok(pagina(titulo, Some(&acceso.sesion), aviso, &cuerpo), aviso.is_some())
}

fn opciones_producto(productos: &[Producto]) -> String {
    let mut html = String::from(r#"<option value="">—</option>"#);
    for p in productos {
        html.push_str(&format!(
            r#"<option value="{}">{} (stock: {})</option>"#,
            p.id,
            escapar(&p.nombre),
            p.stock.map(|s| s.to_string()).unwrap_or_else(|| "?".into())
        ));
    }
    html
}

fn pagina_nuevo_pedido(
    sesion: &Sesion,
    productos: &[Producto],
    cliente_id: &str,
    error: Option<&str>,
) -> String {
    let mut cuerpo = String::new();
    if let Some(error) = error {
        cuerpo.push_str(&banner_error(error));
    }
    cuerpo.push_str(&format!(
        concat!(
            r#"<form method="post" action="/pedidos/nuevo">"#,
            r#"<label>ID del cliente <input name="cliente_id" inputmode="numeric" value="{}" required></label>"#,
            "<fieldset><legend>Productos</legend>"
        ),
        escapar(cliente_id)
    ));

    let opciones = opciones_producto(productos);
    for _ in 0..LINEAS_FORMULARIO {
        let producto = if productos.is_empty() {
            r#"<input name="producto_id" inputmode="numeric" placeholder="ID del producto">"#.to_string()
        } else {
            format!(r#"<select name="producto_id">{opciones}</select>"#)
        };
        cuerpo.push_str(&format!(
            r#"<div class="linea">{producto}<input name="cantidad" type="number" min="1" value="1"></div>"#
        ));
    }
    cuerpo.push_str(r#"</fieldset><button type="submit">Registrar Pedido</button></form>"#);

    pagina("Nuevo Pedido", Some(sesion), None, &cuerpo)
}

async fn productos_para_formulario(data: &AppState, sesion: &Sesion) -> Vec<Producto> {
    match data.api_de(sesion).listar_productos().await {
        Ok(productos) => productos,
        Err(e) => {
            tracing::warn!(error = %e, "no se pudieron cargar los productos del formulario");
            Vec::new()
        }
    }
}

/// Alta de pedido sin carrito: cliente y líneas de producto.
#[get("/pedidos/nuevo")]
pub async fn formulario_pedido(data: web::Data<AppState>, acceso: Protegido<Gestion>) -> HttpResponse {
    let productos = productos_para_formulario(&data, &acceso.sesion).await;
    html_ok(pagina_nuevo_pedido(&acceso.sesion, &productos, "", None), false)
}

/// Rota para registrar un pedido.
#[post("/pedidos/nuevo")]
pub async fn registrar_pedido(
    data: web::Data<AppState>,
    acceso: Protegido<Gestion>,
    formulario: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    let pares = formulario.into_inner();
    let cliente_id = pares
        .iter()
        .find(|(k, _)| k == "cliente_id")
        .map(|(_, v)| v.clone())
        .unwrap_or_default();

    // 1. Validar el formulario
    let error = match nuevo_pedido_desde_formulario(&pares) {
        Ok(pedido) => {
            // 2. Registrar en el backend
            match data.api_de(&acceso.sesion).crear_pedido(&pedido).await {
                Ok(()) => {
                    tracing::info!(cliente = pedido.cliente_id, lineas = pedido.items.len(), "pedido registrado");
                    return redireccion("/pedidos")
                        .cookie(Aviso::PedidoCreado.cookie(data.config.cookie_segura))
                        .finish();
                }
                Err(e) => {
                    tracing::error!(error = %e, "error al registrar el pedido");
                    e.mensaje()
                }
            }
        }
        Err(mensaje) => mensaje.to_string(),
    };

    let productos = productos_para_formulario(&data, &acceso.sesion).await;
    html_con_estado(
        StatusCode::UNPROCESSABLE_ENTITY,
        pagina_nuevo_pedido(&acceso.sesion, &productos, &cliente_id, Some(&error)),
        false,
    )
}

fn detalle(pedido: &Pedido, gestionar: bool) -> String {
    let mut html = format!(
        concat!(
            "<dl><dt>Cliente</dt><dd>{}</dd><dt>Vendedor</dt><dd>{}</dd>",
            "<dt>Total</dt><dd>{}</dd><dt>Estado</dt><dd>{}</dd><dt>Fecha</dt><dd>{}</dd></dl>"
        ),
        escapar(&pedido.nombre_cliente()),
        escapar(&pedido.nombre_vendedor()),
        formatear_precio(pedido.total.as_ref()),
        etiqueta_estado(pedido),
        escapar(&pedido.fecha_corta()),
    );

    if !pedido.items.is_empty() {
        html.push_str("<table><thead><tr><th>Producto</th><th>Cantidad</th><th>Precio unitario</th></tr></thead><tbody>");
        for item in &pedido.items {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escapar(
                    &item
                        .producto
                        .as_ref()
                        .map(|p| p.descripcion())
                        .unwrap_or_default()
                ),
                item.cantidad,
                formatear_precio(item.precio_unitario.as_ref()),
            ));
        }
        html.push_str("</tbody></table>");
    }

    if gestionar {
        html.push_str(&format!(
            r#"<form method="post" action="/pedidos/{}/estado"><label>Estado <select name="estado">"#,
            pedido.id
        ));
        for estado in EstadoPedido::TODOS {
            let marcado = if pedido.estado == Some(estado) { " selected" } else { "" };
            html.push_str(&format!(
                r#"<option value="{}"{}>{}</option>"#,
                estado.as_str(),
                marcado,
                estado.etiqueta()
            ));
        }
        html.push_str(r#"</select></label><button type="submit">Actualizar estado</button></form>"#);
    }

    html.push_str(r#"<p><a href="/pedidos">Volver a pedidos</a></p>"#);
    html
}

/// Detalle de un pedido con sus líneas.
#[get("/pedidos/{id}")]
pub async fn detalle_pedido(
    data: web::Data<AppState>,
    req: HttpRequest,
    acceso: Protegido<CualquierRol>,
    ruta: web::Path<i64>,
) -> HttpResponse {
    let id = ruta.into_inner();
    let aviso = tomar_aviso(&req);
    let titulo = format!("Detalle del Pedido #{id}");

    match data.api_de(&acceso.sesion).obtener_pedido(id).await {
        Ok(pedido) => html_ok(
            pagina(
                &titulo,
                Some(&acceso.sesion),
                aviso,
                &detalle(&pedido, puede_gestionar(&acceso.sesion)),
            ),
            aviso.is_some(),
        ),
        Err(e) => {
            tracing::error!(error = %e, id, "error al cargar el pedido");
            let estado = match e.status() {
                Some(404) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            };
            let doc = pagina(&titulo, Some(&acceso.sesion), aviso, &banner_error(&e.mensaje()));
            html_con_estado(estado, doc, aviso.is_some())
        }
    }
}

/// Rota para cambiar el estado de un pedido.
#[post("/pedidos/{id}/estado")]
pub async fn cambiar_estado(
    data: web::Data<AppState>,
    acceso: Protegido<Gestion>,
    ruta: web::Path<i64>,
    formulario: web::Form<FormularioEstado>,
) -> HttpResponse {
    let id = ruta.into_inner();
    let titulo = format!("Detalle del Pedido #{id}");

    let estado = match formulario.estado.parse::<EstadoPedido>() {
        Ok(estado) => estado,
        Err(e) => {
            let doc = pagina(&titulo, Some(&acceso.sesion), None, &banner_error(&e));
            return html_con_estado(StatusCode::BAD_REQUEST, doc, false);
        }
    };

    match data.api_de(&acceso.sesion).actualizar_estado_pedido(id, estado).await {
        Ok(()) => {
            tracing::info!(id, estado = %estado, "estado de pedido actualizado");
            redireccion(&format!("/pedidos/{id}"))
                .cookie(Aviso::EstadoActualizado.cookie(data.config.cookie_segura))
                .finish()
        }
        Err(e) => {
            tracing::error!(error = %e, id, "error al actualizar el estado");
            let doc = pagina(&titulo, Some(&acceso.sesion), None, &banner_error(&e.mensaje()));
            html_con_estado(StatusCode::BAD_GATEWAY, doc, false)
        }
    }
}
