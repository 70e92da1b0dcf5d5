// src/shared/vistas.rs
//
// Plantillas HTML mínimas. El estilo visual queda fuera de este crate; aquí
// solo se arma la estructura de cada página.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, HttpResponseBuilder};
use bigdecimal::BigDecimal;

use super::aviso::{cookie_borrar_aviso, Aviso};
use crate::usuarios::navegacion::enlaces_de_sesion;
use crate::usuarios::usuario_structs::Sesion;

/// Escapa texto para insertarlo en HTML (contenido o atributos).
pub fn escapar(texto: &str) -> String {
    let mut salida = String::with_capacity(texto.len());
    for c in texto.chars() {
        match c {
            '&' => salida.push_str("&amp;"),
            '<' => salida.push_str("&lt;"),
            '>' => salida.push_str("&gt;"),
            '"' => salida.push_str("&quot;"),
            '\'' => salida.push_str("&#39;"),
            _ => salida.push(c),
        }
    }
    salida
}

/// Precio en soles con dos decimales; sin precio, un guion largo.
pub fn formatear_precio(valor: Option<&BigDecimal>) -> String {
    match valor {
        Some(v) => format!("S/ {}", v.with_scale(2)),
        None => "—".to_string(),
    }
}

pub fn banner_error(mensaje: &str) -> String {
    format!(r#"<div class="banner error" role="alert">{}</div>"#, escapar(mensaje))
}

pub fn campo_oculto(nombre: &str, valor: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        escapar(nombre),
        escapar(valor)
    )
}

/// Mensaje de error debajo de un campo de formulario.
pub fn error_campo(mensaje: Option<&String>) -> String {
    mensaje
        .map(|m| format!(r#"<p class="error-campo">{}</p>"#, escapar(m)))
        .unwrap_or_default()
}

fn cabecera(sesion: Option<&Sesion>) -> String {
    let mut html = String::from(r#"<header><a class="marca" href="/">MiEcommerce</a><nav>"#);
    for enlace in enlaces_de_sesion(sesion) {
        html.push_str(&format!(
            r#"<a href="{}">{}</a>"#,
            enlace.href,
            escapar(enlace.etiqueta)
        ));
    }
    html.push_str("</nav>");
    match sesion {
        Some(_) => html.push_str(
            r#"<form method="post" action="/logout"><button type="submit">Cerrar Sesión</button></form>"#,
        ),
        None => html.push_str(r#"<a href="/login">Iniciar Sesión</a>"#),
    }
    html.push_str("</header>");
    html
}

/// Documento completo: cabecera con la navegación del rol, aviso y contenido.
pub fn pagina(titulo: &str, sesion: Option<&Sesion>, aviso: Option<Aviso>, cuerpo: &str) -> String {
    let aviso = aviso
        .map(|a| format!(r#"<div class="aviso" role="status">{}</div>"#, escapar(a.mensaje())))
        .unwrap_or_default();

    format!(
        concat!(
            "<!DOCTYPE html>\n<html lang=\"es\"><head><meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            "<title>{titulo} | MiEcommerce</title></head><body>{cabecera}<main>{aviso}",
            "<h1>{titulo}</h1>{cuerpo}</main>",
            "<footer>&copy; MiEcommerce</footer></body></html>"
        ),
        titulo = escapar(titulo),
        cabecera = cabecera(sesion),
        aviso = aviso,
        cuerpo = cuerpo,
    )
}

/// Respuesta 200 con HTML. Si la página mostró un aviso, se borra su cookie.
pub fn html_ok(documento: String, aviso_mostrado: bool) -> HttpResponse {
    html_con_estado(StatusCode::OK, documento, aviso_mostrado)
}

pub fn html_con_estado(estado: StatusCode, documento: String, aviso_mostrado: bool) -> HttpResponse {
    let mut respuesta = HttpResponse::build(estado);
    respuesta.content_type("text/html; charset=utf-8");
    if aviso_mostrado {
        respuesta.cookie(cookie_borrar_aviso());
    }
    respuesta.body(documento)
}

/// Redirección 303 (POST/redirect/GET). Se devuelve el builder para añadir cookies.
pub fn redireccion(destino: &str) -> HttpResponseBuilder {
    let mut respuesta = HttpResponse::SeeOther();
    respuesta.insert_header((header::LOCATION, destino.to_string()));
    respuesta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usuarios::usuario_structs::Rol;
    use std::str::FromStr;

    #[test]
    fn escapa_caracteres_html() {
        assert_eq!(
            escapar(r#"<b>"Té" & 'café'</b>"#),
            "&lt;b&gt;&quot;Té&quot; &amp; &#39;café&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn precio_con_dos_decimales() {
        let precio = BigDecimal::from_str("12.5").unwrap();
        assert_eq!(formatear_precio(Some(&precio)), "S/ 12.50");
        assert_eq!(formatear_precio(None), "—");
    }

    #[test]
    fn pagina_sin_sesion_muestra_login() {
        let html = pagina("Inicio", None, None, "<p>hola</p>");
        assert!(html.contains(r#"href="/login""#));
        assert!(!html.contains("/logout"));
    }

    #[test]
    fn pagina_con_sesion_muestra_enlaces_del_rol() {
        let sesion = Sesion {
            token: "t".into(),
            rol: Rol::Vendedor,
        };
        let html = pagina("Inventario", Some(&sesion), Some(Aviso::ProductoEliminado), "");
        assert!(html.contains("Gestionar Pedidos"));
        assert!(html.contains(r#"href="/inventario""#));
        assert!(!html.contains("Dashboard"));
        assert!(html.contains("Producto eliminado."));
    }
}
