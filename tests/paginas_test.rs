//! Pruebas de las páginas completas: guardia de rutas, sesión y formularios,
//! con el backend simulado.
//!
//! | Página | Prueba |
//! |--------|--------|
//! | `/inventario` | `inventario_*`, `vendedor_*`, `cliente_*`, `backend_caido_*` |
//! | `/login`, `/logout`, `/sesion` | `login_*`, `logout_*`, `sesion_*` |
//! | `/productos`, `/admin/productos` | `catalogo_*`, `listado_admin_*` |
//! | `/admin/productos/nuevo[/guardar]` | `asistente_*` |
//! | `/inventario/{id}/editar` | `edicion_*` |
//! | `/pedidos/nuevo` | `pedido_*` |

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use miecommerce::config::config_structs::AppConfig;
use miecommerce::productos::asistente::MSG_NOMBRE;
use miecommerce::{configurar_rutas, AppState};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header as cabecera, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn estado(servidor: &MockServer) -> web::Data<AppState> {
    web::Data::new(AppState::new(AppConfig::para_backend(&servidor.uri())).unwrap())
}

fn cookies_de(rol: &str) -> [Cookie<'static>; 2] {
    [Cookie::new("token", "tok"), Cookie::new("role", rol.to_string())]
}

fn destino(respuesta: &actix_web::dev::ServiceResponse) -> Option<String> {
    respuesta
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn montar_productos(servidor: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/productos"))
        .and(cabecera("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "nombre": "Leche", "stock": 4, "precio_venta": 4.5, "categoria_nombre": "Lácteos"},
            {"id": 2, "nombre": "Pan", "stock": 10, "precio_venta": 1.2, "categoria_nombre": "Panadería"}
        ])))
        .mount(servidor)
        .await;
}

#[actix_web::test]
async fn inventario_sin_sesion_redirige_al_login() {
    let servidor = MockServer::start().await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let req = test::TestRequest::get().uri("/inventario").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(destino(&resp).as_deref(), Some("/login"));
}

#[actix_web::test]
async fn cliente_no_entra_al_inventario() {
    let servidor = MockServer::start().await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let [token, rol] = cookies_de("CLIENTE");
    let req = test::TestRequest::get()
        .uri("/inventario")
        .cookie(token)
        .cookie(rol)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(destino(&resp).as_deref(), Some("/login"));
}

#[actix_web::test]
async fn rol_desconocido_cuenta_como_sin_sesion() {
    let servidor = MockServer::start().await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let [token, rol] = cookies_de("SUPERVISOR");
    let req = test::TestRequest::get()
        .uri("/pedidos")
        .cookie(token)
        .cookie(rol)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn vendedor_ve_el_inventario_filtrado() {
    let servidor = MockServer::start().await;
    montar_productos(&servidor).await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let [token, rol] = cookies_de("VENDEDOR");
    let req = test::TestRequest::get()
        .uri("/inventario?q=LECH")
        .cookie(token)
        .cookie(rol)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cuerpo = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(cuerpo.contains("<td>Leche</td>"));
    assert!(!cuerpo.contains("<td>Pan</td>"));
    assert!(cuerpo.contains(r#"href="/inventario""#));
}

#[actix_web::test]
async fn backend_caido_muestra_el_error_en_el_inventario() {
    let servidor = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/productos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("sin conexión a la base"))
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let [token, rol] = cookies_de("ADMIN");
    let req = test::TestRequest::get()
        .uri("/inventario")
        .cookie(token)
        .cookie(rol)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let cuerpo = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(cuerpo.contains("sin conexión a la base"));
}

#[actix_web::test]
async fn login_guarda_la_sesion_y_envia_a_la_pagina_del_rol() {
    let servidor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-v", "role": "VENDEDOR"})))
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "vera"), ("password", "clave")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(destino(&resp).as_deref(), Some("/inventario"));
    let cookies: Vec<Cookie<'_>> = resp.response().cookies().collect();
    assert!(cookies.iter().any(|c| c.name() == "token" && c.value() == "tok-v"));
    assert!(cookies.iter().any(|c| c.name() == "role" && c.value() == "VENDEDOR"));
}

#[actix_web::test]
async fn login_con_campos_vacios_no_llama_al_backend() {
    let servidor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "  "), ("password", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_rechazado_muestra_el_mensaje() {
    let servidor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "ana"), ("password", "mala")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let cuerpo = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(cuerpo.contains("Usuario o contraseña incorrecta"));
}

#[actix_web::test]
async fn sesion_devuelve_rol_y_enlaces() {
    let servidor = MockServer::start().await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let [token, rol] = cookies_de("CLIENTE");
    let req = test::TestRequest::get()
        .uri("/sesion")
        .cookie(token)
        .cookie(rol)
        .to_request();
    let cuerpo: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(cuerpo["status"], "success");
    assert_eq!(cuerpo["body"]["rol"], "CLIENTE");
    assert_eq!(cuerpo["body"]["enlaces"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn sesion_sin_cookies_no_tiene_rol() {
    let servidor = MockServer::start().await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let req = test::TestRequest::get().uri("/sesion").to_request();
    let cuerpo: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(cuerpo["message"], "Sin sesión");
    assert!(cuerpo["body"]["rol"].is_null());
    assert_eq!(cuerpo["body"]["enlaces"], json!([]));
}

#[actix_web::test]
async fn logout_borra_token_y_rol() {
    let servidor = MockServer::start().await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let [token, rol] = cookies_de("ADMIN");
    let req = test::TestRequest::post()
        .uri("/logout")
        .cookie(token)
        .cookie(rol)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(destino(&resp).as_deref(), Some("/login"));
    let cookies: Vec<Cookie<'_>> = resp.response().cookies().collect();
    for nombre in ["token", "role"] {
        let cookie = cookies.iter().find(|c| c.name() == nombre).unwrap();
        assert_eq!(cookie.value(), "");
    }
}

#[actix_web::test]
async fn asistente_no_avanza_sin_nombre() {
    let servidor = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categorias"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "nombre": "Lácteos"}])))
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let [token, rol] = cookies_de("ADMIN");
    let req = test::TestRequest::post()
        .uri("/admin/productos/nuevo")
        .cookie(token)
        .cookie(rol)
        .set_form([("paso", "1"), ("accion", "siguiente"), ("nombre", ""), ("categoria_id", "1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let cuerpo = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(cuerpo.contains(MSG_NOMBRE));
}

#[actix_web::test]
async fn asistente_es_solo_para_admin() {
    let servidor = MockServer::start().await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let [token, rol] = cookies_de("VENDEDOR");
    let req = test::TestRequest::get()
        .uri("/admin/productos/nuevo")
        .cookie(token)
        .cookie(rol)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn pedido_sin_lineas_se_rechaza_sin_llamar_al_backend() {
    let servidor = MockServer::start().await;
    montar_productos(&servidor).await;
    Mock::given(method("POST"))
        .and(path("/api/pedidos"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let [token, rol] = cookies_de("VENDEDOR");
    let req = test::TestRequest::post()
        .uri("/pedidos/nuevo")
        .cookie(token)
        .cookie(rol)
        .set_form([("cliente_id", "7"), ("producto_id", ""), ("cantidad", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ── Multipart ─────────────────────────────────────────────────────────────

const LIMITE: &str = "limite-miecommerce";

/// Cuerpo `multipart/form-data` con campos de texto y, opcionalmente, la imagen.
fn multipart(campos: &[(&str, &str)], imagen: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut cuerpo = Vec::new();
    for (nombre, valor) in campos {
        cuerpo.extend_from_slice(
            format!("--{LIMITE}\r\nContent-Disposition: form-data; name=\"{nombre}\"\r\n\r\n{valor}\r\n")
                .as_bytes(),
        );
    }
    if let Some((archivo, bytes)) = imagen {
        cuerpo.extend_from_slice(
            format!(
                "--{LIMITE}\r\nContent-Disposition: form-data; name=\"imagen\"; filename=\"{archivo}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        cuerpo.extend_from_slice(bytes);
        cuerpo.extend_from_slice(b"\r\n");
    }
    cuerpo.extend_from_slice(format!("--{LIMITE}--\r\n").as_bytes());
    cuerpo
}

fn post_multipart(uri: &str, rol: &str, cuerpo: Vec<u8>) -> test::TestRequest {
    let [token, rol] = cookies_de(rol);
    test::TestRequest::post()
        .uri(uri)
        .cookie(token)
        .cookie(rol)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={LIMITE}"),
        ))
        .set_payload(cuerpo)
}

fn cookie_de(resp: &actix_web::dev::ServiceResponse, nombre: &str) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == nombre)
        .map(|c| c.value().to_string())
}

// ── Catálogo desde el almacenamiento ───────────────────────────────────────

fn estado_con_almacenamiento(backend: &MockServer, almacen: &MockServer) -> web::Data<AppState> {
    let mut config = AppConfig::para_backend(&backend.uri());
    config.almacenamiento_url = Some(almacen.uri());
    config.almacenamiento_clave = Some("clave-publica".into());
    web::Data::new(AppState::new(config).unwrap())
}

#[actix_web::test]
async fn catalogo_lee_del_almacenamiento_cuando_esta_configurado() {
    let backend = MockServer::start().await;
    let almacen = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("order", "id.desc"))
        .and(cabecera("apikey", "clave-publica"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "nombre": "Yogur", "precio_venta": 3.2, "descripcion": "Natural"}
        ])))
        .expect(1)
        .mount(&almacen)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/productos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&backend)
        .await;
    let app = test::init_service(
        App::new()
            .app_data(estado_con_almacenamiento(&backend, &almacen))
            .configure(configurar_rutas),
    )
    .await;

    let req = test::TestRequest::get().uri("/productos").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cuerpo = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(cuerpo.contains("<h2>Yogur</h2>"));
}

#[actix_web::test]
async fn listado_admin_usa_el_resumen_del_almacenamiento() {
    let backend = MockServer::start().await;
    let almacen = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("order", "id.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "nombre": "Leche", "stock": 4, "precio_venta": 4.5}
        ])))
        .expect(1)
        .mount(&almacen)
        .await;
    let app = test::init_service(
        App::new()
            .app_data(estado_con_almacenamiento(&backend, &almacen))
            .configure(configurar_rutas),
    )
    .await;

    let [token, rol] = cookies_de("ADMIN");
    let req = test::TestRequest::get()
        .uri("/admin/productos")
        .cookie(token)
        .cookie(rol)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cuerpo = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(cuerpo.contains("<td>1</td><td>Leche</td><td>4</td>"));
}

// ── Asistente: envío final ─────────────────────────────────────────────────

fn campos_completos() -> Vec<(&'static str, &'static str)> {
    vec![
        ("nombre", "Queso"),
        ("categoria_id", "1"),
        ("stock", "3"),
        ("precio_venta", "9.90"),
        ("precio_compra", ""),
        ("fecha_vencimiento", ""),
    ]
}

#[actix_web::test]
async fn asistente_sube_la_imagen_y_crea_el_producto() {
    let servidor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/storage/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fileDownloadUri": "https://cdn/x.png"})))
        .expect(1)
        .mount(&servidor)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/productos"))
        .and(body_partial_json(json!({
            "nombre": "Queso",
            "categoria_id": 1,
            "stock": 3,
            "imagen_url": "https://cdn/x.png"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 11})))
        .expect(1)
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let cuerpo = multipart(&campos_completos(), Some(("queso.png", &b"PNG-QUESO"[..])));
    let req = post_multipart("/admin/productos/nuevo/guardar", "ADMIN", cuerpo).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(destino(&resp).as_deref(), Some("/admin/productos"));
    assert_eq!(cookie_de(&resp, "aviso").as_deref(), Some("producto_creado"));
}

#[actix_web::test]
async fn asistente_no_crea_si_la_subida_falla() {
    let servidor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/storage/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "disco lleno"})))
        .expect(1)
        .mount(&servidor)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/productos"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&servidor)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categorias"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "nombre": "Lácteos"}])))
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let cuerpo = multipart(&campos_completos(), Some(("queso.png", &b"PNG-QUESO"[..])));
    let req = post_multipart("/admin/productos/nuevo/guardar", "ADMIN", cuerpo).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("Error subiendo imagen: disco lleno"));
}

#[actix_web::test]
async fn asistente_rechaza_imagen_de_mas_de_5mb() {
    let servidor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/storage/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let enorme = vec![0u8; 5 * 1024 * 1024 + 1];
    let cuerpo = multipart(&campos_completos(), Some(("enorme.png", &enorme[..])));
    let req = post_multipart("/admin/productos/nuevo/guardar", "ADMIN", cuerpo).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("La imagen no debe superar los 5MB."));
}

// ── Inventario: edición parcial ────────────────────────────────────────────

const COPIA_LECHE: &str =
    r#"{"id":1,"nombre":"Leche","stock":25,"precio_venta":4.5,"categoria_id":2,"categoria_nombre":"Lácteos"}"#;

async fn montar_leche(servidor: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/productos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "nombre": "Leche", "stock": 25, "precio_venta": 4.5,
             "categoria": {"id": 2, "nombre": "Lácteos"}, "imagen_url": "https://cdn/leche.png"}
        ])))
        .mount(servidor)
        .await;
}

/// Valor del campo oculto `snapshot` tal como lo devolvería el navegador.
fn copia_del_formulario(html: &str) -> String {
    let marca = r#"name="snapshot" value=""#;
    let inicio = html.find(marca).unwrap() + marca.len();
    let fin = inicio + html[inicio..].find('"').unwrap();
    html[inicio..fin]
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[actix_web::test]
async fn edicion_en_blanco_conserva_los_valores_de_la_copia() {
    let servidor = MockServer::start().await;
    montar_leche(&servidor).await;
    Mock::given(method("PUT"))
        .and(path("/api/productos/1"))
        .and(body_partial_json(json!({
            "nombre": "Leche",
            "stock": 25,
            "precio_venta": 4.5,
            "categoria_id": 2
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    // 1. Abrir el editor y tomar la copia del campo oculto
    let [token, rol] = cookies_de("VENDEDOR");
    let req = test::TestRequest::get()
        .uri("/inventario/1/editar")
        .cookie(token)
        .cookie(rol)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    let copia = copia_del_formulario(&html);

    // 2. Enviar el formulario con todos los campos vacíos
    let campos = [
        ("snapshot", copia.as_str()),
        ("nombre", ""),
        ("categoria_nombre", ""),
        ("precio_venta", ""),
        ("precio_compra", ""),
        ("stock", ""),
        ("fecha_vencimiento", ""),
    ];
    let req = post_multipart("/inventario/1/editar", "VENDEDOR", multipart(&campos, None)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(destino(&resp).as_deref(), Some("/inventario"));
    assert_eq!(cookie_de(&resp, "aviso").as_deref(), Some("producto_actualizado"));
}

#[actix_web::test]
async fn edicion_guarda_aunque_falle_la_subida() {
    let servidor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/storage/upload"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&servidor)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/productos/1"))
        .and(body_partial_json(json!({"nombre": "Leche entera", "stock": 25})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let campos = [("snapshot", COPIA_LECHE), ("nombre", "Leche entera")];
    let cuerpo = multipart(&campos, Some(("leche.png", &b"PNG-LECHE"[..])));
    let req = post_multipart("/inventario/1/editar", "VENDEDOR", cuerpo).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(cookie_de(&resp, "aviso").as_deref(), Some("imagen_no_subida"));
}

#[actix_web::test]
async fn edicion_con_copia_ilegible_responde_400() {
    let servidor = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/productos/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let campos = [("snapshot", "{no es json"), ("nombre", "Otro")];
    let req = post_multipart("/inventario/1/editar", "ADMIN", multipart(&campos, None)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn edicion_con_imagen_de_mas_de_5mb_no_guarda() {
    let servidor = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/productos/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&servidor)
        .await;
    let app = test::init_service(App::new().app_data(estado(&servidor)).configure(configurar_rutas)).await;

    let enorme = vec![0u8; 5 * 1024 * 1024 + 1];
    let cuerpo = multipart(&[("snapshot", COPIA_LECHE)], Some(("enorme.png", &enorme[..])));
    let req = post_multipart("/inventario/1/editar", "ADMIN", cuerpo).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("La imagen no debe superar los 5MB."));
}
