// src/productos/productos_structs.rs

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::decimal::{numero, numero_opcional};

/// Producto normalizado, tal como lo usan las páginas.
///
/// Se serializa en snake_case (precios como texto) y se vuelve a leer igual,
/// así sirve de copia en un campo oculto del formulario de edición.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductoCrudo")]
pub struct Producto {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria_id: Option<i64>,
    /// Nombre de la categoría, solo para mostrar.
    pub categoria_nombre: Option<String>,
    pub stock: Option<i32>,
    pub precio_compra: Option<BigDecimal>,
    pub precio_venta: Option<BigDecimal>,
    pub codigo_qr: Option<String>,
    pub codigo_barras: Option<String>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub imagen_url: Option<String>,
}

#[derive(Deserialize)]
struct CategoriaAnidada {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default, alias = "name")]
    nombre: Option<String>,
}

// El backend responde en snake_case o camelCase según el endpoint, y a veces
// con la categoría anidada.
#[derive(Deserialize)]
struct ProductoCrudo {
    id: i64,
    #[serde(default, alias = "name")]
    nombre: Option<String>,
    #[serde(default, alias = "description")]
    descripcion: Option<String>,
    #[serde(default)]
    stock: Option<i32>,
    #[serde(default, alias = "precioCompra", with = "numero_opcional")]
    precio_compra: Option<BigDecimal>,
    #[serde(default, alias = "precioVenta", with = "numero_opcional")]
    precio_venta: Option<BigDecimal>,
    #[serde(default, alias = "codigoQR", alias = "codigoQr")]
    codigo_qr: Option<String>,
    #[serde(default, alias = "codigoBarras")]
    codigo_barras: Option<String>,
    #[serde(default, alias = "fechaVencimiento")]
    fecha_vencimiento: Option<String>,
    #[serde(default, alias = "imagenUrl")]
    imagen_url: Option<String>,
    #[serde(default, alias = "categoriaId")]
    categoria_id: Option<i64>,
    #[serde(default, alias = "categoriaNombre")]
    categoria_nombre: Option<String>,
    #[serde(default)]
    categoria: Option<CategoriaAnidada>,
}

impl From<ProductoCrudo> for Producto {
    fn from(crudo: ProductoCrudo) -> Self {
        let (anidada_id, anidada_nombre) = match crudo.categoria {
            Some(c) => (c.id, c.nombre),
            None => (None, None),
        };

        Producto {
            id: crudo.id,
            nombre: crudo.nombre.unwrap_or_default(),
            descripcion: crudo.descripcion,
            categoria_id: crudo.categoria_id.or(anidada_id),
            categoria_nombre: crudo.categoria_nombre.or(anidada_nombre),
            stock: crudo.stock,
            precio_compra: crudo.precio_compra,
            precio_venta: crudo.precio_venta,
            codigo_qr: crudo.codigo_qr,
            codigo_barras: crudo.codigo_barras,
            fecha_vencimiento: crudo.fecha_vencimiento.as_deref().and_then(parsear_fecha),
            imagen_url: crudo.imagen_url.filter(|u| !u.is_empty()),
        }
    }
}

/// Acepta `YYYY-MM-DD` y también fechas con hora (`YYYY-MM-DDTHH:MM:SS`).
pub fn parsear_fecha(texto: &str) -> Option<NaiveDate> {
    let texto = texto.trim();
    let solo_fecha = texto.get(..10).unwrap_or(texto);
    NaiveDate::parse_from_str(solo_fecha, "%Y-%m-%d").ok()
}

/// Estructura para enviar un producto nuevo al backend (snake_case, como la BD).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NuevoProducto {
    pub nombre: String,
    pub descripcion: String,
    pub categoria_id: i64,
    pub stock: i32,
    #[serde(with = "numero")]
    pub precio_compra: BigDecimal,
    #[serde(with = "numero")]
    pub precio_venta: BigDecimal,
    pub codigo_qr: String,
    pub codigo_barras: String,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub imagen_url: Option<String>,
}

/// Fila del catálogo público (tabla `products` del almacenamiento).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductoCatalogo {
    pub id: i64,
    pub nombre: String,
    #[serde(default, with = "numero_opcional")]
    pub precio_venta: Option<BigDecimal>,
    #[serde(default)]
    pub imagen_url: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
}

impl From<Producto> for ProductoCatalogo {
    fn from(p: Producto) -> Self {
        ProductoCatalogo {
            id: p.id,
            nombre: p.nombre,
            precio_venta: p.precio_venta,
            imagen_url: p.imagen_url,
            descripcion: p.descripcion,
        }
    }
}

/// Fila del listado de administración.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductoResumen {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default, with = "numero_opcional")]
    pub precio_venta: Option<BigDecimal>,
}

impl From<Producto> for ProductoResumen {
    fn from(p: Producto) -> Self {
        ProductoResumen {
            id: p.id,
            nombre: p.nombre,
            stock: p.stock,
            precio_venta: p.precio_venta,
        }
    }
}

/// Parámetros de búsqueda del catálogo (`?q=&min=&max=`).
#[derive(Debug, Default, Deserialize)]
pub struct FiltroCatalogo {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub min: String,
    #[serde(default)]
    pub max: String,
}

impl FiltroCatalogo {
    pub fn esta_vacio(&self) -> bool {
        self.q.trim().is_empty() && self.min.trim().is_empty() && self.max.trim().is_empty()
    }

    /// Filtra por nombre (sin distinguir mayúsculas) y rango de precio.
    /// Un límite vacío o ilegible no restringe; sin precio cuenta como 0.
    pub fn aplicar<'a>(&self, productos: &'a [ProductoCatalogo]) -> Vec<&'a ProductoCatalogo> {
        let consulta = self.q.trim().to_lowercase();
        let minimo = BigDecimal::from_str(self.min.trim()).ok();
        let maximo = BigDecimal::from_str(self.max.trim()).ok();
        let cero = BigDecimal::from(0);

        productos
            .iter()
            .filter(|p| {
                let precio = p.precio_venta.as_ref().unwrap_or(&cero);
                p.nombre.to_lowercase().contains(&consulta)
                    && minimo.as_ref().map_or(true, |min| precio >= min)
                    && maximo.as_ref().map_or(true, |max| precio <= max)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn normaliza_snake_case() {
        let p: Producto = serde_json::from_str(
            r#"{"id":1,"nombre":"Leche","precio_venta":4.5,"precio_compra":3,
                "categoria_id":2,"categoria_nombre":"Lácteos","stock":10,
                "fecha_vencimiento":"2025-12-31","imagen_url":""}"#,
        )
        .unwrap();
        assert_eq!(p.precio_venta, Some(dec("4.5")));
        assert_eq!(p.categoria_id, Some(2));
        assert_eq!(p.fecha_vencimiento, NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(p.imagen_url, None);
    }

    #[test]
    fn normaliza_camel_case_con_categoria_anidada() {
        let p: Producto = serde_json::from_str(
            r#"{"id":7,"nombre":"Pan","precioVenta":"1.20","codigoQR":"QR-7",
                "fechaVencimiento":"2026-01-02T00:00:00",
                "categoria":{"id":3,"nombre":"Panadería"}}"#,
        )
        .unwrap();
        assert_eq!(p.precio_venta, Some(dec("1.20")));
        assert_eq!(p.codigo_qr.as_deref(), Some("QR-7"));
        assert_eq!(p.categoria_id, Some(3));
        assert_eq!(p.categoria_nombre.as_deref(), Some("Panadería"));
        assert_eq!(p.fecha_vencimiento, NaiveDate::from_ymd_opt(2026, 1, 2));
    }

    #[test]
    fn producto_serializado_se_vuelve_a_leer_igual() {
        let p: Producto = serde_json::from_str(
            r#"{"id":3,"nombre":"Queso","precio_venta":12.9,"stock":4,
                "fecha_vencimiento":"2025-06-30","categoria":{"id":1,"nombre":"Lácteos"}}"#,
        )
        .unwrap();
        let copia: Producto = serde_json::from_str(&serde_json::to_string(&p).unwrap()).unwrap();
        assert_eq!(copia, p);
    }

    #[test]
    fn nuevo_producto_se_envia_en_snake_case() {
        let nuevo = NuevoProducto {
            nombre: "Queso".into(),
            descripcion: String::new(),
            categoria_id: 4,
            stock: 0,
            precio_compra: dec("0"),
            precio_venta: dec("9.90"),
            codigo_qr: String::new(),
            codigo_barras: "775".into(),
            fecha_vencimiento: None,
            imagen_url: Some("https://cdn/q.png".into()),
        };
        let json = serde_json::to_value(&nuevo).unwrap();
        assert_eq!(json["categoria_id"], 4);
        assert_eq!(json["precio_venta"], serde_json::json!(9.9));
        assert_eq!(json["codigo_barras"], "775");
        assert!(json["fecha_vencimiento"].is_null());
    }

    fn catalogo() -> Vec<ProductoCatalogo> {
        vec![
            ProductoCatalogo {
                id: 1,
                nombre: "Arroz Costeño".into(),
                precio_venta: Some(dec("5.50")),
                imagen_url: None,
                descripcion: None,
            },
            ProductoCatalogo {
                id: 2,
                nombre: "Aceite".into(),
                precio_venta: Some(dec("12")),
                imagen_url: None,
                descripcion: None,
            },
            ProductoCatalogo {
                id: 3,
                nombre: "Arroz Integral".into(),
                precio_venta: None,
                imagen_url: None,
                descripcion: None,
            },
        ]
    }

    #[test]
    fn filtro_vacio_devuelve_todo() {
        let productos = catalogo();
        assert_eq!(FiltroCatalogo::default().aplicar(&productos).len(), 3);
    }

    #[test]
    fn filtro_por_nombre_y_rango() {
        let productos = catalogo();
        let filtro = FiltroCatalogo {
            q: "ARROZ".into(),
            min: "1".into(),
            max: String::new(),
        };
        let ids: Vec<i64> = filtro.aplicar(&productos).iter().map(|p| p.id).collect();
        // El integral no tiene precio: cuenta como 0 y queda por debajo del mínimo
        assert_eq!(ids, vec![1]);

        let filtro = FiltroCatalogo {
            q: String::new(),
            min: String::new(),
            max: "10".into(),
        };
        let ids: Vec<i64> = filtro.aplicar(&productos).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
