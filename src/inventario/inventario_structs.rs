// src/inventario/inventario_structs.rs

use std::collections::HashMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::productos::productos_structs::{parsear_fecha, Producto};
use crate::shared::decimal::numero_opcional;

/// Parámetros de la tabla (`?q=&pagina=`).
#[derive(Debug, Default, Deserialize)]
pub struct ConsultaInventario {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub pagina: Option<usize>,
}

/// Busca en nombre, categoría y descripción sin distinguir mayúsculas.
/// Si la consulta es un número, también compara el precio de venta exacto;
/// las fechas de vencimiento (`YYYY-MM-DD`) se comparan por subcadena.
pub fn filtrar_productos<'a>(productos: &'a [Producto], consulta: &str) -> Vec<&'a Producto> {
    let consulta = consulta.trim();
    if consulta.is_empty() {
        return productos.iter().collect();
    }
    let minusculas = consulta.to_lowercase();
    let como_numero = BigDecimal::from_str(consulta).ok();

    let contiene = |texto: Option<&str>| {
        texto.is_some_and(|t| t.to_lowercase().contains(&minusculas))
    };

    productos
        .iter()
        .filter(|p| {
            contiene(Some(&p.nombre))
                || contiene(p.categoria_nombre.as_deref())
                || contiene(p.descripcion.as_deref())
                || matches!((&como_numero, &p.precio_venta), (Some(n), Some(precio)) if n == precio)
                || p.fecha_vencimiento
                    .is_some_and(|f| f.format("%Y-%m-%d").to_string().contains(consulta))
        })
        .collect()
}

/// Valores escritos en el formulario de edición. Un campo en blanco conserva
/// el valor que tenía el producto al empezar la edición.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdicionProducto {
    pub nombre: String,
    pub descripcion: String,
    pub categoria_nombre: String,
    pub stock: String,
    pub precio_compra: String,
    pub precio_venta: String,
    pub codigo_qr: String,
    pub codigo_barras: String,
    pub fecha_vencimiento: String,
}

impl EdicionProducto {
    pub fn desde_campos(campos: &HashMap<String, String>) -> Self {
        let campo = |clave: &str| campos.get(clave).cloned().unwrap_or_default();
        Self {
            nombre: campo("nombre"),
            descripcion: campo("descripcion"),
            categoria_nombre: campo("categoria_nombre"),
            stock: campo("stock"),
            precio_compra: campo("precio_compra"),
            precio_venta: campo("precio_venta"),
            codigo_qr: campo("codigo_qr"),
            codigo_barras: campo("codigo_barras"),
            fecha_vencimiento: campo("fecha_vencimiento"),
        }
    }
}

/// Qué hacer con la imagen al guardar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CambioImagen {
    SinCambio,
    Quitar,
    /// URL de la imagen recién subida.
    Nueva(String),
}

/// Cuerpo de `PUT /api/productos/{id}` (snake_case).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActualizacionProducto {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria_nombre: Option<String>,
    pub stock: Option<i32>,
    #[serde(with = "numero_opcional")]
    pub precio_compra: Option<BigDecimal>,
    #[serde(with = "numero_opcional")]
    pub precio_venta: Option<BigDecimal>,
    pub codigo_qr: Option<String>,
    pub codigo_barras: Option<String>,
    pub fecha_vencimiento: Option<NaiveDate>,
    /// Ausente: no tocar. `Some(None)`: quitar la imagen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_image_url: Option<String>,
}

/// Errores de formato en la edición, por nombre de campo.
pub type ErroresEdicion = HashMap<&'static str, String>;

/// Combina la edición con la copia tomada al abrir el formulario.
pub fn combinar(
    snapshot: &Producto,
    edicion: &EdicionProducto,
    imagen: CambioImagen,
) -> Result<ActualizacionProducto, ErroresEdicion> {
    let mut errores = ErroresEdicion::new();

    let texto = |valor: &str, original: &Option<String>| {
        let valor = valor.trim();
        if valor.is_empty() {
            original.clone()
        } else {
            Some(valor.to_string())
        }
    };

    let stock = match edicion.stock.trim() {
        "" => snapshot.stock,
        s => match s.parse::<i32>() {
            Ok(v) if v >= 0 => Some(v),
            Ok(_) => {
                errores.insert("stock", "El stock no puede ser negativo.".into());
                None
            }
            Err(_) => {
                errores.insert("stock", "El stock debe ser un número entero.".into());
                None
            }
        },
    };

    let mut precio = |campo: &'static str, valor: &str, original: &Option<BigDecimal>| {
        match valor.trim() {
            "" => original.clone(),
            v => match BigDecimal::from_str(v) {
                Ok(p) if p >= BigDecimal::from(0) => Some(p),
                _ => {
                    errores.insert(campo, "Ingresa un precio válido.".into());
                    None
                }
            },
        }
    };
    let precio_compra = precio("precio_compra", &edicion.precio_compra, &snapshot.precio_compra);
    let precio_venta = precio("precio_venta", &edicion.precio_venta, &snapshot.precio_venta);

    if precio_venta
        .as_ref()
        .is_some_and(|p| *p <= BigDecimal::from(0))
    {
        errores.insert(
            "precio_venta",
            "El precio de venta debe ser mayor a cero.".into(),
        );
    }

    let fecha_vencimiento = match edicion.fecha_vencimiento.trim() {
        "" => snapshot.fecha_vencimiento,
        f => match parsear_fecha(f) {
            Some(fecha) => Some(fecha),
            None => {
                errores.insert("fecha_vencimiento", "Fecha inválida (AAAA-MM-DD).".into());
                None
            }
        },
    };

    // Una categoría escrita a mano deja el id al backend
    let nueva_categoria = edicion.categoria_nombre.trim();
    let (categoria_id, categoria_nombre) = if !nueva_categoria.is_empty()
        && Some(nueva_categoria) != snapshot.categoria_nombre.as_deref()
    {
        (None, Some(nueva_categoria.to_string()))
    } else {
        (snapshot.categoria_id, None)
    };

    let (imagen_url, previous_image_url) = match imagen {
        CambioImagen::SinCambio => (None, None),
        CambioImagen::Quitar => (Some(None), None),
        CambioImagen::Nueva(url) => (Some(Some(url)), snapshot.imagen_url.clone()),
    };

    if !errores.is_empty() {
        return Err(errores);
    }

    Ok(ActualizacionProducto {
        nombre: texto(&edicion.nombre, &Some(snapshot.nombre.clone())).unwrap_or_default(),
        descripcion: texto(&edicion.descripcion, &snapshot.descripcion),
        categoria_id,
        categoria_nombre,
        stock,
        precio_compra,
        precio_venta,
        codigo_qr: texto(&edicion.codigo_qr, &snapshot.codigo_qr),
        codigo_barras: texto(&edicion.codigo_barras, &snapshot.codigo_barras),
        fecha_vencimiento,
        imagen_url,
        previous_image_url,
    })
}
