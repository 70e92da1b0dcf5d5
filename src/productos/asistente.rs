// src/productos/asistente.rs
//
// Asistente de alta de producto: esenciales -> inventario y precios ->
// metadatos e imagen. Cada paso tiene su validación y no se avanza sin pasarla.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use super::productos_structs::{parsear_fecha, NuevoProducto};

pub const MSG_NOMBRE: &str = "El nombre es obligatorio.";
pub const MSG_CATEGORIA: &str = "Debes seleccionar una categoría.";
pub const MSG_PRECIO_VENTA: &str = "El precio de venta debe ser mayor a cero.";
pub const MSG_STOCK: &str = "El stock no puede ser negativo.";
pub const MSG_STOCK_ENTERO: &str = "El stock debe ser un número entero.";
pub const MSG_FECHA_O_IMAGEN: &str =
    "Debes proporcionar una fecha de vencimiento o subir una imagen del producto.";

/// Pasos del asistente, en orden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Paso {
    Esenciales = 1,
    InventarioPrecios = 2,
    Metadatos = 3,
}

impl Paso {
    pub fn numero(self) -> u8 {
        self as u8
    }

    /// Números fuera de rango se ajustan al primer o último paso.
    pub fn desde_numero(n: u8) -> Self {
        match n {
            0 | 1 => Paso::Esenciales,
            2 => Paso::InventarioPrecios,
            _ => Paso::Metadatos,
        }
    }

    pub fn titulo(self) -> &'static str {
        match self {
            Paso::Esenciales => "Información Esencial",
            Paso::InventarioPrecios => "Inventario y Precios",
            Paso::Metadatos => "Metadatos y Revisión",
        }
    }

    fn siguiente(self) -> Self {
        Paso::desde_numero(self.numero() + 1)
    }

    fn anterior(self) -> Self {
        Paso::desde_numero(self.numero().saturating_sub(1))
    }
}

/// Campos que pueden llevar un mensaje de error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Campo {
    Nombre,
    Categoria,
    Stock,
    PrecioVenta,
    FechaVencimiento,
    Imagen,
}

pub type ErroresCampo = BTreeMap<Campo, String>;

/// Producto en edición. Los números ilegibles quedan en `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorradorProducto {
    pub nombre: String,
    pub descripcion: String,
    pub categoria_id: Option<i64>,
    pub stock: Option<i32>,
    pub precio_compra: Option<BigDecimal>,
    pub precio_venta: Option<BigDecimal>,
    pub codigo_qr: String,
    pub codigo_barras: String,
    pub fecha_vencimiento: Option<NaiveDate>,
}

impl BorradorProducto {
    /// Borrador inicial del formulario: stock y precio de compra en 0.
    pub fn nuevo() -> Self {
        Self {
            stock: Some(0),
            precio_compra: Some(BigDecimal::from(0)),
            ..Self::default()
        }
    }

    /// Reconstruye el borrador a partir de los campos de un formulario.
    pub fn desde_campos(campos: &HashMap<String, String>) -> Self {
        let texto = |clave: &str| campos.get(clave).map(|v| v.trim().to_string()).unwrap_or_default();
        let decimal = |clave: &str| BigDecimal::from_str(&texto(clave)).ok();

        Self {
            nombre: campos.get("nombre").cloned().unwrap_or_default(),
            descripcion: campos.get("descripcion").cloned().unwrap_or_default(),
            categoria_id: texto("categoria_id").parse().ok(),
            stock: texto("stock").parse().ok(),
            precio_compra: decimal("precio_compra"),
            precio_venta: decimal("precio_venta"),
            codigo_qr: texto("codigo_qr"),
            codigo_barras: texto("codigo_barras"),
            fecha_vencimiento: parsear_fecha(&texto("fecha_vencimiento")),
        }
    }

    /// Pares nombre/valor para repetir el borrador en campos ocultos.
    pub fn como_campos(&self) -> Vec<(&'static str, String)> {
        vec![
            ("nombre", self.nombre.clone()),
            ("descripcion", self.descripcion.clone()),
            ("categoria_id", self.categoria_id.map(|v| v.to_string()).unwrap_or_default()),
            ("stock", self.stock.map(|v| v.to_string()).unwrap_or_default()),
            ("precio_compra", self.precio_compra.as_ref().map(|v| v.to_string()).unwrap_or_default()),
            ("precio_venta", self.precio_venta.as_ref().map(|v| v.to_string()).unwrap_or_default()),
            ("codigo_qr", self.codigo_qr.clone()),
            ("codigo_barras", self.codigo_barras.clone()),
            (
                "fecha_vencimiento",
                self.fecha_vencimiento.map(|f| f.to_string()).unwrap_or_default(),
            ),
        ]
    }
}

/// Paso 1: nombre no vacío y categoría elegida.
pub fn validar_paso1(b: &BorradorProducto) -> ErroresCampo {
    let mut errores = ErroresCampo::new();
    if b.nombre.trim().is_empty() {
        errores.insert(Campo::Nombre, MSG_NOMBRE.to_string());
    }
    if b.categoria_id.is_none() {
        errores.insert(Campo::Categoria, MSG_CATEGORIA.to_string());
    }
    errores
}

/// Paso 2: precio de venta mayor a cero y stock no negativo.
pub fn validar_paso2(b: &BorradorProducto) -> ErroresCampo {
    let mut errores = ErroresCampo::new();
    let cero = BigDecimal::from(0);
    if b.precio_venta.as_ref().map_or(true, |p| *p <= cero) {
        errores.insert(Campo::PrecioVenta, MSG_PRECIO_VENTA.to_string());
    }
    match b.stock {
        None => {
            errores.insert(Campo::Stock, MSG_STOCK_ENTERO.to_string());
        }
        Some(s) if s < 0 => {
            errores.insert(Campo::Stock, MSG_STOCK.to_string());
        }
        Some(_) => {}
    }
    errores
}

/// Paso 3: fecha de vencimiento o imagen. El mensaje aparece en ambos campos.
pub fn validar_paso3(b: &BorradorProducto, tiene_imagen: bool) -> ErroresCampo {
    let mut errores = ErroresCampo::new();
    if b.fecha_vencimiento.is_none() && !tiene_imagen {
        errores.insert(Campo::FechaVencimiento, MSG_FECHA_O_IMAGEN.to_string());
        errores.insert(Campo::Imagen, MSG_FECHA_O_IMAGEN.to_string());
    }
    errores
}

/// Estado del asistente: paso actual, borrador y errores visibles.
#[derive(Debug, Clone)]
pub struct AsistenteProducto {
    paso: Paso,
    borrador: BorradorProducto,
    errores: ErroresCampo,
}

impl AsistenteProducto {
    pub fn new() -> Self {
        Self::en_paso(Paso::Esenciales, BorradorProducto::nuevo())
    }

    /// Retoma el asistente desde un formulario ya enviado.
    pub fn en_paso(paso: Paso, borrador: BorradorProducto) -> Self {
        Self {
            paso,
            borrador,
            errores: ErroresCampo::new(),
        }
    }

    pub fn paso(&self) -> Paso {
        self.paso
    }

    pub fn borrador(&self) -> &BorradorProducto {
        &self.borrador
    }

    pub fn borrador_mut(&mut self) -> &mut BorradorProducto {
        &mut self.borrador
    }

    pub fn errores(&self) -> &ErroresCampo {
        &self.errores
    }

    pub fn error(&self, campo: Campo) -> Option<&String> {
        self.errores.get(&campo)
    }

    /// Avanza un paso si el actual es válido. Devuelve si avanzó.
    pub fn siguiente(&mut self) -> bool {
        let errores = match self.paso {
            Paso::Esenciales => validar_paso1(&self.borrador),
            Paso::InventarioPrecios => validar_paso2(&self.borrador),
            Paso::Metadatos => ErroresCampo::new(),
        };
        let avanza = errores.is_empty() && self.paso != Paso::Metadatos;
        self.errores = errores;
        if avanza {
            self.paso = self.paso.siguiente();
        }
        avanza
    }

    /// Retrocede sin validar; en el primer paso no hace nada.
    pub fn anterior(&mut self) {
        self.errores.clear();
        self.paso = self.paso.anterior();
    }

    /// Validación final de los tres pasos antes de guardar.
    ///
    /// Si algo falla, el asistente vuelve al primer paso con errores y se
    /// devuelve `Err` con ese paso. Solo se puede enviar desde el último paso.
    pub fn preparar_envio(&mut self, tiene_imagen: bool) -> Result<(), Paso> {
        if self.paso != Paso::Metadatos {
            self.siguiente();
            return Err(self.paso);
        }

        let paso1 = validar_paso1(&self.borrador);
        let paso2 = validar_paso2(&self.borrador);
        let paso3 = validar_paso3(&self.borrador, tiene_imagen);

        let fallido = if !paso1.is_empty() {
            Some(Paso::Esenciales)
        } else if !paso2.is_empty() {
            Some(Paso::InventarioPrecios)
        } else if !paso3.is_empty() {
            Some(Paso::Metadatos)
        } else {
            None
        };

        self.errores = paso1.into_iter().chain(paso2).chain(paso3).collect();

        match fallido {
            Some(paso) => {
                self.paso = paso;
                Err(paso)
            }
            None => Ok(()),
        }
    }

    /// Arma el producto a crear con la URL de imagen ya subida (si la hay).
    ///
    /// Devuelve `None` si el borrador no pasa alguno de los tres pasos.
    pub fn en_nuevo_producto(&self, imagen_url: Option<String>) -> Option<NuevoProducto> {
        let b = &self.borrador;
        let valido = validar_paso1(b).is_empty()
            && validar_paso2(b).is_empty()
            && validar_paso3(b, imagen_url.is_some()).is_empty();
        if !valido {
            return None;
        }

        Some(NuevoProducto {
            nombre: b.nombre.trim().to_string(),
            descripcion: b.descripcion.clone(),
            categoria_id: b.categoria_id?,
            stock: b.stock?,
            precio_compra: b.precio_compra.clone().unwrap_or_else(|| BigDecimal::from(0)),
            precio_venta: b.precio_venta.clone()?,
            codigo_qr: b.codigo_qr.clone(),
            codigo_barras: b.codigo_barras.clone(),
            fecha_vencimiento: b.fecha_vencimiento,
            imagen_url,
        })
    }
}

impl Default for AsistenteProducto {
    fn default() -> Self {
        Self::new()
    }
}
