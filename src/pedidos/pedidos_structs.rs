// src/pedidos/pedidos_structs.rs

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::shared::decimal::numero_opcional;

/// Estado de un pedido en el backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoPedido {
    Pendiente,
    EnProceso,
    Enviado,
    Entregado,
    Cancelado,
    /// Cualquier estado que el frontend no conoce. No se ofrece al cambiar estado.
    #[serde(other)]
    Desconocido,
}

impl EstadoPedido {
    pub const TODOS: [EstadoPedido; 5] = [
        EstadoPedido::Pendiente,
        EstadoPedido::EnProceso,
        EstadoPedido::Enviado,
        EstadoPedido::Entregado,
        EstadoPedido::Cancelado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoPedido::Pendiente => "PENDIENTE",
            EstadoPedido::EnProceso => "EN_PROCESO",
            EstadoPedido::Enviado => "ENVIADO",
            EstadoPedido::Entregado => "ENTREGADO",
            EstadoPedido::Cancelado => "CANCELADO",
            EstadoPedido::Desconocido => "DESCONOCIDO",
        }
    }

    pub fn etiqueta(&self) -> &'static str {
        match self {
            EstadoPedido::Pendiente => "Pendiente",
            EstadoPedido::EnProceso => "En proceso",
            EstadoPedido::Enviado => "Enviado",
            EstadoPedido::Entregado => "Entregado",
            EstadoPedido::Cancelado => "Cancelado",
            EstadoPedido::Desconocido => "Desconocido",
        }
    }
}

impl fmt::Display for EstadoPedido {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoPedido {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::TODOS
            .into_iter()
            .find(|e| e.as_str() == s.trim())
            .ok_or_else(|| format!("estado de pedido desconocido: {s}"))
    }
}

/// Cliente o vendedor de un pedido: objeto de usuario o texto plano.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Participante {
    Usuario {
        #[serde(default)]
        id: Option<i64>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        nombre: Option<String>,
    },
    Nombre(String),
}

impl Participante {
    /// Nombre para mostrar: username, nombre o `#id`, en ese orden.
    pub fn nombre(&self) -> String {
        match self {
            Participante::Nombre(n) => n.clone(),
            Participante::Usuario {
                id,
                username,
                nombre,
            } => username
                .clone()
                .or_else(|| nombre.clone())
                .or_else(|| id.map(|i| format!("#{i}")))
                .unwrap_or_default(),
        }
    }
}

/// Producto referenciado por una línea de pedido.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProductoLinea {
    Objeto {
        id: i64,
        #[serde(default)]
        nombre: Option<String>,
    },
    Id(i64),
}

impl ProductoLinea {
    pub fn descripcion(&self) -> String {
        match self {
            ProductoLinea::Objeto {
                nombre: Some(nombre),
                ..
            } => nombre.clone(),
            ProductoLinea::Objeto { id, nombre: None } | ProductoLinea::Id(id) => {
                format!("Producto #{id}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemPedido {
    #[serde(default, alias = "productoId")]
    pub producto: Option<ProductoLinea>,
    #[serde(default)]
    pub cantidad: i32,
    #[serde(default, alias = "precioUnitario", with = "numero_opcional")]
    pub precio_unitario: Option<BigDecimal>,
}

/// Pedido tal como lo devuelve el backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pedido {
    pub id: i64,
    #[serde(default)]
    pub cliente: Option<Participante>,
    #[serde(default)]
    pub vendedor: Option<Participante>,
    #[serde(default, with = "numero_opcional")]
    pub total: Option<BigDecimal>,
    #[serde(default)]
    pub estado: Option<EstadoPedido>,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemPedido>,
}

impl Pedido {
    pub fn nombre_cliente(&self) -> String {
        self.cliente.as_ref().map(Participante::nombre).unwrap_or_default()
    }

    pub fn nombre_vendedor(&self) -> String {
        self.vendedor.as_ref().map(Participante::nombre).unwrap_or_default()
    }

    /// Fecha sin la parte de zona/milisegundos (`YYYY-MM-DD HH:MM`).
    pub fn fecha_corta(&self) -> String {
        let fecha = self.fecha.as_deref().unwrap_or_default();
        fecha.get(..16).unwrap_or(fecha).replace('T', " ")
    }
}

/// Línea de un pedido nuevo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineaNuevoPedido {
    pub producto_id: i64,
    pub cantidad: i32,
}

/// Cuerpo de `POST /api/pedidos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevoPedido {
    pub cliente_id: i64,
    pub items: Vec<LineaNuevoPedido>,
}

/// Cuerpo de `PUT /api/pedidos/{id}/estado`.
#[derive(Debug, Clone, Serialize)]
pub struct CambioEstado {
    pub estado: EstadoPedido,
}

pub const MSG_CLIENTE: &str = "Indica un id de cliente válido.";
pub const MSG_LINEAS: &str = "Agrega al menos un producto con cantidad mayor a cero.";
pub const MSG_LINEA_INVALIDA: &str = "Cada producto necesita un id numérico y una cantidad entera mayor a cero.";

/// Arma el pedido a partir de los pares del formulario, donde `producto_id` y
/// `cantidad` se repiten una vez por línea, en orden.
///
/// Las líneas sin producto se ignoran.
pub fn nuevo_pedido_desde_formulario(pares: &[(String, String)]) -> Result<NuevoPedido, &'static str> {
    let valor = |clave: &str| {
        pares
            .iter()
            .find(|(k, _)| k == clave)
            .map(|(_, v)| v.trim())
            .unwrap_or_default()
    };
    let cliente_id = valor("cliente_id").parse::<i64>().map_err(|_| MSG_CLIENTE)?;

    let productos = pares.iter().filter(|(k, _)| k == "producto_id").map(|(_, v)| v.trim());
    let cantidades = pares.iter().filter(|(k, _)| k == "cantidad").map(|(_, v)| v.trim());

    let mut items = Vec::new();
    for (producto, cantidad) in productos.zip(cantidades.chain(std::iter::repeat(""))) {
        if producto.is_empty() {
            continue;
        }
        let producto_id = producto.parse::<i64>().map_err(|_| MSG_LINEA_INVALIDA)?;
        let cantidad = match cantidad.parse::<i32>() {
            Ok(c) if c >= 1 => c,
            _ => return Err(MSG_LINEA_INVALIDA),
        };
        items.push(LineaNuevoPedido {
            producto_id,
            cantidad,
        });
    }

    if items.is_empty() {
        return Err(MSG_LINEAS);
    }
    Ok(NuevoPedido { cliente_id, items })
}

/// Búsqueda sobre id (subcadena), cliente y vendedor (sin distinguir mayúsculas).
pub fn filtrar_pedidos<'a>(pedidos: &'a [Pedido], consulta: &str) -> Vec<&'a Pedido> {
    let consulta = consulta.trim().to_lowercase();
    if consulta.is_empty() {
        return pedidos.iter().collect();
    }
    pedidos
        .iter()
        .filter(|p| {
            p.id.to_string().contains(&consulta)
                || p.nombre_cliente().to_lowercase().contains(&consulta)
                || p.nombre_vendedor().to_lowercase().contains(&consulta)
        })
        .collect()
}
