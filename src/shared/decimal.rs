// src/shared/decimal.rs
//
// El backend espera y devuelve los precios como números JSON, mientras que
// `bigdecimal` los serializa como texto. Estos módulos se usan con
// `#[serde(with = "...")]` en los campos de precio.

use bigdecimal::BigDecimal;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Convierte un JSON (número o texto) en `BigDecimal`.
fn desde_valor<E: de::Error>(valor: serde_json::Value) -> Result<Option<BigDecimal>, E> {
    match valor {
        serde_json::Value::Null => Ok(None),
        // El `to_string` de serde_json usa la representación más corta del f64,
        // así 12.99 llega como "12.99" y no con la expansión binaria completa.
        serde_json::Value::Number(n) => BigDecimal::from_str(&n.to_string())
            .map(Some)
            .map_err(E::custom),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => BigDecimal::from_str(s.trim()).map(Some).map_err(E::custom),
        otro => Err(E::custom(format!("precio inválido: {otro}"))),
    }
}

fn a_numero<E: ser::Error>(valor: &BigDecimal) -> Result<serde_json::Number, E> {
    serde_json::Number::from_str(&valor.to_string()).map_err(E::custom)
}

/// Precio obligatorio.
pub mod numero {
    use super::*;

    pub fn serialize<S: Serializer>(valor: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        a_numero::<S::Error>(valor)?.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
        let valor = serde_json::Value::deserialize(deserializer)?;
        desde_valor::<D::Error>(valor)?.ok_or_else(|| de::Error::custom("precio ausente"))
    }
}

/// Precio que puede venir vacío o `null`. Usar junto con `#[serde(default)]`.
pub mod numero_opcional {
    use super::*;

    pub fn serialize<S: Serializer>(
        valor: &Option<BigDecimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match valor {
            Some(v) => a_numero::<S::Error>(v)?.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BigDecimal>, D::Error> {
        let valor = Option::<serde_json::Value>::deserialize(deserializer)?;
        match valor {
            Some(v) => desde_valor::<D::Error>(v),
            None => Ok(None),
        }
    }
}
