// src/categorias/categoria_structs.rs

use serde::{Deserialize, Serialize};

/// Estructura para enviar una nueva categoría al backend
#[derive(Debug, Serialize)]
pub struct NuevaCategoria {
    pub nombre: String,
}

/// Categoría tal como la devuelve el backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categoria {
    pub id: i64,
    pub nombre: String,
}
