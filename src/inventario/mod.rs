// src/inventario/mod.rs

// Búsqueda y edición parcial de productos
pub mod inventario_structs;
// Tabla de inventario con edición y borrado
pub mod inventario_router;
