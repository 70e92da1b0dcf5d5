// src/productos/mod.rs

// Structs de producto y filtro del catálogo
pub mod productos_structs;
// Asistente de alta de producto en tres pasos
pub mod asistente;
// Páginas de catálogo y administración de productos
pub mod productos_router;
