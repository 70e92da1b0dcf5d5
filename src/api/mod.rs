// src/api/mod.rs

// Errores de las llamadas remotas
pub mod api_error;
// Cliente del backend REST (token bearer)
pub mod api_cliente;
// Consultas de solo lectura al almacenamiento administrado
pub mod catalogo_cliente;
