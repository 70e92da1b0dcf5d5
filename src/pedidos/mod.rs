// src/pedidos/mod.rs

// Structs de pedido y búsqueda
pub mod pedidos_structs;
// Páginas de listado, detalle, cambio de estado y alta de pedidos
pub mod pedidos_router;
