// src/shared/mod.rs

// Estructuras de respuesta comunes
pub mod shared_structs;
// Serialización de precios (BigDecimal <-> número JSON)
pub mod decimal;
// Paginación local de listados
pub mod paginacion;
// Avisos de un solo uso que sobreviven a una redirección
pub mod aviso;
// Lectura de formularios multipart con imagen
pub mod subida;
// Plantillas HTML
pub mod vistas;
