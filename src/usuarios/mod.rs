// src/usuarios/mod.rs

// Declara el submódulo con las structs de usuario y sesión
pub mod usuario_structs;
// Almacén clave-valor donde vive la sesión (cookies del navegador)
pub mod sesion;
// Guardia de rutas por rol
pub mod auth_middleware;
// Enlaces visibles según el rol
pub mod navegacion;
// Páginas de login, registro y cierre de sesión
pub mod usuario_router;
