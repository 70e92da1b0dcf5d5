// src/config/mod.rs

// Lectura de la configuración desde variables de entorno (.env incluido)
pub mod config_structs;
