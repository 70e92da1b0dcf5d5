// src/usuarios/navegacion.rs

use serde::Serialize;

use super::usuario_structs::{Rol, Sesion};

/// Enlace de la barra de navegación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Enlace {
    pub href: &'static str,
    pub etiqueta: &'static str,
}

const fn enlace(href: &'static str, etiqueta: &'static str) -> Enlace {
    Enlace { href, etiqueta }
}

const ENLACES_CLIENTE: [Enlace; 2] = [
    enlace("/productos", "Productos"),
    enlace("/pedidos", "Mis Pedidos"),
];

const ENLACES_VENDEDOR: [Enlace; 3] = [
    enlace("/productos", "Productos"),
    enlace("/pedidos", "Gestionar Pedidos"),
    enlace("/inventario", "Inventario"),
];

const ENLACES_ADMIN: [Enlace; 4] = [
    enlace("/admin", "Dashboard"),
    enlace("/productos", "Productos"),
    enlace("/pedidos", "Pedidos"),
    enlace("/inventario", "Inventario"),
];

/// Enlaces visibles para un rol.
pub fn enlaces_para(rol: Rol) -> &'static [Enlace] {
    match rol {
        Rol::Cliente => &ENLACES_CLIENTE,
        Rol::Vendedor => &ENLACES_VENDEDOR,
        Rol::Admin => &ENLACES_ADMIN,
    }
}

/// Sin sesión no se muestra ningún enlace.
pub fn enlaces_de_sesion(sesion: Option<&Sesion>) -> &'static [Enlace] {
    sesion.map(|s| enlaces_para(s.rol)).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hrefs(rol: Rol) -> Vec<&'static str> {
        enlaces_para(rol).iter().map(|e| e.href).collect()
    }

    #[test]
    fn cliente_no_ve_inventario() {
        assert_eq!(hrefs(Rol::Cliente), vec!["/productos", "/pedidos"]);
    }

    #[test]
    fn vendedor_ve_inventario() {
        assert_eq!(hrefs(Rol::Vendedor), vec!["/productos", "/pedidos", "/inventario"]);
    }

    #[test]
    fn admin_ve_el_dashboard_primero() {
        let enlaces = enlaces_para(Rol::Admin);
        assert_eq!(enlaces[0].etiqueta, "Dashboard");
        assert_eq!(enlaces.len(), 4);
    }

    #[test]
    fn sin_sesion_no_hay_enlaces() {
        assert!(enlaces_de_sesion(None).is_empty());
    }
}
