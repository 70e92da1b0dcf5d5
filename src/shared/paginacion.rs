// src/shared/paginacion.rs

/// Filas por página en los listados paginados localmente.
pub const TAMANO_PAGINA: usize = 50;

/// Una página de resultados ya filtrados.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagina<T> {
    pub items: Vec<T>,
    /// Número de página (empieza en 1), ya ajustado al rango válido.
    pub numero: usize,
    /// Siempre al menos 1, aunque no haya resultados.
    pub total_paginas: usize,
    /// Total de resultados antes de paginar.
    pub total: usize,
}

impl<T> Pagina<T> {
    pub fn tiene_anterior(&self) -> bool {
        self.numero > 1
    }

    pub fn tiene_siguiente(&self) -> bool {
        self.numero < self.total_paginas
    }
}

/// Corta `items` en páginas de `tamano` y devuelve la página pedida.
pub fn paginar<T>(items: Vec<T>, pagina: usize, tamano: usize) -> Pagina<T> {
    let tamano = tamano.max(1);
    let total = items.len();
    let total_paginas = total.div_ceil(tamano).max(1);
    let numero = pagina.clamp(1, total_paginas);

    let items = items
        .into_iter()
        .skip((numero - 1) * tamano)
        .take(tamano)
        .collect();

    Pagina {
        items,
        numero,
        total_paginas,
        total,
    }
}
