// catalog.rs — Reference lists for goal classification fields.
//
// These populate selectors in client forms. They are suggestions: the
// validator accepts any non-empty division, process or indicator.

use serde::Serialize;

/// One selectable catalog value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Stable slug.
    pub id: &'static str,
    /// Display name, as stored on goals.
    pub nombre: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndicatorEntry {
    pub id: &'static str,
    pub nombre: &'static str,
    pub descripcion: &'static str,
}

pub const DIVISIONES: &[CatalogEntry] = &[
    CatalogEntry { id: "el-teniente", nombre: "El Teniente" },
    CatalogEntry { id: "radomiro-tomic", nombre: "Radomiro Tomic" },
    CatalogEntry { id: "ministro-hales", nombre: "Ministro Hales" },
    CatalogEntry { id: "chuquicamata", nombre: "Chuquicamata" },
    CatalogEntry { id: "salvador", nombre: "Salvador" },
    CatalogEntry { id: "andina", nombre: "Andina" },
];

pub const PROCESOS: &[CatalogEntry] = &[
    CatalogEntry { id: "molienda", nombre: "Molienda" },
    CatalogEntry { id: "chancado", nombre: "Chancado" },
    CatalogEntry { id: "fundicion", nombre: "Fundición" },
    CatalogEntry { id: "flotacion", nombre: "Flotación" },
    CatalogEntry { id: "transporte", nombre: "Transporte" },
];

pub const INDICADORES: &[IndicatorEntry] = &[
    IndicatorEntry {
        id: "tco2e-ton-cu",
        nombre: "tCO₂e/ton Cu",
        descripcion: "Toneladas de CO₂ equivalente por tonelada de cobre",
    },
    IndicatorEntry {
        id: "kwh-ton-cu",
        nombre: "kWh/ton Cu",
        descripcion: "Kilowatt hora por tonelada de cobre",
    },
    IndicatorEntry {
        id: "gj-ton-cu",
        nombre: "GJ/ton Cu",
        descripcion: "Gigajoules por tonelada de cobre",
    },
];

/// All catalogs in one serializable value.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Catalog {
    pub divisiones: &'static [CatalogEntry],
    pub procesos: &'static [CatalogEntry],
    pub indicadores: &'static [IndicatorEntry],
}

impl Catalog {
    pub fn standard() -> Self {
        Self {
            divisiones: DIVISIONES,
            procesos: PROCESOS,
            indicadores: INDICADORES,
        }
    }

    /// Resolve a division slug (e.g. "el-teniente") to its display name.
    pub fn division_name(slug: &str) -> Option<&'static str> {
        DIVISIONES.iter().find(|d| d.id == slug).map(|d| d.nombre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_unique() {
        let mut ids: Vec<&str> = DIVISIONES.iter().chain(PROCESOS).map(|e| e.id).collect();
        ids.extend(INDICADORES.iter().map(|e| e.id));
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn division_slug_resolves() {
        assert_eq!(Catalog::division_name("el-teniente"), Some("El Teniente"));
        assert_eq!(Catalog::division_name("atacama"), None);
    }

    #[test]
    fn catalog_serializes_all_lists() {
        let json = serde_json::to_value(Catalog::standard()).unwrap();
        assert_eq!(json["divisiones"].as_array().unwrap().len(), 6);
        assert_eq!(json["procesos"][3]["nombre"], "Flotación");
        assert_eq!(json["indicadores"][1]["id"], "kwh-ton-cu");
    }
}
