// report.rs — Aggregate views over stored goals: summary counts and CSV export.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::meta::Meta;

const CSV_HEADER: &[&str] = &[
    "id",
    "division",
    "proceso",
    "indicador",
    "linea_base_anio",
    "valor_linea_base",
    "unidad",
    "fecha_objetivo",
    "creado_por",
    "creado_en",
];

/// Goal counts, overall and per classification field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetaSummary {
    pub total: usize,
    pub por_division: BTreeMap<String, usize>,
    pub por_proceso: BTreeMap<String, usize>,
    pub por_indicador: BTreeMap<String, usize>,
}

impl MetaSummary {
    pub fn from_metas(metas: &[Meta]) -> Self {
        let mut summary = Self {
            total: metas.len(),
            ..Default::default()
        };
        for meta in metas {
            *summary.por_division.entry(meta.division.clone()).or_default() += 1;
            *summary.por_proceso.entry(meta.proceso.clone()).or_default() += 1;
            *summary.por_indicador.entry(meta.indicador.clone()).or_default() += 1;
        }
        summary
    }
}

/// Render goals as CSV with a header row. Fields containing commas, quotes
/// or line breaks are quoted, with embedded quotes doubled.
pub fn export_csv(metas: &[Meta]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADER.join(","));
    out.push('\n');

    for meta in metas {
        let row = [
            meta.id.to_string(),
            csv_field(&meta.division),
            csv_field(&meta.proceso),
            csv_field(&meta.indicador),
            meta.linea_base_anio.to_string(),
            meta.valor_linea_base.to_string(),
            csv_field(meta.unidad.as_deref().unwrap_or("")),
            meta.fecha_objetivo.to_string(),
            csv_field(&meta.creado_por),
            meta.creado_en.to_rfc3339(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
