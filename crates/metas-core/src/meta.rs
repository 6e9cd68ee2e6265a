// meta.rs — The goal entity and the payload shapes around it.
//
// Three shapes of the same record:
//   MetaDraft — what a client sent, nothing trusted yet
//   NewMeta   — a validated record that has not been stored
//   Meta      — a stored record with its storage-assigned id

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Assigned by storage on creation. Never reused.
    pub id: i64,

    /// Organizational division (e.g., "Andina").
    pub division: String,

    /// Process within the division (e.g., "Flotación").
    pub proceso: String,

    /// Metric being tracked (e.g., "Consumo Agua").
    pub indicador: String,

    /// Year the baseline was measured.
    pub linea_base_anio: i64,

    /// Baseline value in `unidad`.
    pub valor_linea_base: f64,

    /// Unit of measure (e.g., "m3/ton").
    pub unidad: Option<String>,

    /// Date by which the goal should be reached.
    pub fecha_objetivo: NaiveDate,

    /// Creator identifier, usually an email.
    pub creado_por: String,

    /// When the record was created.
    pub creado_en: DateTime<Utc>,
}

/// A validated goal ready to be persisted.
///
/// Only [`crate::validation::validate`] builds these from client input, so
/// holding one means every required field was present and the target date
/// was in the future when it was checked.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeta {
    pub division: String,
    pub proceso: String,
    pub indicador: String,
    pub linea_base_anio: i64,
    pub valor_linea_base: f64,
    pub unidad: Option<String>,
    pub fecha_objetivo: NaiveDate,
    pub creado_por: String,
}

impl NewMeta {
    /// Attach the storage-assigned id and creation time.
    pub fn into_meta(self, id: i64, creado_en: DateTime<Utc>) -> Meta {
        Meta {
            id,
            division: self.division,
            proceso: self.proceso,
            indicador: self.indicador,
            linea_base_anio: self.linea_base_anio,
            valor_linea_base: self.valor_linea_base,
            unidad: self.unidad,
            fecha_objetivo: self.fecha_objetivo,
            creado_por: self.creado_por,
            creado_en,
        }
    }
}

/// Raw goal-creation payload.
///
/// Every field is an optional JSON value so that a missing or mistyped field
/// becomes a field error during validation instead of a deserialization
/// failure. Unknown keys (including a client-supplied `id`) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaDraft {
    pub division: Option<Value>,
    pub proceso: Option<Value>,
    pub indicador: Option<Value>,
    pub linea_base_anio: Option<Value>,
    pub valor_linea_base: Option<Value>,
    pub unidad: Option<Value>,
    pub fecha_objetivo: Option<Value>,
    pub creado_por: Option<Value>,
}

/// Listing filter for the browsing views.
///
/// All criteria are optional and combined with AND. Text criteria match
/// case-insensitively after trimming; blank criteria are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaFilter {
    pub division: Option<String>,
    pub proceso: Option<String>,
    /// Year of `fecha_objetivo`.
    pub anio: Option<i32>,
}

impl MetaFilter {
    pub fn is_empty(&self) -> bool {
        blank(&self.division) && blank(&self.proceso) && self.anio.is_none()
    }

    pub fn matches(&self, meta: &Meta) -> bool {
        text_matches(&self.division, &meta.division)
            && text_matches(&self.proceso, &meta.proceso)
            && self
                .anio
                .is_none_or(|anio| meta.fecha_objetivo.year() == anio)
    }
}

fn blank(criterion: &Option<String>) -> bool {
    criterion.as_deref().is_none_or(|c| c.trim().is_empty())
}

fn text_matches(criterion: &Option<String>, value: &str) -> bool {
    match criterion.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(c) => c.to_lowercase() == value.trim().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Meta {
        NewMeta {
            division: "El Teniente".into(),
            proceso: "Fundición".into(),
            indicador: "Emisiones SO2".into(),
            linea_base_anio: 2021,
            valor_linea_base: 5.2,
            unidad: None,
            fecha_objetivo: NaiveDate::from_ymd_opt(2030, 6, 30).unwrap(),
            creado_por: "test@codelco.cl".into(),
        }
        .into_meta(7, Utc::now())
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = MetaFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&sample()));
    }

    #[test]
    fn filter_matches_division_case_insensitively() {
        let filter = MetaFilter {
            division: Some("  el teniente ".into()),
            ..Default::default()
        };
        assert!(filter.matches(&sample()));

        let other = MetaFilter {
            division: Some("Andina".into()),
            ..Default::default()
        };
        assert!(!other.matches(&sample()));
    }

    #[test]
    fn filter_combines_criteria() {
        let filter = MetaFilter {
            proceso: Some("FUNDICIÓN".into()),
            anio: Some(2030),
            ..Default::default()
        };
        assert!(filter.matches(&sample()));

        let wrong_year = MetaFilter {
            anio: Some(2031),
            ..filter
        };
        assert!(!wrong_year.matches(&sample()));
    }

    #[test]
    fn blank_criteria_are_ignored() {
        let filter = MetaFilter {
            division: Some("   ".into()),
            proceso: Some(String::new()),
            anio: None,
        };
        assert!(filter.is_empty());
        assert!(filter.matches(&sample()));
    }

    #[test]
    fn draft_ignores_unknown_keys_and_nulls() {
        let draft: MetaDraft =
            serde_json::from_str(r#"{"id": 99, "division": "Andina", "unidad": null}"#).unwrap();
        assert_eq!(draft.division, Some(Value::from("Andina")));
        assert!(draft.unidad.is_none());
        assert!(draft.proceso.is_none());
    }

    #[test]
    fn meta_serializes_date_as_plain_day() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["fecha_objetivo"], "2030-06-30");
        assert_eq!(json["id"], 7);
        assert!(json["unidad"].is_null());
    }
}
