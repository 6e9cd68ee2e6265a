// validation.rs — Goal-creation payload validation.
//
// Every field is checked independently and every problem is reported, so a
// client fixing a form sees all of its mistakes at once. Validation never
// touches storage; the only input besides the payload is "today".

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::meta::{MetaDraft, NewMeta};

/// Wire format for `fecha_objetivo`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED: &str = "is required";
const NOT_TEXT: &str = "must be text";
const NOT_INTEGER: &str = "must be an integer";
const NOT_NUMBER: &str = "must be a number";
const BAD_DATE: &str = "must be a date in YYYY-MM-DD format";
const NOT_FUTURE: &str = "target date must be in the future";

/// Field name → human-readable message for every rejected field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem with `field`. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Validate a creation payload against `today`.
///
/// Returns the normalized record, or every field error found. `unidad` is
/// optional and never produces an error.
pub fn validate(draft: &MetaDraft, today: NaiveDate) -> Result<NewMeta, FieldErrors> {
    let mut errors = FieldErrors::new();

    let division = required_text(&mut errors, "division", &draft.division);
    let proceso = required_text(&mut errors, "proceso", &draft.proceso);
    let indicador = required_text(&mut errors, "indicador", &draft.indicador);
    let linea_base_anio = required_integer(&mut errors, "linea_base_anio", &draft.linea_base_anio);
    let valor_linea_base = required_number(&mut errors, "valor_linea_base", &draft.valor_linea_base);
    let fecha_objetivo = future_date(&mut errors, "fecha_objetivo", &draft.fecha_objetivo, today);
    let creado_por = required_text(&mut errors, "creado_por", &draft.creado_por);
    let unidad = optional_text(&draft.unidad);

    match (
        division,
        proceso,
        indicador,
        linea_base_anio,
        valor_linea_base,
        fecha_objetivo,
        creado_por,
    ) {
        (
            Some(division),
            Some(proceso),
            Some(indicador),
            Some(linea_base_anio),
            Some(valor_linea_base),
            Some(fecha_objetivo),
            Some(creado_por),
        ) if errors.is_empty() => Ok(NewMeta {
            division,
            proceso,
            indicador,
            linea_base_anio,
            valor_linea_base,
            unidad,
            fecha_objetivo,
            creado_por,
        }),
        _ => Err(errors),
    }
}

/// Present, non-blank string. Blank and `null` count as missing.
fn required_text(errors: &mut FieldErrors, field: &str, value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => {
            errors.add(field, NOT_TEXT);
            None
        }
    }
}

/// JSON integer, or a string holding one (form submissions send strings).
fn required_integer(errors: &mut FieldErrors, field: &str, value: &Option<Value>) -> Option<i64> {
    let parsed = match value {
        None | Some(Value::Null) => {
            errors.add(field, REQUIRED);
            return None;
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.add(field, REQUIRED);
            return None;
        }
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    if parsed.is_none() {
        errors.add(field, NOT_INTEGER);
    }
    parsed
}

/// JSON number, or a string holding a finite one.
fn required_number(errors: &mut FieldErrors, field: &str, value: &Option<Value>) -> Option<f64> {
    let parsed = match value {
        None | Some(Value::Null) => {
            errors.add(field, REQUIRED);
            return None;
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.add(field, REQUIRED);
            return None;
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Some(_) => None,
    };
    if parsed.is_none() {
        errors.add(field, NOT_NUMBER);
    }
    parsed
}

/// `YYYY-MM-DD` strictly after `today`.
fn future_date(
    errors: &mut FieldErrors,
    field: &str,
    value: &Option<Value>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let raw = match value {
        None | Some(Value::Null) => {
            errors.add(field, REQUIRED);
            return None;
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.add(field, REQUIRED);
            return None;
        }
        Some(Value::String(s)) => s.trim(),
        Some(_) => {
            errors.add(field, BAD_DATE);
            return None;
        }
    };

    let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) else {
        errors.add(field, BAD_DATE);
        return None;
    };
    if date <= today {
        errors.add(field, NOT_FUTURE);
        return None;
    }
    Some(date)
}

fn optional_text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}
