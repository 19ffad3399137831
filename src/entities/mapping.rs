// src/entities/mapping.rs

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use crate::db::{Filter, Record};

/// Uma regra de tradução entre o esquema canônico (colunas do Supabase)
/// e os nomes/valores nativos de um backend.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Só o nome muda.
    Rename {
        canonical: &'static str,
        native: &'static str,
    },
    /// `status` texto ("ativo"/"inativo") <-> booleano nativo (`active`).
    StatusAsBool {
        canonical: &'static str,
        native: &'static str,
        active: &'static str,
        inactive: &'static str,
    },
    /// Data/hora sem fuso no backend; no canônico sempre RFC 3339 em UTC.
    NaiveTimestamp {
        canonical: &'static str,
        native: &'static str,
    },
}

impl FieldRule {
    fn canonical(&self) -> &'static str {
        match self {
            FieldRule::Rename { canonical, .. }
            | FieldRule::StatusAsBool { canonical, .. }
            | FieldRule::NaiveTimestamp { canonical, .. } => canonical,
        }
    }

    fn native(&self) -> &'static str {
        match self {
            FieldRule::Rename { native, .. }
            | FieldRule::StatusAsBool { native, .. }
            | FieldRule::NaiveTimestamp { native, .. } => native,
        }
    }

    fn value_to_native(&self, value: Value) -> Value {
        match (self, value) {
            (FieldRule::StatusAsBool { active, inactive, .. }, Value::String(s)) => {
                if s == *active {
                    Value::Bool(true)
                } else if s == *inactive {
                    Value::Bool(false)
                } else {
                    // Valor fora do domínio segue como está; o backend decide.
                    Value::String(s)
                }
            }
            (_, value) => value,
        }
    }

    fn value_to_canonical(&self, value: Value) -> Value {
        match (self, value) {
            (FieldRule::StatusAsBool { active, inactive, .. }, Value::Bool(b)) => {
                Value::String(if b { active } else { inactive }.to_string())
            }
            (FieldRule::NaiveTimestamp { .. }, Value::String(s)) => Value::String(ensure_utc(s)),
            (_, value) => value,
        }
    }
}

/// "2024-03-01T10:00:00.123" -> "2024-03-01T10:00:00.123+00:00".
/// Textos que já têm fuso, ou que não são data/hora, passam intactos.
fn ensure_utc(text: String) -> String {
    if DateTime::parse_from_rfc3339(&text).is_ok() {
        return text;
    }
    match NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.and_utc().to_rfc3339(),
        Err(_) => text,
    }
}

/// O conjunto de regras de um backend para uma entidade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMapping {
    rules: Vec<FieldRule>,
}

impl FieldMapping {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    pub fn is_identity(&self) -> bool {
        self.rules.is_empty()
    }

    /// Nome nativo de uma coluna canônica.
    pub fn native_column(&self, canonical: &str) -> String {
        self.rules
            .iter()
            .find(|r| r.canonical() == canonical)
            .map_or_else(|| canonical.to_string(), |r| r.native().to_string())
    }

    pub fn to_native(&self, record: Record) -> Record {
        if self.is_identity() {
            return record;
        }
        record
            .into_iter()
            .map(|(key, value)| match self.rules.iter().find(|r| r.canonical() == key) {
                Some(rule) => (rule.native().to_string(), rule.value_to_native(value)),
                None => (key, value),
            })
            .collect()
    }

    pub fn to_canonical(&self, record: Record) -> Record {
        if self.is_identity() {
            return record;
        }
        record
            .into_iter()
            .map(|(key, value)| match self.rules.iter().find(|r| r.native() == key) {
                Some(rule) => (rule.canonical().to_string(), rule.value_to_canonical(value)),
                None => (key, value),
            })
            .collect()
    }

    pub fn filter_to_native(&self, filter: &Filter) -> Filter {
        if self.is_identity() {
            return filter.clone();
        }
        Filter::from_record(self.to_native(filter.to_record()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base44_plan_mapping() -> FieldMapping {
        FieldMapping::new(vec![
            FieldRule::NaiveTimestamp { canonical: "created_at", native: "created_date" },
            FieldRule::StatusAsBool {
                canonical: "status",
                native: "active",
                active: "ativo",
                inactive: "inativo",
            },
        ])
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn plan_round_trips_through_base44_shape() {
        let mapping = base44_plan_mapping();
        let canonical = record(json!({
            "id": "p1",
            "nome": "Básico",
            "status": "inativo",
            "created_at": "2024-03-01T10:00:00+00:00"
        }));

        let native = mapping.to_native(canonical.clone());
        assert_eq!(native["active"], json!(false));
        assert!(native.contains_key("created_date"));
        assert!(!native.contains_key("status"));

        assert_eq!(mapping.to_canonical(native), canonical);
    }

    #[test]
    fn naive_timestamps_become_utc() {
        let mapping = base44_plan_mapping();
        let canonical = mapping.to_canonical(record(json!({
            "created_date": "2024-03-01T10:00:00.123"
        })));
        let parsed = DateTime::parse_from_rfc3339(canonical["created_at"].as_str().unwrap());
        assert!(parsed.is_ok());
    }

    #[test]
    fn unknown_status_is_passed_through() {
        let mapping = base44_plan_mapping();
        let native = mapping.to_native(record(json!({"status": "suspenso"})));
        assert_eq!(native["active"], json!("suspenso"));
    }

    #[test]
    fn filters_are_translated() {
        let mapping = base44_plan_mapping();
        let filter = Filter::new().eq("status", "ativo").eq("nome", "Básico");
        let native = mapping.filter_to_native(&filter);

        assert!(native.matches(&record(json!({"active": true, "nome": "Básico"}))));
        assert_eq!(mapping.native_column("status"), "active");
        assert_eq!(mapping.native_column("nome"), "nome");
    }
}
