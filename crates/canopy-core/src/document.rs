//! Raw data-model documents as served by the catalog backend.
//!
//! These types mirror the backend JSON one-to-one. They are inputs to
//! hierarchy construction and are never rendered directly; the tree in
//! [`crate::hierarchy`] is the canonical in-memory representation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One admissible value of a categorical variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumeration {
    pub code: String,
    pub label: String,
}

/// A leaf schema element describing one measured or collected field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Display label. Doubles as the node name in the hierarchy.
    pub label: String,

    /// Stable machine identifier, distinct from the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// SQL storage type declared by the backend. Kept verbatim.
    #[serde(default, rename = "sql_type", skip_serializing_if = "Option::is_none")]
    pub sql_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_categorical: Option<bool>,

    /// Admissible values for categorical variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumerations: Vec<Enumeration>,

    /// Declared value type ("nominal", "real", "integer", ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

/// A named container of variables and/or sub-groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
}

/// A versioned schema document describing a dataset's variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModel {
    pub uuid: Uuid,

    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Longitudinal models carry repeated measurements over visits.
    #[serde(default)]
    pub longitudinal: bool,

    /// Released models are frozen: no update, delete, or revert.
    #[serde(default)]
    pub released: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
}

impl DataModel {
    /// Decodes a document from JSON text, e.g. an exported model file.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A named collection of data models, the top-level browsing unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Federation {
    pub code: String,
    pub title: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub data_model_ids: Vec<Uuid>,

    #[serde(default)]
    pub institutions: String,

    #[serde(default)]
    pub records: String,
}

/// Descriptive fields carried by variable nodes in the hierarchy.
///
/// A subset of [`Variable`]: everything except the label/code, which
/// become the node's own identity fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableAttributes {
    pub description: Option<String>,
    pub sql_type: Option<String>,
    pub is_categorical: Option<bool>,
    pub enumerations: Vec<Enumeration>,
    pub var_type: Option<String>,
    pub methodology: Option<String>,
    pub units: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl VariableAttributes {
    /// Extracts the descriptive fields from a raw variable.
    pub fn from_variable(v: &Variable) -> Self {
        Self {
            description: v.description.clone(),
            sql_type: v.sql_type.clone(),
            is_categorical: v.is_categorical,
            enumerations: v.enumerations.clone(),
            var_type: v.var_type.clone(),
            methodology: v.methodology.clone(),
            units: v.units.clone(),
            min_value: v.min_value,
            max_value: v.max_value,
        }
    }

    /// Flattens the attributes into display pairs, skipping absent fields.
    ///
    /// This is the single source for detail panels and tooltips, so the
    /// field ordering here is the ordering everywhere.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(d) = &self.description {
            out.push(("Description", d.clone()));
        }
        if let Some(t) = &self.var_type {
            out.push(("Type", t.clone()));
        }
        if let Some(t) = &self.sql_type {
            out.push(("SQL type", t.clone()));
        }
        if let Some(m) = &self.methodology {
            out.push(("Methodology", m.clone()));
        }
        if let Some(u) = &self.units {
            out.push(("Units", u.clone()));
        }
        if let Some(v) = self.min_value {
            out.push(("Min", format_number(v)));
        }
        if let Some(v) = self.max_value {
            out.push(("Max", format_number(v)));
        }
        if self.is_categorical == Some(true) && !self.enumerations.is_empty() {
            let values = self
                .enumerations
                .iter()
                .map(|e| e.label.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            out.push(("Values", values));
        }
        out
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_deserializes_backend_field_names() {
        let json = r#"{
            "label": "Left hippocampus volume",
            "code": "lefthippocampus",
            "sql_type": "real",
            "isCategorical": false,
            "type": "real",
            "units": "cm3",
            "minValue": 0.5,
            "maxValue": 6.2
        }"#;

        let v: Variable = serde_json::from_str(json).unwrap();
        assert_eq!(v.label, "Left hippocampus volume");
        assert_eq!(v.sql_type.as_deref(), Some("real"));
        assert_eq!(v.var_type.as_deref(), Some("real"));
        assert_eq!(v.is_categorical, Some(false));
        assert_eq!(v.min_value, Some(0.5));
        assert_eq!(v.max_value, Some(6.2));
    }

    #[test]
    fn test_data_model_missing_lists_default_to_empty() {
        let json = r#"{
            "uuid": "8b2c1f5e-9a3d-4c7b-8e1f-2a6d9c4b7e0a",
            "label": "Dementia",
            "version": "v0.5",
            "released": true
        }"#;

        let model: DataModel = serde_json::from_str(json).unwrap();
        assert!(model.variables.is_empty());
        assert!(model.groups.is_empty());
        assert!(!model.longitudinal);
        assert!(model.released);
    }

    #[test]
    fn test_attribute_pairs_skip_absent_fields() {
        let attrs = VariableAttributes {
            var_type: Some("nominal".into()),
            is_categorical: Some(true),
            enumerations: vec![
                Enumeration {
                    code: "F".into(),
                    label: "Female".into(),
                },
                Enumeration {
                    code: "M".into(),
                    label: "Male".into(),
                },
            ],
            ..Default::default()
        };

        let pairs = attrs.pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "Type");
        assert_eq!(pairs[1], ("Values", "Female, Male".to_string()));
    }
}
