//! Schema metadata reported by the engine

use crate::model::{FieldDescriptor, ValueDomain};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field name to field properties, as reported by the schema endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldProperties {
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl FieldProperties {
    /// Range domain of the field type, `None` for text and other discrete types
    pub fn value_domain(&self) -> Option<ValueDomain> {
        field_type_domain(&self.field_type)
    }

    /// Multi-valued flag from the Luke schema flags string (`I-S-M---...`)
    pub fn is_multi_valued(&self) -> bool {
        self.schema
            .as_deref()
            .and_then(|flags| flags.chars().nth(4))
            .map(|c| c == 'M')
            .unwrap_or(false)
    }
}

impl FieldInfo {
    pub fn get(&self, field: &str) -> Option<&FieldProperties> {
        self.fields.get(field)
    }

    pub fn dynamic_fields(&self) -> impl Iterator<Item = (&String, &FieldProperties)> {
        self.fields.iter().filter(|(_, p)| p.dynamic_base.is_some())
    }

    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        self.fields
            .iter()
            .map(|(name, props)| FieldDescriptor {
                name: name.clone(),
                field_type: props.field_type.clone(),
                multi_valued: props.is_multi_valued(),
                dynamic_base: props.dynamic_base.clone(),
            })
            .collect()
    }
}

/// Map an engine field type name to a range domain
pub fn field_type_domain(field_type: &str) -> Option<ValueDomain> {
    let t = field_type.to_ascii_lowercase();
    let t = t
        .trim_start_matches("solr.")
        .trim_start_matches("trie")
        .trim_start_matches('p');
    if t.starts_with("date") || t == "tdate" || t == "dt" {
        return Some(ValueDomain::Date);
    }
    match t {
        "int" | "long" | "short" | "integer" | "tint" | "tlong" | "i" | "l" | "ints" | "longs"
        | "intfield" | "longfield" | "intpointfield" | "longpointfield" => {
            Some(ValueDomain::Integer)
        }
        "float" | "double" | "tfloat" | "tdouble" | "f" | "d" | "floats" | "doubles"
        | "floatfield" | "doublefield" | "floatpointfield" | "doublepointfield" => {
            Some(ValueDomain::Decimal)
        }
        _ => None,
    }
}

/// Minimum and maximum of a field over the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub min: Value,
    pub max: Value,
}
