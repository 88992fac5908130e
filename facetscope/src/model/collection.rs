use super::facet::Facet;
use serde::{Deserialize, Serialize};

/// A search page over one engine collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    #[serde(default)]
    pub facets: Vec<Facet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
}

fn default_true() -> bool {
    true
}

impl Collection {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            label: label.into(),
            enabled: true,
            id_field: None,
            facets: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn facet(&self, id: &str) -> Option<&Facet> {
        self.facets.iter().find(|f| f.id == id)
    }

    /// Same collection showing only `facet`
    pub fn with_only_facet(&self, facet: &Facet) -> Self {
        Self {
            facets: vec![facet.clone()],
            ..self.clone()
        }
    }

    /// Same collection with `facet` in place of the facet sharing its id
    pub fn with_facet(&self, facet: &Facet) -> Self {
        let mut collection = self.clone();
        match collection.facets.iter_mut().find(|f| f.id == facet.id) {
            Some(slot) => *slot = facet.clone(),
            None => collection.facets.push(facet.clone()),
        }
        collection
    }
}

/// One field of the engine schema as shown in the field picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub multi_valued: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_base: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_defaults() {
        let collection: Collection = serde_json::from_value(json!({"name": "logs"})).unwrap();
        assert!(collection.id.is_none());
        assert!(collection.enabled);
        assert!(collection.facets.is_empty());
    }

    #[test]
    fn test_with_only_facet_keeps_identity() {
        let facet: Facet = serde_json::from_value(json!({
            "id": "f2", "field": "host", "type": "field", "properties": {}
        }))
        .unwrap();
        let mut collection = Collection::new("logs", "Logs");
        collection.facets.push(
            serde_json::from_value(json!({
                "id": "f1", "field": "status", "type": "field", "properties": {}
            }))
            .unwrap(),
        );
        collection.facets.push(facet.clone());

        let pruned = collection.with_only_facet(&facet);
        assert_eq!(pruned.name, "logs");
        assert_eq!(pruned.facets, vec![facet]);
        assert!(collection.facet("f1").is_some());
        assert!(pruned.facet("f1").is_none());
    }

    #[test]
    fn test_with_facet_replaces_by_id() {
        let mut collection = Collection::new("logs", "Logs");
        collection.facets.push(
            serde_json::from_value(json!({
                "id": "f1", "label": "Status", "field": "status", "type": "field", "properties": {}
            }))
            .unwrap(),
        );
        let renamed: Facet = serde_json::from_value(json!({
            "id": "f1", "label": "Level", "field": "level", "type": "field", "properties": {}
        }))
        .unwrap();

        let replaced = collection.with_facet(&renamed);
        assert_eq!(replaced.facets, vec![renamed]);

        let extra: Facet = serde_json::from_value(json!({
            "id": "f2", "field": "host", "type": "field", "properties": {}
        }))
        .unwrap();
        assert_eq!(collection.with_facet(&extra).facets.len(), 2);
    }
}
