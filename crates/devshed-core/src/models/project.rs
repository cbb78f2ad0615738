use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::normalize_id;

/// A project record as returned by the API.
///
/// The service is loose about field presence, spelling and id encoding, so
/// identifiers stay raw until normalized and everything not modeled below is
/// carried in `extra` untouched (the server mixes camelCase and snake_case
/// spellings for the descriptive fields).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<Value>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Canonical string identifier; `_id` wins over `id` when both are
    /// present.
    pub fn id(&self) -> Option<String> {
        self.raw_id
            .as_ref()
            .and_then(normalize_id)
            .or_else(|| self.id.as_ref().and_then(normalize_id))
    }

    /// Stable display/selection key for row `index` of a rendered list.
    pub fn entity_key(&self, index: usize) -> String {
        self.id()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("project-{}", index))
    }

    /// Raw value of an unmodeled field, under either spelling the server
    /// uses.
    pub fn field(&self, snake: &str, camel: &str) -> Option<&Value> {
        self.extra.get(snake).or_else(|| self.extra.get(camel))
    }

    /// Owning organization id, normalized.
    pub fn organization_id(&self) -> Option<String> {
        self.field("organization_id", "organizationId")
            .and_then(normalize_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrapped_and_plain_ids_both_normalize() {
        let wrapped: Project =
            serde_json::from_value(json!({"_id": {"$oid": "abc"}, "name": "A"})).unwrap();
        assert_eq!(wrapped.id().as_deref(), Some("abc"));

        let plain: Project = serde_json::from_value(json!({"id": "p1", "name": "B"})).unwrap();
        assert_eq!(plain.id().as_deref(), Some("p1"));
    }

    #[test]
    fn raw_id_wins_over_id() {
        let project: Project =
            serde_json::from_value(json!({"_id": "mongo", "id": "plain", "name": "A"})).unwrap();
        assert_eq!(project.id().as_deref(), Some("mongo"));
    }

    #[test]
    fn unknown_fields_survive_in_extra() {
        let project: Project = serde_json::from_value(json!({
            "name": "A",
            "organization_id": {"$oid": "org1"},
            "project_url": "https://x",
            "tags": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(project.organization_id().as_deref(), Some("org1"));
        assert_eq!(project.field("project_url", "projectUrl"), Some(&json!("https://x")));
        assert_eq!(project.extra.get("tags"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn missing_id_falls_back_to_index_key() {
        let project: Project = serde_json::from_value(json!({"name": "A"})).unwrap();
        assert_eq!(project.entity_key(4), "project-4");
    }
}
