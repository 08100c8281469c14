// ── Field-synonym normalization ──
//
// The two API surfaces report some attributes under different names
// (and older tenants still emit retired spellings). Each canonical
// attribute has one fixed priority list, applied only here at the
// conversion boundary -- the engine never sniffs payload shapes itself.

use serde_json::{Map, Value};

/// Synonyms for the directory cross-reference id on registration and
/// management records, highest priority first.
pub const CROSS_REFERENCE_ID: &[&str] = &[
    "azureAdDeviceId",
    "azureActiveDirectoryDeviceId",
    "azureADDeviceId",
];

/// Synonyms for the deployment-profile assignment status.
pub const ASSIGNMENT_STATUS: &[&str] = &["deploymentProfileAssignmentStatus", "state", "status"];

/// The placeholder the remote uses for "no cross-reference yet".
const NIL_GUID: &str = "00000000-0000-0000-0000-000000000000";

/// First non-empty string value among `synonyms`, in priority order.
pub fn first_string(fields: &Map<String, Value>, synonyms: &[&str]) -> Option<String> {
    synonyms
        .iter()
        .filter_map(|key| fields.get(*key))
        .filter_map(Value::as_str)
        .find(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Extract the cross-reference id, treating the remote's all-zero GUID
/// placeholder as absent.
pub fn cross_reference_id(fields: &Map<String, Value>) -> Option<String> {
    first_string(fields, CROSS_REFERENCE_ID).filter(|id| id != NIL_GUID)
}

/// Extract the raw assignment-status string.
pub fn assignment_status(fields: &Map<String, Value>) -> Option<String> {
    first_string(fields, ASSIGNMENT_STATUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            panic!("expected object")
        };
        map
    }

    #[test]
    fn priority_order_wins() {
        let map = fields(json!({
            "azureActiveDirectoryDeviceId": "low-priority",
            "azureAdDeviceId": "high-priority",
        }));
        assert_eq!(cross_reference_id(&map).as_deref(), Some("high-priority"));
    }

    #[test]
    fn empty_values_fall_through() {
        let map = fields(json!({
            "azureAdDeviceId": "",
            "azureADDeviceId": "fallback",
        }));
        assert_eq!(cross_reference_id(&map).as_deref(), Some("fallback"));
    }

    #[test]
    fn nil_guid_counts_as_absent() {
        let map = fields(json!({
            "azureAdDeviceId": "00000000-0000-0000-0000-000000000000",
        }));
        assert_eq!(cross_reference_id(&map), None);
    }

    #[test]
    fn assignment_status_synonyms() {
        let map = fields(json!({ "deploymentProfileAssignmentStatus": "assigned" }));
        assert_eq!(assignment_status(&map).as_deref(), Some("assigned"));

        let map = fields(json!({ "status": "pending" }));
        assert_eq!(assignment_status(&map).as_deref(), Some("pending"));
    }
}
