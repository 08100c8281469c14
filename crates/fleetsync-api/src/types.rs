// Wire types for the administration graph API.
//
// Shapes follow the remote's camelCase JSON. Fields the two surfaces
// report under differing names are left in the `extra` map and
// normalized by `fleetsync-core` at the conversion boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Registration system ──────────────────────────────────────────────

/// A registered zero-touch device identity.
///
/// Existence in the registration listing is the only signal that an
/// import succeeded; the deployment status and the directory
/// cross-reference id live in `extra` because their field names vary
/// between surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutopilotDevice {
    pub id: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub group_tag: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Upload-side record created by a bulk import call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedDevice {
    pub id: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub group_tag: Option<String>,
    #[serde(default)]
    pub imported_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: Option<ImportState>,
}

/// Import progress as reported on the upload record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportState {
    #[serde(default)]
    pub device_import_status: Option<String>,
    #[serde(default)]
    pub device_registration_id: Option<String>,
    #[serde(default)]
    pub device_error_code: Option<i64>,
    #[serde(default)]
    pub device_error_name: Option<String>,
}

/// Request body for one row of a bulk import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDeviceRequest {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    pub serial_number: String,
    pub hardware_identifier: String,
    pub group_tag: String,
    pub assigned_user_principal_name: String,
}

impl ImportDeviceRequest {
    pub fn new(serial_number: String, hardware_identifier: String, group_tag: String) -> Self {
        Self {
            odata_type: "#microsoft.graph.importedWindowsAutopilotDeviceIdentity",
            serial_number,
            hardware_identifier,
            group_tag,
            assigned_user_principal_name: String::new(),
        }
    }
}

// ── Management system ────────────────────────────────────────────────

/// An enrolled device under organizational management.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDevice {
    pub id: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
    #[serde(default)]
    pub operating_system: Option<String>,
    #[serde(default)]
    pub compliance_state: Option<String>,
    #[serde(default)]
    pub last_sync_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Directory system ─────────────────────────────────────────────────

/// A device object in the organizational directory.
///
/// `device_id` is the cross-reference identifier that management-system
/// records point at -- distinct from the directory object `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDevice {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub operating_system: Option<String>,
    #[serde(default)]
    pub operating_system_version: Option<String>,
    #[serde(default)]
    pub account_enabled: Option<bool>,
    #[serde(default)]
    pub approximate_last_sign_in_date_time: Option<DateTime<Utc>>,
}

/// A named directory group that device objects can be added to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryGroup {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Body for a group-membership addition (`$ref` endpoint).
#[derive(Debug, Clone, Serialize)]
pub struct MemberRef {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}
