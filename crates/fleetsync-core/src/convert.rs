// ── Wire → canonical conversions ──
//
// One place where raw payload shapes become domain records. Synonym
// handling is delegated to `normalize`.

use fleetsync_api::types;

use crate::model::{
    AssignmentStatus, ComplianceState, DirectoryRecord, ManagementRecord, RegistrationRecord,
};
use crate::normalize;

impl From<types::AutopilotDevice> for RegistrationRecord {
    fn from(raw: types::AutopilotDevice) -> Self {
        let assignment = normalize::assignment_status(&raw.extra)
            .map_or(AssignmentStatus::Unknown, |s| {
                AssignmentStatus::from_remote(&s)
            });
        let directory_device_id = normalize::cross_reference_id(&raw.extra);

        Self {
            id: raw.id,
            serial_number: raw.serial_number.unwrap_or_default(),
            manufacturer: raw.manufacturer,
            model: raw.model,
            group_tag: raw.group_tag.filter(|t| !t.is_empty()),
            assignment,
            directory_device_id,
        }
    }
}

impl From<types::ManagedDevice> for ManagementRecord {
    fn from(raw: types::ManagedDevice) -> Self {
        let compliance = raw
            .compliance_state
            .as_deref()
            .map_or(ComplianceState::Unknown, ComplianceState::from_remote);
        let directory_device_id = normalize::cross_reference_id(&raw.extra);

        Self {
            id: raw.id,
            name: raw.device_name,
            user_principal_name: raw.user_principal_name,
            operating_system: raw.operating_system,
            compliance,
            last_sync: raw.last_sync_date_time,
            serial_number: raw.serial_number.filter(|s| !s.is_empty()),
            directory_device_id,
        }
    }
}

impl From<types::DirectoryDevice> for DirectoryRecord {
    fn from(raw: types::DirectoryDevice) -> Self {
        Self {
            object_id: raw.id,
            display_name: raw.display_name,
            device_id: raw.device_id,
            operating_system: raw.operating_system,
            account_enabled: raw.account_enabled,
            last_sign_in: raw.approximate_last_sign_in_date_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registration_record_from_wire_shape() {
        let raw: types::AutopilotDevice = serde_json::from_value(json!({
            "id": "ap-1",
            "serialNumber": "SN-100",
            "manufacturer": "Contoso",
            "model": "Book 3",
            "groupTag": "",
            "deploymentProfileAssignmentStatus": "assignedInSync",
            "azureAdDeviceId": "11111111-2222-3333-4444-555555555555",
        }))
        .expect("valid wire shape");

        let record = RegistrationRecord::from(raw);
        assert_eq!(record.serial_number, "SN-100");
        assert_eq!(record.group_tag, None);
        assert_eq!(record.assignment, AssignmentStatus::Unknown);
        assert_eq!(
            record.directory_device_id.as_deref(),
            Some("11111111-2222-3333-4444-555555555555")
        );
    }

    #[test]
    fn management_record_normalizes_compliance() {
        let raw: types::ManagedDevice = serde_json::from_value(json!({
            "id": "dev-1",
            "deviceName": "LAPTOP-01",
            "complianceState": "inGracePeriod",
            "azureADDeviceId": "aaaa-bbbb",
        }))
        .expect("valid wire shape");

        let record = ManagementRecord::from(raw);
        assert_eq!(record.compliance, ComplianceState::InGracePeriod);
        assert_eq!(record.directory_device_id.as_deref(), Some("aaaa-bbbb"));
    }
}
