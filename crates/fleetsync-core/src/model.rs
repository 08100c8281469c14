// ── Canonical domain records ──
//
// Normalized from the wire shapes so the engine and front ends only
// ever see one form. A serial number is the sole identifier stable
// across all three systems; every cross-system correlation uses serial
// equality, never remote-assigned ids (each system mints its own,
// independently and asynchronously).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deployment-profile assignment status of a registration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AssignmentStatus {
    Assigned,
    Pending,
    NotAssigned,
    Failed,
    Unknown,
}

impl AssignmentStatus {
    /// Parse the remote's status string (any casing). Unrecognized
    /// values map to `Unknown` rather than failing the conversion.
    pub fn from_remote(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "assigned" => Self::Assigned,
            "pending" => Self::Pending,
            "notassigned" => Self::NotAssigned,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Compliance state of a management record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ComplianceState {
    Compliant,
    Noncompliant,
    InGracePeriod,
    Unknown,
}

impl ComplianceState {
    pub fn from_remote(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "compliant" => Self::Compliant,
            "noncompliant" => Self::Noncompliant,
            "ingraceperiod" => Self::InGracePeriod,
            _ => Self::Unknown,
        }
    }

    pub fn is_compliant(&self) -> bool {
        matches!(self, Self::Compliant)
    }
}

/// A device claimed for zero-touch provisioning (registration system).
///
/// Existence in a listing is the only signal an import took effect, and
/// disappearance from a listing is the only signal a deletion did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: String,
    pub serial_number: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub group_tag: Option<String>,
    pub assignment: AssignmentStatus,
    /// Cross-reference into the directory system. Populated
    /// asynchronously after registration syncs -- may be absent for an
    /// arbitrary period after the record itself appears.
    pub directory_device_id: Option<String>,
}

/// An enrolled device under organizational management.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementRecord {
    pub id: String,
    pub name: Option<String>,
    pub user_principal_name: Option<String>,
    pub operating_system: Option<String>,
    pub compliance: ComplianceState,
    pub last_sync: Option<DateTime<Utc>>,
    pub serial_number: Option<String>,
    /// Cross-reference into the directory system.
    pub directory_device_id: Option<String>,
}

impl ManagementRecord {
    /// Whole days since the device last synced, if it ever has.
    pub fn days_since_sync(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_sync.map(|sync| (now - sync).num_days())
    }

    /// A device with no sync timestamp at all counts as stale.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold_days: i64) -> bool {
        self.days_since_sync(now)
            .is_none_or(|days| days > threshold_days)
    }

    /// Case-insensitive match on device name or user principal.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let hit = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&term))
        };
        hit(&self.name) || hit(&self.user_principal_name)
    }
}

/// A device object in the organizational directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Directory object id -- the id deletion operates on.
    pub object_id: String,
    pub display_name: Option<String>,
    /// The cross-reference identifier management records point at.
    /// Distinct from `object_id`.
    pub device_id: Option<String>,
    pub operating_system: Option<String>,
    pub account_enabled: Option<bool>,
    pub last_sign_in: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn assignment_status_parses_known_values() {
        assert_eq!(AssignmentStatus::from_remote("assigned"), AssignmentStatus::Assigned);
        assert_eq!(AssignmentStatus::from_remote("Pending"), AssignmentStatus::Pending);
        assert_eq!(
            AssignmentStatus::from_remote("notAssigned"),
            AssignmentStatus::NotAssigned
        );
        assert_eq!(AssignmentStatus::from_remote("failed"), AssignmentStatus::Failed);
        assert_eq!(
            AssignmentStatus::from_remote("somethingNew"),
            AssignmentStatus::Unknown
        );
    }

    #[test]
    fn stale_when_never_synced() {
        let record = ManagementRecord {
            id: "d1".into(),
            name: Some("LAPTOP-01".into()),
            user_principal_name: None,
            operating_system: None,
            compliance: ComplianceState::Unknown,
            last_sync: None,
            serial_number: None,
            directory_device_id: None,
        };
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert!(record.is_stale(now, 30));
    }

    #[test]
    fn stale_threshold_is_exclusive() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut record = ManagementRecord {
            id: "d1".into(),
            name: None,
            user_principal_name: None,
            operating_system: None,
            compliance: ComplianceState::Compliant,
            last_sync: Some(now - chrono::Duration::days(30)),
            serial_number: None,
            directory_device_id: None,
        };
        assert!(!record.is_stale(now, 30));
        record.last_sync = Some(now - chrono::Duration::days(31));
        assert!(record.is_stale(now, 30));
    }

    #[test]
    fn search_matches_name_or_principal() {
        let record = ManagementRecord {
            id: "d1".into(),
            name: Some("LAPTOP-SALES-01".into()),
            user_principal_name: Some("ada@example.com".into()),
            operating_system: None,
            compliance: ComplianceState::Compliant,
            last_sync: None,
            serial_number: None,
            directory_device_id: None,
        };
        assert!(record.matches_search("sales"));
        assert!(record.matches_search("ADA@"));
        assert!(!record.matches_search("warehouse"));
    }
}
