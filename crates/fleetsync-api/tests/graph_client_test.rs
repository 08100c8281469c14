#![allow(clippy::unwrap_used)]
// Integration tests for `GraphClient` and the operation sets, using wiremock.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetsync_api::types::{AutopilotDevice, ImportDeviceRequest};
use fleetsync_api::{ApiErrorKind, ApiSurface, AutopilotOps, DirectoryOps, Error, GraphClient, IntuneOps};

// ── Helpers ─────────────────────────────────────────────────────────

const AUTOPILOT_PATH: &str = "/v1.0/deviceManagement/windowsAutopilotDeviceIdentities";
const IMPORT_PATH: &str = "/v1.0/deviceManagement/importedWindowsAutopilotDeviceIdentities";

async fn setup() -> (MockServer, Arc<GraphClient>) {
    let server = MockServer::start().await;
    let client = GraphClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, Arc::new(client))
}

fn token() -> SecretString {
    SecretString::from("test-token")
}

// ── Paging ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_all_follows_continuation_links() {
    let (server, client) = setup().await;

    let page_two = format!("{}{AUTOPILOT_PATH}?page=2", server.uri());

    Mock::given(method("GET"))
        .and(path(AUTOPILOT_PATH))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "id": "ap-1", "serialNumber": "SN-001" },
                { "id": "ap-2", "serialNumber": "SN-002" },
            ],
            "@odata.nextLink": page_two,
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(AUTOPILOT_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "id": "ap-3", "serialNumber": "SN-003" },
            ],
        })))
        .mount(&server)
        .await;

    let devices: Vec<AutopilotDevice> = client
        .get_all(
            ApiSurface::Stable,
            "deviceManagement/windowsAutopilotDeviceIdentities",
            &token(),
        )
        .await
        .unwrap();

    let serials: Vec<_> = devices
        .iter()
        .map(|d| d.serial_number.as_deref().unwrap())
        .collect();
    assert_eq!(serials, vec!["SN-001", "SN-002", "SN-003"]);
}

#[tokio::test]
async fn test_get_all_accepts_bare_array_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(AUTOPILOT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "ap-1", "serialNumber": "SN-001" },
        ])))
        .mount(&server)
        .await;

    let devices: Vec<AutopilotDevice> = client
        .get_all(
            ApiSurface::Stable,
            "deviceManagement/windowsAutopilotDeviceIdentities",
            &token(),
        )
        .await
        .unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "ap-1");
}

#[tokio::test]
async fn test_preview_surface_uses_beta_prefix() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/beta/deviceManagement/windowsAutopilotDeviceIdentities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let devices: Vec<AutopilotDevice> = client
        .get_all(
            ApiSurface::Preview,
            "deviceManagement/windowsAutopilotDeviceIdentities",
            &token(),
        )
        .await
        .unwrap();
    assert!(devices.is_empty());
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_error_payload_preserved_verbatim() {
    let (server, client) = setup().await;

    let remote_error = json!({
        "error": {
            "code": "Authorization_RequestDenied",
            "message": "Insufficient privileges to complete the operation.",
            "innerError": { "request-id": "d4e5" }
        }
    });

    Mock::given(method("GET"))
        .and(path("/v1.0/deviceManagement/managedDevices/dev-1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(&remote_error))
        .mount(&server)
        .await;

    let err = IntuneOps::new(Arc::clone(&client))
        .get(&token(), "dev-1")
        .await
        .unwrap_err();

    assert_eq!(err.classify(), ApiErrorKind::PermissionDenied);
    let Error::Api { status, payload } = err else {
        panic!("expected Api error, got {err:?}");
    };
    assert_eq!(status, 403);
    assert_eq!(payload, remote_error);
}

#[tokio::test]
async fn test_non_json_error_body_kept_as_string() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/devices"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = DirectoryOps::new(Arc::clone(&client))
        .list_devices(&token())
        .await
        .unwrap_err();

    let Error::Api { status, payload } = err else {
        panic!("expected Api error, got {err:?}");
    };
    assert_eq!(status, 502);
    assert_eq!(payload, json!("Bad Gateway"));
}

#[tokio::test]
async fn test_autopilot_list_treats_missing_endpoint_as_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(AUTOPILOT_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "ResourceNotFound", "message": "No registered devices" }
        })))
        .mount(&server)
        .await;

    let devices = AutopilotOps::new(Arc::clone(&client))
        .list(&token())
        .await
        .unwrap();
    assert!(devices.is_empty());
}

// ── Bulk import ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_import_reports_per_row_outcomes() {
    let (server, client) = setup().await;

    // The row carrying SN-BAD is rejected; everything else succeeds.
    Mock::given(method("POST"))
        .and(path(IMPORT_PATH))
        .and(body_string_contains("SN-BAD"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "BadRequest", "message": "Invalid hardware identifier" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(IMPORT_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "imp-1",
            "serialNumber": "SN-OK",
            "state": { "deviceImportStatus": "pending" }
        })))
        .mount(&server)
        .await;

    let rows = vec![
        ImportDeviceRequest::new("SN-OK-1".into(), "hash-1".into(), String::new()),
        ImportDeviceRequest::new("SN-BAD".into(), "hash-2".into(), String::new()),
        ImportDeviceRequest::new("SN-OK-2".into(), "hash-3".into(), "Sales".into()),
    ];

    let outcomes = AutopilotOps::new(Arc::clone(&client))
        .import(&token(), &rows)
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_ok());
    assert!(outcomes[1].is_err());
    assert!(outcomes[2].is_ok());
}

// ── Group membership ────────────────────────────────────────────────

#[tokio::test]
async fn test_add_group_member_posts_object_reference() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1.0/groups/grp-1/members/$ref"))
        .and(body_string_contains("directoryObjects/obj-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    DirectoryOps::new(Arc::clone(&client))
        .add_group_member(&token(), "grp-1", "obj-9")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_managed_device() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1.0/deviceManagement/managedDevices/dev-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    IntuneOps::new(Arc::clone(&client))
        .delete(&token(), "dev-1")
        .await
        .unwrap();
}
