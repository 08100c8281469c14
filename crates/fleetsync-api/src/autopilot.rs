// Registration-system operation set (zero-touch device identities).
//
// Stateless wrapper over GraphClient. Deletion here only *initiates*
// removal -- the record disappears from listings asynchronously, and
// callers confirm by re-listing.

use std::sync::Arc;

use futures_util::future::join_all;
use secrecy::SecretString;

use crate::client::{ApiSurface, GraphClient};
use crate::types::{AutopilotDevice, ImportDeviceRequest, ImportedDevice};
use crate::Error;

const REGISTERED: &str = "deviceManagement/windowsAutopilotDeviceIdentities";
const IMPORTED: &str = "deviceManagement/importedWindowsAutopilotDeviceIdentities";

/// Operations on registration-system device identities.
#[derive(Clone)]
pub struct AutopilotOps {
    client: Arc<GraphClient>,
}

impl AutopilotOps {
    pub fn new(client: Arc<GraphClient>) -> Self {
        Self { client }
    }

    /// List every registered device identity (all pages).
    ///
    /// A 404 or 400 from this endpoint means the tenant has no
    /// registration records at all -- returned as an empty list, not
    /// an error.
    pub async fn list(&self, token: &SecretString) -> Result<Vec<AutopilotDevice>, Error> {
        match self
            .client
            .get_all(ApiSurface::Stable, REGISTERED, token)
            .await
        {
            Ok(devices) => Ok(devices),
            Err(e) if matches!(e.status(), Some(400 | 404)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Initiate deletion of a registered device identity.
    ///
    /// Success means the remote accepted the request, nothing more;
    /// there is no synchronous confirmation of removal.
    pub async fn delete(&self, token: &SecretString, id: &str) -> Result<(), Error> {
        self.client
            .delete(ApiSurface::Stable, &format!("{REGISTERED}/{id}"), token)
            .await
    }

    /// Upload a batch of device identities, one POST per row, all
    /// issued concurrently.
    ///
    /// Returns a per-row outcome in input order -- a failed row never
    /// aborts the rest of the batch, so callers must always inspect
    /// every element.
    pub async fn import(
        &self,
        token: &SecretString,
        rows: &[ImportDeviceRequest],
    ) -> Vec<Result<ImportedDevice, Error>> {
        let futs = rows
            .iter()
            .map(|row| self.client.post(ApiSurface::Stable, IMPORTED, token, row));
        join_all(futs).await
    }

    /// List upload records with their import progress.
    pub async fn import_status(&self, token: &SecretString) -> Result<Vec<ImportedDevice>, Error> {
        self.client
            .get_all(
                ApiSurface::Stable,
                &format!("{IMPORTED}?$select=id,serialNumber,importedDateTime,state"),
                token,
            )
            .await
    }

    /// Remove an upload record (not the registered identity).
    pub async fn delete_imported(&self, token: &SecretString, id: &str) -> Result<(), Error> {
        self.client
            .delete(ApiSurface::Stable, &format!("{IMPORTED}/{id}"), token)
            .await
    }
}
