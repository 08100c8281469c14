// Management-system operation set (enrolled devices).
//
// Unlike the registration system, deletion here takes effect
// synchronously -- but cross-referenced lookups in the other systems
// may lag behind it.

use std::sync::Arc;

use secrecy::SecretString;

use crate::client::{ApiSurface, GraphClient};
use crate::types::ManagedDevice;
use crate::Error;

const MANAGED: &str = "deviceManagement/managedDevices";

/// Projection used for listings; bounds payload size per page.
const LIST_SELECT: &str = "$select=id,deviceName,userPrincipalName,operatingSystem,\
complianceState,lastSyncDateTime,serialNumber,managedDeviceOwnerType,azureADDeviceId";

/// Operations on management-system device records.
#[derive(Clone)]
pub struct IntuneOps {
    client: Arc<GraphClient>,
}

impl IntuneOps {
    pub fn new(client: Arc<GraphClient>) -> Self {
        Self { client }
    }

    /// List every managed device (all pages, projected).
    pub async fn list(&self, token: &SecretString) -> Result<Vec<ManagedDevice>, Error> {
        self.client
            .get_all(ApiSurface::Stable, &format!("{MANAGED}?{LIST_SELECT}"), token)
            .await
    }

    /// Fetch a single managed device by id (full shape, no projection).
    pub async fn get(&self, token: &SecretString, id: &str) -> Result<ManagedDevice, Error> {
        self.client
            .get(ApiSurface::Stable, &format!("{MANAGED}/{id}"), token)
            .await
    }

    /// Delete a managed device. Takes effect synchronously.
    pub async fn delete(&self, token: &SecretString, id: &str) -> Result<(), Error> {
        self.client
            .delete(ApiSurface::Stable, &format!("{MANAGED}/{id}"), token)
            .await
    }
}
