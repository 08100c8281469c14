// Directory-system operation set (device objects and groups).

use std::sync::Arc;

use secrecy::SecretString;

use crate::client::{ApiSurface, GraphClient};
use crate::types::{DirectoryDevice, DirectoryGroup, MemberRef};
use crate::Error;

const DEVICES: &str = "devices";
const GROUPS: &str = "groups";

const LIST_SELECT: &str = "$select=id,displayName,operatingSystem,operatingSystemVersion,\
approximateLastSignInDateTime,accountEnabled,deviceId";

/// Operations on directory device objects and group membership.
#[derive(Clone)]
pub struct DirectoryOps {
    client: Arc<GraphClient>,
}

impl DirectoryOps {
    pub fn new(client: Arc<GraphClient>) -> Self {
        Self { client }
    }

    /// List every directory device object (all pages, projected).
    pub async fn list_devices(&self, token: &SecretString) -> Result<Vec<DirectoryDevice>, Error> {
        self.client
            .get_all(ApiSurface::Stable, &format!("{DEVICES}?{LIST_SELECT}"), token)
            .await
    }

    /// Delete a directory device object by its object id.
    pub async fn delete_device(&self, token: &SecretString, object_id: &str) -> Result<(), Error> {
        self.client
            .delete(ApiSurface::Stable, &format!("{DEVICES}/{object_id}"), token)
            .await
    }

    /// Fetch a directory group by id.
    pub async fn get_group(&self, token: &SecretString, group_id: &str) -> Result<DirectoryGroup, Error> {
        self.client
            .get(ApiSurface::Stable, &format!("{GROUPS}/{group_id}"), token)
            .await
    }

    /// Add a directory object to a group.
    ///
    /// The target must already be queryable in the directory; adding a
    /// freshly synced device can race propagation and fail with a
    /// "does not exist" condition the caller is expected to retry.
    pub async fn add_group_member(
        &self,
        token: &SecretString,
        group_id: &str,
        directory_object_id: &str,
    ) -> Result<(), Error> {
        let target = self
            .client
            .endpoint_url(ApiSurface::Stable, &format!("directoryObjects/{directory_object_id}"))?;
        let body = MemberRef {
            odata_id: target.to_string(),
        };
        self.client
            .post_no_response(
                ApiSurface::Stable,
                &format!("{GROUPS}/{group_id}/members/$ref"),
                token,
                &body,
            )
            .await
    }
}
