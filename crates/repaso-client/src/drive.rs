//! Microsoft Graph client for reading documents out of OneDrive.

use serde::Deserialize;

use crate::ClientError;

const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// One file (or folder) listed under a drive folder.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    value: Vec<DriveItem>,
}

pub struct DriveClient {
    client: reqwest::Client,
    token: String,
}

impl DriveClient {
    pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("repaso/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            token: token.into(),
        })
    }

    /// List the items under a drive folder, e.g. `/Apuntes/Ciencias`.
    pub async fn list_children(&self, folder: &str) -> Result<Vec<DriveItem>, ClientError> {
        let url = format!(
            "{}/me/drive/root:{}:/children",
            GRAPH_BASE,
            encode_drive_path(folder)
        );
        tracing::debug!(%url, "listing drive folder");
        let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;
        if resp.status().as_u16() == 404 {
            return Err(ClientError::NotFound(folder.to_string()));
        }
        if !resp.status().is_success() {
            return Err(ClientError::Status("drive", resp.status().as_u16()));
        }
        let children: ChildrenResponse = resp.json().await?;
        Ok(children.value)
    }

    /// Download a drive item's raw content by id.
    pub async fn download(&self, item_id: &str) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}/me/drive/items/{}/content", GRAPH_BASE, item_id);
        let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;
        if resp.status().as_u16() == 404 {
            return Err(ClientError::NotFound(item_id.to_string()));
        }
        if !resp.status().is_success() {
            return Err(ClientError::Status("drive", resp.status().as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Percent-encode each segment of a drive path, keeping the slashes.
fn encode_drive_path(path: &str) -> String {
    let segments: Vec<String> = path
        .trim_matches('/')
        .split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect();
    format!("/{}", segments.join("/"))
}
