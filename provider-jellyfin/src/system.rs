use async_trait::async_trait;

use core_library::{Result, ServerInfo, SystemService};

use crate::client::{decode, status_error, JellyfinClient};
use crate::dto::PublicSystemInfo;

/// The system endpoints are public; no session is needed.
#[async_trait]
impl SystemService for JellyfinClient {
    async fn ping(&self) -> Result<bool> {
        let response = self.get_public("System/Ping").await?;
        Ok(response.status().is_success())
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        let response = self.get_public("System/Info/Public").await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, None));
        }
        let info: PublicSystemInfo = response.json().await.map_err(decode)?;
        Ok(info.into_model())
    }
}
