//! Alerts sub-client: server-side alert feed.

use crate::client::ChartdeskClient;
use crate::error::SdkError;

/// Sub-client for the backend's alert list.
pub struct Alerts<'a> {
    pub(crate) client: &'a ChartdeskClient,
}

impl<'a> Alerts<'a> {
    /// Alert lines (`"<symbol> signal: <type> at <time>"`) for the current user.
    ///
    /// A non-array body is treated as "no alerts"; non-string entries are skipped.
    pub async fn list(&self) -> Result<Vec<String>, SdkError> {
        let value = self.client.http.get_alerts(None).await?;
        let Some(items) = value.as_array() else {
            tracing::debug!("Alerts endpoint returned a non-array body");
            return Ok(Vec::new());
        };
        Ok(items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect())
    }
}
