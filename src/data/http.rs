// HTTP data source - snapshots from a remote status endpoint
//
// Fetches GET {base_url}/widgets/{id} and treats the JSON body as the
// snapshot. Non-2xx responses are errors; the dispatcher turns them into
// the widget's fetch-error placeholder. No timeout is imposed here - a
// hung fetch only delays its own widget, and the engine's staleness
// tickets keep a late completion from clobbering a newer render.

use super::{DataSource, Snapshot};
use anyhow::{Context, Result};
use futures::future::BoxFuture;

pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDataSource {
    /// Create a source rooted at `base_url` (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl DataSource for HttpDataSource {
    fn fetch<'a>(&'a self, widget_id: &'a str) -> BoxFuture<'a, Result<Snapshot>> {
        Box::pin(async move {
            let url = format!("{}/widgets/{}", self.base_url, widget_id);

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("request to {url} failed"))?
                .error_for_status()
                .with_context(|| format!("snapshot endpoint for '{widget_id}' returned an error"))?;

            let snapshot = response
                .json()
                .await
                .with_context(|| format!("snapshot for '{widget_id}' is not valid JSON"))?;

            Ok(snapshot)
        })
    }
}
