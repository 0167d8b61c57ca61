//! Synced block expansion.

use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

use crate::renderer::{RenderScope, Renderer};

impl Renderer {
    /// Render the children of `source_id` in place of a synced block.
    ///
    /// Any failure (missing source, transport error, cycle, depth limit)
    /// contributes nothing to the page. Boxed because it re-enters
    /// [`Renderer::render_blocks`].
    pub fn resolve_sync<'a>(
        &'a self,
        source_id: &'a str,
        scope: &'a RenderScope,
    ) -> Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        Box::pin(async move {
            let inner = match scope.descend(source_id, self.options.max_depth) {
                Ok(inner) => inner,
                Err(e) => {
                    warn!("Skipping synced content from {}: {}", source_id, e);
                    return String::new();
                }
            };

            match self.bounded(self.service.fetch_children(source_id)).await {
                Ok(children) => {
                    debug!("Expanding {} synced blocks from {}", children.len(), source_id);
                    self.render_blocks(&children, &inner).await
                }
                Err(e) => {
                    warn!("Failed to fetch synced content from {}: {}", source_id, e);
                    String::new()
                }
            }
        })
    }
}
