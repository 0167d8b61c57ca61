//! Block tree to HTML.
//!
//! [`Renderer::render_tree`] is the only entry point callers need: it fetches a
//! page's blocks and renders them in document order, and always returns
//! markup. Failures below the root are absorbed where they happen (see
//! `synced` and `links`); a failed root fetch yields [`LOAD_ERROR_HTML`].

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::blocks::{slugify, Block, BlockKind};
use crate::error::ServiceError;
use crate::rich_text;
use crate::service::ContentService;

pub const LOAD_ERROR_HTML: &str = "<h1>Erro ao carregar o conteúdo.</h1>";
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400";
pub const EMBEDDED_COLLECTION_HTML: &str =
    "<p>[Conteúdo de base de dados embutida. Requer uma requisição separada para ser exibido.]</p>";

/// Tunables for a [`Renderer`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Upper bound on every content-service call.
    pub fetch_timeout: Duration,
    /// Maximum number of nested synced-block hops.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            max_depth: 8,
        }
    }
}

/// Blocks currently being expanded on the path from the page root.
#[derive(Debug, Clone, Default)]
pub struct RenderScope {
    ancestors: Vec<String>,
    depth: usize,
}

impl RenderScope {
    pub fn root(root_id: &str) -> Self {
        Self {
            ancestors: vec![root_id.to_string()],
            depth: 0,
        }
    }

    /// Scope for expanding `node_id` below this one.
    pub fn descend(&self, node_id: &str, max_depth: usize) -> Result<Self, ServiceError> {
        if self.ancestors.iter().any(|a| a == node_id) {
            return Err(ServiceError::Cycle {
                node_id: node_id.to_string(),
            });
        }
        if self.depth >= max_depth {
            return Err(ServiceError::DepthExceeded {
                node_id: node_id.to_string(),
                max_depth,
            });
        }

        let mut ancestors = self.ancestors.clone();
        ancestors.push(node_id.to_string());
        Ok(Self {
            ancestors,
            depth: self.depth + 1,
        })
    }
}

/// Renders content-service block trees to HTML.
pub struct Renderer {
    pub(crate) service: Arc<dyn ContentService>,
    pub(crate) options: RenderOptions,
    unsupported: AtomicUsize,
}

impl Renderer {
    pub fn new(service: Arc<dyn ContentService>, options: RenderOptions) -> Self {
        Self {
            service,
            options,
            unsupported: AtomicUsize::new(0),
        }
    }

    /// Number of unsupported blocks skipped since startup.
    pub fn unsupported_count(&self) -> usize {
        self.unsupported.load(Ordering::Relaxed)
    }

    /// Render every child of `root_id`. Never fails.
    pub async fn render_tree(&self, root_id: &str) -> String {
        info!("Rendering page {}", root_id);

        let blocks = match self.bounded(self.service.fetch_children(root_id)).await {
            Ok(blocks) => blocks,
            Err(e) => {
                error!("Failed to load page {}: {}", root_id, e);
                return LOAD_ERROR_HTML.to_string();
            }
        };

        let html = self.render_blocks(&blocks, &RenderScope::root(root_id)).await;
        info!(
            "Rendered page {} ({} blocks, {} chars, {} unsupported skipped since startup)",
            root_id,
            blocks.len(),
            html.len(),
            self.unsupported_count()
        );
        html
    }

    /// Render sibling blocks sequentially, preserving document order.
    pub async fn render_blocks(&self, blocks: &[Block], scope: &RenderScope) -> String {
        let mut html = String::new();
        for block in blocks {
            let fragment = match &block.kind {
                // An original synced block holds its content as children.
                BlockKind::SyncMirror {
                    source_node_id: None,
                } if block.has_children => self.resolve_sync(&block.id, scope).await,
                _ => self.render_block(block, scope).await,
            };
            html.push_str(&fragment);
        }
        html
    }

    /// Render a single block.
    pub async fn render_block(&self, block: &Block, scope: &RenderScope) -> String {
        debug!("Rendering {} block {}", block.kind.tag(), block.id);
        match &block.kind {
            BlockKind::Paragraph { rich_text } => {
                format!("<p>{}</p>", rich_text::format(rich_text))
            }
            BlockKind::Heading1 { rich_text } => {
                format!("<h1>{}</h1>", rich_text::format(rich_text))
            }
            BlockKind::Heading2 { rich_text } => {
                format!("<h2>{}</h2>", rich_text::format(rich_text))
            }
            BlockKind::Image { source } => {
                let src = source
                    .as_ref()
                    .map(|s| s.url())
                    .unwrap_or(PLACEHOLDER_IMAGE_URL);
                format!(
                    "<img src=\"{}\" alt=\"Imagem do Notion\" style=\"max-width: 100%; height: auto;\">",
                    encode_double_quoted_attribute(src)
                )
            }
            // Summary only; the hidden children are not fetched.
            BlockKind::Toggle { rich_text } => format!(
                "<details><summary><h3>{}</h3></summary></details>",
                rich_text::format(rich_text)
            ),
            BlockKind::EmbeddedCollection => EMBEDDED_COLLECTION_HTML.to_string(),
            BlockKind::ChildPageStub { title } => format!(
                "<h4><a href=\"/{}\">{}</a></h4>",
                encode_double_quoted_attribute(&slugify(title)),
                encode_text(title)
            ),
            BlockKind::SyncMirror {
                source_node_id: Some(source_id),
            } => self.resolve_sync(source_id, scope).await,
            BlockKind::SyncMirror {
                source_node_id: None,
            } => String::new(),
            BlockKind::CrossDocLink { target_document_id } => {
                self.resolve_link(target_document_id).await
            }
            BlockKind::Unsupported { kind } => {
                self.unsupported.fetch_add(1, Ordering::Relaxed);
                warn!("Unsupported block type {} ({}), skipping", kind, block.id);
                String::new()
            }
        }
    }

    /// Run a content-service call under the configured timeout.
    pub(crate) async fn bounded<T, F>(&self, call: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        let limit = self.options.fetch_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => {
                debug!("Content service call exceeded {:?}", limit);
                Err(ServiceError::Timeout(limit))
            }
        }
    }
}
