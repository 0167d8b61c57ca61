//! Cross-page link resolution.
//!
//! A link block names another page by id. The page itself supplies the title;
//! the catalog decides whether the link points at a project, in which case the
//! project's public URL replaces the title-derived slug.

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::{debug, error, warn};

use crate::blocks::{slugify, CatalogFilter, URL_PROPERTY};
use crate::error::ServiceError;
use crate::renderer::Renderer;

pub const BROKEN_LINK_HTML: &str = "<h4>Link Quebrado</h4>";
pub const PROJECTS_PREFIX: &str = "projetos";
const DEFAULT_LINK_TITLE: &str = "Link";

/// Where a link block ends up pointing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub title: String,
    /// Site path without the leading slash.
    pub path: String,
}

impl Renderer {
    /// Render a link block, or [`BROKEN_LINK_HTML`] when the target can't be resolved.
    pub async fn resolve_link(&self, target_id: &str) -> String {
        match self.lookup_link(target_id).await {
            Ok(target) => format!(
                "<h4><a href=\"/{}\">{}</a></h4>",
                encode_double_quoted_attribute(&target.path),
                encode_text(&target.title)
            ),
            Err(e) if e.is_not_found() => {
                warn!("Link target {} does not exist: {}", target_id, e);
                BROKEN_LINK_HTML.to_string()
            }
            Err(e) => {
                error!("Failed to resolve link to {}: {}", target_id, e);
                BROKEN_LINK_HTML.to_string()
            }
        }
    }

    pub async fn lookup_link(&self, target_id: &str) -> Result<LinkTarget, ServiceError> {
        let page = self.bounded(self.service.fetch_document(target_id)).await?;
        let title = page
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_LINK_TITLE.to_string());

        let filter = CatalogFilter::text_equals(URL_PROPERTY, page.slug());
        let projects = self.bounded(self.service.query_catalog(&filter)).await?;

        let path = match projects.first() {
            Some(project) => {
                debug!("Link {} resolves to project {}", target_id, project.id);
                format!("{}/{}", PROJECTS_PREFIX, project.slug())
            }
            None => slugify(&title),
        };

        Ok(LinkTarget { title, path })
    }
}
