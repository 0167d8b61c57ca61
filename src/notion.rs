//! Notion REST API client implementing [`ContentService`].

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use crate::blocks::{
    Block, BlockKind, CatalogFilter, DocumentRecord, ImageSource, TextRun, FEATURED_PROPERTY,
    URL_PROPERTY,
};
use crate::error::ServiceError;
use crate::service::ContentService;

const PAGE_SIZE: u32 = 100;

/// Connection settings for the Notion API.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_url: String,
    pub version: String,
    pub token: String,
    /// Project catalog database.
    pub database_id: String,
    pub timeout: Duration,
}

/// Notion client for blocks, pages and the project database.
#[derive(Clone)]
pub struct NotionClient {
    client: Client,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ServiceError::transport)?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.version)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &'static str,
        id: &str,
    ) -> Result<T, ServiceError> {
        let resp = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound {
                resource,
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Transport(format!(
                "Notion API error ({}) for {} {}: {}",
                status, resource, id, text
            )));
        }

        let body = resp.text().await.map_err(|e| self.request_error(e))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn request_error(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.config.timeout)
        } else {
            ServiceError::transport(err)
        }
    }
}

#[async_trait::async_trait]
impl ContentService for NotionClient {
    async fn fetch_children(&self, node_id: &str) -> Result<Vec<Block>, ServiceError> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let mut query = vec![("page_size", PAGE_SIZE.to_string())];
            if let Some(c) = &cursor {
                query.push(("start_cursor", c.clone()));
            }
            let request = self
                .client
                .get(self.url(&format!("blocks/{}/children", node_id)))
                .query(&query);
            let page: ListResponse<RawBlock> = self.send(request, "block", node_id).await?;

            blocks.extend(page.results.into_iter().map(RawBlock::into_block));

            match advance(&mut seen, page.has_more, page.next_cursor, node_id) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!("Fetched {} children of {}", blocks.len(), node_id);
        Ok(blocks)
    }

    async fn fetch_document(&self, document_id: &str) -> Result<DocumentRecord, ServiceError> {
        let request = self.client.get(self.url(&format!("pages/{}", document_id)));
        let page: RawPage = self.send(request, "page", document_id).await?;
        debug!("Fetched page {}", document_id);
        Ok(page.into_record())
    }

    async fn query_catalog(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<DocumentRecord>, ServiceError> {
        let database_id = &self.config.database_id;
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let body = QueryRequest {
                filter: filter_json(filter),
                start_cursor: cursor.take(),
                page_size: PAGE_SIZE,
            };
            let request = self
                .client
                .post(self.url(&format!("databases/{}/query", database_id)))
                .json(&body);
            let page: ListResponse<RawPage> = self.send(request, "database", database_id).await?;

            records.extend(page.results.into_iter().map(RawPage::into_record));

            match advance(&mut seen, page.has_more, page.next_cursor, database_id) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!("Catalog query {:?} matched {} records", filter, records.len());
        Ok(records)
    }
}

/// Cursor for the next page of a listing, or `None` when it is complete.
/// A cursor the API already handed out ends the listing.
fn advance(
    seen: &mut HashSet<String>,
    has_more: bool,
    next_cursor: Option<String>,
    listing: &str,
) -> Option<String> {
    match (has_more, next_cursor) {
        (true, Some(next)) if seen.insert(next.clone()) => Some(next),
        (true, Some(next)) => {
            warn!("Cursor {} repeated while listing {}; stopping", next, listing);
            None
        }
        _ => None,
    }
}

fn filter_json(filter: &CatalogFilter) -> Option<Value> {
    match filter {
        CatalogFilter::All => None,
        CatalogFilter::TextEquals { property, value } => Some(json!({
            "property": property,
            "rich_text": { "equals": value },
        })),
        CatalogFilter::CheckboxEquals { property, value } => Some(json!({
            "property": property,
            "checkbox": { "equals": value },
        })),
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct QueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<String>,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    results: Vec<T>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RichTextObject {
    #[serde(default)]
    plain_text: String,
    href: Option<String>,
}

impl From<RichTextObject> for TextRun {
    fn from(rt: RichTextObject) -> Self {
        TextRun {
            text: rt.plain_text,
            href: rt.href,
        }
    }
}

fn runs(rich_text: Vec<RichTextObject>) -> Vec<TextRun> {
    rich_text.into_iter().map(TextRun::from).collect()
}

/// A block as returned by the API. The payload lives under a key named
/// after the block's own `type`.
#[derive(Debug, Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RichTextPayload {
    #[serde(default)]
    rich_text: Vec<RichTextObject>,
}

#[derive(Debug, Deserialize)]
struct UrlObject {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ImagePayload {
    file: Option<UrlObject>,
    external: Option<UrlObject>,
}

#[derive(Debug, Deserialize)]
struct ChildPagePayload {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SyncedPayload {
    synced_from: Option<SyncedFrom>,
}

#[derive(Debug, Deserialize)]
struct SyncedFrom {
    block_id: String,
}

#[derive(Debug, Deserialize)]
struct LinkToPagePayload {
    page_id: String,
}

impl RawBlock {
    fn into_block(mut self) -> Block {
        let payload = self.rest.remove(&self.block_type).unwrap_or(Value::Null);
        let kind = match decode_kind(&self.block_type, payload) {
            Ok(kind) => kind,
            Err(e) => {
                warn!(
                    "Malformed {} block {}: {}; treating as unsupported",
                    self.block_type, self.id, e
                );
                BlockKind::Unsupported {
                    kind: self.block_type.clone(),
                }
            }
        };

        Block {
            id: self.id,
            has_children: self.has_children,
            kind,
        }
    }
}

fn decode_kind(block_type: &str, payload: Value) -> Result<BlockKind, serde_json::Error> {
    fn payload_as<T: DeserializeOwned>(payload: Value) -> Result<T, serde_json::Error> {
        serde_json::from_value(payload)
    }

    let kind = match block_type {
        "paragraph" => BlockKind::Paragraph {
            rich_text: runs(payload_as::<RichTextPayload>(payload)?.rich_text),
        },
        "heading_1" => BlockKind::Heading1 {
            rich_text: runs(payload_as::<RichTextPayload>(payload)?.rich_text),
        },
        "heading_2" => BlockKind::Heading2 {
            rich_text: runs(payload_as::<RichTextPayload>(payload)?.rich_text),
        },
        "image" => {
            let image: ImagePayload = payload_as(payload)?;
            let source = match (image.file, image.external) {
                (Some(file), _) => Some(ImageSource::Hosted(file.url)),
                (None, Some(external)) => Some(ImageSource::External(external.url)),
                (None, None) => None,
            };
            BlockKind::Image { source }
        }
        "toggle" => BlockKind::Toggle {
            rich_text: runs(payload_as::<RichTextPayload>(payload)?.rich_text),
        },
        "child_database" => BlockKind::EmbeddedCollection,
        "child_page" => BlockKind::ChildPageStub {
            title: payload_as::<ChildPagePayload>(payload)?.title,
        },
        "synced_block" => BlockKind::SyncMirror {
            source_node_id: payload_as::<SyncedPayload>(payload)?
                .synced_from
                .map(|from| from.block_id),
        },
        "link_to_page" => BlockKind::CrossDocLink {
            target_document_id: payload_as::<LinkToPagePayload>(payload)?.page_id,
        },
        other => BlockKind::Unsupported {
            kind: other.to_string(),
        },
    };
    Ok(kind)
}

#[derive(Debug, Deserialize)]
struct RawPage {
    id: String,
    #[serde(default)]
    properties: HashMap<String, PropertyValue>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PropertyValue {
    Title {
        title: Vec<RichTextObject>,
    },
    RichText {
        rich_text: Vec<RichTextObject>,
    },
    Number {
        number: Option<f64>,
    },
    Select {
        select: Option<SelectOption>,
    },
    Checkbox {
        checkbox: bool,
    },
    Files {
        files: Vec<FileObject>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct SelectOption {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    file: Option<UrlObject>,
    external: Option<UrlObject>,
}

fn first_text(rich_text: &[RichTextObject]) -> Option<String> {
    rich_text
        .first()
        .map(|rt| rt.plain_text.clone())
        .filter(|s| !s.is_empty())
}

impl RawPage {
    fn into_record(self) -> DocumentRecord {
        // Every page has exactly one title-typed property; its name varies
        // ("title" for loose pages, "Name"/"Nome" for database rows).
        let title = self.properties.values().find_map(|p| match p {
            PropertyValue::Title { title } => first_text(title),
            _ => None,
        });
        let url = match self.properties.get(URL_PROPERTY) {
            Some(PropertyValue::RichText { rich_text }) => first_text(rich_text),
            _ => None,
        };
        let kind = match self.properties.get("Tipo") {
            Some(PropertyValue::Select { select: Some(opt) }) => Some(opt.name.clone()),
            _ => None,
        };
        let year = match self.properties.get("Ano") {
            Some(PropertyValue::Number { number: Some(n) }) => Some(n.trunc() as i64),
            _ => None,
        };
        let cover_url = match self.properties.get("Capa") {
            Some(PropertyValue::Files { files }) => files.first().and_then(|f| {
                f.file
                    .as_ref()
                    .or(f.external.as_ref())
                    .map(|u| u.url.clone())
            }),
            _ => None,
        };
        let featured = matches!(
            self.properties.get(FEATURED_PROPERTY),
            Some(PropertyValue::Checkbox { checkbox: true })
        );

        DocumentRecord {
            id: self.id,
            title,
            url,
            kind,
            year,
            cover_url,
            featured,
        }
    }
}
