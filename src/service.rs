//! Content service abstraction.
//!
//! The renderer only ever talks to a [`ContentService`]; the Notion REST
//! client is one implementation, tests use an in-memory one.

use crate::blocks::{Block, CatalogFilter, DocumentRecord};
use crate::error::ServiceError;

/// Read-only access to the block tree and the project catalog.
#[async_trait::async_trait]
pub trait ContentService: Send + Sync {
    /// Immediate children of a block or page, in document order.
    async fn fetch_children(&self, node_id: &str) -> Result<Vec<Block>, ServiceError>;

    /// A single document (page) record.
    async fn fetch_document(&self, document_id: &str) -> Result<DocumentRecord, ServiceError>;

    /// Catalog entries matching `filter`. No match is an empty list, not an error.
    async fn query_catalog(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<DocumentRecord>, ServiceError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted in-memory service.

    use super::*;
    use crate::blocks::{FEATURED_PROPERTY, URL_PROPERTY};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    pub struct FakeService {
        children: HashMap<String, Result<Vec<Block>, ServiceError>>,
        documents: HashMap<String, Result<DocumentRecord, ServiceError>>,
        catalog: Vec<DocumentRecord>,
        catalog_error: Option<ServiceError>,
        slow: HashMap<String, Duration>,
        slow_documents: HashMap<String, Duration>,
        slow_catalog: Option<Duration>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_children(mut self, id: &str, blocks: Vec<Block>) -> Self {
            self.children.insert(id.to_string(), Ok(blocks));
            self
        }

        pub fn with_children_error(mut self, id: &str, err: ServiceError) -> Self {
            self.children.insert(id.to_string(), Err(err));
            self
        }

        pub fn with_document(mut self, record: DocumentRecord) -> Self {
            self.documents.insert(record.id.clone(), Ok(record));
            self
        }

        pub fn with_document_error(mut self, id: &str, err: ServiceError) -> Self {
            self.documents.insert(id.to_string(), Err(err));
            self
        }

        pub fn with_catalog(mut self, records: Vec<DocumentRecord>) -> Self {
            self.catalog = records;
            self
        }

        pub fn with_catalog_error(mut self, err: ServiceError) -> Self {
            self.catalog_error = Some(err);
            self
        }

        /// Delay `fetch_children(id)` by `delay`.
        pub fn with_slow_children(mut self, id: &str, delay: Duration) -> Self {
            self.slow.insert(id.to_string(), delay);
            self
        }

        /// Delay `fetch_document(id)` by `delay`.
        pub fn with_slow_document(mut self, id: &str, delay: Duration) -> Self {
            self.slow_documents.insert(id.to_string(), delay);
            self
        }

        /// Delay every `query_catalog` by `delay`.
        pub fn with_slow_catalog(mut self, delay: Duration) -> Self {
            self.slow_catalog = Some(delay);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait::async_trait]
    impl ContentService for FakeService {
        async fn fetch_children(&self, node_id: &str) -> Result<Vec<Block>, ServiceError> {
            self.record(format!("children:{}", node_id));
            if let Some(delay) = self.slow.get(node_id) {
                tokio::time::sleep(*delay).await;
            }
            self.children
                .get(node_id)
                .cloned()
                .unwrap_or_else(|| {
                    Err(ServiceError::NotFound {
                        resource: "block",
                        id: node_id.to_string(),
                    })
                })
        }

        async fn fetch_document(
            &self,
            document_id: &str,
        ) -> Result<DocumentRecord, ServiceError> {
            self.record(format!("document:{}", document_id));
            if let Some(delay) = self.slow_documents.get(document_id) {
                tokio::time::sleep(*delay).await;
            }
            self.documents
                .get(document_id)
                .cloned()
                .unwrap_or_else(|| {
                    Err(ServiceError::NotFound {
                        resource: "page",
                        id: document_id.to_string(),
                    })
                })
        }

        async fn query_catalog(
            &self,
            filter: &CatalogFilter,
        ) -> Result<Vec<DocumentRecord>, ServiceError> {
            self.record(format!("catalog:{:?}", filter));
            if let Some(delay) = self.slow_catalog {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = &self.catalog_error {
                return Err(err.clone());
            }
            let matches = self
                .catalog
                .iter()
                .filter(|record| match filter {
                    CatalogFilter::All => true,
                    CatalogFilter::TextEquals { property, value } => {
                        property == URL_PROPERTY && record.url.as_deref() == Some(value.as_str())
                    }
                    CatalogFilter::CheckboxEquals { property, value } => {
                        property == FEATURED_PROPERTY && record.featured == *value
                    }
                })
                .cloned()
                .collect();
            Ok(matches)
        }
    }
}
