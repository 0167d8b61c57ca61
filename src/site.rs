//! HTTP routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::blocks::{CatalogFilter, FEATURED_PROPERTY, URL_PROPERTY};
use crate::layout;
use crate::renderer::Renderer;
use crate::service::ContentService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn ContentService>,
    pub renderer: Arc<Renderer>,
    pub about_page_id: Option<String>,
    pub contact_page_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(home))
        .route("/projetos", get(projects))
        .route("/projetos/:slug", get(project))
        .route("/sobre", get(about))
        .route("/contato", get(contact))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn error_page(status: StatusCode, title: &str, message: &str) -> Response {
    let body = format!("<h1>{}</h1>", html_escape::encode_text(message));
    (status, Html(layout::page(title, &body))).into_response()
}

/// Featured projects carousel.
async fn home(State(state): State<AppState>) -> Response {
    let filter = CatalogFilter::checkbox(FEATURED_PROPERTY, true);
    match state.renderer.bounded(state.service.query_catalog(&filter)).await {
        Ok(records) => {
            info!("Home: {} featured projects", records.len());
            Html(layout::page("Home - 0e1", &layout::carousel(&records))).into_response()
        }
        Err(e) => {
            error!("Failed to load featured projects: {}", e);
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro no Servidor",
                "Erro ao carregar os projetos.",
            )
        }
    }
}

#[derive(serde::Deserialize)]
struct ProjectsQuery {
    filter: Option<String>,
}

/// Project index with kind filter.
async fn projects(State(state): State<AppState>, Query(query): Query<ProjectsQuery>) -> Response {
    let records = match state
        .renderer
        .bounded(state.service.query_catalog(&CatalogFilter::All))
        .await
    {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to list projects: {}", e);
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro no Servidor",
                "Erro ao carregar os projetos.",
            );
        }
    };

    // The menu always offers every kind, whatever is selected.
    let menu = layout::filter_menu(&records);
    let shown = layout::filter_by_kind(records, query.filter.as_deref());
    let body = format!("<h1>Projetos</h1>{}{}", menu, layout::card_grid(&shown));

    Html(layout::page("Projetos - 0e1", &body)).into_response()
}

/// A single project page, looked up by its public slug.
async fn project(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let filter = CatalogFilter::text_equals(URL_PROPERTY, slug.as_str());
    let record = match state.renderer.bounded(state.service.query_catalog(&filter)).await {
        Ok(records) => match records.into_iter().next() {
            Some(record) => record,
            None => {
                info!("No project with slug {}", slug);
                return error_page(
                    StatusCode::NOT_FOUND,
                    "404 - Projeto não encontrado",
                    "Projeto não encontrado.",
                );
            }
        },
        Err(e) => {
            error!("Failed to look up project {}: {}", slug, e);
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro no Servidor",
                "Erro ao carregar o projeto.",
            );
        }
    };

    let title = record
        .title
        .clone()
        .unwrap_or_else(|| "Detalhes do Projeto".to_string());
    let content = state.renderer.render_tree(&record.id).await;

    Html(layout::page(&title, &layout::titled(&title, &content))).into_response()
}

async fn content_page(state: &AppState, page_id: Option<&str>, title: &str) -> Response {
    let Some(page_id) = page_id else {
        return error_page(StatusCode::NOT_FOUND, title, "Página não configurada.");
    };
    let content = state.renderer.render_tree(page_id).await;
    Html(layout::page(
        &format!("{} - 0e1", title),
        &layout::titled(title, &content),
    ))
    .into_response()
}

async fn about(State(state): State<AppState>) -> Response {
    content_page(&state, state.about_page_id.as_deref(), "Sobre").await
}

async fn contact(State(state): State<AppState>) -> Response {
    content_page(&state, state.contact_page_id.as_deref(), "Contato").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Block, BlockKind, DocumentRecord, TextRun};
    use crate::renderer::{RenderOptions, LOAD_ERROR_HTML};
    use crate::service::testing::FakeService;

    fn state(service: FakeService) -> AppState {
        let service: Arc<dyn ContentService> = Arc::new(service);
        AppState {
            renderer: Arc::new(Renderer::new(service.clone(), RenderOptions::default())),
            service,
            about_page_id: Some("about".to_string()),
            contact_page_id: None,
        }
    }

    async fn body_of(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn project_record(id: &str, title: &str, url: &str, kind: &str) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            kind: Some(kind.to_string()),
            featured: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_project_page_renders_tree() {
        let service = FakeService::new()
            .with_catalog(vec![project_record("p1", "Casa Alpha", "alpha", "Residencial")])
            .with_children(
                "p1",
                vec![Block::new(
                    "b",
                    BlockKind::Paragraph {
                        rich_text: vec![TextRun::plain("Memorial")],
                    },
                )],
            );

        let (status, html) = body_of(project(State(state(service)), Path("alpha".to_string())).await).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<h1>Casa Alpha</h1><hr><p>Memorial</p>"));
    }

    #[tokio::test]
    async fn test_unknown_project_is_404() {
        let (status, html) =
            body_of(project(State(state(FakeService::new())), Path("nope".to_string())).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Projeto não encontrado."));
    }

    #[tokio::test]
    async fn test_catalog_failure_is_500() {
        let service = FakeService::new().with_catalog_error(crate::error::ServiceError::transport("down"));
        let (status, _) = body_of(project(State(state(service)), Path("alpha".to_string())).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_slow_catalog_is_500() {
        let service: Arc<dyn ContentService> = Arc::new(
            FakeService::new().with_slow_catalog(std::time::Duration::from_millis(300)),
        );
        let options = RenderOptions {
            fetch_timeout: std::time::Duration::from_millis(30),
            ..RenderOptions::default()
        };
        let app = AppState {
            renderer: Arc::new(Renderer::new(service.clone(), options)),
            service,
            about_page_id: None,
            contact_page_id: None,
        };

        let (status, _) = body_of(home(State(app)).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_projects_filter() {
        let service = FakeService::new().with_catalog(vec![
            project_record("a", "Casa A", "a", "Residencial"),
            project_record("b", "Loja B", "b", "Comercial"),
        ]);
        let query = ProjectsQuery {
            filter: Some("Comercial".to_string()),
        };

        let (status, html) = body_of(projects(State(state(service)), Query(query)).await).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Loja B"));
        assert!(!html.contains("<h3>Casa A</h3>"));
        assert!(html.contains("filter=Residencial"));
    }

    #[tokio::test]
    async fn test_content_pages() {
        let service = FakeService::new();
        let app = state(service);

        // root fetch fails -> fixed fragment inside a normal page
        let (status, html) = body_of(about(State(app.clone())).await).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(LOAD_ERROR_HTML));

        let (status, _) = body_of(contact(State(app)).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_home_lists_featured() {
        let mut hidden = project_record("b", "Loja B", "b", "Comercial");
        hidden.featured = false;
        let service = FakeService::new()
            .with_catalog(vec![project_record("a", "Casa A", "a", "Residencial"), hidden]);

        let (_, html) = body_of(home(State(state(service))).await).await;
        assert!(html.contains(r#"href="/projetos/a""#));
        assert!(!html.contains(r#"href="/projetos/b""#));
    }
}
