//! Page shell and catalog cards.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::collections::BTreeSet;

use crate::blocks::DocumentRecord;
use crate::links::PROJECTS_PREFIX;
use crate::renderer::PLACEHOLDER_IMAGE_URL;

/// Filter value meaning "no filter".
pub const ALL_KINDS: &str = "Todos";
const UNTITLED: &str = "Sem Título";
const UNTYPED: &str = "Sem Tipo";

const STYLE: &str = r#"
    body { font-family: sans-serif; margin: 0; padding: 0; }
    .container { max-width: 800px; margin: 0 auto; padding: 20px; }
    .nav-menu { position: fixed; right: 20px; top: 20px; }
    .nav-menu a { display: block; text-decoration: none; color: #333; margin-bottom: 10px; }
    .filter-menu a { text-decoration: none; color: #555; margin-right: 15px; }
    .card-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(250px, 1fr)); gap: 20px; }
    .card { border: 1px solid #ddd; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
    .card img { width: 100%; height: 200px; object-fit: cover; display: block; }
    .card-content { padding: 16px; }
    footer { text-align: center; margin-top: 40px; padding: 20px; border-top: 1px solid #eee; }
    .swiper { width: 100%; height: 100%; }
    .swiper-slide { text-align: center; font-size: 18px; background: #fff; display: flex; justify-content: center; align-items: center; }
    .swiper-slide a { display: block; width: 100%; height: 100%; }
    .swiper-slide img { display: block; width: 100%; height: 100%; object-fit: cover; }
"#;

/// Wrap `body` (already-rendered markup) in the site chrome.
pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swiper@8/swiper-bundle.min.css">
</head>
<body>
<div class="nav-menu">
<a href="/projetos">Projetos</a>
<a href="/sobre">Sobre</a>
<a href="/contato">Contato</a>
</div>
<div class="container">
{body}
</div>
<footer>ZERO E UM | arquitetos</footer>
<script src="https://cdn.jsdelivr.net/npm/swiper@8/swiper-bundle.min.js"></script>
<script>
new Swiper('.swiper-home-carousel', {{ loop: true, autoplay: {{ delay: 5000, disableOnInteraction: false }} }});
</script>
</body>
</html>"#,
        title = encode_text(title),
    )
}

/// `<h1>` + rule + rendered content, as used by content pages.
pub fn titled(title: &str, content: &str) -> String {
    format!("<h1>{}</h1><hr>{}", encode_text(title), content)
}

fn title_of(record: &DocumentRecord) -> &str {
    record.title.as_deref().unwrap_or(UNTITLED)
}

fn cover_of(record: &DocumentRecord) -> &str {
    record.cover_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE_URL)
}

fn project_href(record: &DocumentRecord) -> String {
    format!("/{}/{}", PROJECTS_PREFIX, record.slug())
}

/// Home page carousel of featured projects.
pub fn carousel(records: &[DocumentRecord]) -> String {
    let slides: String = records
        .iter()
        .map(|r| {
            format!(
                r#"<div class="swiper-slide"><a href="{}"><img src="{}" alt="{}"></a></div>"#,
                encode_double_quoted_attribute(&project_href(r)),
                encode_double_quoted_attribute(cover_of(r)),
                encode_double_quoted_attribute(title_of(r)),
            )
        })
        .collect();

    format!(
        r#"<div class="swiper swiper-home-carousel"><div class="swiper-wrapper">{}</div></div>"#,
        slides
    )
}

/// Menu of every project kind present in `records`, sorted.
pub fn filter_menu(records: &[DocumentRecord]) -> String {
    let kinds: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.kind.as_deref())
        .filter(|k| *k != ALL_KINDS)
        .collect();

    let mut html = format!(
        r#"<div class="filter-menu"><a href="/{0}?filter={1}">{1}</a>"#,
        PROJECTS_PREFIX, ALL_KINDS
    );
    for kind in kinds {
        html.push_str(&format!(
            r#"<a href="/{}?filter={}">{}</a>"#,
            PROJECTS_PREFIX,
            encode_double_quoted_attribute(&query_escape(kind)),
            encode_text(kind)
        ));
    }
    html.push_str("</div>");
    html
}

/// Grid of project cards.
pub fn card_grid(records: &[DocumentRecord]) -> String {
    let cards: String = records
        .iter()
        .map(|r| {
            let year = r.year.map(|y| y.to_string()).unwrap_or_default();
            format!(
                r#"<a href="{href}" style="text-decoration: none; color: inherit;"><div class="card"><img src="{img}" alt="{alt}"><div class="card-content"><h3>{title}</h3><p>{kind} • {year}</p></div></div></a>"#,
                href = encode_double_quoted_attribute(&project_href(r)),
                img = encode_double_quoted_attribute(cover_of(r)),
                alt = encode_double_quoted_attribute(title_of(r)),
                title = encode_text(title_of(r)),
                kind = encode_text(r.kind.as_deref().unwrap_or(UNTYPED)),
                year = year,
            )
        })
        .collect();

    format!(r#"<div class="card-grid">{}</div>"#, cards)
}

/// Keep records of `kind`; `None` or [`ALL_KINDS`] keeps everything.
pub fn filter_by_kind(records: Vec<DocumentRecord>, kind: Option<&str>) -> Vec<DocumentRecord> {
    match kind {
        None | Some(ALL_KINDS) => records,
        Some(kind) => records
            .into_iter()
            .filter(|r| r.kind.as_deref() == Some(kind))
            .collect(),
    }
}

fn query_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, title: &str, url: &str, kind: Option<&str>) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            kind: kind.map(str::to_string),
            year: Some(2020),
            ..Default::default()
        }
    }

    #[test]
    fn test_page_escapes_title_and_keeps_body() {
        let html = page("A <b>", "<p>ok</p>");
        assert!(html.contains("<title>A &lt;b&gt;</title>"));
        assert!(html.contains("<p>ok</p>"));
        assert!(html.contains(r#"<a href="/projetos">Projetos</a>"#));
    }

    #[test]
    fn test_card_grid() {
        let mut untitled = project("p2", "x", "beta", None);
        untitled.title = None;
        let html = card_grid(&[project("p1", "Casa Alpha", "alpha", Some("Residencial")), untitled]);

        assert!(html.contains(r#"<a href="/projetos/alpha""#));
        assert!(html.contains("<h3>Casa Alpha</h3><p>Residencial • 2020</p>"));
        assert!(html.contains("<h3>Sem Título</h3><p>Sem Tipo • 2020</p>"));
        assert!(html.contains(PLACEHOLDER_IMAGE_URL));
    }

    #[test]
    fn test_carousel_links_to_projects() {
        let html = carousel(&[project("p1", "Casa", "casa", None)]);
        assert!(html.contains(r#"<a href="/projetos/casa"><img src="https://via.placeholder.com/400" alt="Casa"></a>"#));
    }

    #[test]
    fn test_filter_menu_lists_distinct_kinds() {
        let records = vec![
            project("a", "A", "a", Some("Residencial")),
            project("b", "B", "b", Some("Comercial")),
            project("c", "C", "c", Some("Residencial")),
            project("d", "D", "d", None),
        ];
        let html = filter_menu(&records);

        assert_eq!(
            html,
            concat!(
                r#"<div class="filter-menu"><a href="/projetos?filter=Todos">Todos</a>"#,
                r#"<a href="/projetos?filter=Comercial">Comercial</a>"#,
                r#"<a href="/projetos?filter=Residencial">Residencial</a></div>"#
            )
        );
    }

    #[test]
    fn test_filter_menu_encodes_query_values() {
        let html = filter_menu(&[project("a", "A", "a", Some("Uso Misto"))]);
        assert!(html.contains(r#"href="/projetos?filter=Uso+Misto">Uso Misto</a>"#));
    }

    #[test]
    fn test_filter_by_kind() {
        let records = vec![
            project("a", "A", "a", Some("Residencial")),
            project("b", "B", "b", Some("Comercial")),
        ];

        assert_eq!(filter_by_kind(records.clone(), None).len(), 2);
        assert_eq!(filter_by_kind(records.clone(), Some(ALL_KINDS)).len(), 2);
        let only = filter_by_kind(records, Some("Comercial"));
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, "b");
    }
}
