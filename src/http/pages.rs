//! Course page catalog.
//!
//! The real pages are interactive chart playgrounds. Here each section and
//! tab renders a placeholder so that the gate has a page render to guard and
//! navigation events to observe.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::SessionHandle;

#[derive(Debug)]
pub struct Tab {
    pub slug: &'static str,
    pub title: &'static str,
}

#[derive(Debug)]
pub struct Section {
    pub slug: &'static str,
    pub title: &'static str,
    pub tabs: &'static [Tab],
}

impl Section {
    pub fn tab(&self, slug: &str) -> Option<&'static Tab> {
        self.tabs.iter().find(|t| t.slug == slug)
    }
}

macro_rules! tabs {
    ($($slug:literal => $title:literal),* $(,)?) => {
        &[$(Tab { slug: $slug, title: $title }),*]
    };
}

pub static SECTIONS: &[Section] = &[
    Section {
        slug: "ecosystem",
        title: "1. Ecosystem Overview",
        tabs: tabs![
            "core" => "Core Libraries",
            "statistics" => "Statistical Libraries",
            "web" => "Web Libraries",
            "tooling" => "Tooling",
        ],
    },
    Section {
        slug: "anatomy",
        title: "2. Matplotlib Anatomy",
        tabs: tabs![
            "concepts" => "Core Concepts",
            "artists" => "Artist Hierarchy",
            "scales" => "Axis Scales",
            "backends" => "Backends",
        ],
    },
    Section {
        slug: "strokes",
        title: "3. Basic Strokes",
        tabs: tabs![
            "line2d" => "Line2D",
            "patches" => "Patches",
            "collections" => "Collections",
            "images" => "Images",
        ],
    },
    Section {
        slug: "layout",
        title: "4. Layout & Aesthetics",
        tabs: tabs![
            "subplots" => "Subplot Layout",
            "styles" => "Styles & Colors",
            "text" => "Text Styles",
            "axes" => "Axes Settings",
            "legends" => "Legends",
            "annotations" => "Annotations",
        ],
    },
    Section {
        slug: "gallery",
        title: "5. Advanced Gallery",
        tabs: &[],
    },
    Section {
        slug: "libraries",
        title: "6. Other Libraries",
        tabs: tabs![
            "seaborn" => "Seaborn",
            "plotly" => "Plotly",
            "altair" => "Altair",
            "pandas" => "Pandas Plotting",
        ],
    },
    Section {
        slug: "challenges",
        title: "7. Advanced Challenges",
        tabs: tabs![
            "layout" => "Complex Layout",
            "dual-axes" => "Dual Axes",
            "formatters" => "Tick Formatters",
            "gridspec" => "GridSpec",
            "animation" => "Animation",
        ],
    },
];

pub fn find_section(slug: &str) -> Option<&'static Section> {
    SECTIONS.iter().find(|s| s.slug == slug)
}

/// `GET /`
pub async fn index(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    note_navigation(&state, &request, "/");

    let mut body = String::from("<h2>Course Sections</h2><ul>");
    for section in SECTIONS {
        body.push_str(&format!(
            "<li><a href=\"/sections/{}\">{}</a></li>",
            section.slug, section.title
        ));
    }
    body.push_str("</ul>");

    metrics::record_page_render("index", start);
    Html(layout("Plotting Course", &body)).into_response()
}

/// `GET /sections/{section}`
pub async fn section(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let Some(section) = find_section(&slug) else {
        return not_found().into_response();
    };
    note_navigation(&state, &request, request.uri().path());

    let mut body = format!("<h2>{}</h2>", section.title);
    if section.tabs.is_empty() {
        body.push_str("<p>Select a gallery category to preview.</p>");
    } else {
        body.push_str("<nav><ul>");
        for tab in section.tabs {
            body.push_str(&format!(
                "<li><a href=\"/sections/{}/{}\">{}</a></li>",
                section.slug, tab.slug, tab.title
            ));
        }
        body.push_str("</ul></nav>");
    }

    metrics::record_page_render(section.slug, start);
    Html(layout(section.title, &body)).into_response()
}

/// `GET /sections/{section}/{tab}`
pub async fn tab(
    State(state): State<AppState>,
    Path((section_slug, tab_slug)): Path<(String, String)>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let Some((section, tab)) = find_section(&section_slug)
        .and_then(|s| s.tab(&tab_slug).map(|t| (s, t)))
    else {
        return not_found().into_response();
    };
    note_navigation(&state, &request, request.uri().path());

    let body = format!(
        "<h2>{}</h2><h3>{}</h3><div class=\"preview\">Live preview</div><pre class=\"snippet\"></pre>",
        section.title, tab.title
    );

    metrics::record_page_render(section.slug, start);
    Html(layout(tab.title, &body)).into_response()
}

/// Fallback for unknown paths.
pub async fn fallback() -> impl IntoResponse {
    not_found()
}

fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(layout("Not Found", "<h2>Page not found</h2><p><a href=\"/\">Back to course</a></p>")),
    )
}

fn layout(title: &str, body: &str) -> String {
    let mut sidebar = String::from("<aside><ul>");
    for section in SECTIONS {
        sidebar.push_str(&format!(
            "<li><a href=\"/sections/{}\">{}</a></li>",
            section.slug, section.title
        ));
    }
    sidebar.push_str("</ul></aside>");

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body>{}<main>{}</main></body></html>",
        title, sidebar, body
    )
}

/// Record a navigation event on the request's session, if it has one.
fn note_navigation(state: &AppState, request: &Request<Body>, page: &str) {
    let Some(handle) = request.extensions().get::<SessionHandle>() else {
        return;
    };
    let now = state.clock.now();
    match handle.lock() {
        Ok(mut session) => {
            if session.record_navigation(page, now) {
                tracing::debug!(page, switches = session.page_switches().len(), "Page switch");
            }
        }
        Err(e) => tracing::error!(error = %e, "Could not record navigation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_slugs_are_unique() {
        let mut slugs: Vec<&str> = SECTIONS.iter().map(|s| s.slug).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), SECTIONS.len());
    }

    #[test]
    fn test_lookup() {
        let strokes = find_section("strokes").unwrap();
        assert_eq!(strokes.tab("line2d").map(|t| t.title), Some("Line2D"));
        assert!(strokes.tab("nope").is_none());
        assert!(find_section("nope").is_none());
    }
}
