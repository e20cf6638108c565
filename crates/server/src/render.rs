//! HTML views captured by the visual back-end.
//!
//! The built-in layout has one view per [`RenderKind`]. Setting
//! `render_server.template_path` replaces it with a template file rendered
//! against the pushed [`RenderPayload`]. Interpolated text is HTML-escaped
//! either way.

use std::path::{Path, PathBuf};

use maud::{html, Markup, PreEscaped, DOCTYPE};
use minijinja::Environment;
use tales_core::{RenderKind, RenderPayload, RenderServerConfig};
use thiserror::Error;
use tracing::{debug, info};

/// The `.html` suffix turns on minijinja's HTML auto-escaping.
const TEMPLATE_NAME: &str = "page.html";

const STYLE: &str = r#"
body { margin: 0; background: #333333; color: #f2f2f2; font-family: "Helvetica Neue", Arial, sans-serif; }
.card { box-sizing: border-box; width: 100vw; min-height: 100vh; padding: 6vh 8vw; }
.meta { color: #9a9a9a; font-size: 3vh; margin-bottom: 3vh; }
.meta .score { color: #ff8b60; margin-left: 1.5vw; }
.title { font-size: 6vh; font-weight: 600; line-height: 1.25; }
.post-title .title { font-size: 7vh; }
.body { font-size: 4.5vh; line-height: 1.45; white-space: pre-wrap; }
.comment { border-left: 0.6vw solid #ff8b60; }
"#;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read template {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Produces the page for the current payload.
#[derive(Debug, Default)]
pub struct PageRenderer {
    template: Option<TemplateFile>,
}

#[derive(Debug)]
struct TemplateFile {
    path: PathBuf,
    /// Re-read the file on every render.
    refresh: bool,
    source: String,
}

impl PageRenderer {
    /// Renderer using the built-in layout.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Renderer using the template at `path`.
    ///
    /// The file is read and parsed here so a broken template fails startup
    /// rather than the first capture.
    pub async fn from_file(path: impl Into<PathBuf>, refresh: bool) -> Result<Self, RenderError> {
        let path = path.into();
        let source = read_template(&path).await?;
        Environment::new().add_template(TEMPLATE_NAME, &source)?;
        info!(path = %path.display(), refresh, "Loaded page template");
        Ok(Self {
            template: Some(TemplateFile {
                path,
                refresh,
                source,
            }),
        })
    }

    pub async fn from_config(config: &RenderServerConfig) -> Result<Self, RenderError> {
        match &config.template_path {
            Some(path) => Self::from_file(path, config.refresh_template).await,
            None => Ok(Self::builtin()),
        }
    }

    /// Renders `payload` as a complete HTML page.
    pub async fn render(&self, payload: &RenderPayload) -> Result<String, RenderError> {
        let Some(file) = &self.template else {
            return Ok(render_builtin(payload).into_string());
        };

        if file.refresh {
            debug!(path = %file.path.display(), "Refreshing page template");
            let source = read_template(&file.path).await?;
            render_template(&source, payload)
        } else {
            render_template(&file.source, payload)
        }
    }
}

async fn read_template(path: &Path) -> Result<String, RenderError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn render_template(source: &str, payload: &RenderPayload) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, source)?;
    Ok(env.get_template(TEMPLATE_NAME)?.render(payload)?)
}

fn render_builtin(payload: &RenderPayload) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                style { (PreEscaped(STYLE)) }
            }
            body {
                div class={ "card " (payload.kind.as_str()) } {
                    (meta(payload))
                    @match payload.kind {
                        RenderKind::PostTitle => {
                            div.title { (payload.title.as_deref().unwrap_or(&payload.text)) }
                        }
                        RenderKind::PostBody => {
                            @if let Some(title) = &payload.title {
                                div.title { (title) }
                            }
                            div.body { (payload.revealed) }
                        }
                        RenderKind::Comment => {
                            div.body { (payload.revealed) }
                        }
                    }
                }
            }
        }
    }
}

fn meta(payload: &RenderPayload) -> Markup {
    html! {
        div.meta {
            span.author { (payload.author) }
            span.score { (payload.score) " points" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn payload(kind: RenderKind) -> RenderPayload {
        RenderPayload {
            kind,
            author: "op".to_string(),
            score: 120,
            title: Some("A title".to_string()),
            text: "Two.".to_string(),
            revealed: "One. Two.".to_string(),
        }
    }

    fn template_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    async fn builtin(payload: &RenderPayload) -> String {
        PageRenderer::builtin().render(payload).await.unwrap()
    }

    #[tokio::test]
    async fn test_title_page_shows_title() {
        let html = builtin(&payload(RenderKind::PostTitle)).await;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"class="card post-title""#));
        assert!(html.contains("A title"));
        assert!(html.contains("120 points"));
    }

    #[tokio::test]
    async fn test_body_page_shows_revealed_text() {
        let html = builtin(&payload(RenderKind::PostBody)).await;
        assert!(html.contains(r#"<div class="body">One. Two.</div>"#));
    }

    #[tokio::test]
    async fn test_comment_page_omits_title() {
        let html = builtin(&payload(RenderKind::Comment)).await;
        assert!(html.contains(r#"class="card comment""#));
        assert!(!html.contains("A title"));
    }

    #[tokio::test]
    async fn test_user_text_is_escaped() {
        let mut p = payload(RenderKind::Comment);
        p.revealed = "<script>alert(1)</script>".to_string();
        p.author = r#""quoted" & co"#.to_string();
        let html = builtin(&p).await;
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&quot;quoted&quot; &amp; co"));
    }

    #[tokio::test]
    async fn test_template_file_renders_payload_fields() {
        let file = template_file(
            r#"<p class="{{ kind }}">{{ author }}: {{ revealed }} ({{ score }})</p>"#,
        );
        let renderer = PageRenderer::from_file(file.path(), false).await.unwrap();

        let mut p = payload(RenderKind::Comment);
        p.revealed = "<b>bold</b> & more".to_string();
        let html = renderer.render(&p).await.unwrap();

        assert!(html.starts_with(r#"<p class="comment">op: "#));
        assert!(html.contains("&lt;b&gt;bold&lt;"));
        assert!(html.contains("&amp; more"));
        assert!(html.contains("(120)"));
        assert!(!html.contains("<b>"));
    }

    #[tokio::test]
    async fn test_template_without_refresh_keeps_loaded_source() {
        let file = template_file("first {{ author }}");
        let renderer = PageRenderer::from_file(file.path(), false).await.unwrap();
        std::fs::write(file.path(), "second {{ author }}").unwrap();

        let html = renderer.render(&payload(RenderKind::Comment)).await.unwrap();
        assert_eq!(html, "first op");
    }

    #[tokio::test]
    async fn test_template_refresh_picks_up_edits() {
        let file = template_file("first {{ author }}");
        let renderer = PageRenderer::from_file(file.path(), true).await.unwrap();
        std::fs::write(file.path(), "second {{ author }}").unwrap();

        let html = renderer.render(&payload(RenderKind::Comment)).await.unwrap();
        assert_eq!(html, "second op");
    }

    #[tokio::test]
    async fn test_broken_template_fails_to_load() {
        let file = template_file("{% if author %}unclosed");
        let result = PageRenderer::from_file(file.path(), false).await;
        assert!(matches!(result, Err(RenderError::Template(_))));
    }

    #[tokio::test]
    async fn test_missing_template_fails_to_load() {
        let result = PageRenderer::from_file("/nonexistent/page.html", false).await;
        assert!(matches!(result, Err(RenderError::Read { .. })));
    }

    #[tokio::test]
    async fn test_from_config_defaults_to_builtin() {
        let renderer = PageRenderer::from_config(&RenderServerConfig::default())
            .await
            .unwrap();
        let html = renderer.render(&payload(RenderKind::PostBody)).await.unwrap();
        assert!(html.contains(r#"class="card post-body""#));
    }
}
