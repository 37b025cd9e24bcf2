//! Blog server: list and post pages, JSON API, live search and live reload

mod events;
mod search;

use anyhow::Result;
use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::browse::{tag_vocabulary, Composer};
use crate::content::{ContentLoader, LoadError, MarkdownRenderer, Post};
use crate::templates::TemplateRenderer;
use crate::theme::{Theme, ThemeController};
use crate::Blog;

pub use events::{BroadcastFrame, ServerEvent};
pub use search::{SearchReply, SearchRequest, SearchSession};

type Collection = Arc<Vec<Arc<Post>>>;

/// Shared server state
pub struct AppState {
    blog: Blog,
    loader: ContentLoader,
    renderer: MarkdownRenderer,
    templates: TemplateRenderer,
    /// `None` once loading the index failed
    posts: RwLock<Option<Collection>>,
    theme: Mutex<ThemeController>,
    events: broadcast::Sender<ServerEvent>,
}

impl AppState {
    /// Load the post collection and wire the theme controller to connected pages
    pub async fn new(blog: Blog, mut theme: ThemeController) -> Result<Arc<Self>> {
        let (events, _) = broadcast::channel(16);
        theme.attach_frame(Box::new(BroadcastFrame::new(events.clone())));

        let state = Arc::new(Self {
            loader: ContentLoader::new(&blog),
            renderer: blog.markdown_renderer(),
            templates: TemplateRenderer::new(&blog.config)?,
            blog,
            posts: RwLock::new(None),
            theme: Mutex::new(theme),
            events,
        });
        state.reload_posts().await;
        Ok(state)
    }

    /// Current collection, if it loaded
    pub async fn posts(&self) -> Option<Collection> {
        self.posts.read().await.clone()
    }

    /// Re-read the post index
    pub async fn reload_posts(&self) {
        let loaded = match self.loader.load_posts().await {
            Ok(posts) => {
                tracing::info!("Loaded {} posts", posts.len());
                Some(Arc::new(posts.into_iter().map(Arc::new).collect()))
            }
            Err(e) => {
                tracing::error!("Failed to load posts: {}", e);
                None
            }
        };
        *self.posts.write().await = loaded;
    }

    async fn current_theme(&self) -> Theme {
        self.theme.lock().await.current()
    }

    async fn theme_state(&self) -> ThemeState {
        let controller = self.theme.lock().await;
        ThemeState {
            theme: controller.current(),
            saved: controller.saved(),
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.blog.base_dir);

    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/post.html", get(post_handler))
        .route("/api/posts", get(api_posts))
        .route("/api/tags", get(api_tags))
        .route("/api/theme", get(api_theme))
        .route("/api/theme/toggle", post(api_theme_toggle))
        .route("/api/theme/system", post(api_theme_system))
        .route("/__search", get(search_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the blog server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let state = AppState::new(blog.clone(), blog.theme_controller()).await?;
    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let watched = state.clone();
        tokio::spawn(async move {
            if let Err(e) = events::watch_and_reload(watched).await {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `?tag=` and `?q=` on the list page and the posts API
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub tag: Option<String>,
    pub q: Option<String>,
}

impl ListParams {
    fn compose(&self, posts: &[Arc<Post>]) -> Composer {
        let mut composer = Composer::new(posts.iter().cloned());
        composer.select_tag(self.tag.clone().filter(|t| !t.is_empty()));
        if let Some(q) = &self.q {
            composer.set_query(q);
        }
        composer
    }
}

#[derive(Debug, Deserialize)]
pub struct PostParams {
    pub file: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

#[derive(Debug, Serialize)]
struct ThemeState {
    theme: Theme,
    saved: Option<Theme>,
}

#[derive(Debug, Deserialize)]
struct SystemChange {
    theme: Theme,
}

fn load_failed() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: "Failed to load posts".to_string(),
        }),
    )
}

/// Send a rendered page, or a plain 500 when the template failed
fn page(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Response {
    let theme = state.current_theme().await;
    let templates = &state.templates;

    match state.posts().await {
        Some(posts) => page(
            StatusCode::OK,
            templates.index_page(&params.compose(&posts), theme),
        ),
        None => page(
            StatusCode::INTERNAL_SERVER_ERROR,
            templates.load_error_page(theme),
        ),
    }
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostParams>,
) -> Response {
    let theme = state.current_theme().await;
    let templates = &state.templates;

    let Some(file) = params.file.filter(|f| !f.is_empty()) else {
        return page(
            StatusCode::BAD_REQUEST,
            templates.post_error_page("No post specified.", theme),
        );
    };

    let fm = match state.loader.load_document(&file).await {
        Ok(fm) => fm,
        Err(e) => {
            tracing::warn!("Failed to load post {}: {}", file, e);
            let status = match e {
                LoadError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
                LoadError::InvalidPath(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let message = format!("Failed to load post: {}", e);
            return page(status, templates.post_error_page(&message, theme));
        }
    };

    let highlight = state.blog.config.highlight.theme_for(theme);
    match state.renderer.render_with_theme(&fm.body, highlight) {
        Ok(content) => page(
            StatusCode::OK,
            templates.post_page(&file, &fm, &content, theme),
        ),
        Err(e) => {
            tracing::error!("Failed to render post {}: {}", file, e);
            let message = format!("Failed to render post: {}", e);
            page(
                StatusCode::INTERNAL_SERVER_ERROR,
                templates.post_error_page(&message, theme),
            )
        }
    }
}

async fn api_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Post>>, (StatusCode, Json<ApiError>)> {
    let posts = state.posts().await.ok_or_else(load_failed)?;
    let composer = params.compose(&posts);
    Ok(Json(
        composer.visible().iter().map(|p| p.as_ref().clone()).collect(),
    ))
}

async fn api_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, (StatusCode, Json<ApiError>)> {
    let posts = state.posts().await.ok_or_else(load_failed)?;
    Ok(Json(tag_vocabulary(&posts)))
}

async fn api_theme(State(state): State<Arc<AppState>>) -> Json<ThemeState> {
    Json(state.theme_state().await)
}

async fn api_theme_toggle(State(state): State<Arc<AppState>>) -> Json<ThemeState> {
    let theme = state.theme.lock().await.toggle();
    tracing::info!("Theme switched to {}", theme);
    Json(state.theme_state().await)
}

async fn api_theme_system(
    State(state): State<Arc<AppState>>,
    Json(change): Json<SystemChange>,
) -> Json<ThemeState> {
    state.theme.lock().await.on_system_change(change.theme);
    Json(state.theme_state().await)
}

async fn search_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| search::handle_search_socket(socket, state))
}

async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let events = state.events.subscribe();
    ws.on_upgrade(move |socket| events::handle_event_socket(socket, events))
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{FixedPreference, MemoryStore};
    use axum::body::Body;
    use axum::http::{Method, Request};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const INDEX: &str = r#"[
        {"file": "hello.md", "title": "Hello Rust", "date": "2024-02-01", "tags": ["rust"]},
        {"file": "css.md", "title": "Grid layouts", "tags": ["web"]},
        {"file": "plain.md", "title": "Plain notes"}
    ]"#;

    fn site(index: Option<&str>) -> TempDir {
        let dir = TempDir::new().unwrap();
        if let Some(index) = index {
            fs::write(dir.path().join("posts.json"), index).unwrap();
        }
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(
            dir.path().join("pages/hello.md"),
            "---\ntitle: Hello Rust\ntags: [rust]\n---\n# Heading\n\n```rust\nfn main() {}\n```\n",
        )
        .unwrap();
        dir
    }

    async fn app(dir: &TempDir) -> Router {
        let blog = Blog::new(dir.path()).unwrap();
        let theme = ThemeController::new(
            Some(Box::new(MemoryStore::new())),
            Box::new(FixedPreference(Theme::Light)),
            "blog-theme",
        );
        router(AppState::new(blog, theme).await.unwrap())
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        send(app, Method::GET, uri).await
    }

    #[tokio::test]
    async fn test_index_page() {
        let dir = site(Some(INDEX));
        let (status, body) = get(app(&dir).await, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello Rust"));
        assert!(body.contains("Grid layouts"));
        assert!(body.contains(r#"href="index.html?tag=rust""#));
    }

    #[tokio::test]
    async fn test_index_page_with_tag_and_query() {
        let dir = site(Some(INDEX));
        let (_, body) = get(app(&dir).await, "/index.html?tag=web&q=GRID").await;
        assert!(body.contains("Grid layouts"));
        assert!(!body.contains("Hello Rust"));
        assert!(body.contains(r#"value="grid""#));
    }

    /// The href of the tag button for `tag`, as a request path
    fn tag_link(html: &str, tag: &str) -> String {
        let marker = format!(r#"data-tag="{}""#, tag);
        let button = html.find(&marker).unwrap();
        let href_start = html[..button].rfind(r#"href=""#).unwrap() + r#"href=""#.len();
        let href_end = href_start + html[href_start..].find('"').unwrap();
        format!("/{}", html[href_start..href_end].replace("&amp;", "&"))
    }

    #[tokio::test]
    async fn test_tag_link_after_query_keeps_query() {
        let dir = site(Some(INDEX));
        let app = app(&dir).await;

        let (_, searched) = get(app.clone(), "/index.html?q=grid").await;
        assert!(searched.contains("Grid layouts"));
        assert!(!searched.contains("Hello Rust"));

        let web = tag_link(&searched, "web");
        assert_eq!(web, "/index.html?tag=web&q=grid");
        let (status, body) = get(app.clone(), &web).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"value="grid""#));
        assert!(body.contains(r#"data-active-tag="web""#));
        assert!(body.contains("Grid layouts"));

        let (_, body) = get(app.clone(), &tag_link(&searched, "rust")).await;
        assert!(body.contains(r#"value="grid""#));
        assert!(!body.contains("Hello Rust"));
        assert!(body.contains("No posts found."));

        let (_, body) = get(app, &tag_link(&body, "")).await;
        assert!(body.contains(r#"value="grid""#));
        assert!(body.contains(r#"data-active-tag="""#));
        assert!(body.contains("Grid layouts"));
        assert!(!body.contains("Plain notes"));
    }

    #[tokio::test]
    async fn test_missing_index_shows_error_state() {
        let dir = site(None);
        let app = app(&dir).await;
        let (status, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Failed to load posts."));

        let (status, _) = get(app, "/api/posts").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_post_page() {
        let dir = site(Some(INDEX));
        let (status, body) = get(app(&dir).await, "/post.html?file=hello.md").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Hello Rust - Blog</title>"));
        assert!(body.contains("<h1>Heading</h1>"));
        assert!(body.contains("highlight language-rust"));
    }

    #[tokio::test]
    async fn test_post_errors() {
        let dir = site(Some(INDEX));
        let app = app(&dir).await;

        let (status, body) = get(app.clone(), "/post.html").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("No post specified."));

        let (status, body) = get(app.clone(), "/post.html?file=missing.md").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("missing.md"));

        let (status, _) = get(app, "/post.html?file=..%2Fposts.json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_posts_api() {
        let dir = site(Some(INDEX));
        let (status, body) = get(app(&dir).await, "/api/posts?q=notes").await;
        assert_eq!(status, StatusCode::OK);
        let posts: Vec<Post> = serde_json::from_str(&body).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].file, "plain.md");
    }

    #[tokio::test]
    async fn test_tags_api() {
        let dir = site(Some(INDEX));
        let (_, body) = get(app(&dir).await, "/api/tags").await;
        let tags: Vec<String> = serde_json::from_str(&body).unwrap();
        assert_eq!(tags, vec!["rust", "web"]);
    }

    #[tokio::test]
    async fn test_theme_api() {
        let dir = site(Some(INDEX));
        let app = app(&dir).await;

        let (_, body) = get(app.clone(), "/api/theme").await;
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({"theme": "light", "saved": null})
        );

        let (status, body) = send(app.clone(), Method::POST, "/api/theme/toggle").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({"theme": "dark", "saved": "dark"})
        );

        let (_, body) = get(app, "/").await;
        assert!(body.contains(r#"data-theme="dark""#));
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_index() {
        let dir = site(Some(INDEX));
        let blog = Blog::new(dir.path()).unwrap();
        let theme = ThemeController::new(None, Box::new(FixedPreference(Theme::Dark)), "k");
        let state = AppState::new(blog, theme).await.unwrap();
        assert_eq!(state.posts().await.unwrap().len(), 3);

        fs::write(dir.path().join("posts.json"), "[]").unwrap();
        state.reload_posts().await;
        assert!(state.posts().await.unwrap().is_empty());

        fs::write(dir.path().join("posts.json"), "{").unwrap();
        state.reload_posts().await;
        assert!(state.posts().await.is_none());
    }
}
