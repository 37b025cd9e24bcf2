//! Live search over a websocket
//!
//! Each connection owns its own list state. Typed input goes through a
//! debouncer; Enter and Escape bypass it.

use axum::extract::ws::{Message, WebSocket};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::AppState;
use crate::browse::{Composer, Debouncer};
use crate::content::Post;
use crate::templates::TemplateRenderer;

/// Message from the list page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchRequest {
    /// Keystroke in the search box
    Input { query: String },
    /// Enter pressed
    Submit { query: String },
    /// Escape pressed
    Cancel,
    /// Tag selected; `None` shows all posts
    Tag { tag: Option<String> },
}

/// Reply with the new list contents
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchReply {
    Results { count: usize, html: String },
}

/// List state and query debouncing for one connection
pub struct SearchSession {
    composer: Composer,
    debouncer: Debouncer<String>,
}

impl SearchSession {
    /// Start a session; queries that settle arrive on the returned receiver
    /// and must be passed to [`SearchSession::apply_query`].
    pub fn new(
        posts: &[Arc<Post>],
        quiet: std::time::Duration,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (debouncer, queries) = Debouncer::new(quiet);
        let session = Self {
            composer: Composer::new(posts.iter().cloned()),
            debouncer,
        };
        (session, queries)
    }

    /// Handle a request; true when the visible list changed right away
    pub fn handle(&mut self, request: SearchRequest) -> bool {
        match request {
            SearchRequest::Input { query } => {
                self.debouncer.input(query);
                false
            }
            SearchRequest::Submit { query } => {
                self.debouncer.flush(query);
                false
            }
            SearchRequest::Cancel => {
                self.debouncer.cancel();
                false
            }
            SearchRequest::Tag { tag } => {
                let tag = tag.filter(|t| !t.is_empty());
                self.composer.select_tag(tag);
                true
            }
        }
    }

    /// Apply a settled query
    pub fn apply_query(&mut self, query: &str) {
        self.composer.set_query(query);
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    fn reply(&self, templates: &TemplateRenderer) -> anyhow::Result<SearchReply> {
        let visible = self.composer.visible();
        Ok(SearchReply::Results {
            count: visible.len(),
            html: templates.post_list(visible)?,
        })
    }
}

/// Serve one search connection until it closes
pub(super) async fn handle_search_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let Some(posts) = state.posts().await else {
        tracing::debug!("Search requested without a post collection");
        return;
    };

    let quiet = state.blog.config.search.debounce();
    let (mut session, mut queries) = SearchSession::new(&posts, quiet);
    tracing::debug!("Search client connected");

    loop {
        let changed = tokio::select! {
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<SearchRequest>(&text) {
                    Ok(request) => session.handle(request),
                    Err(e) => {
                        tracing::debug!("Ignoring search message {:?}: {}", text, e);
                        false
                    }
                },
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                    false
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => false,
            },
            Some(query) = queries.recv() => {
                session.apply_query(&query);
                true
            }
        };

        if !changed {
            continue;
        }

        let reply = match session.reply(&state.templates) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Failed to render search results: {:#}", e);
                continue;
            }
        };
        let text = match serde_json::to_string(&reply) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to encode search results: {}", e);
                continue;
            }
        };
        if socket.send(Message::Text(text)).await.is_err() {
            break;
        }
    }

    tracing::debug!("Search client disconnected");
}
