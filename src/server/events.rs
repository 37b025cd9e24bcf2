//! Server-pushed events: live reload and theme changes

use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use super::AppState;
use crate::theme::{CommentFrame, GiscusMessage, Theme};

/// Event pushed to every open page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    /// Content changed on disk
    Reload,
    /// Active theme changed; `message` is forwarded to the comment widget
    Theme {
        theme: Theme,
        origin: String,
        message: GiscusMessage,
    },
}

/// Comment frame reached through the pages connected to the event socket
pub struct BroadcastFrame {
    tx: broadcast::Sender<ServerEvent>,
}

impl BroadcastFrame {
    pub fn new(tx: broadcast::Sender<ServerEvent>) -> Self {
        Self { tx }
    }
}

impl CommentFrame for BroadcastFrame {
    fn post_message(&self, message: &GiscusMessage, target_origin: &str) {
        let event = ServerEvent::Theme {
            theme: message.theme(),
            origin: target_origin.to_string(),
            message: message.clone(),
        };
        if self.tx.send(event).is_err() {
            tracing::debug!("No page listening for theme changes");
        }
    }

    fn is_present(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

/// Forward events to one connected page until it goes away
pub(super) async fn handle_event_socket(
    mut socket: WebSocket,
    mut events: broadcast::Receiver<ServerEvent>,
) {
    tracing::debug!("Event client connected");

    loop {
        tokio::select! {
            result = events.recv() => {
                match result {
                    Ok(event) => {
                        let text = match serde_json::to_string(&event) {
                            Ok(text) => text,
                            Err(e) => {
                                tracing::error!("Failed to encode event: {}", e);
                                continue;
                            }
                        };
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Event client disconnected");
}

/// Whether a changed path should trigger a reload
fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.contains(".blogfront")
        && !path_str.ends_with('~')
}

/// Whether a change seen by the watchers touches the index or a document.
/// The index directory is watched as a whole so the index can appear later.
fn touches_content(path: &Path, index_path: &Path, pages_dir: &Path) -> bool {
    if !is_relevant(path) {
        return false;
    }
    path.starts_with(pages_dir)
        || (path.file_name().is_some() && path.file_name() == index_path.file_name())
}

/// Directory holding the index file
fn index_dir(index_path: &Path) -> PathBuf {
    match index_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Watch the post index and documents, reloading the collection on change
pub(super) async fn watch_and_reload(state: Arc<AppState>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<DebounceEventResult>();

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |result: DebounceEventResult| {
            let _ = tx.send(result);
        },
    )?;

    let index_path: PathBuf = state.blog.index_path.clone();
    let pages_dir: PathBuf = state.blog.pages_dir.clone();

    if pages_dir.exists() {
        debouncer
            .watcher()
            .watch(&pages_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", pages_dir);
    }

    let index_dir = index_dir(&index_path);
    if index_dir.exists() {
        debouncer
            .watcher()
            .watch(&index_dir, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?} for {:?}", index_dir, index_path.file_name());
    } else {
        tracing::warn!("Index directory {:?} does not exist", index_dir);
    }

    while let Some(result) = rx.recv().await {
        match result {
            Ok(events) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| touches_content(&e.path, &index_path, &pages_dir))
                    .collect();
                if changed.is_empty() {
                    continue;
                }

                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                state.reload_posts().await;
                if state.events.send(ServerEvent::Reload).is_err() {
                    tracing::debug!("No page to reload");
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}
