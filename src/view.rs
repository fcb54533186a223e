//! View binding: the rendering surface the clients talk to.
//!
//! DESIGN
//! ======
//! Request/response logic never touches a concrete surface. It reads the
//! post input and writes status, alerts, section visibility, navigation,
//! and the posts container through `View`. The CLI uses `TerminalView`;
//! tests use a recording implementation.

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;

use std::sync::Mutex;

use crate::messages;
use crate::net::types::{Post, PostId, ReactionKind};

// =============================================================================
// RENDER MODEL
// =============================================================================

/// A clickable reaction trigger with its running count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionControl {
    pub kind: ReactionKind,
    pub count: u64,
}

/// One rendered post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    /// Target for the reaction controls. `None` renders them inert.
    pub post_id: Option<PostId>,
    pub author: String,
    pub content: String,
    pub reactions: Vec<ReactionControl>,
}

impl PostRow {
    #[must_use]
    pub fn from_post(post: &Post) -> Self {
        Self {
            post_id: post.id,
            author: post.author_label().to_owned(),
            content: post.content.clone(),
            reactions: ReactionKind::ALL
                .iter()
                .map(|&kind| ReactionControl { kind, count: post.count(kind) })
                .collect(),
        }
    }
}

/// Entire contents of the posts container after a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedContent {
    Placeholder(&'static str),
    Rows(Vec<PostRow>),
}

impl FeedContent {
    #[must_use]
    pub fn from_posts(posts: &[Post]) -> Self {
        if posts.is_empty() {
            return Self::Placeholder(messages::NO_POSTS);
        }
        Self::Rows(posts.iter().map(PostRow::from_post).collect())
    }
}

// =============================================================================
// VIEW
// =============================================================================

pub trait View: Send + Sync {
    /// Replace the status line.
    fn set_status(&self, message: &str);

    /// Show a blocking alert.
    fn alert(&self, message: &str);

    /// Show the signed-in section and hide the sign-in form.
    fn show_app(&self);

    /// Show the sign-in form and hide the signed-in section.
    fn hide_app(&self);

    /// Full navigation to `route`.
    fn navigate(&self, route: &str);

    /// Current value of the post input.
    fn post_input(&self) -> String;

    fn clear_post_input(&self);

    /// Whether this surface has somewhere to render posts.
    fn has_posts_container(&self) -> bool;

    /// Replace the posts container's contents.
    fn render_posts(&self, content: &FeedContent);
}

// =============================================================================
// TERMINAL
// =============================================================================

/// Line-oriented view on stdout/stderr.
#[derive(Debug, Default)]
pub struct TerminalView {
    post_input: Mutex<String>,
    show_posts: bool,
}

impl TerminalView {
    #[must_use]
    pub fn new(show_posts: bool) -> Self {
        Self { post_input: Mutex::new(String::new()), show_posts }
    }

    /// Preload the post input, standing in for the user typing.
    pub fn set_post_input(&self, text: &str) {
        *self
            .post_input
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = text.to_owned();
    }
}

impl View for TerminalView {
    fn set_status(&self, message: &str) {
        println!("{message}");
    }

    fn alert(&self, message: &str) {
        eprintln!("[!] {message}");
    }

    fn show_app(&self) {
        tracing::debug!("app section shown");
    }

    fn hide_app(&self) {
        tracing::debug!("auth section shown");
    }

    fn navigate(&self, route: &str) {
        println!("-> {route}");
    }

    fn post_input(&self) -> String {
        self.post_input
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn clear_post_input(&self) {
        self.post_input
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    fn has_posts_container(&self) -> bool {
        self.show_posts
    }

    fn render_posts(&self, content: &FeedContent) {
        println!("{}", format_feed(content));
    }
}

#[must_use]
pub fn format_feed(content: &FeedContent) -> String {
    match content {
        FeedContent::Placeholder(text) => (*text).to_owned(),
        FeedContent::Rows(rows) => rows
            .iter()
            .map(format_row)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[must_use]
pub fn format_row(row: &PostRow) -> String {
    let id = row
        .post_id
        .map_or_else(|| "-".to_owned(), |id| id.to_string());
    let reactions = row
        .reactions
        .iter()
        .map(|r| format!("{} {}", r.kind.glyph(), r.count))
        .collect::<Vec<_>>()
        .join("  ");
    format!("[{id}] {}: {}  {reactions}", row.author, row.content)
}
