//! Hand-written doubles for the provider, API, and view seams.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{oneshot, watch};

use crate::auth::{AuthError, AuthEvents, AuthProvider, AuthUser};
use crate::net::ApiError;
use crate::net::FeedApi;
use crate::net::types::{CreatePostRequest, CreatePostResponse, Post, ReactionRequest, ReactionResponse, RoomId};
use crate::view::{FeedContent, View};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

#[must_use]
pub fn user(uid: &str) -> AuthUser {
    AuthUser { uid: uid.into(), email: format!("{uid}@example.com") }
}

#[must_use]
pub fn post(id: i64, uid: &str, content: &str) -> Post {
    Post {
        id: Some(id),
        uid: uid.into(),
        username: None,
        content: content.into(),
        likes: None,
        hearts: None,
        icon_url: None,
        creator_uid: None,
    }
}

// =========================================================================
// MockAuth
// =========================================================================

/// Accepts any password except `"wrong"`; hands out a fixed token.
pub struct MockAuth {
    events: AuthEvents,
    token: String,
    fail_tokens: AtomicBool,
    fail_sign_out: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

impl MockAuth {
    #[must_use]
    pub fn new(initial: Option<AuthUser>) -> Self {
        Self {
            events: AuthEvents::new(initial),
            token: "tok".into(),
            fail_tokens: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_tokens(&self) {
        self.fail_tokens.store(true, Ordering::SeqCst);
    }

    pub fn fail_sign_out(&self) {
        self.fail_sign_out.store(true, Ordering::SeqCst);
    }

    pub fn publish(&self, user: Option<AuthUser>) {
        self.events.publish(user);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_owned());
    }

    fn user_for(email: &str) -> AuthUser {
        let local = email.split('@').next().unwrap_or(email);
        AuthUser { uid: format!("uid-{local}"), email: email.to_owned() }
    }
}

fn rejected(code: &str, message: &str) -> AuthError {
    AuthError::Provider { code: code.into(), message: message.into() }
}

#[async_trait::async_trait]
impl AuthProvider for MockAuth {
    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.record("create_user");
        if password.len() < 6 {
            return Err(rejected("WEAK_PASSWORD", "weak password"));
        }
        Ok(Self::user_for(email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.record("sign_in");
        if password == "wrong" {
            return Err(rejected("INVALID_LOGIN_CREDENTIALS", "bad credentials"));
        }
        let user = Self::user_for(email);
        self.events.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.record("sign_out");
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Request("offline".into()));
        }
        self.events.publish(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.record("send_password_reset");
        if email.starts_with("unknown") {
            return Err(rejected("EMAIL_NOT_FOUND", "no such user"));
        }
        Ok(())
    }

    async fn id_token(&self, _user: &AuthUser) -> Result<String, AuthError> {
        self.record("id_token");
        if self.fail_tokens.load(Ordering::SeqCst) {
            return Err(rejected("TOKEN_EXPIRED", "token expired"));
        }
        Ok(self.token.clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.events.subscribe()
    }
}

// =========================================================================
// MockApi
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List(RoomId),
    Create(CreatePostRequest),
    React(ReactionRequest),
}

#[derive(Default)]
pub struct MockApi {
    posts: Mutex<Vec<Post>>,
    gates: Mutex<VecDeque<oneshot::Receiver<Vec<Post>>>>,
    create_response: Mutex<CreatePostResponse>,
    reaction_response: Mutex<ReactionResponse>,
    fail_lists: AtomicBool,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_posts(&self, posts: Vec<Post>) {
        *self.posts.lock().unwrap() = posts;
    }

    /// The next list call waits for this channel instead of answering.
    pub fn push_gate(&self, gate: oneshot::Receiver<Vec<Post>>) {
        self.gates.lock().unwrap().push_back(gate);
    }

    pub fn set_create_response(&self, response: CreatePostResponse) {
        *self.create_response.lock().unwrap() = response;
    }

    pub fn set_reaction_response(&self, response: ReactionResponse) {
        *self.reaction_response.lock().unwrap() = response;
    }

    pub fn fail_lists(&self) {
        self.fail_lists.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn list_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::List(_)))
            .count()
    }
}

#[async_trait::async_trait]
impl FeedApi for MockApi {
    async fn list_posts(&self, room_id: RoomId) -> Result<Vec<Post>, ApiError> {
        self.calls.lock().unwrap().push(ApiCall::List(room_id));
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(ApiError::Request("connection refused".into()));
        }
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            return Ok(gate.await.unwrap_or_default());
        }
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn create_post(&self, request: &CreatePostRequest) -> Result<CreatePostResponse, ApiError> {
        self.calls.lock().unwrap().push(ApiCall::Create(request.clone()));
        Ok(self.create_response.lock().unwrap().clone())
    }

    async fn send_reaction(&self, request: &ReactionRequest) -> Result<ReactionResponse, ApiError> {
        self.calls.lock().unwrap().push(ApiCall::React(request.clone()));
        Ok(self.reaction_response.lock().unwrap().clone())
    }
}

// =========================================================================
// RecordingView
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Auth,
    App,
}

pub struct RecordingView {
    has_container: bool,
    input: Mutex<String>,
    pub statuses: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
    pub navigations: Mutex<Vec<String>>,
    pub section: Mutex<Option<Section>>,
    pub renders: Mutex<Vec<FeedContent>>,
}

impl RecordingView {
    #[must_use]
    pub fn new() -> Self {
        Self::with_container(true)
    }

    #[must_use]
    pub fn with_container(has_container: bool) -> Self {
        Self {
            has_container,
            input: Mutex::new(String::new()),
            statuses: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
            navigations: Mutex::new(Vec::new()),
            section: Mutex::new(None),
            renders: Mutex::new(Vec::new()),
        }
    }

    pub fn type_post(&self, text: &str) {
        *self.input.lock().unwrap() = text.to_owned();
    }

    #[must_use]
    pub fn input(&self) -> String {
        self.input.lock().unwrap().clone()
    }

    #[must_use]
    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }

    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    #[must_use]
    pub fn section(&self) -> Option<Section> {
        *self.section.lock().unwrap()
    }

    #[must_use]
    pub fn renders(&self) -> Vec<FeedContent> {
        self.renders.lock().unwrap().clone()
    }
}

impl View for RecordingView {
    fn set_status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_owned());
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_owned());
    }

    fn show_app(&self) {
        *self.section.lock().unwrap() = Some(Section::App);
    }

    fn hide_app(&self) {
        *self.section.lock().unwrap() = Some(Section::Auth);
    }

    fn navigate(&self, route: &str) {
        self.navigations.lock().unwrap().push(route.to_owned());
    }

    fn post_input(&self) -> String {
        self.input()
    }

    fn clear_post_input(&self) {
        self.input.lock().unwrap().clear();
    }

    fn has_posts_container(&self) -> bool {
        self.has_container
    }

    fn render_posts(&self, content: &FeedContent) {
        self.renders.lock().unwrap().push(content.clone());
    }
}
