use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use roomfeed::auth::firebase::FirebaseAuth;
use roomfeed::config::ClientConfig;
use roomfeed::net::types::{PostId, ReactionKind, RoomId};
use roomfeed::net::{FeedApi, HttpFeedApi};
use roomfeed::storage::{FileStore, KeyValueStore};
use roomfeed::view::TerminalView;
use roomfeed::{AuthBridge, AuthProvider, ClientError, FeedClient, ReactionClient, SessionHolder};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roomfeed", about = "Sign in, read, and post to rooms from the terminal")]
struct Cli {
    /// Room to read from and post into.
    #[arg(long, env = "ROOMFEED_ROOM_ID")]
    room: Option<RoomId>,

    #[arg(long)]
    api_base_url: Option<String>,

    #[arg(long)]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account (does not sign in).
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ROOMFEED_PASSWORD", hide_env_values = true)]
        password: String,
    },
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ROOMFEED_PASSWORD", hide_env_values = true)]
        password: String,
    },
    SignOut,
    ResetPassword {
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Show the current sign-in status.
    Status,
    /// List the room's posts.
    Posts,
    /// Post to the room.
    Post { content: String },
    /// React to a post with `like` or `heart`.
    React { post_id: PostId, reaction: ReactionKind },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url.trim_end_matches('/').to_owned();
    }
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage_path)?);
    let auth: Arc<dyn AuthProvider> = Arc::new(FirebaseAuth::new(config.firebase.clone(), config.timeouts, Arc::clone(&store))?);
    let api: Arc<dyn FeedApi> = Arc::new(HttpFeedApi::new(config.api_base_url.clone(), config.timeouts)?);
    let view = Arc::new(TerminalView::new(true));
    let session = SessionHolder::new();

    let feed = Arc::new(FeedClient::new(
        Arc::clone(&api),
        Arc::clone(&auth),
        session.clone(),
        view.clone(),
        cli.room,
    ));
    let reactions = ReactionClient::new(api, Arc::clone(&auth), session.clone(), view.clone(), Arc::clone(&feed));
    let bridge = AuthBridge::new(auth, session, store, view.clone(), config.rooms_route.clone())
        .with_feed(Arc::clone(&feed));

    // Each run is one page load: apply the restored sign-in status first.
    // When signed in this also renders the room's posts.
    bridge.sync().await;
    tracing::debug!(room = ?cli.room, storage = %config.storage_path.display(), "client ready");

    match cli.command {
        Command::SignUp { email, password } => {
            bridge.sign_up(&email, &password).await;
        }
        Command::SignIn { email, password } => {
            bridge.sign_in(&email, &password).await;
            bridge.sync().await;
        }
        Command::SignOut => {
            bridge.sign_out().await;
        }
        Command::ResetPassword { email } => {
            bridge.reset_password(&email).await;
        }
        Command::Status => {}
        // The initial sync already rendered the feed.
        Command::Posts => {
            if cli.room.is_none() {
                tracing::warn!("no room selected; pass --room or set ROOMFEED_ROOM_ID");
            } else if !bridge.session().is_signed_in() {
                tracing::warn!("not signed in; posts load after sign-in");
            }
        }
        Command::Post { content } => {
            view.set_post_input(&content);
            feed.post_content().await?;
        }
        Command::React { post_id, reaction } => {
            reactions.send_reaction(post_id, reaction).await?;
        }
    }

    Ok(())
}
