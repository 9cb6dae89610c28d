/// Tempo - terminal front end for the music feed
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tempo_api_client::{FeedScope, TempoApiClient};
use tempo_core::{MemoryRecentlyViewedStore, Post, PostId, Song, TempoError, UserId};
use tempo_feed::{FeedLayout, RefreshCoordinator, RefreshOutcome, RefreshTimings};
use tempo_playback::{
    FeedRowSlot, HistoryRowSlot, PlaybackCoordinator, SilentBackend, SlotId, SlotRender,
    ViewSlot,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod library;

use config::CliConfig;
use library::DisconnectedLibrary;

/// Rows kept on "screen" by the play command
const VISIBLE_ROWS: usize = 4;

#[derive(Parser)]
#[command(name = "tempo")]
#[command(about = "Browse and play the Tempo music feed", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./tempo.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ScopeArgs {
    /// Show this user's feed instead of everyone's
    #[arg(long)]
    user: Option<String>,

    /// Show the user's own posts (requires --user)
    #[arg(long, requires = "user")]
    history: bool,
}

impl ScopeArgs {
    fn scope(&self) -> FeedScope {
        match (&self.user, self.history) {
            (Some(user), true) => FeedScope::History(UserId::new(user.clone())),
            (Some(user), false) => FeedScope::Following(UserId::new(user.clone())),
            (None, _) => FeedScope::Everyone,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh and list the feed
    Feed {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Use pull-to-refresh timings instead of the initial-load preset
        #[arg(long)]
        pull: bool,
    },
    /// Play a post, then refresh while it keeps playing
    Play {
        /// Post to play
        post_id: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Toggle the like on a post
    Like {
        post_id: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Toggle saving a post's song to the music library
    Add {
        post_id: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Share a song
    Post {
        /// Posting user
        #[arg(short, long)]
        user: String,
        /// Spotify URI (spotify:track:<id>) or bare track ID
        song: String,
    },
}

/// Everything one command needs, wired explicitly
struct App {
    config: CliConfig,
    client: TempoApiClient,
    refresh: RefreshCoordinator,
    playback: PlaybackCoordinator,
    scope: FeedScope,
}

impl App {
    fn new(config: CliConfig, scope: FeedScope) -> anyhow::Result<Self> {
        let client = TempoApiClient::new(config.api_config())?;
        let refresh = RefreshCoordinator::new(Arc::new(client.feed(scope.clone())));
        let playback = PlaybackCoordinator::new(
            Box::new(SilentBackend::new()),
            Arc::new(DisconnectedLibrary),
            Arc::new(client.clone()),
            Arc::new(MemoryRecentlyViewedStore::new()),
        );
        Ok(Self {
            config,
            client,
            refresh,
            playback,
            scope,
        })
    }

    async fn refresh(&self, timings: RefreshTimings) -> anyhow::Result<RefreshOutcome> {
        let outcome = self.refresh.start_refresh(timings)?.wait().await?;
        if outcome.did_timeout {
            tracing::warn!(
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "Feed refresh timed out"
            );
        }
        Ok(outcome)
    }

    async fn find_post(&self, post_id: &str) -> anyhow::Result<Post> {
        let outcome = self.refresh(RefreshTimings::initial_load()).await?;
        select_post(outcome.posts, &PostId::new(post_id))
            .with_context(|| format!("searching the {:?} feed", self.scope))
    }

    fn new_row(&self) -> (Arc<dyn ViewSlot>, Row) {
        if matches!(self.scope, FeedScope::History(_)) {
            let row = Arc::new(HistoryRowSlot::new());
            (row.clone(), Row::History(row))
        } else {
            let row = Arc::new(FeedRowSlot::new());
            (row.clone(), Row::Feed(row))
        }
    }
}

fn select_post(posts: Vec<Post>, id: &PostId) -> tempo_core::Result<Post> {
    posts
        .into_iter()
        .find(|p| &p.id == id)
        .ok_or_else(|| TempoError::not_found("post", id.as_str()))
}

enum Row {
    Feed(Arc<FeedRowSlot>),
    History(Arc<HistoryRowSlot>),
}

impl Row {
    fn render(&self) -> SlotRender {
        match self {
            Row::Feed(row) => row.render(),
            Row::History(row) => row.render(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tempo_cli=info,tempo_feed=info,tempo_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.validate()?;

    match cli.command {
        Commands::Feed { scope, pull } => {
            let app = App::new(config, scope.scope())?;
            feed(&app, pull).await?;
        }
        Commands::Play { post_id, scope } => {
            let app = App::new(config, scope.scope())?;
            play(&app, &post_id).await?;
        }
        Commands::Like { post_id, scope } => {
            let app = App::new(config, scope.scope())?;
            let post = app.find_post(&post_id).await?;
            let outcome = app.playback.toggle_like(&post).await;
            println!("like {}: {:?}", post.id, outcome);
            print_events(&app);
        }
        Commands::Add { post_id, scope } => {
            let app = App::new(config, scope.scope())?;
            let post = app.find_post(&post_id).await?;
            let outcome = app.playback.toggle_add(&post).await;
            println!("add {}: {:?}", post.id, outcome);
            print_events(&app);
        }
        Commands::Post { user, song } => {
            let app = App::new(config, FeedScope::Everyone)?;
            let song = Song::from_spotify_uri(&song);
            let id = app.client.post_song(&UserId::new(user), &song).await?;
            println!("posted {} as {}", song.spotify_uri(), id);
        }
    }

    Ok(())
}

async fn feed(app: &App, pull: bool) -> anyhow::Result<()> {
    let timings = if pull {
        app.config.refresh.timings()
    } else {
        RefreshTimings::initial_load()
    };
    let outcome = app.refresh(timings).await?;

    for post in &outcome.posts {
        println!(
            "{:>8}  {:<24} {} - {}  ({} likes)",
            post.id,
            post.user.display_name(),
            post.song.artist,
            post.song.title,
            post.like_count
        );
    }

    let layout = FeedLayout::for_post_count(outcome.posts.len());
    if layout == FeedLayout::EmptyWithSuggestions {
        println!("No more posts");
    }
    if layout.shows_suggestions() {
        println!("Follow more people to fill your feed");
    }
    Ok(())
}

async fn play(app: &App, post_id: &str) -> anyhow::Result<()> {
    let post = app.find_post(post_id).await?;

    let mut rows = Vec::new();
    let mut slots: Vec<SlotId> = Vec::new();
    for _ in 0..VISIBLE_ROWS {
        let (slot, row) = app.new_row();
        slots.push(app.playback.register_slot(slot));
        rows.push(row);
    }
    app.playback.bind(slots[0], &post)?;
    app.playback.play(&post)?;

    // Pull-to-refresh while the post keeps playing
    let mut outcome = app.refresh(app.config.refresh.timings()).await?;
    let playing_index = app.playback.apply_refresh(&mut outcome.posts);

    for (slot, post) in slots.iter().zip(&outcome.posts) {
        app.playback.bind(*slot, post)?;
    }
    if !matches!(playing_index, Some(index) if index < VISIBLE_ROWS) {
        tracing::info!(post_id = %post.id, "Playing post scrolled out of view");
    }

    for row in &rows {
        let render = row.render();
        let Some(id) = render.post_id else { continue };
        println!(
            "{} {:>8}  {:<20} {}{}",
            if render.is_playing { ">" } else { " " },
            id,
            render.headline,
            render.title,
            if render.played_once { "  (played)" } else { "" }
        );
    }
    print_events(app);
    Ok(())
}

fn print_events(app: &App) {
    for event in app.playback.drain_events() {
        println!("event: {:?}", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempo_core::User;

    fn post(id: &str) -> Post {
        let user = Arc::new(User::new("u1", "annie", "Annie", "Cheng"));
        Post::new(id, user, Song::new(format!("song-{}", id)), Utc::now())
    }

    #[test]
    fn select_post_finds_by_id() {
        let posts = vec![post("a"), post("b")];
        let found = select_post(posts, &PostId::new("b")).unwrap();
        assert_eq!(found.id, PostId::new("b"));
    }

    #[test]
    fn select_post_reports_missing_post() {
        let err = select_post(vec![post("a")], &PostId::new("zz")).unwrap_err();
        assert!(matches!(err, TempoError::NotFound { .. }));
        assert_eq!(err.to_string(), "post not found: zz");
    }
}
