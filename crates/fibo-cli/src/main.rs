use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fibo_app::CachedFetcher;
use fibo_app::views::{self, PostView, SaveOutcome, WriteForm};
use fibo_common::document::{self, BlockDocument};
use fibo_common::telemetry::{self, TelemetryConfig};
use fibo_common::{AuthedClient, BackendClient, Config};
use miette::{IntoDiagnostic, Result};

#[derive(Parser)]
#[command(version, about = "fibo - read and write posts on a fibo blog", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the blog API [env: FIBO_BACKEND_URL, default: http://localhost:8080]
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Auth token, sent as the Authorization header [env: FIBO_TOKEN]
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rendered page for one post
    Show {
        /// Post id
        id: i64,
    },
    /// List unpublished posts
    Drafts,
    /// List published posts
    Published,
    /// List your own drafts (needs a token)
    Mine,
    /// Create a post from a block document file
    Write {
        /// Path to the block document JSON
        document: PathBuf,

        /// Post title
        #[arg(long)]
        title: Option<String>,

        /// Publish immediately instead of saving a draft
        #[arg(long)]
        publish: bool,
    },
    /// Replace an existing post's content, and optionally its title or publish state
    Update {
        /// Post id
        id: i64,

        /// Path to the new block document JSON
        document: PathBuf,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// Publish the post
        #[arg(long, conflicts_with = "draft")]
        publish: bool,

        /// Turn the post back into a draft
        #[arg(long)]
        draft: bool,
    },
    /// Render a block document file to HTML without contacting the backend
    Render {
        /// Path to the block document JSON
        document: PathBuf,
    },
    /// Total likes across your posts
    Likes,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();
    let _ = dotenvy::dotenv();
    telemetry::init(TelemetryConfig::from_env("fibo"));

    let cli = Cli::parse();
    let config = Config::from_env()?.override_with(cli.backend.as_deref(), cli.token)?;
    let fetcher = CachedFetcher::new(BackendClient::from_config(&config));

    match cli.command {
        Commands::Show { id } => {
            let view = PostView::load(&fetcher, id).await;
            print!("{}", view.html());
            if let PostView::Error(message) = view {
                return Err(miette::miette!("post {id}: {message}"));
            }
        }
        Commands::Drafts => {
            let posts = fetcher.list_posts().await?;
            print!("{}", views::render_cards(&views::drafts(&posts)));
        }
        Commands::Published => {
            let posts = fetcher.list_published().await?;
            print!("{}", views::render_cards(&views::published(&posts)));
        }
        Commands::Mine => {
            let posts = authed(&config, &fetcher.client)?.my_posts().await?;
            print!("{}", views::render_cards(&views::drafts(&posts)));
        }
        Commands::Write {
            document,
            title,
            publish,
        } => {
            let doc = read_document(&document)?;
            let mut form = WriteForm::new().with_document(doc).publish(publish);
            if let Some(title) = title {
                form = form.with_title(title);
            }
            save(form, &authed(&config, &fetcher.client)?).await?;
        }
        Commands::Update {
            id,
            document,
            title,
            publish,
            draft,
        } => {
            let post = fetcher.get_post(id).await?;
            let mut form = WriteForm::edit(&post)?.with_document(read_document(&document)?);
            if let Some(is_published) = publish_state(publish, draft) {
                form = form.publish(is_published);
            }
            if let Some(title) = title {
                form = form.with_title(title);
            }
            save(form, &authed(&config, &fetcher.client)?).await?;
            fetcher.invalidate(id);
        }
        Commands::Render { document } => {
            let doc = read_document(&document)?;
            print!("{}", fibo_renderer::render_document(&doc));
        }
        Commands::Likes => {
            let likes = authed(&config, &fetcher.client)?.total_likes().await?;
            println!("{likes}");
        }
    }

    Ok(())
}

/// Publish state requested on the command line; `None` keeps the post's current one.
fn publish_state(publish: bool, draft: bool) -> Option<bool> {
    match (publish, draft) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn authed(config: &Config, client: &BackendClient) -> Result<AuthedClient> {
    let token = config.require_token()?;
    Ok(client.authenticated(token.clone()))
}

fn read_document(path: &Path) -> Result<BlockDocument> {
    let text = std::fs::read_to_string(path).into_diagnostic()?;
    Ok(document::deserialize_named(&path.display().to_string(), &text)?)
}

async fn save(form: WriteForm, client: &AuthedClient) -> Result<()> {
    match form.save(client).await? {
        SaveOutcome::Navigate(_) => {
            println!("Saved \"{}\"", form.title);
            Ok(())
        }
        SaveOutcome::Stay(response) => Err(miette::miette!(
            "backend did not save the post ({}): {}",
            response.body.status,
            response.body.message
        )),
    }
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(3)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
