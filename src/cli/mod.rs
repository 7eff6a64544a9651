//! Command-line surface of the `streamflix` binary.

pub mod output;
pub mod shell;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use streamflix::api::{
    Avatar, MaturityRating, MovieCategory, MovieQuery, Profile, ProfileDraft, ProfileUpdate,
};
use streamflix::session::{Account, ProfileRegistry, SessionState};
use streamflix::{
    AuthSession, Catalog, ClientConfig, FileTokenStore, HttpApi, Library, PlaybackTracker,
};

use output::{print_info, print_success};

#[derive(Parser, Debug)]
#[command(name = "streamflix")]
#[command(about = "StreamFlix terminal client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile (id or name) for profile-scoped commands
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Sign out and forget the stored token
    Logout,

    /// Show who is signed in
    Status,

    /// Manage viewing profiles
    Profiles {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Browse the catalog
    Movies {
        /// Search titles, descriptions and tags
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short = 'g', long)]
        category: Option<MovieCategory>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },

    /// Show one movie (id or slug)
    Movie { id: String },

    /// Movies in progress for the profile
    Continue,

    /// Report a watch position
    Progress {
        movie: String,

        /// Position in seconds
        seconds: u64,

        /// Mark as watched regardless of position
        #[arg(long)]
        completed: bool,
    },

    /// Manage the profile's watchlist
    Watchlist {
        #[command(subcommand)]
        command: WatchlistCommand,
    },

    /// Check server connectivity
    Health,

    /// Interactive session
    Shell,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// List profiles
    List,
    /// Create a profile
    Create {
        name: String,
        #[arg(short, long, default_value = "red")]
        avatar: Avatar,
        /// Preferred audio and subtitle language (server default: en)
        #[arg(short, long)]
        language: Option<String>,
        /// Content ceiling: G, PG, PG-13, R or NC-17 (server default: PG-13)
        #[arg(short, long)]
        maturity: Option<MaturityRating>,
    },
    /// Rename a profile
    Rename { profile: String, name: String },
    /// Change a profile's avatar
    Avatar { profile: String, avatar: Avatar },
    /// Delete a profile
    Delete {
        profile: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum WatchlistCommand {
    /// List the watchlist
    List,
    /// Add a movie
    Add { movie: String },
    /// Remove a movie
    Remove { movie: String },
    /// Check whether a movie is listed
    Check { movie: String },
}

// ── Application context ──────────────────────────────────────────

pub struct App {
    pub config: ClientConfig,
    pub session: AuthSession,
}

impl App {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = HttpApi::new(&config.api_url, config.request_timeout())?;
        let data_dir = config.resolved_data_dir()?;
        let store = FileTokenStore::open(&data_dir);
        tracing::debug!(path = %store.path().display(), "Token store opened");

        let session = AuthSession::new(Arc::new(api), Arc::new(store), config.profile_selection);
        Ok(Self { config, session })
    }

    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(self.session.api())
    }

    pub fn lang(&self) -> &str {
        &self.config.language
    }

    /// Restore the stored session and require it to be signed in.
    pub async fn account(&self) -> Result<Account> {
        match self.session.start().await {
            SessionState::Authenticated(account) => Ok(account),
            SessionState::Failed { reason } => {
                bail!("Stored session is unreadable ({reason}). Run `streamflix login`.")
            }
            _ => bail!("Not signed in. Run `streamflix login` first."),
        }
    }

    /// Restore the session and make the requested profile active.
    pub async fn profile_scope(&self, requested: Option<&str>) -> Result<Profile> {
        let account = self.account().await?;
        let profile = match (requested, account.active_profile()) {
            (Some(key), _) => find_profile(&account, key)?,
            (None, Some(active)) => active.clone(),
            (None, None) => match account.profiles() {
                [only] => only.clone(),
                [] => bail!("No profiles yet. Create one with `streamflix profiles create`."),
                many => bail!(
                    "Choose a profile with --profile (one of: {})",
                    many.iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
        };
        self.session.switch_profile(&profile.id);
        Ok(profile)
    }
}

pub fn find_profile(account: &Account, key: &str) -> Result<Profile> {
    account
        .find_profile(key)
        .cloned()
        .with_context(|| format!("No profile named or with id '{key}'"))
}

fn prompt_email(email: Option<String>) -> Result<String> {
    match email {
        Some(email) => Ok(email),
        None => Ok(dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .interact_text()?),
    }
}

pub fn prompt_password(confirm: bool) -> Result<String> {
    let mut prompt = dialoguer::Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub fn confirm_delete(profile: &Profile) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(format!(
            "Delete profile {}? Its watch history and watchlist are removed too.",
            profile.name
        ))
        .default(false)
        .interact()
        .unwrap_or(false)
}

// ── Dispatch ─────────────────────────────────────────────────────

pub async fn run(cli: Cli, app: &App) -> Result<()> {
    let requested = cli.profile.as_deref();
    match cli.command {
        Command::Login { email } => {
            let email = prompt_email(email)?;
            let password = prompt_password(false)?;
            app.session.login(&email, &password).await?;
            signed_in(app);
            Ok(())
        }
        Command::Register { email } => {
            let email = prompt_email(email)?;
            let password = prompt_password(true)?;
            app.session.register(&email, &password).await?;
            signed_in(app);
            Ok(())
        }
        Command::Logout => {
            app.session.logout();
            print_success("Signed out");
            Ok(())
        }
        Command::Status => status(app).await,
        Command::Profiles { command } => profiles(app, command).await,
        Command::Movies {
            search,
            category,
            year,
            limit,
        } => {
            let query = MovieQuery {
                search,
                category,
                year,
                limit: Some(limit),
            };
            let movies = app.catalog().list_movies(&query).await?;
            output::print_movies(&movies, app.lang());
            Ok(())
        }
        Command::Movie { id } => {
            let movie = app.catalog().movie(&id).await?;
            output::print_movie(&movie, app.lang());
            Ok(())
        }
        Command::Continue => {
            app.profile_scope(requested).await?;
            let rows = Library::new(&app.session).continue_watching().await?;
            output::print_continue_watching(&rows, app.lang());
            Ok(())
        }
        Command::Progress {
            movie,
            seconds,
            completed,
        } => {
            app.profile_scope(requested).await?;
            let movie = app.catalog().movie(&movie).await?;
            let mut update = PlaybackTracker::for_movie(&movie, &app.config.playback).finish(seconds);
            update.completed |= completed;
            Library::new(&app.session)
                .record_progress(&movie.id, update)
                .await?;
            print_success(&format!(
                "Saved {}s of {}{}",
                update.progress_seconds,
                movie.localized_title(app.lang()),
                if update.completed { " (watched)" } else { "" }
            ));
            Ok(())
        }
        Command::Watchlist { command } => {
            app.profile_scope(requested).await?;
            watchlist(app, command).await
        }
        Command::Health => {
            let health = app.catalog().health().await?;
            print_success(&format!("{} is {}", app.config.api_url, health.status));
            Ok(())
        }
        Command::Shell => shell::run(app).await,
    }
}

fn signed_in(app: &App) {
    let state = app.session.state();
    let Some(account) = state.account() else {
        return;
    };
    print_success(&format!("Signed in as {}", account.identity().email));
    output::print_profiles(
        account.profiles(),
        account.active_profile().map(|p| p.id.as_str()),
    );
}

async fn status(app: &App) -> Result<()> {
    match app.session.start().await {
        SessionState::Authenticated(account) => {
            print_success(&format!(
                "Signed in as {} ({})",
                account.identity().email,
                account.identity().role
            ));
            output::print_profiles(
                account.profiles(),
                account.active_profile().map(|p| p.id.as_str()),
            );
        }
        SessionState::Failed { reason } => {
            output::print_error(&format!("Stored session is unreadable: {reason}"));
        }
        _ => print_info("Not signed in"),
    }
    Ok(())
}

fn profile_draft(
    name: &str,
    avatar: Avatar,
    language: Option<String>,
    maturity: Option<MaturityRating>,
) -> Result<ProfileDraft> {
    let mut draft = ProfileDraft::new(name, avatar).map_err(anyhow::Error::msg)?;
    if let Some(language) = language {
        let language = language.trim();
        if language.is_empty() {
            bail!("Language must not be empty");
        }
        draft = draft.with_language(language);
    }
    if let Some(rating) = maturity {
        draft = draft.with_maturity_rating(rating);
    }
    Ok(draft)
}

async fn profiles(app: &App, command: ProfileCommand) -> Result<()> {
    let account = app.account().await?;
    let registry = ProfileRegistry::new(&app.session);
    match command {
        ProfileCommand::List => {
            output::print_profiles(account.profiles(), None);
        }
        ProfileCommand::Create {
            name,
            avatar,
            language,
            maturity,
        } => {
            let draft = profile_draft(&name, avatar, language, maturity)?;
            let profile = registry.create(draft).await?;
            print_success(&format!("Created profile {}", output::profile_badge(&profile)));
        }
        ProfileCommand::Rename { profile, name } => {
            let target = find_profile(&account, &profile)?;
            let update = ProfileUpdate::rename(&name).map_err(anyhow::Error::msg)?;
            let renamed = registry.update(&target.id, update).await?;
            print_success(&format!("Renamed to {}", output::profile_badge(&renamed)));
        }
        ProfileCommand::Avatar { profile, avatar } => {
            let target = find_profile(&account, &profile)?;
            let update = ProfileUpdate {
                avatar: Some(avatar),
                ..ProfileUpdate::default()
            };
            let updated = registry.update(&target.id, update).await?;
            print_success(&format!("Updated {}", output::profile_badge(&updated)));
        }
        ProfileCommand::Delete { profile, yes } => {
            let target = find_profile(&account, &profile)?;
            let pending = registry.prepare_delete(&target.id)?;
            if !yes && !confirm_delete(pending.profile()) {
                output::print_error("Aborted");
                return Ok(());
            }
            registry.delete(pending).await?;
            print_success(&format!("Deleted profile {}", target.name));
        }
    }
    Ok(())
}

async fn watchlist(app: &App, command: WatchlistCommand) -> Result<()> {
    let library = Library::new(&app.session);
    match command {
        WatchlistCommand::List => {
            let movies = library.watchlist().await?;
            output::print_movies(&movies, app.lang());
        }
        WatchlistCommand::Add { movie } => {
            library.add_to_watchlist(&movie).await?;
            print_success(&format!("Added {movie} to the watchlist"));
        }
        WatchlistCommand::Remove { movie } => {
            library.remove_from_watchlist(&movie).await?;
            print_success(&format!("Removed {movie} from the watchlist"));
        }
        WatchlistCommand::Check { movie } => {
            if library.in_watchlist(&movie).await? {
                print_info(&format!("{movie} is on the watchlist"));
            } else {
                print_info(&format!("{movie} is not on the watchlist"));
            }
        }
    }
    Ok(())
}
