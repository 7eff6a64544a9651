//! Interactive shell. What it accepts depends on the navigation mode.

use super::output::{self, print_error, print_info, print_success};
use super::{confirm_delete, find_profile, prompt_password, App};
use anyhow::{bail, Context, Result};
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use streamflix::api::{Avatar, MovieCategory, MovieQuery, ProfileDraft, ProfileUpdate};
use streamflix::session::{Account, AppMode, NavigationGate, ProfileRegistry};
use streamflix::{Library, PlaybackTracker};

pub async fn run(app: &App) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut gate = NavigationGate::new(&app.session);
    app.session.start().await;
    print_info("Type `help` for commands, `quit` to leave.");

    loop {
        let mode = gate.mode();
        let line = match editor.readline(&prompt(&gate, mode)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        let words: Vec<&str> = line.split_whitespace().collect();
        match words[0] {
            "quit" | "exit" => break,
            "help" => {
                print_help(mode);
                continue;
            }
            _ => {}
        }

        let result = match mode {
            AppMode::LoginScreen => login_screen(app, &words).await,
            AppMode::ProfileSelection => selection(app, &mut gate, &words).await,
            AppMode::ProfileManagement => management(app, &mut gate, &words).await,
            AppMode::MainApplication => browsing(app, &words).await,
        };
        if let Err(e) = result {
            print_error(&format!("{e:#}"));
        }
    }
    Ok(())
}

fn prompt(gate: &NavigationGate, mode: AppMode) -> String {
    let snapshot = gate.snapshot();
    match (mode, snapshot.state.active_profile()) {
        (AppMode::MainApplication, Some(profile)) => {
            format!("{}> ", output::profile_badge(profile))
        }
        _ => format!("{}> ", style(mode.label()).dim()),
    }
}

fn print_help(mode: AppMode) {
    let lines: &[&str] = match mode {
        AppMode::LoginScreen => &["login [email]", "register [email]"],
        AppMode::ProfileSelection => &["list", "use <profile>", "manage", "logout"],
        AppMode::ProfileManagement => &[
            "list",
            "create <name> [avatar]",
            "rename <profile> <name>",
            "avatar <profile> <avatar>",
            "delete <profile>",
            "done",
            "logout",
        ],
        AppMode::MainApplication => &[
            "movies [search]",
            "category <category>",
            "movie <id|slug>",
            "continue",
            "watchlist",
            "toggle <movie>",
            "watch <movie> <minutes>",
            "profiles",
            "whoami",
            "logout",
        ],
    };
    println!("{} mode:", style(mode.label()).bold());
    for line in lines {
        println!("  {line}");
    }
}

fn account(app: &App) -> Result<Account> {
    app.session
        .state()
        .account()
        .cloned()
        .context("Not signed in")
}

fn arg<'a>(words: &[&'a str], index: usize, name: &str) -> Result<&'a str> {
    words
        .get(index)
        .copied()
        .with_context(|| format!("Missing <{name}>"))
}

fn minutes_to_secs(raw: &str) -> Result<u64> {
    let minutes: u64 = raw
        .parse()
        .context("<minutes> must be a whole number")?;
    minutes
        .checked_mul(60)
        .with_context(|| format!("{minutes} minutes is too long"))
}

fn unknown(command: &str) -> Result<()> {
    bail!("Unknown command `{command}`; try `help`")
}

// ── Modes ────────────────────────────────────────────────────────

async fn login_screen(app: &App, words: &[&str]) -> Result<()> {
    let register = match words[0] {
        "login" => false,
        "register" => true,
        other => return unknown(other),
    };
    let email = match words.get(1) {
        Some(email) => email.to_string(),
        None => dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .interact_text()?,
    };
    let password = prompt_password(register)?;
    if register {
        app.session.register(&email, &password).await?;
    } else {
        app.session.login(&email, &password).await?;
    }
    list_profiles(app)
}

async fn selection(app: &App, gate: &mut NavigationGate, words: &[&str]) -> Result<()> {
    match words[0] {
        "list" => list_profiles(app),
        "use" => {
            let key = words[1..].join(" ");
            let profile = find_profile(&account(app)?, &key)?;
            app.session.switch_profile(&profile.id);
            Ok(())
        }
        "manage" => {
            gate.request_management();
            Ok(())
        }
        "logout" => {
            app.session.logout();
            print_success("Signed out");
            Ok(())
        }
        other => unknown(other),
    }
}

async fn management(app: &App, gate: &mut NavigationGate, words: &[&str]) -> Result<()> {
    let registry = ProfileRegistry::new(&app.session);
    match words[0] {
        "list" => list_profiles(app),
        "create" => {
            let name = arg(words, 1, "name")?;
            let avatar = match words.get(2) {
                Some(tag) => tag.parse::<Avatar>().map_err(anyhow::Error::msg)?,
                None => Avatar::default(),
            };
            let draft = ProfileDraft::new(name, avatar).map_err(anyhow::Error::msg)?;
            let profile = registry.create(draft).await?;
            print_success(&format!("Created {}", output::profile_badge(&profile)));
            Ok(())
        }
        "rename" => {
            let target = find_profile(&account(app)?, arg(words, 1, "profile")?)?;
            let name = words.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
            let update = ProfileUpdate::rename(&name).map_err(anyhow::Error::msg)?;
            registry.update(&target.id, update).await?;
            list_profiles(app)
        }
        "avatar" => {
            let target = find_profile(&account(app)?, arg(words, 1, "profile")?)?;
            let avatar = arg(words, 2, "avatar")?
                .parse::<Avatar>()
                .map_err(anyhow::Error::msg)?;
            let update = ProfileUpdate {
                avatar: Some(avatar),
                ..ProfileUpdate::default()
            };
            registry.update(&target.id, update).await?;
            list_profiles(app)
        }
        "delete" => {
            let target = find_profile(&account(app)?, arg(words, 1, "profile")?)?;
            let pending = registry.prepare_delete(&target.id)?;
            if !confirm_delete(pending.profile()) {
                print_info("Kept");
                return Ok(());
            }
            registry.delete(pending).await?;
            print_success(&format!("Deleted {}", target.name));
            Ok(())
        }
        "done" => {
            gate.close_management();
            Ok(())
        }
        "logout" => {
            app.session.logout();
            print_success("Signed out");
            Ok(())
        }
        other => unknown(other),
    }
}

async fn browsing(app: &App, words: &[&str]) -> Result<()> {
    let library = Library::new(&app.session);
    let lang = app.lang();
    match words[0] {
        "movies" => {
            let search = (words.len() > 1).then(|| words[1..].join(" "));
            let movies = app
                .catalog()
                .list_movies(&MovieQuery {
                    search,
                    ..MovieQuery::default()
                })
                .await?;
            output::print_movies(&movies, lang);
            Ok(())
        }
        "category" => {
            let category = arg(words, 1, "category")?
                .parse::<MovieCategory>()
                .map_err(anyhow::Error::msg)?;
            let movies = app
                .catalog()
                .list_movies(&MovieQuery {
                    category: Some(category),
                    ..MovieQuery::default()
                })
                .await?;
            output::print_movies(&movies, lang);
            Ok(())
        }
        "movie" => {
            let movie = app.catalog().movie(arg(words, 1, "id")?).await?;
            output::print_movie(&movie, lang);
            Ok(())
        }
        "continue" => {
            let rows = library.continue_watching().await?;
            output::print_continue_watching(&rows, lang);
            Ok(())
        }
        "watchlist" => {
            let movies = library.watchlist().await?;
            output::print_movies(&movies, lang);
            Ok(())
        }
        "toggle" => {
            let movie = arg(words, 1, "movie")?;
            if library.toggle_watchlist(movie).await? {
                print_success(&format!("Added {movie} to the watchlist"));
            } else {
                print_success(&format!("Removed {movie} from the watchlist"));
            }
            Ok(())
        }
        "watch" => {
            let movie = app.catalog().movie(arg(words, 1, "movie")?).await?;
            let seconds = minutes_to_secs(arg(words, 2, "minutes")?)?;
            watch(app, &library, &movie, seconds).await
        }
        "profiles" => {
            app.session.leave_profile();
            Ok(())
        }
        "whoami" => {
            let account = account(app)?;
            println!("{}", account.identity().email);
            if let Some(profile) = account.active_profile() {
                println!("watching as {}", output::profile_badge(profile));
            }
            Ok(())
        }
        "logout" => {
            app.session.logout();
            print_success("Signed out");
            Ok(())
        }
        other => unknown(other),
    }
}

/// Play `movie` from the start up to `until` seconds, reporting as it goes.
async fn watch(
    app: &App,
    library: &Library<'_>,
    movie: &streamflix::api::Movie,
    until: u64,
) -> Result<()> {
    let mut tracker = PlaybackTracker::for_movie(movie, &app.config.playback);
    let step = app.config.playback.report_interval_secs.max(1);
    let end = match movie.duration_secs() {
        0 => until,
        duration => until.min(duration),
    };

    let mut position = 0;
    while position < end {
        position = position.saturating_add(step).min(end);
        if let Some(update) = tracker.observe(position) {
            library.record_progress(&movie.id, update).await?;
        }
    }
    let last = tracker.finish(end);
    library.record_progress(&movie.id, last).await?;

    print_success(&format!(
        "Watched {} to {}:{:02}{}",
        movie.localized_title(app.lang()),
        end / 60,
        end % 60,
        if last.completed { " (finished)" } else { "" }
    ));
    Ok(())
}

fn list_profiles(app: &App) -> Result<()> {
    let account = account(app)?;
    output::print_profiles(
        account.profiles(),
        account.active_profile().map(|p| p.id.as_str()),
    );
    if account.profiles().is_empty() {
        print_info("Use `manage` to create a profile");
    }
    Ok(())
}
