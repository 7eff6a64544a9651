//! Terminal rendering.

use console::style;
use streamflix::api::{ContinueWatching, Movie, Profile};

pub fn print_success(message: &str) {
    println!("{} {message}", style("✓").green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", style("✗").red());
}

pub fn print_info(message: &str) {
    println!("{} {message}", style("ℹ").blue());
}

/// A profile's name in its avatar colour.
pub fn profile_badge(profile: &Profile) -> String {
    style(&profile.name).fg(profile.avatar.color()).bold().to_string()
}

pub fn print_profiles(profiles: &[Profile], active: Option<&str>) {
    if profiles.is_empty() {
        println!("{}", style("No profiles yet").dim());
        return;
    }
    for profile in profiles {
        let marker = if active == Some(profile.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<24} {} {}",
            profile_badge(profile),
            style(&profile.id).dim(),
            style(profile.avatar).dim()
        );
    }
}

pub fn print_movies(movies: &[Movie], lang: &str) {
    if movies.is_empty() {
        println!("{}", style("No results").dim());
        return;
    }
    for movie in movies {
        println!(
            "{:<28} {} {} {}",
            style(movie.localized_title(lang)).bold(),
            movie.release_year,
            style(movie.category).cyan(),
            style(&movie.id).dim()
        );
    }
}

pub fn print_movie(movie: &Movie, lang: &str) {
    println!("{}", style(movie.localized_title(lang)).bold());
    println!(
        "{} · {} · {} min · ★ {:.1}",
        movie.release_year, movie.category, movie.duration_minutes, movie.rating
    );
    let description = movie.localized_description(lang);
    if !description.is_empty() {
        println!("\n{description}");
    }
    if !movie.tags.is_empty() {
        println!("\n{}", style(movie.tags.join(", ")).dim());
    }
    println!("{}", style(format!("id: {}  slug: {}", movie.id, movie.slug)).dim());
}

pub fn print_continue_watching(rows: &[ContinueWatching], lang: &str) {
    if rows.is_empty() {
        println!("{}", style("Nothing in progress").dim());
        return;
    }
    for row in rows {
        let total = row.movie.duration_secs().max(1);
        let percent = (row.progress.progress_seconds * 100 / total).min(100);
        println!(
            "{:<28} {:>3}%  {}",
            style(row.movie.localized_title(lang)).bold(),
            percent,
            style(row.progress.last_watched.format("%Y-%m-%d %H:%M")).dim()
        );
    }
}
