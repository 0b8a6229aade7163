use crate::router::Screen;
use crate::session::{redact, SessionState};
use crate::theme::{Theme, ThemePreference};
use colored::*;
use serde_json::Value;

/// Alert-style failure: red title, plain message
pub fn display_error(title: &str, message: &str) {
    eprintln!("{} {}", format!("{}:", title).red().bold(), message);
}

pub fn display_success(message: &str) {
    println!("{}", message.green());
}

/// Session summary plus the screen the router would present
pub fn display_status(state: &SessionState, screen: Screen) {
    let status = state.status().to_string();
    let status = if state.is_authenticated() {
        status.green()
    } else {
        status.yellow()
    };
    println!("{} {}", "Session:".bold(), status);
    if let Some(token) = &state.token {
        println!("{} {}", "Token:".bold(), redact(token).dimmed());
    }
    println!("{} {}", "Screen:".bold(), screen.to_string().cyan());
}

pub fn display_profile(profile: &Value) {
    match serde_json::to_string_pretty(profile) {
        Ok(pretty) => println!("{}", pretty),
        Err(_) => println!("{}", profile),
    }
}

pub fn display_theme(theme: &Theme, preference: ThemePreference) {
    println!(
        "{} {} {}",
        "Theme:".bold(),
        theme.name.cyan(),
        format!("(preference: {})", preference).dimmed()
    );
    let colors = &theme.colors;
    for (name, value) in [
        ("primary", colors.primary),
        ("background", colors.background),
        ("card", colors.card),
        ("text", colors.text),
        ("link", colors.link),
    ] {
        println!("  {:<11} {}", name, value);
    }
}
