//! Light/dark theme preference, persisted next to the session.

use crate::error::StorageError;
use crate::observer::lock;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Durable key holding the theme preference
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    System,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(format!("unknown theme preference '{}'", other)),
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color scheme reported by the host system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            other => Err(format!("unknown color scheme '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub notification: &'static str,
    pub input_background: &'static str,
    pub input_text: &'static str,
    pub button_primary: &'static str,
    pub button_secondary: &'static str,
    pub button_text: &'static str,
    pub link: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBarStyle {
    DarkContent,
    LightContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub colors: Palette,
    pub status_bar: StatusBarStyle,
}

pub const LIGHT: Theme = Theme {
    name: "light",
    colors: Palette {
        primary: "#007AFF",
        background: "#F0F2F5",
        card: "#FFFFFF",
        text: "#333333",
        border: "#E0E0E0",
        notification: "#FF3B30",
        input_background: "#F8F8F8",
        input_text: "#333333",
        button_primary: "#007AFF",
        button_secondary: "#6c757d",
        button_text: "#FFFFFF",
        link: "#007AFF",
    },
    status_bar: StatusBarStyle::DarkContent,
};

pub const DARK: Theme = Theme {
    name: "dark",
    colors: Palette {
        primary: "#BB86FC",
        background: "#121212",
        card: "#1E1E1E",
        text: "#FFFFFF",
        border: "#333333",
        notification: "#CF6679",
        input_background: "#2C2C2C",
        input_text: "#FFFFFF",
        button_primary: "#BB86FC",
        button_secondary: "#4A4A4A",
        button_text: "#FFFFFF",
        link: "#BB86FC",
    },
    status_bar: StatusBarStyle::LightContent,
};

struct ThemeState {
    preference: ThemePreference,
    system: ColorScheme,
}

pub struct ThemeStore {
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<ThemeState>,
}

impl ThemeStore {
    /// Read the stored preference. A missing, unreadable or unknown value
    /// falls back to following the system.
    pub async fn load(storage: Arc<dyn KeyValueStore>, system: ColorScheme) -> Self {
        let preference = match storage.get(THEME_KEY).await {
            Ok(Some(stored)) => stored.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring stored theme preference");
                ThemePreference::System
            }),
            Ok(None) => ThemePreference::System,
            Err(e) => {
                tracing::error!(error = %e, "failed to load theme preference from storage");
                ThemePreference::System
            }
        };

        Self {
            storage,
            state: Mutex::new(ThemeState { preference, system }),
        }
    }

    pub fn preference(&self) -> ThemePreference {
        lock(&self.state).preference
    }

    pub fn is_dark(&self) -> bool {
        let state = lock(&self.state);
        match state.preference {
            ThemePreference::Dark => true,
            ThemePreference::Light => false,
            ThemePreference::System => state.system == ColorScheme::Dark,
        }
    }

    pub fn current(&self) -> &'static Theme {
        if self.is_dark() {
            &DARK
        } else {
            &LIGHT
        }
    }

    pub fn set_system_scheme(&self, scheme: ColorScheme) {
        lock(&self.state).system = scheme;
    }

    /// Persist the opposite of the effective theme, then switch to it.
    pub async fn toggle(&self) -> Result<ThemePreference, StorageError> {
        let next = if self.is_dark() {
            ThemePreference::Light
        } else {
            ThemePreference::Dark
        };
        self.set_preference(next).await?;
        Ok(next)
    }

    pub async fn set_preference(&self, preference: ThemePreference) -> Result<(), StorageError> {
        self.storage.set(THEME_KEY, preference.as_str()).await?;
        lock(&self.state).preference = preference;
        Ok(())
    }
}
