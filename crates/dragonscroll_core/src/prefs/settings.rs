//! Typed settings view over the preference store.
//!
//! # Invariants
//! - The text size is stored as the already-scaled multiplier; the slider
//!   percentage is converted once, at write time.
//! - Unknown stored theme/dark-mode strings read back as the default variant.

use crate::prefs::keys::{
    DEFAULT_TEXT_SIZE_MULTIPLIER, MAX_TEXT_SIZE_PERCENT, SETTINGS_DARK_MODE, SETTINGS_THEME,
    SETTINGS_TEXT_SIZE_MULTIPLIER,
};
use crate::prefs::store::{PrefError, PrefResult, PreferenceStore};
use std::str::FromStr;
use std::sync::Arc;

/// Color theme choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Default,
    Dragon,
    Ocean,
    Forest,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dragon => "dragon",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
        }
    }
}

impl FromStr for Theme {
    type Err = PrefError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "default" => Ok(Self::Default),
            "dragon" => Ok(Self::Dragon),
            "ocean" => Ok(Self::Ocean),
            "forest" => Ok(Self::Forest),
            other => Err(PrefError::invalid(
                SETTINGS_THEME,
                format!("unknown theme `{other}`"),
            )),
        }
    }
}

/// Dark mode choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DarkMode {
    /// Follow the platform setting.
    #[default]
    System,
    On,
    Off,
}

impl DarkMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl FromStr for DarkMode {
    type Err = PrefError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "system" => Ok(Self::System),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(PrefError::invalid(
                SETTINGS_DARK_MODE,
                format!("unknown dark mode `{other}`"),
            )),
        }
    }
}

/// Converts a text-size slider position (0..=200 percent) to the multiplier
/// that gets stored.
pub fn text_size_multiplier_from_percent(percent: u32) -> PrefResult<f64> {
    if percent > MAX_TEXT_SIZE_PERCENT {
        return Err(PrefError::invalid(
            SETTINGS_TEXT_SIZE_MULTIPLIER,
            format!("slider percent {percent} exceeds {MAX_TEXT_SIZE_PERCENT}"),
        ));
    }
    Ok(f64::from(percent) / 100.0)
}

/// Theme, dark mode and text size settings.
#[derive(Clone)]
pub struct Settings {
    prefs: Arc<PreferenceStore>,
}

impl Settings {
    pub fn new(prefs: Arc<PreferenceStore>) -> Self {
        Self { prefs }
    }

    pub fn theme(&self) -> Theme {
        self.prefs
            .get_opt_string(SETTINGS_THEME)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> PrefResult<()> {
        self.prefs.set_string(SETTINGS_THEME, theme.as_str())
    }

    pub fn dark_mode(&self) -> DarkMode {
        self.prefs
            .get_opt_string(SETTINGS_DARK_MODE)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_dark_mode(&self, mode: DarkMode) -> PrefResult<()> {
        self.prefs.set_string(SETTINGS_DARK_MODE, mode.as_str())
    }

    pub fn text_size_multiplier(&self) -> f64 {
        self.prefs
            .get_float(SETTINGS_TEXT_SIZE_MULTIPLIER, DEFAULT_TEXT_SIZE_MULTIPLIER)
    }

    /// Stores the multiplier for a slider position and returns it.
    pub fn set_text_size_percent(&self, percent: u32) -> PrefResult<f64> {
        let multiplier = text_size_multiplier_from_percent(percent)?;
        self.prefs
            .set_float(SETTINGS_TEXT_SIZE_MULTIPLIER, multiplier)?;
        Ok(multiplier)
    }

    /// Drops every stored preference, profile fields included.
    pub fn reset(&self) -> PrefResult<()> {
        self.prefs.clear_all()
    }
}
