//! Well-known preference keys and their defaults.

pub const PROFILE_NAME: &str = "profile.name";
pub const PROFILE_IMAGE_URI: &str = "profile.imageUri";
pub const PROFILE_FAVORITE_BOOK: &str = "profile.favoriteBook";

pub const SETTINGS_THEME: &str = "settings.theme";
pub const SETTINGS_DARK_MODE: &str = "settings.darkMode";
pub const SETTINGS_TEXT_SIZE_MULTIPLIER: &str = "settings.textSizeMultiplier";

pub const DEFAULT_PROFILE_NAME: &str = "Reader";
pub const DEFAULT_TEXT_SIZE_MULTIPLIER: f64 = 1.0;
pub const MAX_TEXT_SIZE_PERCENT: u32 = 200;
