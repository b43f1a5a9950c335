pub mod state;

pub use state::{ClientSettings, DisplaySettings, SettingsError, SettingsStore};
