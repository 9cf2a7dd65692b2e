//! CSV loaders feeding the regime engine.

pub mod activity_codes;
pub mod history_loader;
pub mod profile_loader;

pub use activity_codes::{ActivityCode, ActivityCodeLoaderError, ActivityCodeTable};
pub use history_loader::{HistoryLoadError, HistoryLoader, HistoryRow};
pub use profile_loader::{LoadedProfile, ProfileLoadError, load_from_file, load_from_str};
