use std::path::PathBuf;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

pub const APP_DIR_NAME: &str = "arbor";
pub const CHATS_DIR_NAME: &str = "chats";
pub const PROMPTS_DIR_NAME: &str = "prompts";
pub const LOGS_DIR_NAME: &str = "logs";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Filesystem-safe timestamp used for default chat file names.
pub const FILE_TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");

/// The platform config directory for this application, when the platform
/// reports one.
#[must_use]
pub fn default_config_root() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_DIR_NAME))
}

/// Formats the current wall-clock time for use in a file name.
pub fn file_timestamp() -> Result<String, time::error::Format> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(FILE_TIMESTAMP_FORMAT)
}

/// Strips the directory and extension from a chat or prompt file path for
/// display in pickers.
#[must_use]
pub fn display_name(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{display_name, file_timestamp};

    #[test]
    fn file_timestamp_contains_no_path_hostile_characters() {
        let stamp = file_timestamp().expect("clock formats");
        assert!(!stamp.contains([':', '/', '\\', ' ']));
    }

    #[test]
    fn display_name_strips_directory_and_extension() {
        assert_eq!(
            display_name(Path::new("/home/u/.config/arbor/chats/2026-01-05_09-00-00.json")),
            "2026-01-05_09-00-00"
        );
        assert_eq!(display_name(Path::new("notes.txt")), "notes");
    }
}
