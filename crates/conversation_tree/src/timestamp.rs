use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

/// Wall-clock format used for node timestamps and the persisted `time`
/// field: `YYYY-MM-DD HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Formats the current wall-clock time, falling back to UTC when the local
/// offset cannot be determined (e.g. in sandboxed test environments).
pub fn now_timestamp() -> Result<String, time::error::Format> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(TIMESTAMP_FORMAT)
}
