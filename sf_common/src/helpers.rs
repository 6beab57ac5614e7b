/// Interprets an on/off switch such as `SF_AUTO_MIGRATE`.
///
/// Accepts `1/0`, `true/false`, `yes/no` and `on/off` in any case. Returns `None` for anything else, so callers can
/// tell a typo from an unset variable.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
