/// Environment variable `main` sets when `--verbose` is passed.
pub const VERBOSE_ENV: &str = "IPA_REPO_VERBOSE";

pub fn is_enabled() -> bool {
    std::env::var(VERBOSE_ENV).is_ok()
}

/// Print a `[VERBOSE]` diagnostic line on stderr when verbose output is enabled.
pub fn log(message: impl AsRef<str>) {
    if is_enabled() {
        eprintln!("[VERBOSE] {}", message.as_ref());
    }
}
