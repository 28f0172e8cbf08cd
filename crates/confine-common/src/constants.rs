//! System-wide constants and default paths.

/// Default directory searched for syscall allow-list profiles.
pub const DEFAULT_SECCOMP_PROFILE_DIR: &str = "/var/lib/confine/seccomp/profiles";

/// Maximum number of characters on one allow-list line, excluding the newline.
pub const MAX_ALLOWLIST_LINE_LEN: usize = 80;

/// Whole-line allow-list token that disables syscall filtering.
pub const UNRESTRICTED_TOKEN: &str = "@unrestricted";

/// Allow-list lines starting with this byte are comments.
pub const COMMENT_PREFIX: u8 = b'#';

/// Environment variable overriding [`DEFAULT_SECCOMP_PROFILE_DIR`].
pub const ENV_SECCOMP_PROFILE_DIR: &str = "CONFINE_SECCOMP_PROFILE_DIR";

/// Environment variable whose presence skips the no-new-privileges change
/// and the privilege bracket around filter installation.
pub const ENV_NO_ROOT: &str = "CONFINE_NO_ROOT";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "confine";
