//! System-wide default constants.
//!
//! Service-level numbers that are not part of the versioned scoring formula.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

/// Maximum accepted request body (bytes). A scoring request is ~1 KiB.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Per-request timeout for the HTTP stack (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Storage
// ============================================================================

/// Default data directory for the sled site store.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Sled tree holding site records.
pub const SITES_TREE: &str = "sites";

// ============================================================================
// Site Listing
// ============================================================================

/// Page size used when the caller does not pass one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Smallest page size a caller can request.
pub const MIN_PAGE_SIZE: usize = 1;

/// Largest page size a caller can request.
pub const MAX_PAGE_SIZE: usize = 100;

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "ERW_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "erw_config.toml";

/// Scoring formula version shipped as the built-in default.
pub const SCORING_VERSION: &str = "3.0";
