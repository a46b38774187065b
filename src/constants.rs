//! Shared default values.

use std::time::Duration;

/// Default HTTP port for `mediafold serve`.
pub const DEFAULT_PORT: u16 = 5000;

/// How many successive ports to try when the configured one is busy.
pub const DEFAULT_PORT_FALLBACK_ATTEMPTS: u16 = 10;

/// Largest number of ids the remote service accepts in one batch delete.
pub const MAX_BATCH_SIZE: usize = 100;

/// Page size requested from folder searches.
pub const DEFAULT_SEARCH_PAGE_SIZE: usize = 500;

/// Default lifetime of a cached response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Root segment some deployments prepend to asset paths.
pub const DEFAULT_ROOT_ALIAS: &str = "home";

/// Folder that holds the whole media library.
pub const DEFAULT_LIBRARY_ROOT: &str = "home";

/// Most recent images returned by the image-only library view.
pub const ALL_IMAGES_LIMIT: usize = 100;

/// Largest request body the HTTP API accepts. Uploads arrive as data URIs.
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Default per-request timeout for remote calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Public Cloudinary API endpoint.
pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "mediafold.toml";
