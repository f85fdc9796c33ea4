/// Common constants used across the storefront.
///
/// These defaults are used for command line arguments and
/// configuration when explicit values are not provided.
pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Request header carrying the session uri (`SID:<TYPE>:<realm>:<id>`).
pub const SESSION_HEADER: &str = "Session-Id";

/// Number of log lines retained for `/api/logs`.
pub const LOG_BUFFER_SIZE: usize = 1000;
