/// Application name
pub const APP_NAME: &str = "Friend Tracker";

/// Name of the remote collection holding contact rows
pub const CONTACT_TABLE: &str = "contact";

/// Wire format of a date-only birthday
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the date-only segment of a transported date (`YYYY-MM-DD`)
pub const DATE_ONLY_LEN: usize = 10;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Route of the login flow guarded routes redirect to
pub const LOGIN_PATH: &str = "/login";

/// Where a successful login lands when no redirect target was preserved
pub const DEFAULT_LANDING_PATH: &str = "/contacts";
