/// Path segment WordPress serves its XML-RPC endpoint from
pub const XMLRPC_PATH: &str = "xmlrpc.php";

/// Default timeout for HTTP requests in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// User agent string for HTTP requests
pub const USER_AGENT: &str = concat!("wordpress-xmlrpc/", env!("CARGO_PKG_VERSION"));

/// Blog id sent with every `wp.*` call; single-site installs ignore it
pub const DEFAULT_BLOG_ID: i64 = 1;

/// Host marker of a delegated-auth callback
pub const SSO_CALLBACK_HOST: &str = "wordpress-sso";

/// App-switch address of the WordPress app's authorization screen
pub const SSO_AUTHORIZE_URL: &str = "wordpress://oauth";

/// Fault code WordPress answers with for bad credentials
pub const FAULT_BAD_CREDENTIALS: i64 = 403;

/// XML-RPC interop fault codes, used when the server gave us none
pub const CODE_TRANSPORT: i64 = -32300;
pub const CODE_PARSE_ERROR: i64 = -32700;
pub const CODE_MALFORMED: i64 = -32600;
