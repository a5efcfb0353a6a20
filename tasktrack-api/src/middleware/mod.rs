/// Middleware modules for the API server
///
/// - `security`: Security response headers
///
/// Bearer authentication is `tasktrack_shared::auth::middleware::require_bearer`.

pub mod security;
