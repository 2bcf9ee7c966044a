/// Router Module Index
///
/// Splits the routing table by access level. Protection is applied per route
/// in `authenticated`, so each endpoint names the permission it requires next to
/// its registration.

/// Routes open to anonymous clients.
pub mod public;

/// Routes wrapped in the permission guard.
pub mod authenticated;
