/// Sources module
///
/// Outbound calls to the post provider: credential exchange and listing pages.
pub mod pagination;
pub mod reddit;
