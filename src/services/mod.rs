// ============================================================================
// PLATFORM SERVICES
// ============================================================================
pub mod platform;
pub mod reddit_client;

pub use platform::{PlatformConnector, PlatformContext};
pub use reddit_client::RedditClient;
