pub mod controller;
pub mod form;
pub mod registry;
pub mod state;
pub mod view;

// Re-exports for easier access
pub use controller::{fetch_community, resolve_identity, ToastQueue, WidgetServices, WidgetSession};
pub use form::{community_selection_form, FormSpec, FormValues};
pub use registry::SessionRegistry;
pub use state::{WidgetPhase, WidgetState};
pub use view::{render, ViewNode};
