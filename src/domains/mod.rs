pub mod ledger;
pub mod menu;
pub mod settings;
pub mod widget;

// Re-export domain entry points for easier access
pub use ledger::BalanceLedger;
pub use widget::{SessionRegistry, WidgetServices, WidgetSession};
