// ============================================================================
// WIDGET SESSION CONTROLLER
// ============================================================================
// identity -> balance runs once at mount; info -> styles runs per form
// submission. Each step publishes a new render state through a watch channel.
// ============================================================================

use parking_lot::Mutex;
use shared::{AppError, CommunityInfo, Identity, Toast, Username};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::form::{extract_community_name, FormValues};
use super::state::{WidgetEvent, WidgetState};
use super::view::{render, ViewNode};
use crate::domains::ledger::{BalanceLedger, LedgerError};
use crate::observability::{record_community_lookup, record_toast};
use crate::services::platform::{CommunityDirectory, IdentityProvider, Notifier, SettingsProvider};

/// Dependencies shared by every session.
#[derive(Clone)]
pub struct WidgetServices {
    pub ledger: BalanceLedger,
    pub settings: Arc<dyn SettingsProvider>,
    /// Create the balance record with the configured default when it is absent.
    pub initialize_on_first_read: bool,
}

/// Per-session toast queue drained by the UI shell.
#[derive(Debug, Default)]
pub struct ToastQueue {
    pending: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.pending.lock())
    }
}

impl Notifier for ToastQueue {
    fn show_toast(&self, toast: Toast) {
        record_toast("widget");
        self.pending.lock().push(toast);
    }
}

/// Result of the info + styles lookups for one community.
#[derive(Debug, Clone)]
pub struct FetchedCommunity {
    pub info: CommunityInfo,
    pub theme_color: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct CommunityFetchError {
    /// Set when the info lookup succeeded before the failure.
    pub metadata: Option<CommunityInfo>,
    pub source: AppError,
}

/// Identity of the current user; absence and failures fall back to anonymous.
pub async fn resolve_identity(provider: &dyn IdentityProvider) -> Identity {
    match provider.current_user().await {
        Ok(Some(user)) => Identity::User(user.username),
        Ok(None) => Identity::Anonymous,
        Err(e) => {
            warn!("⚠️ Identity lookup failed, using fallback label: {}", e);
            Identity::Anonymous
        }
    }
}

/// Info lookup followed by the styles lookup keyed by the returned id.
pub async fn fetch_community(
    directory: &dyn CommunityDirectory,
    name: &str,
) -> Result<FetchedCommunity, CommunityFetchError> {
    let info = directory.community_info_by_name(name).await;
    record_community_lookup("info", info.is_ok());
    let info = info.map_err(|source| CommunityFetchError {
        metadata: None,
        source,
    })?;

    let community_id = match info.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => {
            warn!(community = %name, "Could not retrieve community id, skipping styles lookup");
            return Ok(FetchedCommunity {
                info,
                theme_color: None,
            });
        }
    };

    let styles = directory.community_styles(&community_id).await;
    record_community_lookup("styles", styles.is_ok());
    match styles {
        Ok(styles) => Ok(FetchedCommunity {
            theme_color: styles.primary_color.filter(|c| !c.trim().is_empty()),
            info,
        }),
        Err(source) => Err(CommunityFetchError {
            metadata: Some(info),
            source,
        }),
    }
}

pub struct WidgetSession {
    id: Uuid,
    state: watch::Sender<WidgetState>,
    mounted: AtomicBool,
    services: WidgetServices,
    directory: Arc<dyn CommunityDirectory>,
    toasts: Arc<ToastQueue>,
    last_seen: Mutex<Instant>,
}

impl WidgetSession {
    pub fn new(services: WidgetServices, directory: Arc<dyn CommunityDirectory>) -> Self {
        let (state, _) = watch::channel(WidgetState::new());
        Self {
            id: Uuid::new_v4(),
            state,
            mounted: AtomicBool::new(true),
            services,
            directory,
            toasts: Arc::new(ToastQueue::new()),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn snapshot(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state.subscribe()
    }

    pub fn render(&self) -> ViewNode {
        render(&self.state.borrow())
    }

    pub fn take_toasts(&self) -> Vec<Toast> {
        self.toasts.drain()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Stops the session; results that arrive afterwards are dropped.
    pub fn unmount(&self) {
        if self.mounted.swap(false, Ordering::AcqRel) {
            info!(session = %self.id, "🔌 Widget session unmounted");
        }
    }

    pub fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }

    /// Resolves the identity, then the balance of that identity.
    pub async fn mount(&self, identity_provider: &dyn IdentityProvider) {
        let identity = resolve_identity(identity_provider).await;
        info!(session = %self.id, user = %identity.display_name(), "👤 Identity resolved");

        if self.apply(WidgetEvent::IdentityResolved(identity.clone())).is_none() {
            return;
        }

        let Some(username) = identity.username() else {
            debug!(session = %self.id, "anonymous session, no balance lookup");
            return;
        };

        if self.apply(WidgetEvent::BalanceRequested).is_none() {
            return;
        }

        match self.resolve_balance(username).await {
            Ok(balance) => {
                self.apply(WidgetEvent::BalanceLoaded(balance));
            }
            Err(e) => {
                error!(session = %self.id, username = %username, retryable = e.is_retryable(), "❌ Balance lookup failed: {}", e);
                if self.apply(WidgetEvent::BalanceFailed(e.to_string())).is_some() {
                    self.toasts.show_toast(Toast::new("Could not load your $UPV balance."));
                }
            }
        }
    }

    /// Balance of a resolved user. Only reachable with a `Username`, which
    /// exists only after identity resolution.
    async fn resolve_balance(&self, username: &Username) -> Result<Option<i64>, LedgerError> {
        let ledger = &self.services.ledger;
        if self.services.initialize_on_first_read {
            let default_balance = self.services.settings.default_balance();
            ledger.read_or_initialize(username, default_balance).await.map(Some)
        } else {
            ledger.read(username).await
        }
    }

    /// Form submit handler. Never fails: lookup errors become a toast and the
    /// previous counts stay on screen.
    pub async fn submit_form(&self, values: &FormValues) {
        self.touch();

        let Some(name) = extract_community_name(values) else {
            self.toasts.show_toast(Toast::new("Enter the name of a subreddit."));
            return;
        };

        // Read under the same lock as the bump so concurrent submits each
        // keep their own generation.
        let Some(generation) = self.apply(WidgetEvent::CommunitySubmitted(name.clone())) else {
            return;
        };
        info!(session = %self.id, community = %name, generation = generation, "🔎 Community selected");

        match fetch_community(self.directory.as_ref(), &name).await {
            Ok(fetched) => {
                self.apply(WidgetEvent::CommunityLoaded {
                    generation,
                    info: fetched.info,
                    theme_color: fetched.theme_color,
                });
            }
            Err(failure) => {
                error!(session = %self.id, community = %name, "❌ Community lookup failed: {}", failure);
                let message = failure.to_string();
                let applied = self.apply(WidgetEvent::CommunityFailed {
                    generation,
                    metadata: failure.metadata,
                    message: message.clone(),
                });
                if applied.is_some() {
                    self.toasts.show_toast(Toast::new(message));
                }
            }
        }
    }

    /// Publishes the next state and returns its generation, read while the
    /// channel is still locked. `None` once the session is unmounted.
    fn apply(&self, event: WidgetEvent) -> Option<u64> {
        if !self.is_mounted() {
            debug!(session = %self.id, ?event, "session unmounted, result discarded");
            return None;
        }
        let mut generation = 0;
        self.state.send_if_modified(|state| {
            let next = state.apply(event);
            generation = next.generation;
            if next == *state {
                false
            } else {
                *state = next;
                true
            }
        });
        Some(generation)
    }
}
