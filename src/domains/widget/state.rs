//! Render state of one widget session.
//!
//! The state is a single immutable value. Every change goes through
//! [`WidgetState::apply`], which returns the next value.

use serde::Serialize;
use shared::{CommunityInfo, Identity};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunitySnapshot {
    pub member_count: u64,
    /// `None` until the directory reports a live count.
    pub live_count: Option<u64>,
    pub theme_color: Option<String>,
}

impl CommunitySnapshot {
    fn from_info(info: &CommunityInfo, theme_color: Option<String>) -> Self {
        Self {
            member_count: info.subscribers_count,
            live_count: info.active_count,
            theme_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "identity", rename_all = "snake_case")]
pub enum IdentityState {
    Resolving,
    Resolved(Identity),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceState {
    Idle,
    Loading,
    /// `None` when the user has no balance record.
    Loaded { balance: Option<i64> },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommunityState {
    Idle,
    Loading {
        name: String,
        generation: u64,
        previous: Option<CommunitySnapshot>,
    },
    Loaded {
        name: String,
        snapshot: CommunitySnapshot,
    },
    Failed {
        name: String,
        retained: Option<CommunitySnapshot>,
        message: String,
    },
}

impl CommunityState {
    pub fn selected_name(&self) -> Option<&str> {
        match self {
            CommunityState::Idle => None,
            CommunityState::Loading { name, .. }
            | CommunityState::Loaded { name, .. }
            | CommunityState::Failed { name, .. } => Some(name),
        }
    }

    /// Counts and color to display; stale values stay visible while loading
    /// and after a failure.
    pub fn visible_snapshot(&self) -> Option<&CommunitySnapshot> {
        match self {
            CommunityState::Idle => None,
            CommunityState::Loading { previous, .. } => previous.as_ref(),
            CommunityState::Loaded { snapshot, .. } => Some(snapshot),
            CommunityState::Failed { retained, .. } => retained.as_ref(),
        }
    }
}

/// Phases a user can observe, derived from the render state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetPhase {
    ResolvingIdentity,
    IdentityResolved,
    AwaitingCommunitySelection,
    CommunityLoading,
    CommunityDataLoaded,
    CommunityDataFailed,
}

#[derive(Debug, Clone)]
pub enum WidgetEvent {
    IdentityResolved(Identity),
    BalanceRequested,
    BalanceLoaded(Option<i64>),
    BalanceFailed(String),
    CommunitySubmitted(String),
    CommunityLoaded {
        generation: u64,
        info: CommunityInfo,
        theme_color: Option<String>,
    },
    /// `metadata` is set when the info lookup succeeded and only the theme failed.
    CommunityFailed {
        generation: u64,
        metadata: Option<CommunityInfo>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetState {
    pub identity: IdentityState,
    pub balance: BalanceState,
    pub community: CommunityState,
    /// Bumped on every form submission.
    pub generation: u64,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetState {
    pub fn new() -> Self {
        Self {
            identity: IdentityState::Resolving,
            balance: BalanceState::Idle,
            community: CommunityState::Idle,
            generation: 0,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.identity {
            IdentityState::Resolving => None,
            IdentityState::Resolved(identity) => Some(identity),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.community, CommunityState::Loading { .. })
    }

    pub fn phase(&self) -> WidgetPhase {
        if matches!(self.identity, IdentityState::Resolving) {
            return WidgetPhase::ResolvingIdentity;
        }
        match &self.community {
            CommunityState::Loading { .. } => WidgetPhase::CommunityLoading,
            CommunityState::Loaded { .. } => WidgetPhase::CommunityDataLoaded,
            CommunityState::Failed { .. } => WidgetPhase::CommunityDataFailed,
            CommunityState::Idle if matches!(self.balance, BalanceState::Loading) => {
                WidgetPhase::IdentityResolved
            }
            CommunityState::Idle => WidgetPhase::AwaitingCommunitySelection,
        }
    }

    /// Next state after `event`. Events that do not fit the current state
    /// (a second identity, results of a superseded submission) leave it unchanged.
    pub fn apply(&self, event: WidgetEvent) -> WidgetState {
        let mut next = self.clone();
        match event {
            WidgetEvent::IdentityResolved(identity) => {
                if matches!(self.identity, IdentityState::Resolving) {
                    next.identity = IdentityState::Resolved(identity);
                } else {
                    debug!("identity already resolved, ignoring");
                }
            }
            WidgetEvent::BalanceRequested => next.balance = BalanceState::Loading,
            WidgetEvent::BalanceLoaded(balance) => next.balance = BalanceState::Loaded { balance },
            WidgetEvent::BalanceFailed(message) => next.balance = BalanceState::Failed { message },
            WidgetEvent::CommunitySubmitted(name) => {
                next.generation = self.generation + 1;
                next.community = CommunityState::Loading {
                    name,
                    generation: next.generation,
                    previous: self.community.visible_snapshot().cloned(),
                };
            }
            WidgetEvent::CommunityLoaded {
                generation,
                info,
                theme_color,
            } => {
                if let Some(name) = self.pending_name(generation) {
                    next.community = CommunityState::Loaded {
                        name,
                        snapshot: CommunitySnapshot::from_info(&info, theme_color),
                    };
                }
            }
            WidgetEvent::CommunityFailed {
                generation,
                metadata,
                message,
            } => {
                if let CommunityState::Loading { name, previous, .. } = &self.community {
                    if self.pending_name(generation).is_some() {
                        let previous_color = previous.as_ref().and_then(|p| p.theme_color.clone());
                        let retained = match metadata {
                            Some(info) => Some(CommunitySnapshot::from_info(&info, previous_color)),
                            None => previous.clone(),
                        };
                        next.community = CommunityState::Failed {
                            name: name.clone(),
                            retained,
                            message,
                        };
                    }
                }
            }
        }
        next
    }

    /// Name of the in-flight submission when `generation` is still current.
    fn pending_name(&self, generation: u64) -> Option<String> {
        match &self.community {
            CommunityState::Loading {
                name,
                generation: current,
                ..
            } if *current == generation => Some(name.clone()),
            _ => {
                debug!(generation = generation, "stale community result discarded");
                None
            }
        }
    }
}
