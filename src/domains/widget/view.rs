//! Declarative view tree handed to the UI shell.

use serde::Serialize;
use shared::utils::format::format_count;

use super::form::COMMUNITY_FORM_ID;
use super::state::{BalanceState, IdentityState, WidgetState};

const MASCOT_URL: &str =
    "https://www.redditstatic.com/devvit-dev-portal/assets/landing-page/flyingSnoo.png";
const MEMBERS_COLOR: &str = "#2F54D2";
const LIVE_COLOR: &str = "green";
const MUTED_COLOR: &str = "gray";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewNode {
    Zstack(Stack),
    Vstack(Stack),
    Hstack(Stack),
    Text(Text),
    Icon(Icon),
    Image(Image),
    Button(Button),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stack {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    pub children: Vec<ViewNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icon {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub url: String,
    pub image_width: String,
    pub image_height: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub action: ViewAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewAction {
    ShowForm { form: String },
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full(mut self) -> Self {
        self.width = Some("100%".into());
        self.height = Some("100%".into());
        self
    }

    pub fn alignment(mut self, alignment: &str) -> Self {
        self.alignment = Some(alignment.into());
        self
    }

    pub fn gap(mut self, gap: &str) -> Self {
        self.gap = Some(gap.into());
        self
    }

    pub fn padding(mut self, padding: &str) -> Self {
        self.padding = Some(padding.into());
        self
    }

    pub fn child(mut self, node: ViewNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn child_if(self, node: Option<ViewNode>) -> Self {
        match node {
            Some(node) => self.child(node),
            None => self,
        }
    }
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn size(mut self, size: &str) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.weight = Some("bold".into());
        self
    }

    pub fn color(mut self, color: Option<&str>) -> Self {
        self.color = color.map(str::to_string);
        self
    }
}

impl ViewNode {
    pub fn text(text: Text) -> Self {
        ViewNode::Text(text)
    }

    pub fn icon(name: &str, color: Option<&str>) -> Self {
        ViewNode::Icon(Icon {
            name: name.into(),
            color: color.map(str::to_string),
        })
    }

    /// Placeholder shown by the host while a freshly created post loads.
    pub fn loading_preview() -> Self {
        ViewNode::Vstack(
            Stack::new()
                .full()
                .alignment("middle center")
                .child(ViewNode::Text(Text::new("Loading ...").size("large"))),
        )
    }

    /// All text content, depth first, one line per text node.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        self.collect_text(&mut lines);
        lines.join("\n")
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ViewNode::Zstack(stack) | ViewNode::Vstack(stack) | ViewNode::Hstack(stack) => {
                for child in &stack.children {
                    child.collect_text(out);
                }
            }
            ViewNode::Text(text) => out.push(&text.text),
            ViewNode::Button(button) => out.push(&button.text),
            ViewNode::Icon(_) | ViewNode::Image(_) => {}
        }
    }
}

/// Renders the widget for the given state. Tolerates any mix of resolved and
/// pending fields.
pub fn render(state: &WidgetState) -> ViewNode {
    let snapshot = state.community.visible_snapshot();

    let heading = state.community.selected_name().map(|name| {
        ViewNode::text(
            Text::new(format!("r/{}", name))
                .size("xlarge")
                .bold()
                .color(snapshot.and_then(|s| s.theme_color.as_deref())),
        )
    });

    let members = match snapshot {
        Some(snapshot) => stat_row(
            "users-fill",
            "MEMBERS",
            MEMBERS_COLOR,
            &format_count(snapshot.member_count),
        ),
        None => ViewNode::text(Text::new("Discover and choose which subreddit to invest.")),
    };

    let live = snapshot
        .and_then(|s| s.live_count)
        .map(|live| stat_row("live-fill", "LIVE", LIVE_COLOR, &format_count(live)));

    let spinner = state.is_loading().then(|| ViewNode::icon("load", None));

    let main = Stack::new()
        .gap("medium")
        .padding("small")
        .alignment("middle center")
        .child(ViewNode::Image(Image {
            url: MASCOT_URL.into(),
            image_width: "100px".into(),
            image_height: "100px".into(),
        }))
        .child(ViewNode::Button(Button {
            text: "Find What To Invest".into(),
            icon: Some("search-fill".into()),
            action: ViewAction::ShowForm {
                form: COMMUNITY_FORM_ID.into(),
            },
        }))
        .child_if(heading)
        .child(members)
        .child_if(live)
        .child_if(spinner);

    let corner = Stack::new()
        .full()
        .alignment("top end")
        .padding("small")
        .child(ViewNode::Vstack(
            Stack::new()
                .child(muted(&format!("u/{}", username_label(&state.identity))))
                .child(muted(&balance_label(&state.balance))),
        ));

    ViewNode::Zstack(
        Stack::new()
            .full()
            .alignment("middle center")
            .child(ViewNode::Vstack(main))
            .child(ViewNode::Hstack(corner)),
    )
}

fn stat_row(icon: &str, label: &str, color: &str, value: &str) -> ViewNode {
    ViewNode::Hstack(
        Stack::new()
            .gap("medium")
            .child(ViewNode::Hstack(
                Stack::new()
                    .gap("small")
                    .child(ViewNode::icon(icon, Some(color)))
                    .child(ViewNode::text(Text::new(label).bold().color(Some(color)))),
            ))
            .child(ViewNode::text(Text::new(value).bold())),
    )
}

fn muted(text: &str) -> ViewNode {
    ViewNode::text(Text::new(text).size("small").color(Some(MUTED_COLOR)))
}

fn username_label(identity: &IdentityState) -> String {
    match identity {
        IdentityState::Resolving => "...".to_string(),
        IdentityState::Resolved(identity) => identity.display_name().to_string(),
    }
}

fn balance_label(balance: &BalanceState) -> String {
    match balance {
        BalanceState::Loaded { balance: Some(points) } => format!("{} $UPV", format_count(points)),
        _ => "$UPV".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::widget::state::{CommunityState, WidgetEvent};
    use shared::{CommunityInfo, Identity, Username};

    fn texts(state: &WidgetState) -> String {
        render(state).plain_text()
    }

    #[test]
    fn test_initial_render_shows_placeholders() {
        let out = texts(&WidgetState::new());
        assert!(out.contains("u/..."));
        assert!(out.contains("Find What To Invest"));
        assert!(out.contains("Discover and choose which subreddit to invest."));
        assert!(!out.contains("MEMBERS"));
    }

    #[test]
    fn test_loaded_render_groups_counts() {
        let state = WidgetState::new()
            .apply(WidgetEvent::IdentityResolved(Identity::User(Username::parse("spez").unwrap())))
            .apply(WidgetEvent::BalanceLoaded(Some(12_500)))
            .apply(WidgetEvent::CommunitySubmitted("rust".into()))
            .apply(WidgetEvent::CommunityLoaded {
                generation: 1,
                info: CommunityInfo {
                    id: Some("t5_2s7lj".into()),
                    name: "rust".into(),
                    subscribers_count: 1_234_567,
                    active_count: Some(2_048),
                },
                theme_color: Some("#dea584".into()),
            });

        assert!(matches!(state.community, CommunityState::Loaded { .. }));
        let out = texts(&state);
        assert!(out.contains("r/rust"));
        assert!(out.contains("1,234,567"));
        assert!(out.contains("2,048"));
        assert!(out.contains("u/spez"));
        assert!(out.contains("12,500 $UPV"));

        let json = serde_json::to_value(render(&state)).unwrap();
        assert_eq!(json["type"], "zstack");
        let heading = &json["children"][0]["children"][2];
        assert_eq!(heading["text"], "r/rust");
        assert_eq!(heading["color"], "#dea584");
    }

    #[test]
    fn test_loading_render_has_spinner() {
        let state = WidgetState::new().apply(WidgetEvent::CommunitySubmitted("rust".into()));
        let json = serde_json::to_string(&render(&state)).unwrap();
        assert!(json.contains("\"name\":\"load\""));
    }

    #[test]
    fn test_loading_preview_text() {
        assert_eq!(ViewNode::loading_preview().plain_text(), "Loading ...");
    }
}
