//! Per-platform selector cascade.
//!
//! Every supported platform has an ordered list of selector tiers, most
//! reliable first. [`run_cascade`] tries them in order and uses the first
//! tier that matches anything; lower tiers are never merged in.

use crate::excerpt::{normalize_whitespace, visible_text};
use crate::platform::Platform;
use crate::transcript::{Role, Transcript, Turn};
use lazy_static::lazy_static;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A selector whose presence on a turn (or inside it) implies a role.
#[derive(Debug, Clone, Copy)]
pub struct RoleMarker {
    pub selector: &'static str,
    pub role: Role,
}

/// One ranked strategy for locating turns on a platform.
#[derive(Debug, Clone, Copy)]
pub struct SelectorTier {
    /// Matches turn candidate nodes.
    pub turn: &'static str,
    /// Attribute carrying an explicit role, on the node or a descendant.
    pub role_attribute: Option<&'static str>,
    /// Structural markers correlated with a role, checked in order.
    pub role_markers: &'static [RoleMarker],
    /// Message body sub-elements, checked in order.
    pub body: &'static [&'static str],
}

impl SelectorTier {
    /// A tier with no semantic role signal at all.
    pub const fn parity_only(turn: &'static str) -> Self {
        Self {
            turn,
            role_attribute: None,
            role_markers: &[],
            body: &[],
        }
    }
}

const fn marker(selector: &'static str, role: Role) -> RoleMarker {
    RoleMarker { selector, role }
}

const CHATGPT_ROLE_ATTR: &str = "data-message-author-role";
const CHATGPT_MARKERS: &[RoleMarker] = &[
    marker(".markdown", Role::Assistant),
    marker(".whitespace-pre-wrap", Role::User),
];
const CHATGPT_BODY: &[&str] = &[".markdown", ".whitespace-pre-wrap"];

const CLAUDE_MARKERS: &[RoleMarker] = &[
    marker("[data-testid='user-message']", Role::User),
    marker(".font-claude-message", Role::Assistant),
];
const CLAUDE_RENDER_MARKERS: &[RoleMarker] = &[
    marker(".font-user-message", Role::User),
    marker("[data-is-streaming]", Role::Assistant),
];
const CLAUDE_RENDER_BODY: &[&str] = &[".font-user-message", ".prose"];

const GEMINI_MARKERS: &[RoleMarker] = &[
    marker("user-query", Role::User),
    marker("model-response", Role::Assistant),
];
const GEMINI_BODY: &[&str] = &[".query-text", "message-content"];
const GEMINI_CONTAINER_MARKERS: &[RoleMarker] = &[
    marker(".query-content", Role::User),
    marker(".response-container", Role::Assistant),
];
const GEMINI_CONTAINER_BODY: &[&str] = &[".query-text", ".model-response-text"];

const GROK_TESTID_MARKERS: &[RoleMarker] = &[
    marker("[data-testid='user-message']", Role::User),
    marker("[data-testid='assistant-message']", Role::Assistant),
];
const GROK_ALIGN_MARKERS: &[RoleMarker] = &[
    marker(".items-end", Role::User),
    marker(".items-start", Role::Assistant),
];

const CHATGPT_TIERS: &[SelectorTier] = &[
    SelectorTier {
        turn: "[data-testid^='conversation-turn']",
        role_attribute: Some(CHATGPT_ROLE_ATTR),
        role_markers: CHATGPT_MARKERS,
        body: CHATGPT_BODY,
    },
    SelectorTier {
        turn: "[data-message-author-role]",
        role_attribute: Some(CHATGPT_ROLE_ATTR),
        role_markers: &[],
        body: CHATGPT_BODY,
    },
    SelectorTier::parity_only("[class*='group'], [class*='message']"),
];

const CLAUDE_TIERS: &[SelectorTier] = &[
    SelectorTier {
        turn: "[data-testid='user-message'], .font-claude-message",
        role_attribute: None,
        role_markers: CLAUDE_MARKERS,
        body: &[],
    },
    SelectorTier {
        turn: "[data-test-render-count]",
        role_attribute: None,
        role_markers: CLAUDE_RENDER_MARKERS,
        body: CLAUDE_RENDER_BODY,
    },
    SelectorTier::parity_only("[class*='message']"),
];

const GEMINI_TIERS: &[SelectorTier] = &[
    SelectorTier {
        turn: "user-query, model-response",
        role_attribute: None,
        role_markers: GEMINI_MARKERS,
        body: GEMINI_BODY,
    },
    SelectorTier {
        turn: ".conversation-container > *",
        role_attribute: None,
        role_markers: GEMINI_CONTAINER_MARKERS,
        body: GEMINI_CONTAINER_BODY,
    },
    SelectorTier::parity_only("[class*='message']"),
];

const GROK_TIERS: &[SelectorTier] = &[
    SelectorTier {
        turn: "[data-testid='user-message'], [data-testid='assistant-message']",
        role_attribute: None,
        role_markers: GROK_TESTID_MARKERS,
        body: &[],
    },
    SelectorTier {
        turn: ".message-bubble",
        role_attribute: None,
        role_markers: GROK_ALIGN_MARKERS,
        body: &[],
    },
    SelectorTier::parity_only("[class*='message']"),
];

/// The declarative tier table for a platform, most specific first.
pub fn tiers(platform: Platform) -> &'static [SelectorTier] {
    match platform {
        Platform::ChatGpt => CHATGPT_TIERS,
        Platform::Claude => CLAUDE_TIERS,
        Platform::Gemini => GEMINI_TIERS,
        Platform::Grok => GROK_TIERS,
        Platform::Unknown => &[],
    }
}

/// A tier with its selectors parsed.
struct CompiledTier {
    turn: Selector,
    role_attribute: Option<&'static str>,
    role_markers: Vec<(Selector, Role)>,
    body: Vec<Selector>,
}

impl CompiledTier {
    fn compile(tier: &SelectorTier) -> Option<Self> {
        let parse = |s: &str| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!(selector = s, error = %e, "skipping unparsable selector");
                None
            }
        };
        Some(Self {
            turn: parse(tier.turn)?,
            role_attribute: tier.role_attribute,
            role_markers: tier
                .role_markers
                .iter()
                .filter_map(|m| parse(m.selector).map(|s| (s, m.role)))
                .collect(),
            body: tier.body.iter().filter_map(|s| parse(*s)).collect(),
        })
    }
}

lazy_static! {
    static ref COMPILED: Vec<(Platform, Vec<CompiledTier>)> =
        [Platform::ChatGpt, Platform::Claude, Platform::Gemini, Platform::Grok]
            .into_iter()
            .map(|platform| {
                let compiled = tiers(platform)
                    .iter()
                    .filter_map(CompiledTier::compile)
                    .collect();
                (platform, compiled)
            })
            .collect();
}

fn compiled_tiers(platform: Platform) -> &'static [CompiledTier] {
    COMPILED
        .iter()
        .find(|(p, _)| *p == platform)
        .map(|(_, tiers)| tiers.as_slice())
        .unwrap_or(&[])
}

/// Outcome of evaluating the cascade on one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeResult {
    /// Index of the tier that matched, if any did.
    pub tier: Option<usize>,
    pub transcript: Transcript,
}

/// Evaluate the platform's tiers against an HTML snapshot.
pub fn run_cascade(html: &str, platform: Platform) -> CascadeResult {
    let document = Html::parse_document(html);

    for (index, tier) in compiled_tiers(platform).iter().enumerate() {
        let candidates = outermost(document.select(&tier.turn).collect());
        if candidates.is_empty() {
            debug!(platform = %platform, tier = index, "tier matched nothing");
            continue;
        }

        let turns: Vec<Turn> = candidates
            .into_iter()
            .enumerate()
            .filter_map(|(position, node)| {
                let role = infer_role(tier, node, position);
                Turn::accept(role, &turn_text(tier, node))
            })
            .collect();
        debug!(platform = %platform, tier = index, turns = turns.len(), "tier matched");

        return CascadeResult {
            tier: Some(index),
            transcript: Transcript::new(turns),
        };
    }

    CascadeResult {
        tier: None,
        transcript: Transcript::default(),
    }
}

/// Drop every node that has an ancestor in the same match set.
fn outermost(nodes: Vec<ElementRef<'_>>) -> Vec<ElementRef<'_>> {
    let ids: HashSet<_> = nodes.iter().map(|n| n.id()).collect();
    nodes
        .into_iter()
        .filter(|node| !node.ancestors().any(|a| ids.contains(&a.id())))
        .collect()
}

/// Role from explicit attribute, then structural marker, then position.
fn infer_role(tier: &CompiledTier, node: ElementRef<'_>, position: usize) -> Role {
    if let Some(role) = tier.role_attribute.and_then(|attr| attribute_role(node, attr)) {
        return role;
    }
    for (selector, role) in &tier.role_markers {
        if selector.matches(&node) || node.select(selector).next().is_some() {
            return *role;
        }
    }
    Role::from_parity(position)
}

fn attribute_role(node: ElementRef<'_>, attr: &str) -> Option<Role> {
    if let Some(value) = node.value().attr(attr) {
        return Role::from_marker(value);
    }
    node.descendants()
        .filter_map(ElementRef::wrap)
        .find_map(|el| el.value().attr(attr))
        .and_then(Role::from_marker)
}

/// Text of the first body selector that matches, else of the whole node.
fn turn_text(tier: &CompiledTier, node: ElementRef<'_>) -> String {
    for selector in &tier.body {
        let bodies = outermost(node.select(selector).collect());
        if !bodies.is_empty() {
            return bodies
                .into_iter()
                .map(|body| normalize_whitespace(&visible_text(body, is_hidden)))
                .collect::<Vec<_>>()
                .join("\n");
        }
    }
    normalize_whitespace(&visible_text(node, is_hidden))
}

fn is_hidden(element: &Element) -> bool {
    matches!(element.name(), "script" | "style" | "noscript" | "template")
}
