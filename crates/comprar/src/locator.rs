//! Resilient locator resolution.
//!
//! A [`LocatorSpec`] names one logical UI target (e.g. "place order button")
//! and carries an ordered chain of selector strategies, tried from the most
//! specific markup anchor down to the most general one. The first strategy
//! that matches at least one live element wins; later strategies are never
//! evaluated. Within the winning strategy a [`Pick`] rule selects exactly
//! one element.
//!
//! Resolution is re-evaluated fresh on every call: the page mutates between
//! actions, so a [`ResolvedElement`] is only guaranteed to exist at the
//! moment it was resolved.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::driver::ElementHandle;
use crate::result::{ComprarError, ComprarResult};

/// One concrete way of querying the page tree for elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// CSS selector (e.g. `button[type="submit"]`)
    Css(String),
    /// XPath expression
    XPath(String),
    /// Leafmost elements whose text content contains the string
    Text(String),
    /// `data-testid` attribute selector
    TestId(String),
    /// ARIA role with accessible-name filter
    Role {
        /// Role name (`button`, `link`, `heading`, ...)
        role: String,
        /// Accessible name substring, matched case-insensitively
        name: String,
    },
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// Attribute substring selector (`[attr*="value"]`)
    AttrContains {
        /// Attribute name
        attr: String,
        /// Substring the attribute must contain
        value: String,
    },
}

impl Strategy {
    /// Create a CSS strategy
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath strategy
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a text-content strategy
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a test-id strategy
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a role strategy
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Create a CSS-with-text strategy
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Create an attribute-substring strategy
    #[must_use]
    pub fn attr_contains(attr: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttrContains {
            attr: attr.into(),
            value: value.into(),
        }
    }

    /// Native element selectors that carry a role implicitly.
    fn native_selector(role: &str) -> &'static str {
        match role {
            "button" => "button, input[type=\"submit\"], input[type=\"button\"]",
            "link" => "a[href]",
            "textbox" => "input:not([type]), input[type=\"text\"], input[type=\"email\"], input[type=\"password\"], textarea",
            "heading" => "h1, h2, h3, h4, h5, h6",
            "combobox" => "select",
            "listitem" => "li",
            _ => "*",
        }
    }

    /// Render a JavaScript expression that evaluates to the array of all
    /// matching elements on the current page.
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::XPath(s) => format!(
                "(() => {{ const r = document.evaluate({s:?}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                 return out; }})()"
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('*'))\
                 .filter(el => el.childElementCount === 0 && el.textContent.includes({t:?}))"
            ),
            Self::TestId(id) => {
                format!("Array.from(document.querySelectorAll('[data-testid=\"{id}\"]'))")
            }
            Self::Role { role, name } => format!(
                "(() => {{ const needle = {name:?}.toLowerCase(); \
                 return Array.from(document.querySelectorAll('[role=\"{role}\"], {natives}'))\
                 .filter(el => ((el.getAttribute('aria-label') || el.textContent || '')\
                 .toLowerCase().includes(needle))); }})()",
                natives = Self::native_selector(role),
            ),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({css:?}))\
                 .filter(el => el.textContent.includes({text:?}))"
            ),
            Self::AttrContains { attr, value } => {
                format!("Array.from(document.querySelectorAll('[{attr}*=\"{value}\"]'))")
            }
        }
    }
}

/// Deterministic disambiguation when a strategy matches several elements.
///
/// The rule is declared as part of the spec, never inferred from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pick {
    /// Take the first match in document order
    First,
    /// Take the match at a zero-based index
    Nth(usize),
    /// Take the first match whose text content contains the string
    WithText(String),
}

impl Default for Pick {
    fn default() -> Self {
        Self::First
    }
}

impl Pick {
    /// Apply the rule to the matches of the winning strategy.
    #[must_use]
    pub fn apply(&self, matches: Vec<ElementHandle>) -> Option<ElementHandle> {
        match self {
            Self::First => matches.into_iter().next(),
            Self::Nth(n) => matches.into_iter().nth(*n),
            Self::WithText(text) => matches
                .into_iter()
                .find(|el| el.text_content.as_deref().is_some_and(|t| t.contains(text.as_str()))),
        }
    }
}

/// Ordered fallback chain of selector strategies for one logical UI target.
///
/// Built fluently, mirroring how the chains read at the declaration site:
///
/// ```
/// use comprar::{LocatorSpec, Strategy};
///
/// let place_order = LocatorSpec::new(
///     "place order button",
///     Strategy::xpath("//button[normalize-space(text())=\"Place free order\"]"),
/// )
/// .or(Strategy::role("button", "place free order"))
/// .or(Strategy::css_with_text("button", "Place free order"));
///
/// assert_eq!(place_order.strategies().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorSpec {
    role: String,
    strategies: Vec<Strategy>,
    pick: Pick,
}

impl LocatorSpec {
    /// Create a spec with its most stable strategy.
    ///
    /// Requiring the first strategy at construction keeps the "at least one
    /// strategy" invariant unrepresentable to violate.
    #[must_use]
    pub fn new(role: impl Into<String>, first: Strategy) -> Self {
        Self {
            role: role.into(),
            strategies: vec![first],
            pick: Pick::First,
        }
    }

    /// Append a fallback strategy, tried only if all earlier ones matched
    /// nothing.
    #[must_use]
    pub fn or(mut self, fallback: Strategy) -> Self {
        self.strategies.push(fallback);
        self
    }

    /// Use the nth match of the winning strategy (zero-based).
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        self.pick = Pick::Nth(index);
        self
    }

    /// Use the first match containing the given text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.pick = Pick::WithText(text.into());
        self
    }

    /// Logical UI role this spec targets
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Strategies in declared order
    #[must_use]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Disambiguation rule
    #[must_use]
    pub const fn pick(&self) -> &Pick {
        &self.pick
    }

    fn not_found(&self) -> ComprarError {
        ComprarError::ElementNotFound {
            role: self.role.clone(),
            attempts: self.strategies.len(),
        }
    }
}

/// A live element together with the strategy that found it.
///
/// Ephemeral: valid for the page snapshot it was resolved against. Callers
/// re-resolve after any action that may have mutated the page.
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    /// Handle to the live element
    pub handle: ElementHandle,
    /// Index into the spec's strategy chain that produced the match
    pub strategy_index: usize,
}

/// Source of element matches for a single strategy.
///
/// Implemented by every [`Driver`](crate::Driver); kept as its own seam so
/// resolution can be unit-tested against a scripted page tree.
#[async_trait]
pub trait ElementSource: Send + Sync {
    /// All elements currently matching the strategy, in document order.
    async fn find_all(&self, strategy: &Strategy) -> ComprarResult<Vec<ElementHandle>>;
}

/// Resolve a spec against the current page state.
///
/// Strategies are evaluated in declared order; the first one yielding at
/// least one match is selected and the rest are never evaluated. Within the
/// winning strategy the spec's [`Pick`] rule chooses exactly one element; a
/// pick that selects nothing is a resolution failure, not a fall-through.
///
/// # Errors
///
/// Returns [`ComprarError::ElementNotFound`] when every strategy yields zero
/// matches, or when the pick rule rejects every match of the winning
/// strategy.
pub async fn resolve<S: ElementSource + ?Sized>(
    spec: &LocatorSpec,
    source: &S,
) -> ComprarResult<ResolvedElement> {
    for (strategy_index, strategy) in spec.strategies().iter().enumerate() {
        let matches = source.find_all(strategy).await?;
        if matches.is_empty() {
            continue;
        }
        tracing::debug!(
            role = spec.role(),
            strategy = strategy_index,
            matched = matches.len(),
            "locator strategy matched"
        );
        return spec
            .pick()
            .apply(matches)
            .map(|handle| ResolvedElement {
                handle,
                strategy_index,
            })
            .ok_or_else(|| spec.not_found());
    }
    Err(spec.not_found())
}
