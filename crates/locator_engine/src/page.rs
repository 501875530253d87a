use ego_tree::NodeRef;
use locator_core::LinkCandidate;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const DEFAULT_MAX_ANCHORS: usize = 5_000;

/// Takes [`LinkCandidate`] snapshots of the anchors in a static HTML page.
///
/// Visibility and enabled state are read from markup only: `hidden`,
/// `aria-hidden`, inline `display:none`/`visibility:hidden` and non-rendered
/// containers hide an anchor; `disabled` or `aria-disabled` disables it.
/// Hrefs are resolved against `base_url`; anchors without one keep an empty href.
pub struct AnchorSnapshotter {
    max_anchors: usize,
}

impl AnchorSnapshotter {
    pub fn new() -> Self {
        Self::with_max_anchors(DEFAULT_MAX_ANCHORS)
    }

    pub fn with_max_anchors(max_anchors: usize) -> Self {
        Self { max_anchors }
    }

    pub fn snapshot(&self, html: &str, base_url: Option<&str>) -> Vec<LinkCandidate> {
        let document = Html::parse_document(html);
        let base = base_url.and_then(|b| Url::parse(b).ok());
        let Ok(anchors) = Selector::parse("a") else {
            return Vec::new();
        };

        document
            .select(&anchors)
            .take(self.max_anchors)
            .map(|anchor| LinkCandidate {
                text: visible_text(anchor),
                href: anchor
                    .value()
                    .attr("href")
                    .and_then(|raw| resolve_href(raw, base.as_ref()))
                    .unwrap_or_default(),
                visible: is_displayed(anchor),
                enabled: is_enabled(anchor.value()),
            })
            .collect()
    }
}

impl Default for AnchorSnapshotter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper over a default [`AnchorSnapshotter`].
pub fn snapshot_anchors(html: &str, base_url: Option<&str>) -> Vec<LinkCandidate> {
    AnchorSnapshotter::new().snapshot(html, base_url)
}

fn visible_text(anchor: ElementRef) -> String {
    let mut out = String::new();
    collect_text(*anchor, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                out.push(' ');
                out.push_str(text);
            }
            Node::Element(element) if !is_hidden(element) => collect_text(child, out),
            _ => {}
        }
    }
}

fn is_displayed(anchor: ElementRef) -> bool {
    if is_hidden(anchor.value()) {
        return false;
    }
    !anchor
        .ancestors()
        .filter_map(|node| node.value().as_element())
        .any(is_hidden)
}

fn is_hidden(element: &Element) -> bool {
    if matches!(
        element.name(),
        "head" | "template" | "noscript" | "script" | "style"
    ) {
        return true;
    }
    if element.attr("hidden").is_some() {
        return true;
    }
    if element
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    element.attr("style").is_some_and(style_hides)
}

fn style_hides(style: &str) -> bool {
    style.split(';').any(|decl| {
        let Some((prop, value)) = decl.split_once(':') else {
            return false;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        (prop == "display" && value.starts_with("none"))
            || (prop == "visibility" && (value.starts_with("hidden") || value.starts_with("collapse")))
    })
}

fn is_enabled(element: &Element) -> bool {
    element.attr("disabled").is_none()
        && !element
            .attr("aria-disabled")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn resolve_href(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.and_then(|base| base.join(trimmed).ok())
        .map(Into::into)
        .or_else(|| Some(trimmed.to_string()))
}
