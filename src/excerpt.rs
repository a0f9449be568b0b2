//! Generic page excerpt extraction.
//!
//! Used when a page has no recognised conversation structure and the user
//! has not selected anything: pick the most likely main-content container,
//! drop non-content subtrees and keep the first [`EXCERPT_MAX_CHARS`] of text.

use lazy_static::lazy_static;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};

/// Upper bound on the excerpt length, in chars.
pub const EXCERPT_MAX_CHARS: usize = 2000;

/// Candidate main-content containers, most specific first.
const CONTAINER_SELECTORS: [&str; 5] = ["main", "article", "[role='main']", ".content", "body"];

const STRIPPED_TAGS: [&str; 8] = [
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
];
const STRIPPED_ROLES: [&str; 4] = ["navigation", "banner", "contentinfo", "complementary"];
const STRIPPED_CLASSES: [&str; 3] = ["nav", "menu", "sidebar"];

const BLOCK_TAGS: [&str; 22] = [
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "li", "p", "pre", "section", "td", "tr",
];

lazy_static! {
    static ref CONTAINERS: Vec<Selector> = CONTAINER_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect();
}

/// Extract a cleaned, truncated excerpt of the page's main content.
pub fn extract_excerpt(html: &str) -> String {
    let document = Html::parse_document(html);
    let container = CONTAINERS
        .iter()
        .find_map(|selector| document.select(selector).find(|c| !inside_non_content(*c)))
        .unwrap_or_else(|| document.root_element());

    let text = normalize_whitespace(&visible_text(container, is_non_content));
    truncate_chars(&text, EXCERPT_MAX_CHARS)
}

/// Whether an element roots a subtree that never counts as page content.
fn is_non_content(element: &Element) -> bool {
    if STRIPPED_TAGS.contains(&element.name()) {
        return true;
    }
    if let Some(role) = element.attr("role") {
        if STRIPPED_ROLES.iter().any(|r| role.eq_ignore_ascii_case(r)) {
            return true;
        }
    }
    element
        .classes()
        .any(|class| STRIPPED_CLASSES.iter().any(|c| class.eq_ignore_ascii_case(c)))
}

/// A container nested in stripped chrome is not a candidate.
fn inside_non_content(candidate: ElementRef<'_>) -> bool {
    is_non_content(candidate.value())
        || candidate
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_non_content(ancestor.value()))
}

/// Concatenate descendant text, breaking lines at block elements and
/// skipping any subtree whose root satisfies `skip`.
pub(crate) fn visible_text(element: ElementRef<'_>, skip: fn(&Element) -> bool) -> String {
    let mut out = String::new();
    collect_text(element, skip, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, skip: fn(&Element) -> bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(child_element) => {
                if skip(child_element) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&child_element.name());
                if block {
                    out.push('\n');
                }
                collect_text(child_ref, skip, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Trim every line, collapse inner whitespace runs, drop blank lines.
pub(crate) fn normalize_whitespace(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_main_over_body() {
        let html = r#"<html><body>
            <div>Cookie banner text</div>
            <main><p>The actual article body.</p></main>
        </body></html>"#;
        assert_eq!(extract_excerpt(html), "The actual article body.");
    }

    #[test]
    fn strips_non_content_subtrees() {
        let html = r#"<html><head><title>t</title></head><body>
            <header>Site header</header>
            <nav>Home | About</nav>
            <script>var tracking = 1;</script>
            <style>p { color: red }</style>
            <div class="sidebar">Related links</div>
            <ul class="menu"><li>Menu item</li></ul>
            <div role="navigation">Breadcrumbs</div>
            <p>First paragraph.</p>
            <aside>Advert</aside>
            <p>Second   paragraph
               continues here.</p>
            <footer>Copyright</footer>
        </body></html>"#;
        let excerpt = extract_excerpt(html);
        assert_eq!(excerpt, "First paragraph.\nSecond paragraph\ncontinues here.");
        for chrome in ["Site header", "Home", "tracking", "color", "Related", "Menu item", "Breadcrumbs", "Advert", "Copyright"] {
            assert!(!excerpt.contains(chrome), "leaked {chrome}");
        }
    }

    #[test]
    fn container_inside_aside_is_passed_over() {
        let html = r#"<body>
            <aside><article>Sponsored related story teaser</article></aside>
            <article><p>The real post body.</p></article>
        </body>"#;
        assert_eq!(extract_excerpt(html), "The real post body.");
    }

    #[test]
    fn container_inside_header_falls_back_to_body() {
        let html = r#"<body>
            <header><div class="content">Site banner tagline text</div></header>
            <p>Body paragraph.</p>
        </body>"#;
        let excerpt = extract_excerpt(html);
        assert_eq!(excerpt, "Body paragraph.");
        assert!(!excerpt.contains("tagline"));
    }

    #[test]
    fn script_inside_main_is_stripped() {
        let html = "<main><p>Visible words here.</p><script>alert('x')</script></main>";
        assert_eq!(extract_excerpt(html), "Visible words here.");
    }

    #[test]
    fn excerpt_is_capped() {
        let body = "word ".repeat(1000);
        let html = format!("<article><p>{body}</p></article>");
        let excerpt = extract_excerpt(&html);
        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS);
    }

    #[test]
    fn cap_respects_char_boundaries() {
        let body = "日本語".repeat(1000);
        let html = format!("<main>{body}</main>");
        let excerpt = extract_excerpt(&html);
        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS);
    }

    #[test]
    fn block_elements_break_lines() {
        let html = "<main><p>alpha</p><p>beta</p><span>gam</span><span>ma</span></main>";
        assert_eq!(extract_excerpt(html), "alpha\nbeta\ngamma");
    }

    #[test]
    fn empty_page_yields_empty_excerpt() {
        assert_eq!(extract_excerpt(""), "");
    }
}
