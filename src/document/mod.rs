// src/document/mod.rs
//! Read-only view over one rendered page.
//!
//! `Document` owns the parsed tree; `Element` is a cheap copyable handle into
//! it; `Query` is the matching predicate every field extractor is written
//! against (tag + class tokens + optional text containment).

use once_cell::sync::Lazy;
use scraper::{node::Node, ElementRef, Html, Selector};

use crate::utils::error::ExtractError;

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

/// A parsed page. html5ever recovers from any malformed input, so parsing
/// never fails.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self { html: Html::parse_document(markup) }
    }

    /// All elements matching `query`, in document order.
    pub fn find_all(&self, query: &Query) -> Vec<Element<'_>> {
        self.html
            .select(&query.selector)
            .map(Element::from)
            .filter(|el| query.text_matches(el))
            .collect()
    }

    pub fn find_first(&self, query: &Query) -> Option<Element<'_>> {
        self.html
            .select(&query.selector)
            .map(Element::from)
            .find(|el| query.text_matches(el))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
}

impl<'a> From<ElementRef<'a>> for Element<'a> {
    fn from(inner: ElementRef<'a>) -> Self {
        Self { inner }
    }
}

impl<'a> Element<'a> {
    pub fn tag(&self) -> &'a str {
        self.inner.value().name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.value().attr(name)
    }

    /// Concatenation of every text node in the subtree.
    pub fn text(&self) -> String {
        self.inner.text().collect()
    }

    /// Text of this element's direct text children only.
    pub fn own_text(&self) -> String {
        let mut out = String::new();
        for node in self.inner.children() {
            if let Node::Text(text_node) = node.value() {
                out.push_str(&text_node.text);
            }
        }
        out
    }

    pub fn inner_html(&self) -> String {
        self.inner.inner_html()
    }

    pub fn parent(&self) -> Option<Element<'a>> {
        self.inner.parent().and_then(ElementRef::wrap).map(Element::from)
    }

    pub fn children(&self) -> Vec<Element<'a>> {
        self.inner.children().filter_map(ElementRef::wrap).map(Element::from).collect()
    }

    /// Following element siblings, nearest first.
    pub fn next_siblings(&self) -> impl Iterator<Item = Element<'a>> {
        self.inner.next_siblings().filter_map(ElementRef::wrap).map(Element::from)
    }

    pub fn find_first(&self, query: &Query) -> Option<Element<'a>> {
        self.inner
            .select(&query.selector)
            .map(Element::from)
            .find(|el| query.text_matches(el))
    }

    /// `tr` elements below this one (intended for tables).
    pub fn rows(&self) -> Vec<Element<'a>> {
        self.inner.select(&ROW_SELECTOR).map(Element::from).collect()
    }

    /// Direct `th`/`td` children of a row.
    pub fn cells(&self) -> Vec<Cell<'a>> {
        self.children()
            .into_iter()
            .filter_map(|el| match el.tag() {
                "th" => Some(Cell { element: el, is_header: true }),
                "td" => Some(Cell { element: el, is_header: false }),
                _ => None,
            })
            .collect()
    }
}

/// One table cell; `is_header` is true for `th`.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub element: Element<'a>,
    pub is_header: bool,
}

impl<'a> Cell<'a> {
    /// Trimmed subtree text.
    pub fn text(&self) -> String {
        self.element.text().trim().to_string()
    }
}

#[derive(Debug, Clone)]
enum TextMatch {
    Subtree(String),
    SubtreeCi(String),
    SubtreeAny(Vec<String>),
    OwnCi(String),
}

impl TextMatch {
    fn holds(&self, el: &Element<'_>) -> bool {
        match self {
            TextMatch::Subtree(needle) => el.text().contains(needle.as_str()),
            TextMatch::SubtreeCi(needle) => el.text().to_lowercase().contains(needle.as_str()),
            TextMatch::SubtreeAny(needles) => {
                let text = el.text();
                needles.iter().any(|n| text.contains(n.as_str()))
            }
            TextMatch::OwnCi(needle) => el.own_text().to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Tag + class-token predicate compiled to a CSS selector, optionally
/// narrowed by text containment. Chained text conditions must all hold.
#[derive(Debug, Clone)]
pub struct Query {
    selector: Selector,
    text: Vec<TextMatch>,
}

impl Query {
    /// `classes` is a whitespace-separated token list; every token must be
    /// present on the element (case-sensitive). Either part may be empty.
    pub fn new(tag: Option<&str>, classes: &str) -> Result<Self, ExtractError> {
        let mut css = tag.unwrap_or("*").to_string();
        for token in classes.split_whitespace() {
            css.push('.');
            css.push_str(token);
        }
        let selector = Selector::parse(&css).map_err(|e| ExtractError::Selector {
            selector: css.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { selector, text: Vec::new() })
    }

    pub fn tag(tag: &str) -> Result<Self, ExtractError> {
        Self::new(Some(tag), "")
    }

    /// Subtree text must contain `needle` exactly.
    pub fn containing(mut self, needle: &str) -> Self {
        self.text.push(TextMatch::Subtree(needle.to_string()));
        self
    }

    /// Subtree text must contain `needle`, ignoring case.
    pub fn containing_ci(mut self, needle: &str) -> Self {
        self.text.push(TextMatch::SubtreeCi(needle.to_lowercase()));
        self
    }

    /// Subtree text must contain at least one of `needles` exactly.
    pub fn containing_any(mut self, needles: &[&str]) -> Self {
        self.text.push(TextMatch::SubtreeAny(needles.iter().map(|n| n.to_string()).collect()));
        self
    }

    /// The element's own text nodes must contain `needle`, ignoring case.
    pub fn owning_ci(mut self, needle: &str) -> Self {
        self.text.push(TextMatch::OwnCi(needle.to_lowercase()));
        self
    }

    fn text_matches(&self, el: &Element<'_>) -> bool {
        self.text.iter().all(|m| m.holds(el))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="pill a">Equity</div>
          <div class="pill">Large Cap</div>
          <table>
            <tr><th>Fund benchmark</th><td> Nifty 50 TRI </td></tr>
          </table>
          <p>Fund size <b>₹1,234Cr</b></p>
        </body></html>
    "#;

    #[test]
    fn finds_by_tag_and_class_tokens() {
        let doc = Document::parse(PAGE);
        let pills = doc.find_all(&Query::new(Some("div"), "pill").unwrap());
        assert_eq!(pills.len(), 2);
        let both = doc.find_all(&Query::new(Some("div"), "a pill").unwrap());
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].text(), "Equity");
        // class lookup is case-sensitive
        assert!(doc.find_first(&Query::new(Some("div"), "Pill").unwrap()).is_none());
    }

    #[test]
    fn text_predicates() {
        let doc = Document::parse(PAGE);
        let owning = doc.find_all(&Query::new(None, "").unwrap().owning_ci("FUND SIZE"));
        assert_eq!(owning.len(), 1);
        assert_eq!(owning[0].tag(), "p");
        assert_eq!(owning[0].own_text().trim(), "Fund size");
        assert!(owning[0].inner_html().contains("<b>₹1,234Cr</b>"));

        let tables = doc.find_all(&Query::tag("table").unwrap().containing("Fund benchmark"));
        assert_eq!(tables.len(), 1);
        assert!(doc.find_first(&Query::tag("table").unwrap().containing("fund benchmark")).is_none());
        assert!(doc.find_first(&Query::tag("table").unwrap().containing_ci("fund BENCHMARK")).is_some());
    }

    #[test]
    fn chained_text_conditions_all_hold() {
        let doc = Document::parse(
            "<table><tr><td>Alpha</td></tr></table><table><tr><td>Alpha</td><td>Beta</td></tr></table>",
        );
        let both = Query::tag("table").unwrap().containing("Alpha").containing("Beta");
        assert_eq!(doc.find_all(&both).len(), 1);

        let either = Query::tag("table").unwrap().containing_any(&["Beta", "Gamma"]);
        assert_eq!(doc.find_all(&either).len(), 1);
        let none = Query::tag("table").unwrap().containing_any(&["Gamma"]);
        assert!(doc.find_first(&none).is_none());
    }

    #[test]
    fn table_traversal() {
        let doc = Document::parse(PAGE);
        let table = doc.find_first(&Query::tag("table").unwrap()).unwrap();
        let rows = table.rows();
        assert_eq!(rows.len(), 1);
        let cells = rows[0].cells();
        assert_eq!(cells.len(), 2);
        assert!(cells[0].is_header);
        assert!(!cells[1].is_header);
        assert_eq!(cells[1].text(), "Nifty 50 TRI");
        assert_eq!(cells[1].element.parent().map(|p| p.tag()), Some("tr"));
        assert_eq!(cells[0].element.next_siblings().next().map(|s| s.tag()), Some("td"));
        assert_eq!(cells[0].element.next_siblings().count(), 1);
    }

    #[test]
    fn malformed_markup_still_parses() {
        let doc = Document::parse("<table><tr><td>1Y<td>15%</table><div class=");
        let table = doc.find_first(&Query::tag("table").unwrap()).unwrap();
        assert_eq!(table.rows()[0].cells().len(), 2);
    }

    #[test]
    fn invalid_class_token_is_an_error() {
        assert!(matches!(Query::new(Some("div"), "1bad"), Err(ExtractError::Selector { .. })));
    }
}
