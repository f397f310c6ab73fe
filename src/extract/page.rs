use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

mod selectors {
    use super::*;

    /// Containers that hold a listing's key facts, in order of preference.
    pub static ESSENTIALS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        ["div.essentials", ".listing-essentials", "#listing-essentials", ".quick-facts"]
            .iter()
            .map(|s| Selector::parse(s).unwrap())
            .collect()
    });

    pub static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

    pub static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
}

/// A parsed listing page with its list items and text pulled out once.
pub struct ListingPage {
    document: Html,
    essential_items: Vec<String>,
    items: Vec<String>,
    text: String,
}

impl ListingPage {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let essential_items = selectors::ESSENTIALS
            .iter()
            .find_map(|selector| document.select(selector).next())
            .map(|section| section.select(&selectors::LIST_ITEM).map(element_text).collect())
            .unwrap_or_default();

        let items = document
            .select(&selectors::LIST_ITEM)
            .map(element_text)
            .collect();

        let text = document
            .select(&selectors::BODY)
            .next()
            .map(element_text)
            .unwrap_or_else(|| collapse_whitespace(&document.root_element().text().collect::<String>()));

        Self {
            document,
            essential_items,
            items,
            text,
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// List items inside the essentials section; empty when the page has none.
    pub fn essential_items(&self) -> &[String] {
        &self.essential_items
    }

    /// Every list item on the page.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Whole-page text with whitespace collapsed.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Visible text of an element, whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Next sibling that is an element, skipping text nodes.
pub fn next_element_sibling<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.next_siblings().find_map(ElementRef::wrap)
}
