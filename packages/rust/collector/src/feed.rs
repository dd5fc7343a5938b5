//! Lightweight RSS channel parser.
//!
//! String-scanning extraction of the handful of fields the pipeline consumes
//! (`title`, `link`, `pubDate`, `description`). Handles CDATA sections and
//! the five predefined XML entities. Items missing both a title and a link
//! are dropped.

use threatwire_shared::FeedItem;

/// Parse an RSS document into feed items, in document order.
pub fn parse_channel(xml: &str) -> Vec<FeedItem> {
    extract_items(xml)
        .iter()
        .filter_map(|block| parse_item(block))
        .collect()
}

/// Extract all `<item>...</item>` blocks from the XML.
fn extract_items(xml: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut search_from = 0;

    loop {
        let start_tag = "<item>";
        let end_tag = "</item>";
        let start = match xml[search_from..].find(start_tag) {
            Some(pos) => search_from + pos,
            None => break,
        };
        let end = match xml[start..].find(end_tag) {
            Some(pos) => start + pos + end_tag.len(),
            None => break,
        };
        items.push(xml[start..end].to_string());
        search_from = end;
    }

    items
}

/// Parse a single `<item>` block. Returns `None` for items that carry
/// neither a title nor a link.
fn parse_item(block: &str) -> Option<FeedItem> {
    let title = extract_tag_text(block, "title").map(|t| clean_text(&t));
    let link = extract_tag_text(block, "link").map(|t| clean_text(&t));
    let published = extract_tag_text(block, "pubDate").map(|t| clean_text(&t));
    let summary = extract_tag_text(block, "description").map(|t| clean_text(&t));

    if title.is_none() && link.is_none() {
        return None;
    }

    Some(FeedItem {
        title: title.unwrap_or_default(),
        link,
        published,
        summary,
    })
}

/// Extract the text content of the first `<tag>` (attributes tolerated).
fn extract_tag_text(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let start_pos = xml.find(&open)?;
    let content_start = xml[start_pos..].find('>')? + start_pos + 1;
    let content_end = xml[content_start..].find(&close)? + content_start;

    Some(xml[content_start..content_end].trim().to_string())
}

/// Strip a CDATA wrapper, decode entities, and collapse whitespace.
fn clean_text(text: &str) -> String {
    let text = strip_cdata(text);
    normalize_whitespace(&decode_entities(text))
}

fn strip_cdata(text: &str) -> &str {
    text.trim()
        .strip_prefix("<![CDATA[")
        .and_then(|t| t.strip_suffix("]]>"))
        .unwrap_or(text)
        .trim()
}

/// Decode the predefined XML entities. `&amp;` last so it cannot manufacture
/// new entity sequences.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
