// ABOUTME: RSS 2.0 parser walking the quick-xml event stream.
// ABOUTME: Extracts channel metadata and items, tolerating extension namespaces by local name.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::ParseError;
use crate::html_utils::{classify_content, decode_entities, strip_html};
use crate::identity::{derive_unique_id, IdSignals};
use crate::image_utils::extract_first_image;
use crate::models::{FeedType, ParsedAttachment, ParsedAuthor, ParsedFeed, ParsedHub, ParsedItem};
use crate::time_parse::parse_date;
use crate::xml_utils::{attr, attr_local, local_name};
use crate::duration_parse::parse_duration_seconds;

/// Working state for one `<item>` element.
#[derive(Default)]
struct ItemDraft {
    guid: Option<String>,
    // RSS defaults isPermaLink to true when the attribute is absent.
    guid_is_permalink: bool,
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    content_encoded: Option<String>,
    creator: Option<String>,
    author_email: Option<String>,
    pub_date: Option<String>,
    dc_date: Option<String>,
    itunes_duration: Option<String>,
    image_url: Option<String>,
    tags: Vec<String>,
    attachments: Vec<ParsedAttachment>,
}

impl ItemDraft {
    fn new() -> Self {
        ItemDraft {
            guid_is_permalink: true,
            ..Default::default()
        }
    }

    /// Builds the canonical item, or `None` when no unique ID is derivable.
    fn finalize(mut self, feed_url: &str) -> Option<ParsedItem> {
        let date_published = self
            .pub_date
            .as_deref()
            .and_then(parse_date)
            .or_else(|| self.dc_date.as_deref().and_then(parse_date));

        // content:encoded wins; a coexisting description is demoted to summary.
        let (content_html, content_text, summary) = match self.content_encoded.take() {
            Some(encoded) => {
                let (html, text) = classify_content(Some(encoded));
                let summary = self
                    .description
                    .take()
                    .map(|d| strip_html(&d))
                    .filter(|s| !s.is_empty());
                (html, text, summary)
            }
            None => {
                let (html, text) = classify_content(self.description.take());
                (html, text, None)
            }
        };

        let external_url = self.link.take().or_else(|| {
            // A permalink guid doubles as the item URL.
            self.guid
                .as_deref()
                .filter(|g| self.guid_is_permalink && looks_like_url(g))
                .map(String::from)
        });

        let mut authors = Vec::new();
        let author = ParsedAuthor {
            name: self.creator.take(),
            email_address: self.author_email.take(),
            ..Default::default()
        };
        if author.has_content() {
            authors.push(author);
        }

        if let Some(secs) = self
            .itunes_duration
            .as_deref()
            .and_then(parse_duration_seconds)
        {
            for att in self.attachments.iter_mut() {
                att.duration_in_seconds.get_or_insert(secs);
            }
        }

        let image_url = self.image_url.take().or_else(|| {
            content_html
                .as_deref()
                .and_then(|html| extract_first_image(html, external_url.as_deref()))
        });

        let unique_id = match self.guid.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            Some(guid) => guid.to_string(),
            None => {
                let signals = IdSignals {
                    date_published,
                    title: self.title.as_deref(),
                    external_url: external_url.as_deref(),
                    author_email: authors.first().and_then(|a| a.email_address.as_deref()),
                    attachment_url: self.attachments.first().map(|a| a.url.as_str()),
                    content: content_html.as_deref().or(content_text.as_deref()),
                };
                derive_unique_id(&signals)?
            }
        };

        Some(ParsedItem {
            unique_id,
            feed_url: feed_url.to_string(),
            external_url,
            title: self.title,
            content_html,
            content_text,
            summary,
            image_url,
            date_published,
            authors,
            tags: self.tags,
            attachments: self.attachments,
            ..Default::default()
        })
    }
}

/// Parses an RSS 2.0 document.
pub fn parse(data: &str, feed_url: &str) -> Result<ParsedFeed, ParseError> {
    let mut reader = Reader::from_str(data);

    let mut feed = ParsedFeed::new(FeedType::Rss, feed_url);
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut item: Option<ItemDraft> = None;
    let mut saw_channel = false;
    let mut in_channel = false;

    loop {
        match reader.read_event() {
            Err(err) => return Err(ParseError::invalid_xml(feed_url, err)),
            Ok(Event::Start(e)) => {
                let name = local_name(e.name());
                text.clear();
                match name.as_str() {
                    "channel" => {
                        saw_channel = true;
                        in_channel = true;
                    }
                    "item" => item = Some(ItemDraft::new()),
                    "guid" => {
                        if let Some(draft) = item.as_mut() {
                            draft.guid_is_permalink = !attr(&e, "isPermaLink")
                                .is_some_and(|v| v.eq_ignore_ascii_case("false"));
                        }
                    }
                    _ => handle_attribute_element(&name, &e, &mut feed, &mut item, in_channel),
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(e.name());
                handle_attribute_element(&name, &e, &mut feed, &mut item, in_channel);
            }
            Ok(Event::Text(e)) => {
                let chunk = e
                    .decode()
                    .map_err(|err| ParseError::parse_failed(FeedType::Rss, feed_url, err))?;
                text.push_str(&decode_entities(&chunk));
            }
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(&e);
                text.push_str(&decode_entities(&format!("&{name};")));
            }
            Ok(Event::CData(e)) => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.name());
                match stack.pop() {
                    Some(open) if open == name => {}
                    _ => {
                        return Err(ParseError::invalid_xml(
                            feed_url,
                            format!("mismatched closing tag </{name}>"),
                        ))
                    }
                }
                // CDATA stays verbatim; entity decoding happened per text chunk.
                let value = std::mem::take(&mut text).trim().to_string();
                match name.as_str() {
                    "channel" => in_channel = false,
                    "item" => {
                        if let Some(draft) = item.take() {
                            match draft.finalize(feed_url) {
                                Some(parsed) => feed.items.push(parsed),
                                None => {
                                    debug!(feed_url, "dropping RSS item with no derivable unique ID")
                                }
                            }
                        }
                    }
                    _ => assign_text(&name, value, &stack, &mut feed, &mut item, in_channel),
                }
            }
            Ok(Event::Eof) => {
                if !stack.is_empty() {
                    return Err(ParseError::invalid_xml(feed_url, "unexpected end of document"));
                }
                break;
            }
            Ok(_) => {}
        }
    }

    if !saw_channel {
        return Err(ParseError::RssChannelNotFound {
            feed_url: feed_url.to_string(),
        });
    }
    Ok(feed)
}

/// Elements whose payload lives in attributes: enclosures, atom:link,
/// media:thumbnail, and itunes:image.
fn handle_attribute_element(
    name: &str,
    e: &quick_xml::events::BytesStart<'_>,
    feed: &mut ParsedFeed,
    item: &mut Option<ItemDraft>,
    in_channel: bool,
) {
    match name {
        "enclosure" => {
            if let Some(draft) = item.as_mut() {
                let size = attr(e, "length").and_then(|l| l.trim().parse::<u64>().ok());
                if let Some(att) =
                    ParsedAttachment::new(attr(e, "url"), attr(e, "type"), None, size, None)
                {
                    draft.attachments.push(att);
                }
            }
        }
        "link" => {
            // atom:link carries an href attribute; the plain RSS <link> is text.
            if let Some(href) = attr(e, "href") {
                let rel = attr(e, "rel").unwrap_or_default();
                if item.is_none() && in_channel && rel == "hub" {
                    if let Some(hub) = ParsedHub::new(Some(href), Some(rel), None) {
                        feed.hubs.push(hub);
                    }
                }
            }
        }
        "thumbnail" => {
            if let Some(draft) = item.as_mut() {
                if let Some(url) = attr_local(e, "url") {
                    draft.image_url.get_or_insert(url);
                }
            }
        }
        "image" => {
            // itunes:image is attribute-styled; the bare <image> container is not.
            if let Some(href) = attr(e, "href") {
                match item.as_mut() {
                    Some(draft) => {
                        draft.image_url.get_or_insert(href);
                    }
                    None if in_channel => {
                        feed.icon_url.get_or_insert(href);
                    }
                    None => {}
                }
            }
        }
        _ => {}
    }
}

/// Routes closed-element text into the draft item or the feed.
fn assign_text(
    name: &str,
    value: String,
    stack: &[String],
    feed: &mut ParsedFeed,
    item: &mut Option<ItemDraft>,
    in_channel: bool,
) {
    if value.is_empty() {
        return;
    }
    let parent = stack.last().map(String::as_str);

    if let Some(draft) = item.as_mut() {
        // Only direct children of <item> count; nested containers such as
        // media:group must not clobber item fields by local-name collision.
        if parent != Some("item") {
            return;
        }
        match name {
            "title" => draft.title = Some(value),
            "link" => draft.link = Some(value),
            "guid" => draft.guid = Some(value),
            "description" => draft.description = Some(value),
            "encoded" => draft.content_encoded = Some(value),
            "creator" => draft.creator = Some(value),
            "author" => draft.author_email = Some(value),
            "pubDate" => draft.pub_date = Some(value),
            "date" => draft.dc_date = Some(value),
            "category" => draft.tags.push(value),
            "duration" => draft.itunes_duration = Some(value),
            _ => {}
        }
        return;
    }

    if !in_channel {
        return;
    }
    match (name, parent) {
        ("title", Some("channel")) => feed.title = Some(value),
        ("link", Some("channel")) => feed.home_page_url = Some(value),
        ("description", Some("channel")) => feed.description = Some(value),
        ("language", Some("channel")) => feed.language = Some(value),
        ("url", Some("image")) => feed.icon_url = Some(value),
        _ => {}
    }
}

fn looks_like_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
