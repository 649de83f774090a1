// ABOUTME: Atom 1.0 parser walking the quick-xml event stream.
// ABOUTME: Handles nested author elements, typed content (including raw XHTML), and link relations.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::ParseError;
use crate::html_utils::{classify_content, decode_entities, strip_html};
use crate::identity::{derive_unique_id, IdSignals};
use crate::image_utils::extract_first_image;
use crate::models::{FeedType, ParsedAttachment, ParsedAuthor, ParsedFeed, ParsedHub, ParsedItem};
use crate::time_parse::parse_date;
use crate::xml_utils::{attr, local_name};

/// Working state for one `<entry>` element.
#[derive(Default)]
struct EntryDraft {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    dc_date: Option<String>,
    creator: Option<String>,
    link_alternate: Option<String>,
    link_other: Option<String>,
    authors: Vec<ParsedAuthor>,
    tags: Vec<String>,
    attachments: Vec<ParsedAttachment>,
}

impl EntryDraft {
    /// Builds the canonical item, or `None` when no unique ID is derivable.
    fn finalize(mut self, feed_url: &str) -> Option<ParsedItem> {
        let date_published = self
            .published
            .as_deref()
            .and_then(parse_date)
            .or_else(|| self.dc_date.as_deref().and_then(parse_date));
        let date_modified = self.updated.as_deref().and_then(parse_date);

        let (content_html, content_text) = classify_content(self.content.take());
        let summary = self
            .summary
            .take()
            .map(|s| strip_html(&s))
            .filter(|s| !s.is_empty());

        let external_url = self.link_alternate.take().or_else(|| self.link_other.take());

        if self.authors.is_empty() {
            if let Some(name) = self.creator.take() {
                self.authors.push(ParsedAuthor {
                    name: Some(name),
                    ..Default::default()
                });
            }
        }

        let image_url = content_html
            .as_deref()
            .and_then(|html| extract_first_image(html, external_url.as_deref()));

        let unique_id = match self.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let signals = IdSignals {
                    date_published,
                    title: self.title.as_deref(),
                    external_url: external_url.as_deref(),
                    author_email: self.authors.first().and_then(|a| a.email_address.as_deref()),
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
            date_modified,
            authors: self.authors,
            tags: self.tags,
            attachments: self.attachments,
            ..Default::default()
        })
    }
}

/// Working state for one `<author>` element (feed- or entry-level).
#[derive(Default)]
struct AuthorDraft {
    name: Option<String>,
    uri: Option<String>,
    email: Option<String>,
}

/// Parses an Atom 1.0 document.
pub fn parse(data: &str, feed_url: &str) -> Result<ParsedFeed, ParseError> {
    let mut reader = Reader::from_str(data);

    let mut feed = ParsedFeed::new(FeedType::Atom, feed_url);
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut entry: Option<EntryDraft> = None;
    let mut author: Option<AuthorDraft> = None;
    let mut saw_feed = false;
    let mut in_feed = false;

    loop {
        match reader.read_event() {
            Err(err) => return Err(ParseError::invalid_xml(feed_url, err)),
            Ok(Event::Start(e)) => {
                let name = local_name(e.name());
                text.clear();
                match name.as_str() {
                    "feed" => {
                        saw_feed = true;
                        in_feed = true;
                        if let Some(lang) = attr(&e, "xml:lang") {
                            feed.language.get_or_insert(lang);
                        }
                    }
                    "entry" => entry = Some(EntryDraft::default()),
                    "author" => author = Some(AuthorDraft::default()),
                    "content" if attr(&e, "type").as_deref() == Some("xhtml") => {
                        // XHTML content is real markup; capture it verbatim.
                        let raw = reader
                            .read_text(e.name())
                            .map_err(|err| ParseError::invalid_xml(feed_url, err))?;
                        if let Some(draft) = entry.as_mut() {
                            draft.content = Some(raw.trim().to_string());
                        }
                        continue;
                    }
                    "link" => handle_link(&e, &mut feed, &mut entry, in_feed),
                    "category" => handle_category(&e, &mut entry),
                    _ => {}
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => match local_name(e.name()).as_str() {
                "link" => handle_link(&e, &mut feed, &mut entry, in_feed),
                "category" => handle_category(&e, &mut entry),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                let chunk = e
                    .decode()
                    .map_err(|err| ParseError::parse_failed(FeedType::Atom, feed_url, err))?;
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
                let value = std::mem::take(&mut text).trim().to_string();
                match name.as_str() {
                    "feed" => in_feed = false,
                    "entry" => {
                        if let Some(draft) = entry.take() {
                            match draft.finalize(feed_url) {
                                Some(parsed) => feed.items.push(parsed),
                                None => {
                                    debug!(feed_url, "dropping Atom entry with no derivable unique ID")
                                }
                            }
                        }
                    }
                    "author" => {
                        if let Some(draft) = author.take() {
                            let parsed = ParsedAuthor {
                                name: draft.name,
                                url: draft.uri,
                                email_address: draft.email,
                                ..Default::default()
                            };
                            if parsed.has_content() {
                                match entry.as_mut() {
                                    Some(draft) => draft.authors.push(parsed),
                                    None if in_feed => feed.authors.push(parsed),
                                    None => {}
                                }
                            }
                        }
                    }
                    _ => assign_text(&name, value, &stack, &mut feed, &mut entry, &mut author, in_feed),
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

    if !saw_feed {
        return Err(ParseError::AtomFeedNotFound {
            feed_url: feed_url.to_string(),
        });
    }
    Ok(feed)
}

/// Atom `<link>` relations. An absent rel means "alternate".
fn handle_link(
    e: &BytesStart<'_>,
    feed: &mut ParsedFeed,
    entry: &mut Option<EntryDraft>,
    in_feed: bool,
) {
    let Some(href) = attr(e, "href") else { return };
    let rel = attr(e, "rel").unwrap_or_default();

    if let Some(draft) = entry.as_mut() {
        match rel.as_str() {
            "" | "alternate" => {
                draft.link_alternate.get_or_insert(href);
            }
            "enclosure" => {
                let size = attr(e, "length").and_then(|l| l.trim().parse::<u64>().ok());
                if let Some(att) =
                    ParsedAttachment::new(Some(href), attr(e, "type"), attr(e, "title"), size, None)
                {
                    draft.attachments.push(att);
                }
            }
            _ => {
                draft.link_other.get_or_insert(href);
            }
        }
        return;
    }

    if !in_feed {
        return;
    }
    match rel.as_str() {
        "" | "alternate" => {
            feed.home_page_url.get_or_insert(href);
        }
        "hub" => {
            if let Some(hub) = ParsedHub::new(Some(href), Some(rel), None) {
                feed.hubs.push(hub);
            }
        }
        // rel="self" is ignored: feed_url is anchored to the caller's URL.
        _ => {}
    }
}

fn handle_category(e: &BytesStart<'_>, entry: &mut Option<EntryDraft>) {
    if let (Some(draft), Some(term)) = (entry.as_mut(), attr(e, "term")) {
        if !term.trim().is_empty() {
            draft.tags.push(term);
        }
    }
}

fn assign_text(
    name: &str,
    value: String,
    stack: &[String],
    feed: &mut ParsedFeed,
    entry: &mut Option<EntryDraft>,
    author: &mut Option<AuthorDraft>,
    in_feed: bool,
) {
    if value.is_empty() {
        return;
    }
    let parent = stack.last().map(String::as_str);

    if let Some(draft) = author.as_mut() {
        if parent != Some("author") {
            return;
        }
        match name {
            "name" => draft.name = Some(value),
            "uri" => draft.uri = Some(value),
            "email" => draft.email = Some(value),
            _ => {}
        }
        return;
    }

    if let Some(draft) = entry.as_mut() {
        // Only direct children of <entry>; a nested <source> block must not
        // overwrite entry fields by local-name collision.
        if parent != Some("entry") {
            return;
        }
        match name {
            "id" => draft.id = Some(value),
            "title" => draft.title = Some(value),
            "summary" => draft.summary = Some(value),
            "content" => draft.content = Some(value),
            "published" | "issued" => draft.published = Some(value),
            "updated" | "modified" => draft.updated = Some(value),
            "date" => draft.dc_date = Some(value),
            "creator" => draft.creator = Some(value),
            _ => {}
        }
        return;
    }

    if !in_feed || parent != Some("feed") {
        return;
    }
    match name {
        "title" => feed.title = Some(value),
        "subtitle" => feed.description = Some(value),
        "logo" => feed.icon_url = Some(value),
        "icon" => feed.favicon_url = Some(value),
        _ => {}
    }
}
