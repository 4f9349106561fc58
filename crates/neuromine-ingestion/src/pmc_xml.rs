//! Field extraction from PMC full-text XML (JATS).
//!
//! Only the first `article-title`, `abstract` and `body` elements are read.
//! Each field is the concatenated text of all descendants, with markup
//! dropped, so `<italic>in vivo</italic>` contributes `in vivo`.

use neuromine_common::{NeuromineError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::models::ArticleDocument;

const TAGS: [&[u8]; 3] = [b"article-title", b"abstract", b"body"];

#[derive(Default)]
struct Capture {
    /// Open elements with this capture's tag name; > 0 while inside.
    depth: usize,
    text: Option<String>,
}

impl Capture {
    fn done(&self) -> bool {
        self.depth == 0 && self.text.is_some()
    }
}

/// Parse one efetch document into its title, abstract and body text.
pub fn parse_article(identifier: &str, xml: &str) -> Result<ArticleDocument> {
    let mut reader = Reader::from_str(xml);
    let mut captures: [Capture; 3] = Default::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                for (cap, tag) in captures.iter_mut().zip(TAGS) {
                    if e.name().as_ref() != tag {
                        continue;
                    }
                    if cap.depth > 0 {
                        cap.depth += 1;
                    } else if !cap.done() {
                        cap.depth = 1;
                        cap.text = Some(String::new());
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                for (cap, tag) in captures.iter_mut().zip(TAGS) {
                    if cap.depth > 0 && e.name().as_ref() == tag {
                        cap.depth -= 1;
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                for (cap, tag) in captures.iter_mut().zip(TAGS) {
                    if cap.depth == 0 && cap.text.is_none() && e.name().as_ref() == tag {
                        cap.text = Some(String::new());
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = match e.unescape() {
                    Ok(t) => t.into_owned(),
                    // Entities declared in the DTD are kept verbatim.
                    Err(_) => String::from_utf8_lossy(e).into_owned(),
                };
                push_text(&mut captures, &text);
            }
            Ok(Event::CData(ref e)) => {
                push_text(&mut captures, &String::from_utf8_lossy(e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(NeuromineError::Xml(format!(
                    "{identifier}: byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        if captures.iter().all(Capture::done) {
            break;
        }
        buf.clear();
    }

    let [title, abstract_text, body] = captures.map(|c| c.text);
    Ok(ArticleDocument {
        identifier: identifier.to_string(),
        title: title.map(|t| t.trim().to_string()),
        abstract_text,
        body,
    })
}

fn push_text(captures: &mut [Capture; 3], text: &str) {
    for cap in captures.iter_mut().filter(|c| c.depth > 0) {
        if let Some(buf) = cap.text.as_mut() {
            buf.push_str(text);
        }
    }
}
