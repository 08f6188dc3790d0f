//! Well-formedness check for stored payloads

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

/// Outcome of [`check_xml`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlCheck {
    pub well_formed: bool,
    /// Empty when well formed
    pub message: String,
}

impl XmlCheck {
    fn ok() -> Self {
        Self {
            well_formed: true,
            message: String::new(),
        }
    }

    fn failed(position: usize, detail: impl std::fmt::Display) -> Self {
        Self {
            well_formed: false,
            message: format!(
                "Fatal error occurred while checking xml parsability at byte {}: {}",
                position, detail
            ),
        }
    }
}

/// Check that `content` is a single well-formed XML document
pub fn check_xml(content: &[u8]) -> XmlCheck {
    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut root_seen = false;

    loop {
        let position = reader.buffer_position();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => {
                if depth == 0 && root_seen {
                    return XmlCheck::failed(position, "more than one root element");
                }
                depth += 1;
                root_seen = true;
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Empty(_)) => {
                if depth == 0 && root_seen {
                    return XmlCheck::failed(position, "more than one root element");
                }
                root_seen = true;
            }
            Ok(Event::Text(text)) => {
                if depth == 0 && !text.iter().all(u8::is_ascii_whitespace) {
                    return XmlCheck::failed(position, "content is not allowed outside the root element");
                }
            }
            Ok(Event::CData(_)) if depth == 0 => {
                return XmlCheck::failed(position, "content is not allowed outside the root element");
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return XmlCheck::failed(reader.buffer_position(), e),
        }
        buf.clear();
    }

    if !root_seen {
        return XmlCheck::failed(reader.buffer_position(), "premature end of file, no root element");
    }
    if depth > 0 {
        return XmlCheck::failed(
            reader.buffer_position(),
            format!("{} element(s) not closed", depth),
        );
    }
    XmlCheck::ok()
}
