use crate::utils::error::{ColissimoError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Minimal element tree; namespace prefixes are dropped.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn named(raw: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(raw).into_owned(),
            ..Default::default()
        }
    }

    fn take_child(&mut self, name: &str) -> Option<Element> {
        let index = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(index))
    }

    fn child_text(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.text.as_str())
    }

    /// Leaves become strings, repeated siblings become arrays. Text between
    /// child elements is dropped; leaf text is kept untouched.
    fn into_value(self) -> Value {
        if self.children.is_empty() {
            return Value::String(self.text);
        }

        let mut map = Map::new();
        for child in self.children {
            let name = child.name.clone();
            let value = child.into_value();
            match map.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(name, value);
                }
            }
        }
        Value::Object(map)
    }
}

/// Extracts the `return` element of a SOAP response as a [`Value`].
///
/// A `Fault` body is reported as [`ColissimoError::SoapFault`].
pub fn parse_response(xml: &str) -> Result<Value> {
    let mut root = parse_document(strip_mime_wrapper(xml))?;

    let mut envelope = root
        .take_child("Envelope")
        .ok_or_else(|| ColissimoError::xml("missing SOAP Envelope"))?;
    let body = envelope
        .take_child("Body")
        .ok_or_else(|| ColissimoError::xml("missing SOAP Body"))?;
    let mut payload = body
        .children
        .into_iter()
        .next()
        .ok_or_else(|| ColissimoError::xml("empty SOAP Body"))?;

    if payload.name == "Fault" {
        return Err(fault_error(&payload));
    }

    let result = payload
        .take_child("return")
        .ok_or_else(|| ColissimoError::MissingField {
            field: format!("{}/return", payload.name),
        })?;

    Ok(result.into_value())
}

fn fault_error(fault: &Element) -> ColissimoError {
    // SOAP 1.1 first, then the 1.2 Code/Value + Reason/Text layout
    let code = fault
        .child_text("faultcode")
        .or_else(|| nested_text(fault, "Code", "Value"))
        .unwrap_or("Unknown");
    let message = fault
        .child_text("faultstring")
        .or_else(|| nested_text(fault, "Reason", "Text"))
        .unwrap_or("");

    ColissimoError::SoapFault {
        code: code.to_string(),
        message: message.to_string(),
    }
}

fn nested_text<'a>(element: &'a Element, outer: &str, inner: &str) -> Option<&'a str> {
    element
        .children
        .iter()
        .find(|c| c.name == outer)
        .and_then(|c| c.child_text(inner))
}

/// CXF may answer with an MTOM multipart body; keep only the envelope.
fn strip_mime_wrapper(raw: &str) -> &str {
    let Some(marker) = raw.find("Envelope") else {
        return raw;
    };
    let start = raw[..marker].rfind('<').unwrap_or(0);
    let end = raw
        .rfind("Envelope>")
        .map(|i| i + "Envelope>".len())
        .filter(|end| *end > start)
        .unwrap_or(raw.len());

    &raw[start..end]
}

fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);

    let mut stack = vec![Element::default()];

    loop {
        match reader.read_event().map_err(ColissimoError::xml)? {
            Event::Start(e) => stack.push(Element::named(e.local_name().as_ref())),
            Event::Empty(e) => {
                let element = Element::named(e.local_name().as_ref());
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(ColissimoError::xml)?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                let bytes = c.into_inner();
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&bytes));
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ColissimoError::xml("unbalanced closing tag"))?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| ColissimoError::xml("unbalanced closing tag"))?;
                parent.children.push(element);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(ColissimoError::xml("unexpected end of document"));
    }
    stack
        .pop()
        .ok_or_else(|| ColissimoError::xml("empty document"))
}
