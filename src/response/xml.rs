use quick_xml::{events::Event, Reader};
use serde_json::{Map, Value};

use crate::error::{IpcError, Result};

struct Node {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> Value {
        if self.children.is_empty() {
            Value::String(self.text)
        } else {
            Value::Object(self.children)
        }
    }
}

/// Converts an XML document into an ordered field map.
///
/// The root element is dropped. Leaf elements become strings, nested
/// elements objects and repeated siblings arrays.
pub(crate) fn parse(raw: &str) -> Result<Map<String, Value>> {
    let mut reader = Reader::from_str(raw);
    reader.trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event().map_err(invalid)? {
            Event::Start(e) => stack.push(Node::new(element_name(e.name().as_ref())?)),
            Event::Empty(e) => {
                let name = element_name(e.name().as_ref())?;
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, String::new().into()),
                    None => root = Some(Value::Object(Map::new())),
                }
            }
            Event::Text(t) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&t.unescape().map_err(invalid)?);
                }
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| IpcError::InvalidResponse("Unbalanced XML".into()))?;
                let name = node.name.clone();
                let value = node.into_value();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => root = Some(value),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match root {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(IpcError::InvalidResponse(
            "XML document carries no fields".into(),
        )),
    }
}

fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

fn element_name(name: &[u8]) -> Result<String> {
    String::from_utf8(name.to_vec())
        .map_err(|e| IpcError::InvalidResponse(format!("Element name is not UTF-8: {e}")))
}

fn invalid(e: quick_xml::Error) -> IpcError {
    IpcError::InvalidResponse(format!("Malformed XML: {e}"))
}
