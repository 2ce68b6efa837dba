use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use html_escape::encode_text;
use log::debug;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::value::Value;
use crate::api::error::OperationError;
use crate::common::time_utils::{format_xmlrpc_datetime, parse_xmlrpc_datetime};

const XML_DECL: &str = "<?xml version=\"1.0\"?>\n";

pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECL);
    out.push_str("<methodCall><methodName>");
    out.push_str(&encode_text(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

pub fn encode_response(value: &Value) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str("<methodResponse><params><param>");
    write_value(&mut out, value);
    out.push_str("</param></params></methodResponse>");
    out
}

pub fn encode_fault(code: i64, message: &str) -> String {
    let fault = super::value::structure([
        ("faultCode", Value::Int(code)),
        ("faultString", Value::from(message)),
    ]);
    let mut out = String::from(XML_DECL);
    out.push_str("<methodResponse><fault>");
    write_value(&mut out, &fault);
    out.push_str("</fault></methodResponse>");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(i) => out.push_str(&format!("<int>{}</int>", i)),
        Value::Bool(b) => out.push_str(if *b {
            "<boolean>1</boolean>"
        } else {
            "<boolean>0</boolean>"
        }),
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&encode_text(s));
            out.push_str("</string>");
        }
        Value::Double(d) => out.push_str(&format!("<double>{}</double>", d)),
        Value::DateTime(dt) => out.push_str(&format!(
            "<dateTime.iso8601>{}</dateTime.iso8601>",
            format_xmlrpc_datetime(dt)
        )),
        Value::Base64(bytes) => {
            out.push_str("<base64>");
            out.push_str(&STANDARD.encode(bytes));
            out.push_str("</base64>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&encode_text(name));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

pub fn decode_response(body: &str) -> Result<Value, OperationError> {
    let root = parse_tree(body)?;
    if root.name != "methodResponse" {
        return Err(OperationError::parse(format!(
            "expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = decode_value(required(fault, "value")?)?;
        let code = value.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
        let message = value
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or("unknown fault")
            .to_string();
        debug!("XML-RPC fault {}: {}", code, message);
        return Err(OperationError::fault(code, message));
    }

    let params = required(&root, "params")?;
    let param = required(params, "param")?;
    decode_value(required(param, "value")?)
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn required<'a>(node: &'a Node, name: &str) -> Result<&'a Node, OperationError> {
    node.child(name).ok_or_else(|| {
        OperationError::parse(format!("<{}> is missing <{}>", node.name, name))
    })
}

fn parse_tree(body: &str) -> Result<Node, OperationError> {
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| OperationError::parse(format!("invalid XML: {}", e)))?;
        match event {
            Event::Start(e) => stack.push(Node {
                name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ..Node::default()
            }),
            Event::Empty(e) => {
                let node = Node {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ..Node::default()
                };
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| OperationError::parse("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| OperationError::parse(format!("invalid text: {}", e)))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(OperationError::parse("document ended inside an element"));
    }
    root.ok_or_else(|| OperationError::parse("empty document"))
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<(), OperationError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(OperationError::parse("multiple root elements")),
    }
    Ok(())
}

fn decode_value(node: &Node) -> Result<Value, OperationError> {
    let typed = match node.children.first() {
        Some(typed) => typed,
        // untyped <value> defaults to string
        None => return Ok(Value::String(node.text.clone())),
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .parse()
            .map(Value::Int)
            .map_err(|_| OperationError::parse(format!("invalid integer '{}'", text))),
        "boolean" => match text {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            other => Err(OperationError::parse(format!("invalid boolean '{}'", other))),
        },
        "string" => Ok(Value::String(typed.text.clone())),
        "double" => text
            .parse()
            .map(Value::Double)
            .map_err(|_| OperationError::parse(format!("invalid double '{}'", text))),
        "dateTime.iso8601" => parse_xmlrpc_datetime(text)
            .map(Value::DateTime)
            .ok_or_else(|| OperationError::parse(format!("invalid dateTime '{}'", text))),
        "base64" => {
            let compact: String = text.split_whitespace().collect();
            STANDARD
                .decode(compact)
                .map(Value::Base64)
                .map_err(|e| OperationError::parse(format!("invalid base64: {}", e)))
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children_named("member") {
                let name = required(member, "name")?.text.clone();
                let value = decode_value(required(member, "value")?)?;
                members.insert(name, value);
            }
            Ok(Value::Struct(members))
        }
        "array" => {
            let data = required(typed, "data")?;
            data.children_named("value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "nil" => Ok(Value::Nil),
        other => Err(OperationError::parse(format!("unknown value type <{}>", other))),
    }
}
