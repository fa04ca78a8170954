//! Test utilities for line protocol encoding

use chrono::{DateTime, Utc};

use super::LineProtocolEncoder;
use crate::app::models::{FieldType, FieldValue, Point, TypedDocument, Value};
use crate::app::services::schema::Schema;


pub fn time(rfc3339: &str) -> Value {
    Value::Time(
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc),
    )
}

pub fn schema_of(fields: &[(&str, FieldType)]) -> Schema {
    Schema::from_fields(fields.iter().map(|(name, ty)| (name.to_string(), *ty)))
}

/// Schema in the order group, cruise, speed, distance, notes, flag, time
pub fn survey_schema() -> Schema {
    schema_of(&[
        ("group", FieldType::Category),
        ("cruise", FieldType::Category),
        ("speed", FieldType::Float),
        ("distance", FieldType::Integer),
        ("notes", FieldType::Text),
        ("flag", FieldType::Boolean),
        ("time", FieldType::Time),
    ])
}

pub fn encoder(schema: &Schema) -> LineProtocolEncoder {
    LineProtocolEncoder::new("measurement", schema).unwrap()
}

/// Document holding only a time value
pub fn timed(rfc3339: &str) -> TypedDocument {
    TypedDocument::new().with("time", time(rfc3339))
}

/// Minimal line protocol reader used to check that encoded lines decode back
pub fn parse_line(line: &str) -> Point {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let mut chars = line.chars().peekable();

    let mut read_escaped = |stops: &[char]| {
        let mut out = String::new();
        while let Some(&c) = chars.peek() {
            if stops.contains(&c) {
                break;
            }
            chars.next();
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else {
                out.push(c);
            }
        }
        let stop = chars.next();
        (out, stop)
    };

    let (measurement, mut stop) = read_escaped(&[',', ' ']);

    let mut tags = Vec::new();
    while stop == Some(',') {
        let (key, _) = read_escaped(&['=']);
        let (value, next) = read_escaped(&[',', ' ']);
        tags.push((key, value));
        stop = next;
    }

    let rest: String = chars.collect();
    let (field_part, timestamp) = rest.rsplit_once(' ').unwrap();
    let fields = split_fields(field_part);

    Point {
        measurement,
        timestamp_ns: timestamp.parse().unwrap(),
        tags,
        fields,
        line_index: None,
    }
}

fn split_fields(text: &str) -> Vec<(String, FieldValue)> {
    let mut fields = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        let mut key = String::new();
        while let Some(c) = chars.next() {
            match c {
                '\\' => key.extend(chars.next()),
                '=' => break,
                _ => key.push(c),
            }
        }

        let mut raw = String::new();
        let value = if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        raw.push('"');
                    } else {
                        break;
                    }
                } else {
                    raw.push(c);
                }
            }
            FieldValue::Text(raw)
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                raw.push(c);
                chars.next();
            }
            match raw.as_str() {
                "TRUE" | "true" => FieldValue::Boolean(true),
                "FALSE" => FieldValue::Boolean(false),
                int if int.ends_with('i') => {
                    FieldValue::Integer(int.trim_end_matches('i').parse().unwrap())
                }
                float => FieldValue::Float(float.parse().unwrap()),
            }
        };
        fields.push((key, value));

        if chars.next() != Some(',') {
            break;
        }
    }

    fields
}
