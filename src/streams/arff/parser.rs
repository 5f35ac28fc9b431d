use crate::core::attributes::{Attribute, NominalAttribute};
use crate::core::instance_header::InstanceHeader;
use crate::utils::file_parsing::{split_csv_preserving_quotes, strip_surrounding_quotes};
use std::io::{BufRead, Error, ErrorKind, Seek};

#[derive(Debug)]
pub(super) enum AttributeKind {
    Numeric,
    Nominal(Vec<String>),
}

pub(super) fn is_comment_or_empty(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.starts_with('%')
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidData, msg.into())
}

/// Reads everything up to and including `@data`. The class attribute is
/// taken out of the feature list; `class_index` defaults to the last one.
/// Returns the header, the class column and the offset of the first data line.
pub(super) fn parse_header<R: BufRead + Seek>(
    reader: &mut R,
    class_index: Option<usize>,
) -> Result<(InstanceHeader, usize, u64), Error> {
    let mut relation: Option<String> = None;
    let mut declared: Vec<(String, AttributeKind)> = Vec::new();
    let mut line = String::new();

    let data_start_pos = loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                "ARFF file ended before @data",
            ));
        }
        if is_comment_or_empty(&line) {
            continue;
        }

        let low = line.trim().to_ascii_lowercase();
        if low.starts_with("@relation") {
            let raw = line.trim()["@relation".len()..].trim();
            relation = Some(strip_surrounding_quotes(raw).to_string());
        } else if low.starts_with("@attribute") {
            declared.push(parse_attribute_line(&line)?);
        } else if low.starts_with("@data") {
            break reader.stream_position()?;
        } else {
            return Err(invalid(format!(
                "unsupported header directive: {}",
                line.trim()
            )));
        }
    };

    if declared.is_empty() {
        return Err(invalid("ARFF header declares no attributes"));
    }
    let class_index = class_index.unwrap_or(declared.len() - 1);
    if class_index >= declared.len() {
        return Err(invalid(format!(
            "class index {class_index} is out of range for {} attributes",
            declared.len()
        )));
    }

    let mut attributes = Vec::with_capacity(declared.len() - 1);
    let mut class_attribute = None;
    for (i, (name, kind)) in declared.into_iter().enumerate() {
        match (i == class_index, kind) {
            (true, AttributeKind::Nominal(values)) => {
                class_attribute = Some(NominalAttribute::with_values(name, values));
            }
            (true, AttributeKind::Numeric) => {
                return Err(invalid(format!(
                    "class attribute '{name}' must be nominal"
                )));
            }
            (false, AttributeKind::Nominal(values)) => {
                attributes.push(Attribute::nominal(name, values));
            }
            (false, AttributeKind::Numeric) => attributes.push(Attribute::numeric(name)),
        }
    }
    let class_attribute = class_attribute.ok_or_else(|| invalid("missing class attribute"))?;

    let header = InstanceHeader::new(
        relation.unwrap_or_else(|| "unnamed_relation".to_string()),
        attributes,
        class_attribute,
    );
    Ok((header, class_index, data_start_pos))
}

pub(super) fn parse_attribute_line(line: &str) -> Result<(String, AttributeKind), Error> {
    let trimmed = line.trim();
    if !trimmed.to_ascii_lowercase().starts_with("@attribute") {
        return Err(invalid("line is not '@attribute'"));
    }
    let rest = trimmed["@attribute".len()..].trim();

    let (name, after_name) = match rest.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let end = rest[1..]
                .find(quote)
                .map(|i| i + 1)
                .ok_or_else(|| invalid("attribute name without closing quote marks"))?;
            (rest[1..end].to_string(), rest[end + 1..].trim())
        }
        _ => {
            let mut it = rest.splitn(2, char::is_whitespace);
            let name = it.next().unwrap_or_default().to_string();
            let after = it.next().ok_or_else(|| invalid("attribute type is missing"))?;
            (name, after.trim())
        }
    };

    let low = after_name.to_ascii_lowercase();
    if low.starts_with("numeric") || low.starts_with("real") || low.starts_with("integer") {
        return Ok((name, AttributeKind::Numeric));
    }

    if after_name.starts_with('{') {
        let close = after_name
            .rfind('}')
            .ok_or_else(|| invalid("nominal set without closing '}'"))?;
        let values = split_csv_preserving_quotes(&after_name[1..close])
            .iter()
            .map(|s| strip_surrounding_quotes(s.trim()).to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if values.is_empty() {
            return Err(invalid("empty nominal domain"));
        }
        return Ok((name, AttributeKind::Nominal(values)));
    }

    Err(invalid(format!("attribute kind not supported: {after_name}")))
}

fn nominal_index(attribute: &NominalAttribute, raw: &str, column: usize) -> Result<usize, Error> {
    let key = strip_surrounding_quotes(raw);
    attribute.index_of_value(key).ok_or_else(|| {
        invalid(format!(
            "nominal value '{key}' not found in domain of column #{column}"
        ))
    })
}

/// Parses one data row into feature values and the class id.
pub(super) fn parse_instance_values(
    header: &InstanceHeader,
    class_index: usize,
    line: &str,
) -> Result<(Vec<f64>, usize), Error> {
    let tokens = split_csv_preserving_quotes(line);
    let expected = header.number_of_attributes() + 1;
    if tokens.len() != expected {
        return Err(invalid(format!(
            "number of columns ({}) differs from number of attributes ({expected})",
            tokens.len()
        )));
    }

    let mut values = Vec::with_capacity(expected - 1);
    let mut label = 0;
    for (column, raw) in tokens.iter().enumerate() {
        let raw = raw.trim();
        if raw == "?" {
            return Err(invalid(format!("missing value in column #{column}")));
        }
        if column == class_index {
            label = nominal_index(header.class_attribute(), raw, column)?;
            continue;
        }

        let feature = if column > class_index { column - 1 } else { column };
        match header.attribute_at_index(feature) {
            Some(Attribute::Numeric(_)) => {
                let v: f64 = raw.parse().map_err(|_| {
                    invalid(format!("invalid numeric value '{raw}' in column #{column}"))
                })?;
                values.push(v);
            }
            Some(Attribute::Nominal(nominal)) => {
                values.push(nominal_index(nominal, raw, column)? as f64);
            }
            None => return Err(invalid(format!("no attribute for column #{column}"))),
        }
    }
    Ok((values, label))
}
