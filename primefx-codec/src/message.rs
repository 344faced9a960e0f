use crate::{error::CodecError, tags};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// FIX timestamp format: `YYYYMMDD-HH:MM:SS.sss`.
const UTC_TIMESTAMP_FMT: &str = "%Y%m%d-%H:%M:%S%.3f";

/// Anything that can be rendered as a FIX field value.
pub trait FieldValue {
    fn to_field(&self) -> String;
}

macro_rules! impl_field_value_display {
    ($($ty:ty),*) => {
        $(impl FieldValue for $ty {
            fn to_field(&self) -> String {
                self.to_string()
            }
        })*
    };
}

impl_field_value_display!(i64, u32, u64, char, &str, String, Decimal);

impl FieldValue for bool {
    fn to_field(&self) -> String {
        if *self { "Y".to_string() } else { "N".to_string() }
    }
}

impl FieldValue for DateTime<Utc> {
    fn to_field(&self) -> String {
        self.format(UTC_TIMESTAMP_FMT).to_string()
    }
}

/// A decoded or to-be-encoded FIX message: an ordered list of `tag=value`
/// pairs. Order is preserved because repeating groups are delimited
/// positionally (counter-tag-then-first-element-tag), and because FIX
/// requires `BeginString`/`BodyLength` first and `CheckSum` last.
///
/// The codec does not interpret semantics; a `Message` is an opaque field
/// map exposing typed accessors (spec.md §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    fields: Vec<(u32, String)>,
}

impl Message {
    pub fn builder(msg_type: impl FieldValue) -> MessageBuilder {
        MessageBuilder::new(msg_type)
    }

    pub fn from_fields(fields: Vec<(u32, String)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(u32, String)] {
        &self.fields
    }

    pub fn msg_type(&self) -> Option<&str> {
        self.get_str(tags::MSG_TYPE)
    }

    /// First occurrence of `tag`, as a raw string slice.
    pub fn get_str(&self, tag: u32) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    pub fn require_str(&self, tag: u32) -> Result<&str, CodecError> {
        self.get_str(tag).ok_or(CodecError::MissingTag(tag))
    }

    pub fn get_int(&self, tag: u32) -> Result<Option<i64>, CodecError> {
        self.get_str(tag)
            .map(|v| {
                v.parse::<i64>().map_err(|_| CodecError::TypeCoercion {
                    tag,
                    value: v.to_string(),
                    expected: "int",
                })
            })
            .transpose()
    }

    pub fn require_int(&self, tag: u32) -> Result<i64, CodecError> {
        self.get_int(tag)?.ok_or(CodecError::MissingTag(tag))
    }

    pub fn get_decimal(&self, tag: u32) -> Result<Option<Decimal>, CodecError> {
        self.get_str(tag)
            .map(|v| {
                Decimal::from_str(v).map_err(|_| CodecError::TypeCoercion {
                    tag,
                    value: v.to_string(),
                    expected: "decimal",
                })
            })
            .transpose()
    }

    pub fn require_decimal(&self, tag: u32) -> Result<Decimal, CodecError> {
        self.get_decimal(tag)?.ok_or(CodecError::MissingTag(tag))
    }

    pub fn get_char(&self, tag: u32) -> Result<Option<char>, CodecError> {
        match self.get_str(tag) {
            None => Ok(None),
            Some(v) if v.chars().count() == 1 => Ok(v.chars().next()),
            Some(v) => Err(CodecError::TypeCoercion {
                tag,
                value: v.to_string(),
                expected: "enum char",
            }),
        }
    }

    pub fn require_char(&self, tag: u32) -> Result<char, CodecError> {
        self.get_char(tag)?.ok_or(CodecError::MissingTag(tag))
    }

    pub fn get_utc_timestamp(&self, tag: u32) -> Result<Option<DateTime<Utc>>, CodecError> {
        self.get_str(tag)
            .map(|v| {
                NaiveDateTime::parse_from_str(v, UTC_TIMESTAMP_FMT)
                    .map(|naive| naive.and_utc())
                    .map_err(|_| CodecError::TypeCoercion {
                        tag,
                        value: v.to_string(),
                        expected: "UTC timestamp",
                    })
            })
            .transpose()
    }

    pub fn require_utc_timestamp(&self, tag: u32) -> Result<DateTime<Utc>, CodecError> {
        self.get_utc_timestamp(tag)?.ok_or(CodecError::MissingTag(tag))
    }

    /// Extract a repeating group using the standard FIX convention: a
    /// counter tag gives the element count, and each element starts at the
    /// next occurrence of `first_element_tag`.
    ///
    /// Returns one [`Message`] per element, each containing exactly the
    /// fields belonging to that element (from its `first_element_tag` up to,
    /// but excluding, the next element's `first_element_tag` or the end of
    /// the group).
    pub fn group(&self, counter_tag: u32, first_element_tag: u32) -> Result<Vec<Message>, CodecError> {
        let Some(counter_idx) = self.fields.iter().position(|(t, _)| *t == counter_tag) else {
            return Ok(Vec::new());
        };
        let count = self.fields[counter_idx]
            .1
            .parse::<usize>()
            .map_err(|_| CodecError::TypeCoercion {
                tag: counter_tag,
                value: self.fields[counter_idx].1.clone(),
                expected: "group counter",
            })?;

        if count == 0 {
            return Ok(Vec::new());
        }

        let mut elements = Vec::with_capacity(count);
        let mut current: Vec<(u32, String)> = Vec::new();

        for (tag, value) in self.fields.iter().skip(counter_idx + 1) {
            if *tag == first_element_tag {
                if !current.is_empty() {
                    elements.push(Message::from_fields(std::mem::take(&mut current)));
                }
                if elements.len() == count {
                    break;
                }
            } else if current.is_empty() {
                // A field before this group's first element tag belongs to
                // whatever comes after the group; stop scanning.
                break;
            }
            current.push((*tag, value.clone()));
        }
        if !current.is_empty() && elements.len() < count {
            elements.push(Message::from_fields(current));
        }

        if elements.len() != count {
            return Err(CodecError::GroupCountMismatch {
                tag: counter_tag,
                counter: count,
                actual: elements.len(),
            });
        }

        Ok(elements)
    }
}

/// Builds a [`Message`] field-by-field, preserving insertion order.
pub struct MessageBuilder {
    fields: Vec<(u32, String)>,
}

impl MessageBuilder {
    pub fn new(msg_type: impl FieldValue) -> Self {
        Self {
            fields: vec![(tags::MSG_TYPE, msg_type.to_field())],
        }
    }

    pub fn field(mut self, tag: u32, value: impl FieldValue) -> Self {
        self.fields.push((tag, value.to_field()));
        self
    }

    /// Push a field only if `value` is `Some`.
    pub fn field_opt(self, tag: u32, value: Option<impl FieldValue>) -> Self {
        match value {
            Some(v) => self.field(tag, v),
            None => self,
        }
    }

    /// Begin a repeating group: pushes the counter tag, then lets the caller
    /// push each element's fields (first element tag first) via further
    /// calls to [`Self::field`].
    pub fn group_counter(self, counter_tag: u32, count: usize) -> Self {
        self.field(counter_tag, count as i64)
    }

    pub fn build(self) -> Message {
        Message::from_fields(self.fields)
    }
}
