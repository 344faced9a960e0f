//! C2 — Message Codec.
//!
//! Parses the FIX 4.4 wire format (SOH-delimited `tag=value` tuples with
//! body-length/checksum framing) into an address-by-tag [`Message`];
//! serializes in reverse. Knows the field-type dictionary and the broker's
//! custom tag extensions ([`tags::fxcm`]) but not their business semantics.

pub mod error;
pub mod message;
pub mod tags;
pub mod wire;

pub use error::CodecError;
pub use message::{FieldValue, Message, MessageBuilder};
pub use wire::{decode, encode, Header};
