//! # ShelfDB Codec
//!
//! Dynamic values and pluggable byte codecs for ShelfDB.
//!
//! Records never reach a codec as typed values. They are first converted
//! into a [`Value`] with [`to_value`], and a [`Codec`] turns that value
//! into bytes. Decoding goes the other way through [`from_value`].
//!
//! Built-in formats:
//! - [`CborCodec`] (default for stores)
//! - [`JsonCodec`]
//! - [`MsgpackCodec`]
//!
//! ## Usage
//!
//! ```
//! use shelfdb_codec::{to_value, from_value, CborCodec, Codec, Value};
//!
//! let value = to_value(&("answer", 42)).unwrap();
//! let bytes = CborCodec.encode(&value).unwrap();
//! let decoded: Value = CborCodec.decode(&bytes).unwrap();
//! let back: (String, i64) = from_value(&decoded).unwrap();
//! assert_eq!(back, ("answer".to_string(), 42));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bridge;
mod codec;
mod error;
mod value;

pub use bridge::{from_value, to_value};
pub use codec::{codec_by_name, CborCodec, Codec, JsonCodec, MsgpackCodec};
pub use error::{CodecError, CodecResult};
pub use value::Value;
