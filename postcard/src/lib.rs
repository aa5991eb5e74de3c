/*!
A compact, schema-less binary codec in the style of
[postcard](https://postcard.jamesmunns.com/wire-format).

Values are written with no field tags and no self-describing type
information: integers wider than a byte are LEB128 varints (signed values
zigzagged first), floats are little-endian IEEE-754, and strings, byte
strings, sequences and maps carry a varint count. Decoding is strict:
non-canonical varints and out-of-range tag bytes are rejected.

Typed values go through [`ToPostcard`] and [`FromPostcard`] (derivable with
the `derive` feature); values whose shape is only known at runtime go through
[`value::Value`] and [`value::Shape`].
*/

#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// The derive macros emit `::hardy_postcard::` paths, including in our own tests
extern crate self as hardy_postcard;

pub mod decode;
pub mod encode;
pub mod fixed;
pub mod value;
pub mod varint;
pub mod zigzag;

mod error;

pub use decode::FromPostcard;
pub use encode::ToPostcard;
pub use error::Error;
pub use varint::Varint;

#[cfg(feature = "derive")]
pub use hardy_postcard_derive::{FromPostcard, ToPostcard};


#[cfg(test)]
mod encode_tests;


#[cfg(all(test, feature = "derive"))]
mod derive_tests;
