//! Framework-agnostic descriptors produced by the decoder.
//!
//! Everything in this module is plain data: value identities, partially known shapes,
//! element types from the recognized-type table and materialized constants. None of it
//! refers back to the native graph it was decoded from.

mod constant;
mod element_type;
mod shape;
mod value;

pub use constant::*;
pub use element_type::*;
pub use shape::*;
pub use value::*;
