//! Typed hat parameters ("metapixels") stored in the reserved pixel column of
//! a 97x56 RGBA hat image.
//!
//! Each row of column 96 holds one metapixel as `(type id, g, b, 255)`. The
//! [`codec`] module turns the `(g, b)` pair into a typed value and back,
//! [`catalog`] declares every known type, [`document`] keeps them in row
//! order, and [`persistence`] moves a document in and out of the grid.

pub mod catalog;
pub mod codec;
pub mod document;
pub mod error_codes;
pub mod hat_file;
pub mod manifest;
pub mod meta_pixel;
pub mod persistence;

pub use catalog::{Category, MetaPixelType};
pub use codec::{Value, ValueCodec, ValueDomain, ValueKind};
pub use document::MetaPixelDocument;
pub use error_codes::MetaPixelError;
pub use meta_pixel::MetaPixel;
pub use persistence::{load, save, SaveOptions};
