//! Document model.
//!
//! `Book` is what the container reader produces; `Conversion` is what the
//! cleanup pipeline and renderer produce from it.

mod book;
mod conversion;

pub use book::*;
pub use conversion::*;
