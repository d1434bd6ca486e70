//! The structure-binding engine.

mod binder;
mod coerce;
mod env;
mod error;
mod tag;

pub use binder::{Bindable, Binder};
pub use coerce::FromValue;
pub use error::BindError;
pub use tag::FieldSpec;
