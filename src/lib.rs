pub mod bind;
mod error;
pub mod loader;
mod macros;
pub mod value;

pub use bind::{BindError, Bindable, Binder, FieldSpec, FromValue};
pub use error::Error;
pub use loader::{load, Config, ConfigBuilder, ConfigError};
pub use value::{normalize_keys, Mapping, Value, ValueKind};
