//! The recursive walk that maps a dynamic tree onto a typed structure.

use super::coerce::FromValue;
use super::env;
use super::error::BindError;
use super::tag::FieldSpec;
use crate::value::{normalize_keys, Mapping, Value};

/// A structure whose fields can be populated from a [`Mapping`].
///
/// Implemented by the [`bindable!`](crate::bindable) macro; `bind_fields`
/// visits every field in declaration order against the given scope.
pub trait Bindable {
    fn bind_fields(&mut self, binder: &Binder, scope: &Mapping) -> Result<(), BindError>;
}

/// The binding engine. Holds the per-bind configuration, frozen for the
/// duration of each call.
///
/// ## Example
///
/// ```
/// use metacfg::{Binder, Mapping, Value};
///
/// metacfg::bindable! {
///     #[derive(Debug, Default)]
///     struct Server {
///         host: String = "host,default=localhost",
///         port: u16 = "port,range=[1:65535],default=8080",
///     }
/// }
///
/// let mut tree = Mapping::new();
/// tree.insert("Port".into(), Value::Integer(9000));
///
/// let server: Server = Binder::new().bind(&tree)?;
/// assert_eq!(server.host, "localhost");
/// assert_eq!(server.port, 9000);
/// # Ok::<(), metacfg::BindError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Binder {
    pub(crate) ignore_case: bool,
    pub(crate) use_defaults: bool,
    pub(crate) use_env: bool,
}

impl Default for Binder {
    fn default() -> Self {
        Self {
            ignore_case: true,
            use_defaults: true,
            use_env: true,
        }
    }
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether key lookups ignore case. Defaults to `true`.
    #[must_use]
    pub fn ignore_case(mut self, enabled: bool) -> Self {
        self.ignore_case = enabled;
        self
    }

    /// Sets whether declared `default=` values apply. Defaults to `true`.
    #[must_use]
    pub fn use_defaults(mut self, enabled: bool) -> Self {
        self.use_defaults = enabled;
        self
    }

    /// Sets whether `${NAME}` environment placeholders are substituted.
    /// Defaults to `true`.
    #[must_use]
    pub fn use_env(mut self, enabled: bool) -> Self {
        self.use_env = enabled;
        self
    }

    /// Binds a fresh `T` from the tree.
    pub fn bind<T: Bindable + Default>(&self, tree: &Mapping) -> Result<T, BindError> {
        let mut target = T::default();
        self.bind_into(&mut target, tree)?;
        Ok(target)
    }

    /// Binds into a caller-owned structure. Fields set before an error are
    /// not rolled back.
    ///
    /// In case-insensitive mode the whole tree is case-normalized once
    /// here, never per field.
    pub fn bind_into<T: Bindable>(&self, target: &mut T, tree: &Mapping) -> Result<(), BindError> {
        if self.ignore_case {
            target.bind_fields(self, &normalize_keys(tree))
        } else {
            target.bind_fields(self, tree)
        }
    }

    /// Walks a tree that is already case-normalized (the loader normalizes
    /// once at load time).
    pub(crate) fn walk_root<T: Bindable>(
        &self,
        target: &mut T,
        tree: &Mapping,
    ) -> Result<(), BindError> {
        target.bind_fields(self, tree)
    }

    /// Binds one field. `field` is the structure field's own name, used
    /// both as the lookup fallback and to qualify errors.
    ///
    /// Resolution order: explicit value in the scope, then (for leaves) the
    /// `optional` skip, then the declared default, then
    /// [`BindError::MissingRequired`]. Structure-shaped targets instead
    /// bind from an empty mapping when their key is absent or holds a
    /// non-mapping value, so their inner defaults still apply; an explicit
    /// null clears an optional structure and fails a required one.
    pub fn bind_field<T: FromValue>(
        &self,
        target: &mut T,
        field: &str,
        annotation: &str,
        scope: &Mapping,
    ) -> Result<(), BindError> {
        let (name, spec) = FieldSpec::parse(annotation);
        let name = if name.is_empty() { field } else { name };
        if name == "-" {
            return Ok(());
        }

        let key = if self.ignore_case {
            name.to_lowercase()
        } else {
            name.to_owned()
        };
        let raw = match scope.get(&key) {
            Some(value) if T::NESTED && !value.is_mapping() && !value.is_null() => None,
            found => found,
        };

        let bound = match raw {
            // nested scopes resolve their strings leaf by leaf during the
            // recursion, not wholesale here
            Some(value) if T::NESTED => T::from_value(self, value, &spec),
            Some(value) => self.coerce(value, &spec),
            None if T::NESTED => T::from_value(self, &Value::Mapping(Mapping::new()), &spec),
            None if spec.optional => return Ok(()),
            None => match spec.default.as_ref().filter(|_| self.use_defaults) {
                Some(default) => self.coerce(default, &spec),
                None => Err(BindError::MissingRequired),
            },
        };

        *target = bound.map_err(|err| err.for_field(field))?;
        Ok(())
    }

    /// Binds an embedded structure against the *same* scope as its parent;
    /// its fields live at the parent's level.
    pub fn bind_embedded<T: Bindable>(
        &self,
        target: &mut T,
        scope: &Mapping,
    ) -> Result<(), BindError> {
        target.bind_fields(self, scope)
    }

    fn coerce<T: FromValue>(&self, value: &Value, spec: &FieldSpec) -> Result<T, BindError> {
        if self.use_env {
            T::from_value(self, &env::resolve(value), spec)
        } else {
            T::from_value(self, value, spec)
        }
    }
}
