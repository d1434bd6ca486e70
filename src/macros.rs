/// Defines a structure together with its binding implementation.
///
/// Each field carries a binding annotation string after `=`:
///
/// ```text
/// [targetName][,default=<literal>][,range=[<int>:<int>]][,options=<v1>|<v2>|...][,optional]
/// ```
///
/// An empty target name binds under the field's own name; `-` skips the
/// field entirely. The keyword `flatten` in annotation position embeds a
/// structure whose fields bind from the *same* scope as the parent.
///
/// The structure must implement [`Default`]; attributes, doc comments and
/// visibility pass through unchanged. The macro generates
/// [`Bindable`](crate::Bindable) (the field walk, in declaration order) and
/// [`FromValue`](crate::FromValue) (so the structure can appear nested
/// under a key, inside sequences, or behind `Option`/`Box`).
///
/// ## Example
///
/// ```
/// metacfg::bindable! {
///     #[derive(Debug, Default)]
///     pub struct Database {
///         pub host: String = "host,default=localhost",
///         pub port: u16 = "port,range=[1:65535],default=5432",
///         pub replicas: Vec<String> = "replicas,optional",
///     }
/// }
///
/// metacfg::bindable! {
///     #[derive(Debug, Default)]
///     pub struct AppConfig {
///         pub name: String = "name",
///         pub database: Database = "database",
///     }
/// }
///
/// let config: AppConfig = metacfg::Config::builder()
///     .from_yaml("name: svc\ndatabase:\n  port: 6000\n")?
///     .parse()?;
/// assert_eq!(config.database.host, "localhost");
/// assert_eq!(config.database.port, 6000);
/// # Ok::<(), metacfg::Error>(())
/// ```
#[macro_export]
macro_rules! bindable {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field:ident : $field_ty:ty = $binding:tt
            ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        $vis struct $name {
            $(
                $(#[$field_attr])*
                $field_vis $field: $field_ty,
            )*
        }

        impl $crate::Bindable for $name {
            fn bind_fields(
                &mut self,
                binder: &$crate::Binder,
                scope: &$crate::Mapping,
            ) -> ::std::result::Result<(), $crate::BindError> {
                $(
                    $crate::__bind_field!(self, binder, scope, $field, $binding);
                )*
                ::std::result::Result::Ok(())
            }
        }

        impl $crate::FromValue for $name {
            const NESTED: bool = true;

            fn from_value(
                binder: &$crate::Binder,
                value: &$crate::Value,
                _spec: &$crate::FieldSpec,
            ) -> ::std::result::Result<Self, $crate::BindError> {
                match value {
                    $crate::Value::Mapping(scope) => {
                        let mut target = <Self as ::std::default::Default>::default();
                        $crate::Bindable::bind_fields(&mut target, binder, scope)?;
                        ::std::result::Result::Ok(target)
                    }
                    other => ::std::result::Result::Err($crate::BindError::coercion(
                        other.kind(),
                        "mapping",
                    )),
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __bind_field {
    ($target:ident, $binder:ident, $scope:ident, $field:ident, flatten) => {
        $binder.bind_embedded(&mut $target.$field, $scope)?
    };
    ($target:ident, $binder:ident, $scope:ident, $field:ident, $annotation:literal) => {
        $binder.bind_field(
            &mut $target.$field,
            ::std::stringify!($field),
            $annotation,
            $scope,
        )?
    };
}
