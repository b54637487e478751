//! Macros for declaring lifecycle status enums.

/// Declare a status enum and implement [`State`](crate::core::State) for it.
///
/// The generated enum derives `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
/// `Debug`, `Serialize` and `Deserialize`. Extra attributes (including
/// `#[serde(...)]`) are forwarded after the derive.
///
/// # Example
///
/// ```
/// use caretrack::state_enum;
/// use caretrack::core::State;
///
/// state_enum! {
///     #[serde(rename_all = "snake_case")]
///     pub enum RouteStatus {
///         Planned,
///         OnRoute,
///         Arrived,
///     }
///     final: [Arrived]
/// }
///
/// assert_eq!(RouteStatus::OnRoute.name(), "OnRoute");
/// assert!(RouteStatus::Arrived.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}
