#[macro_export]
/// Shortcut for aborting a joinhandle and then awaiting and discarding its
/// result
macro_rules! cancel_task {
    ($task:ident) => {
        #[allow(unused_must_use)]
        {
            let t = $task.into_inner();
            t.abort();
            t.await;
        }
    };
}

#[macro_export]
/// Shortcut for implementing agent traits
macro_rules! impl_as_ref_core {
    ($agent:ident) => {
        impl AsRef<$crate::AgentCore> for $agent {
            fn as_ref(&self) -> &$crate::AgentCore {
                &self.core
            }
        }
    };
}

#[macro_export]
/// Declare a new agent struct with the additional fields
macro_rules! decl_agent {
    (
        $(#[$outer:meta])*
        $name:ident{
            $($prop:ident: $type:ty,)*
        }) => {

        $(#[$outer])*
        #[derive(Debug)]
        pub struct $name {
            $($prop: $type,)*
            core: $crate::AgentCore,
        }

        $crate::impl_as_ref_core!($name);
    };
}

/// Export this so they don't need to import paste.
#[doc(hidden)]
pub use paste;
use serde::Deserialize;

#[macro_export]
/// Declare a new settings block
///
/// This macro declares a settings struct for an agent. The new settings block
/// contains a [`crate::Settings`] and any other specified attributes.
///
/// Please note that integers should be specified as
/// [`fleetwatch_core::StrOrInt`] in order to allow them to be configured via
/// env var as well as JSON. They must then be converted in the
/// [`BaseAgent::from_settings`](crate::BaseAgent::from_settings) method.
///
/// ### Usage
///
/// ```ignore
/// decl_settings!(Monitor {
///    accounts: Vec<AccountConf>,
///    loopintervalms: Option<StrOrInt>,
/// });
/// ```
macro_rules! decl_settings {
    (
        $name:ident {
            $($(#[$tags:meta])* $prop:ident: $type:ty,)*
        }
    ) => {
        $crate::macros::paste::paste! {
            #[derive(Debug, serde::Deserialize)]
            #[serde(rename_all = "camelCase")]
            #[doc = "Settings for `" $name "`"]
            pub struct [<$name Settings>] {
                #[serde(flatten)]
                pub(crate) base: $crate::settings::Settings,
                $(
                    $(#[$tags])*
                    pub(crate) $prop: $type,
                )*
            }

            impl std::ops::Deref for [<$name Settings>] {
                type Target = $crate::settings::Settings;

                fn deref(&self) -> &Self::Target {
                    &self.base
                }
            }

            impl [<$name Settings>] {
                /// Load these settings from the configured sources. See
                /// `load_settings_object` for more information about how
                /// settings are loaded.
                pub fn new() -> eyre::Result<Self> {
                    $crate::macros::_new_settings(stringify!($name))
                }
            }
        }
    }
}

/// Static logic called by the decl_settings! macro. Do not call directly!
#[doc(hidden)]
pub fn _new_settings<'de, T: Deserialize<'de>>(name: &str) -> eyre::Result<T> {
    crate::settings::load_settings_object::<T, &str>(name, &[])
}
