//! Macros for plugin crates.

/// Exports `captable_plugin_init` for the given [`Plugin`](crate::Plugin)
/// type.
///
/// # Example
/// ```rust,ignore
/// struct Counter { hits: u32 }
///
/// impl Plugin for Counter {
///     const NAME: &'static str = "counter";
///     fn init(_api: &PluginApi<'_>) -> Self { Self { hits: 0 } }
/// }
///
/// plugin_entry!(Counter);
/// ```
#[macro_export]
macro_rules! plugin_entry {
    ($plugin:ty) => {
        /// Plugin entry point called once by the host.
        ///
        /// # Safety
        ///
        /// Must be called by a captable host with its table and a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn captable_plugin_init(
            table: &$crate::abi::CapabilityTable,
            host: $crate::abi::HostHandle,
        ) -> $crate::abi::PluginUserData {
            unsafe { $crate::trampoline::init::<$plugin>(table, host) }
        }
    };
}
