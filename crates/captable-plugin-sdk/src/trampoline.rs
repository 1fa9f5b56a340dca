//! `extern "C"` functions that adapt the table's calling convention to the
//! [`Plugin`] and [`Command`] traits.
//!
//! The user data handed to the host is a `Box<PluginState<P>>`. Its error
//! buffer backs the message returned by a failing command, so the message
//! stays valid until the next call into the same plugin.

use std::any::Any;
use std::os::raw::c_void;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use captable_abi::{ByteSlice, CapabilityTable, CommandContext, HostHandle, PluginUserData};

use crate::api::PluginApi;
use crate::plugin::{Command, CommandArgs, Plugin};

const MISSING_STATE: ByteSlice = ByteSlice::from_text("plugin state is not available");
const INVALID_ARGS: ByteSlice = ByteSlice::from_text("command arguments are not valid UTF-8");

/// What the SDK stores behind the user data pointer.
#[derive(Debug)]
pub struct PluginState<P> {
    /// The plugin's own state.
    pub plugin: P,
    error: String,
}

impl<P> PluginState<P> {
    fn fail(&mut self, message: String) -> ByteSlice {
        self.error = message;
        ByteSlice::from_bytes(self.error.as_bytes())
    }
}

/// Entry point body: runs [`Plugin::init`] and boxes the result.
///
/// A panicking `init` leaves the plugin without state. Its commands then fail
/// with a fixed message.
///
/// # Safety
///
/// Must only be called by a host, with its table and a live handle.
pub unsafe extern "C" fn init<P: Plugin>(
    table: &CapabilityTable,
    host: HostHandle,
) -> PluginUserData {
    let api = PluginApi::new(table, host);
    let plugin = match panic::catch_unwind(AssertUnwindSafe(|| P::init(&api))) {
        Ok(plugin) => plugin,
        Err(payload) => {
            error!(plugin = P::NAME, panic = %panic_message(&*payload), "Plugin init panicked");
            return PluginUserData::null();
        }
    };
    api.set_deinit::<P>();

    let state = Box::new(PluginState {
        plugin,
        error: String::new(),
    });
    PluginUserData(Box::into_raw(state) as *mut c_void)
}

/// Command trampoline for command `C` of plugin `P`.
///
/// # Safety
///
/// `userdata` must be the value returned by [`init::<P>`] and not yet passed
/// to [`deinit::<P>`]. `ctx` must be null or point to a valid context.
pub unsafe extern "C" fn command<P: Plugin, C: Command<P>>(
    table: &CapabilityTable,
    host: HostHandle,
    ctx: *const CommandContext,
    userdata: PluginUserData,
) -> ByteSlice {
    let Some(state) = (unsafe { state_mut::<P>(userdata) }) else {
        return MISSING_STATE;
    };

    let ctx = unsafe { ctx.as_ref() }.copied().unwrap_or_default();
    let args = if ctx.args.is_null() {
        ""
    } else {
        match unsafe { ctx.args.as_str() } {
            Ok(args) => args,
            Err(_) => return INVALID_ARGS,
        }
    };
    let args = CommandArgs {
        args,
        bang: ctx.bang,
    };

    state.error.clear();
    let api = PluginApi::new(table, host);
    let plugin = &mut state.plugin;
    match panic::catch_unwind(AssertUnwindSafe(|| C::run(plugin, &api, &args))) {
        Ok(Ok(())) => ByteSlice::null(),
        Ok(Err(message)) => state.fail(message),
        Err(payload) => {
            let message = panic_message(&*payload);
            state.fail(format!("command '{}' panicked: {message}", C::NAME))
        }
    }
}

/// Event trampoline for plugin `P`. Panics are logged and swallowed.
///
/// # Safety
///
/// Same contract as [`command`].
pub unsafe extern "C" fn event<P: Plugin>(
    table: &CapabilityTable,
    host: HostHandle,
    userdata: PluginUserData,
) {
    let Some(state) = (unsafe { state_mut::<P>(userdata) }) else {
        return;
    };
    let api = PluginApi::new(table, host);
    let plugin = &mut state.plugin;
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| plugin.on_event(&api))) {
        error!(plugin = P::NAME, panic = %panic_message(&*payload), "Event handler panicked");
    }
}

/// Deinit trampoline for plugin `P`: runs [`Plugin::deinit`] and frees the
/// state.
///
/// # Safety
///
/// `userdata` must be the value returned by [`init::<P>`]. It is invalid
/// afterwards.
pub unsafe extern "C" fn deinit<P: Plugin>(userdata: PluginUserData) {
    if userdata.is_null() {
        return;
    }
    let state = unsafe { Box::from_raw(userdata.0 as *mut PluginState<P>) };
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || state.plugin.deinit())) {
        error!(plugin = P::NAME, panic = %panic_message(&*payload), "Plugin deinit panicked");
    }
}

unsafe fn state_mut<'a, P>(userdata: PluginUserData) -> Option<&'a mut PluginState<P>> {
    unsafe { (userdata.0 as *mut PluginState<P>).as_mut() }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use captable_abi::{Capabilities, Capability, StatusLevel};
    use captable_host::{PluginManager, restricted_table};

    use super::*;
    use crate::entry_point;

    thread_local! {
        static DROPS: Cell<u32> = const { Cell::new(0) };
        static EVENTS: Cell<u32> = const { Cell::new(0) };
        static REGISTERED: RefCell<Vec<bool>> = const { RefCell::new(Vec::new()) };
    }

    struct Notes {
        notes: Vec<String>,
    }

    impl Drop for Notes {
        fn drop(&mut self) {
            DROPS.with(|d| d.set(d.get() + 1));
        }
    }

    impl Plugin for Notes {
        const NAME: &'static str = "notes";

        fn init(api: &PluginApi<'_>) -> Self {
            let results = vec![
                api.register_command::<Self, Add>(),
                api.register_command::<Self, Reject>(),
                api.register_command::<Self, Explode>(),
                api.set_event_handler::<Self>(),
            ];
            REGISTERED.with(|r| *r.borrow_mut() = results);
            Self { notes: Vec::new() }
        }

        fn on_event(&mut self, api: &PluginApi<'_>) {
            EVENTS.with(|e| e.set(e.get() + 1));
            api.info(&format!("{} notes", self.notes.len()));
        }
    }

    struct Add;

    impl Command<Notes> for Add {
        const NAME: &'static str = "add";

        fn run(
            plugin: &mut Notes,
            api: &PluginApi<'_>,
            args: &CommandArgs<'_>,
        ) -> Result<(), String> {
            if args.is_empty() {
                return Err("nothing to add".to_string());
            }
            plugin.notes.push(args.args.to_string());
            if args.bang {
                api.warning("added with force");
            }
            Ok(())
        }
    }

    struct Reject;

    impl Command<Notes> for Reject {
        const NAME: &'static str = "reject";

        fn run(_: &mut Notes, _: &PluginApi<'_>, _: &CommandArgs<'_>) -> Result<(), String> {
            Err(String::new())
        }
    }

    struct Explode;

    impl Command<Notes> for Explode {
        const NAME: &'static str = "explode";

        fn run(_: &mut Notes, _: &PluginApi<'_>, _: &CommandArgs<'_>) -> Result<(), String> {
            panic!("boom")
        }
    }

    fn manager() -> PluginManager {
        let mut manager = PluginManager::new();
        manager.load("notes", entry_point::<Notes>()).expect("load");
        manager
    }

    #[test]
    fn test_commands_run_against_plugin_state() {
        let mut manager = manager();
        assert!(manager.run_line("add first").unwrap().is_success());
        assert!(manager.run_line("add! second").unwrap().is_success());

        let latest = manager.status().latest().expect("status");
        assert_eq!(latest.level, StatusLevel::Warning);
        assert_eq!(latest.text, "added with force");

        assert_eq!(manager.fire_event(), 1);
        assert_eq!(manager.status().latest().unwrap().text, "2 notes");
        assert_eq!(EVENTS.with(Cell::get), 1);
    }

    #[test]
    fn test_err_becomes_failure_message() {
        let mut manager = manager();
        let outcome = manager.run_line("add").unwrap();
        assert_eq!(outcome.failure(), Some("nothing to add"));
    }

    #[test]
    fn test_empty_err_counts_as_success() {
        let mut manager = manager();
        assert!(manager.run_line("reject").unwrap().is_success());
    }

    #[test]
    fn test_panic_becomes_failure_message() {
        let mut manager = manager();
        let outcome = manager.run_line("explode").unwrap();
        assert_eq!(outcome.failure(), Some("command 'explode' panicked: boom"));

        // The plugin keeps working afterwards.
        assert!(manager.run_line("add again").unwrap().is_success());
    }

    #[test]
    fn test_unload_drops_state_once() {
        let mut manager = manager();
        let handle = manager.find("notes").expect("loaded");
        manager.unload(handle).expect("unload");
        assert!(manager.unload(handle).is_err());
        drop(manager);
        assert_eq!(DROPS.with(Cell::get), 1);
    }

    #[test]
    fn test_missing_capabilities_are_reported() {
        let table = restricted_table(Capabilities::NONE.with(Capability::Commands));
        let mut manager = PluginManager::new().with_table(table);
        manager.load("notes", entry_point::<Notes>()).expect("load");

        assert_eq!(REGISTERED.with(|r| r.borrow().clone()), [true, true, true, false]);
        assert_eq!(manager.fire_event(), 0);
        // Without the deinit member the state cannot be freed by the host.
        drop(manager);
        assert_eq!(DROPS.with(Cell::get), 0);
    }

    #[test]
    fn test_null_userdata_fails_commands() {
        let table = captable_host::host_table();
        let result = unsafe {
            command::<Notes, Add>(
                table,
                HostHandle::null(),
                std::ptr::null(),
                PluginUserData::null(),
            )
        };
        assert_eq!(unsafe { result.as_str() }, Ok("plugin state is not available"));
    }
}
