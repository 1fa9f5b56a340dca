//! The capability table and the function signatures it carries.
//!
//! Layout rules:
//! - the table starts with a [`TableHeader`];
//! - every other member is a function pointer;
//! - members are only ever appended, so existing offsets never move.
//!
//! A plugin must not call a member unless [`CapabilityTable::supports`]
//! says so. That check covers both the capability bit and whether the
//! host's table is large enough to contain the member at all.

use std::mem::{offset_of, size_of};

use crate::handle::{CommandContext, HostHandle, PluginUserData};
use crate::slice::ByteSlice;

/// Table layout version implemented by this crate.
pub const ABI_VERSION: u32 = 1;

/// A plugin command.
///
/// `ctx` may be null. Returning a null or empty slice signals success; a
/// non-empty slice is the failure message. The message memory belongs to
/// the plugin and must stay valid until the next call into the plugin.
pub type CommandFn = unsafe extern "C" fn(
    table: &CapabilityTable,
    host: HostHandle,
    ctx: *const CommandContext,
    userdata: PluginUserData,
) -> ByteSlice;

/// Called exactly once when the plugin is torn down.
pub type DeinitFn = unsafe extern "C" fn(userdata: PluginUserData);

/// Called for host events. Fire-and-forget.
pub type EventHandlerFn =
    unsafe extern "C" fn(table: &CapabilityTable, host: HostHandle, userdata: PluginUserData);

/// Plugin entry point. Returns the plugin's user data.
pub type PluginInitFn =
    unsafe extern "C" fn(table: &CapabilityTable, host: HostHandle) -> PluginUserData;

/// `register_command` member.
pub type RegisterCommandFn =
    unsafe extern "C" fn(host: HostHandle, name: ByteSlice, command_fn: CommandFn);

/// `write_to_statusbar` member. `level` is a [`crate::StatusLevel`] wire value.
pub type WriteToStatusbarFn = unsafe extern "C" fn(host: HostHandle, level: u32, message: ByteSlice);

/// `set_deinit_fn` member.
pub type SetDeinitFn = unsafe extern "C" fn(host: HostHandle, deinit_fn: DeinitFn);

/// `set_event_handler_fn` member.
pub type SetEventHandlerFn = unsafe extern "C" fn(host: HostHandle, handler: EventHandlerFn);

/// Optional table members a host may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `register_command`.
    Commands,
    /// `write_to_statusbar`.
    Statusbar,
    /// `set_deinit_fn`.
    Deinit,
    /// `set_event_handler_fn`.
    Events,
}

impl Capability {
    /// Every capability known to this ABI version.
    pub const ALL: [Capability; 4] = [
        Capability::Commands,
        Capability::Statusbar,
        Capability::Deinit,
        Capability::Events,
    ];

    /// Bit in [`TableHeader::capabilities`].
    pub const fn bit(self) -> u64 {
        match self {
            Self::Commands => 1 << 0,
            Self::Statusbar => 1 << 1,
            Self::Deinit => 1 << 2,
            Self::Events => 1 << 3,
        }
    }

    /// Byte offset just past the member backing this capability.
    pub const fn member_end(self) -> usize {
        let offset = match self {
            Self::Commands => offset_of!(CapabilityTable, register_command),
            Self::Statusbar => offset_of!(CapabilityTable, write_to_statusbar),
            Self::Deinit => offset_of!(CapabilityTable, set_deinit_fn),
            Self::Events => offset_of!(CapabilityTable, set_event_handler_fn),
        };
        offset + size_of::<usize>()
    }
}

/// Bit set of [`Capability`] values.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(pub u64);

impl Capabilities {
    /// No capabilities.
    pub const NONE: Self = Self(0);

    /// Every capability of this ABI version.
    pub const fn all() -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < Capability::ALL.len() {
            bits |= Capability::ALL[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Returns whether `capability` is set.
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Returns a copy with `capability` set.
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Returns a copy with `capability` cleared.
    pub const fn without(self, capability: Capability) -> Self {
        Self(self.0 & !capability.bit())
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

/// Version and feature negotiation data at the head of the table.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    /// Layout version, see [`ABI_VERSION`].
    pub version: u32,
    /// `size_of::<CapabilityTable>()` as compiled by the host.
    pub size: u32,
    /// Members the host actually implements.
    pub capabilities: Capabilities,
}

/// Host operations available to a plugin.
///
/// The host owns the table for as long as the plugin is loaded; plugins
/// only ever see it by reference.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct CapabilityTable {
    /// Negotiation header. Always first.
    pub header: TableHeader,
    /// Binds a command name to a function of the calling plugin.
    pub register_command: RegisterCommandFn,
    /// Writes a message to the host's status bar.
    pub write_to_statusbar: WriteToStatusbarFn,
    /// Sets the calling plugin's deinit function. Replaces any earlier one.
    pub set_deinit_fn: SetDeinitFn,
    /// Sets the calling plugin's event handler. Replaces any earlier one.
    pub set_event_handler_fn: SetEventHandlerFn,
}

impl CapabilityTable {
    /// Builds a full table of the current version.
    pub const fn new(
        register_command: RegisterCommandFn,
        write_to_statusbar: WriteToStatusbarFn,
        set_deinit_fn: SetDeinitFn,
        set_event_handler_fn: SetEventHandlerFn,
    ) -> Self {
        Self {
            header: TableHeader {
                version: ABI_VERSION,
                size: size_of::<Self>() as u32,
                capabilities: Capabilities::all(),
            },
            register_command,
            write_to_statusbar,
            set_deinit_fn,
            set_event_handler_fn,
        }
    }

    /// Returns a copy advertising only `capabilities`.
    pub const fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.header.capabilities = capabilities;
        self
    }

    /// Returns whether the table's version is one this crate understands.
    pub fn is_compatible(&self) -> bool {
        self.header.version == ABI_VERSION
    }

    /// Returns whether the plugin may call the member behind `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.is_compatible()
            && self.header.capabilities.contains(capability)
            && self.header.size as usize >= capability.member_end()
    }
}

impl std::fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityTable")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

const PTR: usize = size_of::<usize>();
const _: () = assert!(size_of::<TableHeader>() == 16);
const _: () = assert!(offset_of!(CapabilityTable, header) == 0);
const _: () = assert!(offset_of!(CapabilityTable, register_command) == 16);
const _: () = assert!(offset_of!(CapabilityTable, write_to_statusbar) == 16 + PTR);
const _: () = assert!(offset_of!(CapabilityTable, set_deinit_fn) == 16 + 2 * PTR);
const _: () = assert!(offset_of!(CapabilityTable, set_event_handler_fn) == 16 + 3 * PTR);
const _: () = assert!(size_of::<CapabilityTable>() == 16 + 4 * PTR);
const _: () = assert!(size_of::<ByteSlice>() == 2 * PTR);
const _: () = assert!(size_of::<PluginUserData>() == PTR);
const _: () = assert!(size_of::<HostHandle>() == PTR);
