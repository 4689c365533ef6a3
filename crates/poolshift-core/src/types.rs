//! Shared identifiers used across poolshift crates.

/// Position of a server in the capacity pool (0-based, stable).
pub type ServerIndex = usize;

/// Identity of a client in the fixed population (0-based, stable).
pub type ClientId = usize;

/// Number of clients bound to a server.
pub type Load = u32;

/// Display label for a server (`S1`, `S2`, ...).
pub fn server_label(index: ServerIndex) -> String {
    format!("S{}", index + 1)
}

/// Display label for a client (`U1`, `U2`, ...).
pub fn client_label(id: ClientId) -> String {
    format!("U{}", id + 1)
}
