//! Process-wide collaborators: the injected IDNA function and the
//! scheme-to-default-port table.
//!
//! Both are installed once by [init] and cleared by [cleanup]; neither
//! should be reinstalled while a URL is being parsed or mutated, since
//! in-flight parses read through them without any synchronization beyond
//! the lock itself.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::idna::{default_idna_to_ascii, IdnaToAscii};
use crate::url::Port;

static IDNA_TO_ASCII: OnceLock<Mutex<IdnaToAscii>> = OnceLock::new();
static PORT_TABLE: OnceLock<Mutex<HashMap<String, Port>>> = OnceLock::new();

/// <https://url.spec.whatwg.org/#default-port>
fn default_port_table() -> HashMap<String, Port> {
    [
        ("ftp", 21),
        ("http", 80),
        ("https", 443),
        ("ws", 80),
        ("wss", 443),
    ]
    .into_iter()
    .map(|(scheme, port)| (scheme.to_string(), port))
    .collect()
}

/// Parameters accepted by [init].
#[derive(Clone)]
pub struct InitParams {
    pub idna_to_ascii: IdnaToAscii,
    pub port_table: HashMap<String, Port>,
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            idna_to_ascii: default_idna_to_ascii(),
            port_table: default_port_table(),
        }
    }
}

/// Installs the process-wide IDNA collaborator and default-port table.
///
/// Must only be called when no URL record is currently live, and must not
/// be called again (to mutate either collaborator) while any URL is in
/// flight.
pub fn init(params: InitParams) {
    let idna_lock = IDNA_TO_ASCII.get_or_init(|| Mutex::new(params.idna_to_ascii));
    *idna_lock.lock().unwrap() = params.idna_to_ascii;

    let port_lock = PORT_TABLE.get_or_init(|| Mutex::new(params.port_table.clone()));
    *port_lock.lock().unwrap() = params.port_table;
}

/// Clears the process-wide IDNA collaborator and port table, reverting both
/// to their built-in defaults. Must only be invoked when no live URL record
/// exists.
pub fn cleanup() {
    if let Some(lock) = IDNA_TO_ASCII.get() {
        *lock.lock().unwrap() = default_idna_to_ascii();
    }
    if let Some(lock) = PORT_TABLE.get() {
        *lock.lock().unwrap() = default_port_table();
    }
}

/// Returns the currently installed IDNA collaborator, or the
/// ASCII-passthrough default if [init] was never called.
pub(crate) fn idna_to_ascii() -> IdnaToAscii {
    match IDNA_TO_ASCII.get() {
        Some(lock) => *lock.lock().unwrap(),
        None => default_idna_to_ascii(),
    }
}

/// <https://url.spec.whatwg.org/#default-port>
///
/// Reads through the currently installed port table, or the built-in
/// default table if [init] was never called.
pub(crate) fn default_port_for_scheme(scheme: &str) -> Option<Port> {
    match PORT_TABLE.get() {
        Some(lock) => lock.lock().unwrap().get(scheme).copied(),
        None => default_port_table().get(scheme).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idna::IdnaMode;

    fn uppercase_marker_idna(input: &str, _mode: IdnaMode) -> Option<String> {
        Some(format!("XN--{}", input.to_ascii_uppercase()))
    }

    #[test]
    fn init_and_cleanup_roundtrip() {
        init(InitParams {
            idna_to_ascii: uppercase_marker_idna,
            ..Default::default()
        });
        assert_eq!(
            idna_to_ascii()("test", IdnaMode::Default),
            Some("XN--TEST".to_string())
        );

        cleanup();
        assert_eq!(
            idna_to_ascii()("test", IdnaMode::Default),
            Some("test".to_string())
        );
    }

    #[test]
    fn port_table_install_and_clear_roundtrip() {
        let mut custom_ports = HashMap::new();
        custom_ports.insert("gopher".to_string(), 70);

        init(InitParams {
            idna_to_ascii: default_idna_to_ascii(),
            port_table: custom_ports,
        });
        assert_eq!(default_port_for_scheme("gopher"), Some(70));
        assert_eq!(default_port_for_scheme("http"), None);

        cleanup();
        assert_eq!(default_port_for_scheme("http"), Some(80));
        assert_eq!(default_port_for_scheme("gopher"), None);
    }
}
