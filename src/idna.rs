//! The IDNA-to-ASCII collaborator.
//!
//! IDNA (Unicode domain name handling) is explicitly out of scope for this
//! crate: it is an external collaborator the core merely calls through a
//! function pointer, installed process-wide by [crate::init]. This crate
//! carries neither a Unicode table nor a Punycode codec of its own.

/// Strictness requested of the IDNA collaborator. Only [IdnaMode::Default]
/// is ever passed internally; the other variants exist because
/// <https://url.spec.whatwg.org/#concept-domain-to-ascii> names them as part
/// of the "domain to ASCII" algorithm's parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdnaMode {
    Default,
    Lenient,
    Strict,
}

/// Converts a Unicode domain to its ASCII (Punycode, `xn--`-prefixed) form.
/// Returns `None` on failure, matching `domain to ASCII`'s failure case.
pub type IdnaToAscii = fn(&str, IdnaMode) -> Option<String>;

/// The collaborator installed when no embedder has called [crate::init]:
/// passes ASCII input through unchanged (lowercased, as "domain to ASCII"
/// always lowercases) and fails closed on any non-ASCII byte, since this
/// crate has no Punycode encoder of its own to fall back on.
pub fn ascii_only_idna_to_ascii(input: &str, _mode: IdnaMode) -> Option<String> {
    if input.is_ascii() {
        Some(input.to_ascii_lowercase())
    } else {
        None
    }
}

/// Convenience constructor used by tests and internally before any embedder
/// installs a real collaborator.
pub fn default_idna_to_ascii() -> IdnaToAscii {
    ascii_only_idna_to_ascii
}
