//! Contains parsers and utilities related to **U**niform **R**esource
//! **L**ocators ([URL]s), implementing <https://url.spec.whatwg.org/>.
//!
//! The preferred way to obtain a [URL] is to parse it:
//! ```
//! use weburl::URL;
//!
//! let url: URL = "https://example.com/foo?bar=1".parse().unwrap();
//! assert_eq!(url.scheme, "https");
//! assert_eq!(url.pathname(), "/foo");
//! ```
//!
//! Before parsing a URL with an internationalized domain name, install an
//! IDNA collaborator with [init] — without one, non-ASCII hosts fail to
//! parse rather than silently passing through unconverted.

mod env;
mod host;
mod idna;
mod ip;
mod parser;
mod path;
mod percent_encode;
mod search_params;
mod url;
mod util;
mod validation_error;

pub use crate::env::{cleanup, init, InitParams};
pub use crate::host::{Host, HostParseError};
pub use crate::idna::{ascii_only_idna_to_ascii, IdnaMode, IdnaToAscii};
pub use crate::ip::IpParseError;
pub use crate::parser::Error as ParseError;
pub use crate::path::Path;
pub use crate::percent_encode::{percent_decode, percent_encode};
pub use crate::search_params::URLSearchParams;
pub use crate::url::{Origin, Port, URL};
pub use crate::validation_error::{
    IgnoreValidationErrors, ValidationError, ValidationErrorHandler, ValidationErrorList,
};
