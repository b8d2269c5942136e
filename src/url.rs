//! Implements <https://url.spec.whatwg.org>

use std::fmt;

use crate::env;
use crate::host::Host;
use crate::parser::{Error as ParseError, ParserState, URLParser};
use crate::path::Path;
use crate::search_params::URLSearchParams;
use crate::validation_error::{IgnoreValidationErrors, ValidationErrorHandler};

pub type Port = u16;

/// <https://url.spec.whatwg.org/#special-scheme>
pub(crate) fn is_special_scheme(scheme: &str) -> bool {
    matches!(scheme, "ftp" | "file" | "http" | "https" | "ws" | "wss")
}

/// <https://url.spec.whatwg.org/#default-port>
///
/// Reads through the process-wide port table installed by [crate::init],
/// rather than hard-coding the five well-known schemes, so an embedder can
/// extend or override the table at startup.
pub(crate) fn default_port_for_scheme(scheme: &str) -> Option<Port> {
    env::default_port_for_scheme(scheme)
}

/// A **U**niform **R**esource **L**ocator.
///
/// <https://url.spec.whatwg.org/#concept-url>
///
/// Represented field-by-field (scheme, username, password, host, port, path,
/// query, fragment) rather than packed into a single offset-addressed
/// string, matching the field-access style this crate's parser uses
/// throughout.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct URL {
    pub scheme: String,
    pub username: String,
    pub password: String,
    pub host: Option<Host>,
    pub port: Option<Port>,
    pub path: Path,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl URL {
    fn empty() -> Self {
        Self {
            scheme: String::new(),
            username: String::new(),
            password: String::new(),
            host: None,
            port: None,
            path: Path::Segments(Vec::new()),
            query: None,
            fragment: None,
        }
    }

    /// <https://url.spec.whatwg.org/#concept-basic-url-parser>
    ///
    /// Collects validation errors via [IgnoreValidationErrors]; use
    /// [URL::parse_with] to observe them.
    pub fn parse(input: &str, base: Option<&URL>) -> Result<Self, ParseError> {
        let mut errors = IgnoreValidationErrors;
        Self::parse_with(input, base, &mut errors)
    }

    /// As [URL::parse], reporting every non-fatal validation error
    /// encountered along the way to `errors`.
    pub fn parse_with<H: ValidationErrorHandler>(
        input: &str,
        base: Option<&URL>,
        errors: &mut H,
    ) -> Result<Self, ParseError> {
        let trimmed = input.trim_matches(crate::util::is_c0_or_space);
        if trimmed.len() != input.len() {
            errors.validation_error(crate::validation_error::ValidationError::InvalidUrlUnit);
        }

        let filtered: String = trimmed
            .chars()
            .filter(|c| !crate::util::is_ascii_tab_or_newline(*c))
            .collect();
        if filtered.len() != trimmed.chars().count() {
            errors.validation_error(crate::validation_error::ValidationError::InvalidUrlUnit);
        }

        let parser = URLParser::new(
            &filtered,
            URL::empty(),
            base.cloned(),
            None,
            errors,
            env::idna_to_ascii(),
        );
        let parser = parser.run_to_completion()?;
        Ok(parser.url)
    }

    /// Collects validation errors produced while running the parser in a
    /// given state with a given partially-built URL, used by the setters
    /// below to implement the state-override contract.
    fn parse_with_state_override<H: ValidationErrorHandler>(
        input: &str,
        url: URL,
        state: ParserState,
        errors: &mut H,
    ) -> Result<URL, ParseError> {
        let parser = URLParser::new(input, url, None, Some(state), errors, env::idna_to_ascii());
        let parser = parser.run_to_completion()?;
        Ok(parser.url)
    }

    pub fn is_special(&self) -> bool {
        is_special_scheme(&self.scheme)
    }

    /// <https://url.spec.whatwg.org/#include-credentials>
    pub fn includes_credentials(&self) -> bool {
        !self.username.is_empty() || !self.password.is_empty()
    }

    /// <https://url.spec.whatwg.org/#cannot-have-a-username-password-port>
    pub fn cannot_have_username_password_port(&self) -> bool {
        self.host.is_none() || self.host == Some(Host::Empty) || self.scheme == "file"
    }

    /// <https://url.spec.whatwg.org/#url-opaque-path>
    pub fn has_opaque_path(&self) -> bool {
        self.path.is_opaque()
    }

    /// <https://url.spec.whatwg.org/#concept-url-serializer>
    pub fn serialize(&self, exclude_fragment: bool) -> String {
        let mut output = self.scheme.clone();
        output.push(':');

        if let Some(host) = &self.host {
            output.push_str("//");

            if self.includes_credentials() {
                output.push_str(&self.username);
                if !self.password.is_empty() {
                    output.push(':');
                    output.push_str(&self.password);
                }
                output.push('@');
            }

            output.push_str(&host.serialize());

            if let Some(port) = self.port {
                output.push(':');
                output.push_str(&port.to_string());
            }
        } else if !self.has_opaque_path() && self.path.segments().len() > 1 && self.path.segments()[0].is_empty()
        {
            output.push_str("/.");
        }

        output.push_str(&self.path.serialize());

        if let Some(query) = &self.query {
            output.push('?');
            output.push_str(query);
        }

        if !exclude_fragment {
            if let Some(fragment) = &self.fragment {
                output.push('#');
                output.push_str(fragment);
            }
        }

        output
    }

    /// <https://url.spec.whatwg.org/#concept-url-origin>
    pub fn origin(&self) -> Option<Origin> {
        match self.scheme.as_str() {
            "ftp" | "http" | "https" | "ws" | "wss" => {
                let host = self.host.clone()?;
                let domain = match &host {
                    Host::Domain(domain) => Some(domain.clone()),
                    _ => None,
                };
                Some(Origin {
                    scheme: self.scheme.clone(),
                    host,
                    port: self.port.or_else(|| default_port_for_scheme(&self.scheme)),
                    domain,
                })
            },
            "file" => None,
            _blob if self.scheme == "blob" => {
                let inner = URL::parse(self.path.serialize().trim_start_matches('/'), None).ok()?;
                inner.origin()
            },
            _ => None,
        }
    }

    // -- External getters/setters, https://url.spec.whatwg.org/#urlutils --

    pub fn href(&self) -> String {
        self.serialize(false)
    }

    pub fn set_href(&mut self, value: &str) -> Result<(), ParseError> {
        *self = URL::parse(value, None)?;
        Ok(())
    }

    pub fn protocol(&self) -> String {
        format!("{}:", self.scheme)
    }

    pub fn set_protocol(&mut self, value: &str) {
        let mut errors = IgnoreValidationErrors;
        let input = format!("{value}:");
        if let Ok(url) = Self::parse_with_state_override(
            &input,
            self.clone(),
            ParserState::SchemeStart,
            &mut errors,
        ) {
            *self = url;
        }
    }

    pub fn set_username(&mut self, value: &str) {
        if self.cannot_have_username_password_port() {
            return;
        }
        self.username = crate::percent_encode::percent_encode(
            value,
            crate::percent_encode::is_userinfo_percent_encode_set,
        );
    }

    pub fn set_password(&mut self, value: &str) {
        if self.cannot_have_username_password_port() {
            return;
        }
        self.password = crate::percent_encode::percent_encode(
            value,
            crate::percent_encode::is_userinfo_percent_encode_set,
        );
    }

    pub fn host(&self) -> Option<String> {
        let host = self.host.as_ref()?;
        let mut output = host.serialize();
        if let Some(port) = self.port {
            output.push(':');
            output.push_str(&port.to_string());
        }
        Some(output)
    }

    pub fn set_host(&mut self, value: &str) {
        if self.has_opaque_path() {
            return;
        }
        let mut errors = IgnoreValidationErrors;
        if let Ok(url) =
            Self::parse_with_state_override(value, self.clone(), ParserState::Host, &mut errors)
        {
            *self = url;
        }
    }

    pub fn hostname(&self) -> Option<String> {
        self.host.as_ref().map(Host::serialize)
    }

    pub fn set_hostname(&mut self, value: &str) {
        if self.has_opaque_path() {
            return;
        }
        let mut errors = IgnoreValidationErrors;
        if let Ok(url) = Self::parse_with_state_override(
            value,
            self.clone(),
            ParserState::Hostname,
            &mut errors,
        ) {
            *self = url;
        }
    }

    pub fn port(&self) -> Option<Port> {
        self.port
    }

    pub fn set_port(&mut self, value: &str) {
        if self.cannot_have_username_password_port() {
            return;
        }
        if value.is_empty() {
            self.port = None;
            return;
        }
        let mut errors = IgnoreValidationErrors;
        if let Ok(url) =
            Self::parse_with_state_override(value, self.clone(), ParserState::Port, &mut errors)
        {
            *self = url;
        }
    }

    pub fn pathname(&self) -> String {
        self.path.serialize()
    }

    pub fn set_pathname(&mut self, value: &str) {
        if self.has_opaque_path() {
            return;
        }
        self.path = Path::Segments(Vec::new());
        let mut errors = IgnoreValidationErrors;
        if let Ok(url) = Self::parse_with_state_override(
            value,
            self.clone(),
            ParserState::PathStart,
            &mut errors,
        ) {
            *self = url;
        }
    }

    pub fn search(&self) -> String {
        match &self.query {
            Some(query) if !query.is_empty() => format!("?{query}"),
            _ => String::new(),
        }
    }

    pub fn set_search(&mut self, value: &str) {
        if value.is_empty() {
            self.query = None;
            return;
        }
        let input = value.strip_prefix('?').unwrap_or(value);
        self.query = Some(String::new());
        let mut errors = IgnoreValidationErrors;
        if let Ok(url) = Self::parse_with_state_override(
            input,
            self.clone(),
            ParserState::Query,
            &mut errors,
        ) {
            *self = url;
        }
    }

    pub fn hash(&self) -> String {
        match &self.fragment {
            Some(fragment) if !fragment.is_empty() => format!("#{fragment}"),
            _ => String::new(),
        }
    }

    pub fn set_hash(&mut self, value: &str) {
        if value.is_empty() {
            self.fragment = None;
            return;
        }
        let input = value.strip_prefix('#').unwrap_or(value);
        self.fragment = Some(String::new());
        let mut errors = IgnoreValidationErrors;
        if let Ok(url) = Self::parse_with_state_override(
            input,
            self.clone(),
            ParserState::Fragment,
            &mut errors,
        ) {
            *self = url;
        }
    }

    /// Builds a [URLSearchParams] snapshot of this URL's query string.
    ///
    /// This is a detached copy: mutating the returned value has no effect on
    /// `self`. Use [URL::with_search_params_mut] for the mirrored,
    /// write-back form, or write back explicitly with
    /// `url.set_search(&params.stringify())`.
    pub fn search_params(&self) -> URLSearchParams {
        URLSearchParams::from_query_string(self.query.as_deref().unwrap_or(""))
    }

    /// Gives `f` mutable access to this URL's search params, re-serializing
    /// them back into `self`'s query when `f` returns.
    ///
    /// The living standard has `URLSearchParams` keep a non-owning
    /// back-reference to its owning URL so every mutation updates the URL's
    /// query in place. A raw aliased back-reference has no safe, zero-cost
    /// equivalent for a plain `Clone + PartialEq` value type like [URL];
    /// scoping the mutable view to a closure achieves the same "mutation on
    /// the params side propagates to the URL" behavior without
    /// `Rc<RefCell<_>>` bleeding into every field. An empty resulting params
    /// list clears the query to `None`, matching the standard's
    /// empty-list-to-null convention.
    pub fn with_search_params_mut<R>(&mut self, f: impl FnOnce(&mut URLSearchParams) -> R) -> R {
        let mut params = self.search_params();
        let result = f(&mut params);
        self.query = if params.is_empty() {
            None
        } else {
            Some(params.stringify())
        };
        result
    }
}

/// <https://url.spec.whatwg.org/#concept-url-origin>'s non-opaque case: a
/// (scheme, host, port, domain) tuple. `domain` is `Some` exactly when
/// `host` is [Host::Domain], carrying the same string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    pub scheme: String,
    pub host: Host,
    pub port: Option<Port>,
    pub domain: Option<String>,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host.serialize())?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

impl fmt::Display for URL {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

impl std::str::FromStr for URL {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        URL::parse(s, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_http_url() {
        let url = URL::parse("https://example.com/foo?bar=1#baz", None).unwrap();
        assert_eq!(url.scheme, "https");
        assert_eq!(url.host, Some(Host::Domain("example.com".to_string())));
        assert_eq!(url.path, Path::Segments(vec!["foo".to_string()]));
        assert_eq!(url.query.as_deref(), Some("bar=1"));
        assert_eq!(url.fragment.as_deref(), Some("baz"));
    }

    #[test]
    fn authority_only_url_has_slash_path() {
        let url = URL::parse("https://example.com", None).unwrap();
        assert_eq!(url.path, Path::Segments(vec![String::new()]));
        assert_eq!(url.pathname(), "/");
        assert_eq!(url.href(), "https://example.com/");
    }

    #[test]
    fn relative_url_resolves_against_base() {
        let base = URL::parse("https://example.com/a/b", None).unwrap();
        let url = URL::parse("../c", Some(&base)).unwrap();
        assert_eq!(url.href(), "https://example.com/c");
    }

    #[test]
    fn set_protocol_requires_matching_specialness() {
        let mut url = URL::parse("https://example.com", None).unwrap();
        url.set_protocol("http");
        assert_eq!(url.scheme, "http");

        url.set_protocol("not-special");
        assert_eq!(url.scheme, "http");
    }

    #[test]
    fn set_search_updates_query() {
        let mut url = URL::parse("https://example.com/", None).unwrap();
        url.set_search("?a=1");
        assert_eq!(url.search(), "?a=1");
        url.set_search("");
        assert_eq!(url.search(), "");
    }

    #[test]
    fn origin_for_special_scheme() {
        let url = URL::parse("https://example.com:8443/x", None).unwrap();
        let origin = url.origin().unwrap();
        assert_eq!(origin.to_string(), "https://example.com:8443");
        assert_eq!(origin.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn origin_domain_is_none_for_ip_host() {
        let url = URL::parse("http://127.0.0.1/", None).unwrap();
        let origin = url.origin().unwrap();
        assert_eq!(origin.domain, None);
    }

    #[test]
    fn file_url_has_no_origin() {
        let url = URL::parse("file:///etc/passwd", None).unwrap();
        assert!(url.origin().is_none());
    }
}
