//! The 21-state basic URL parser, <https://url.spec.whatwg.org/#url-parsing>.
//!
//! One state per match arm against a field-based `URL`, with full
//! `state_override` support so every setter can re-enter the machine at the
//! right state (<https://url.spec.whatwg.org/#concept-basic-url-parser>'s
//! "state override" parameter).
//!
//! The cursor is a plain `Vec<char>` + `isize` index rather than a custom
//! reversible iterator type: "decrease pointer by one" in a state handler
//! and the implicit increment the algorithm performs after every step
//! cancel out (net: reprocess the same code point), and "start over" sets
//! the index to `-1` so that the same increment lands on the first code
//! point. Using `isize` means the momentary negative value between a
//! decrement and the following increment never needs to be masked or
//! special-cased.

use crate::host::Host;
use crate::idna::IdnaToAscii;
use crate::path::Path;
use crate::percent_encode::{
    is_c0_percent_encode_set, is_fragment_percent_encode_set, is_path_percent_encode_set,
    is_query_percent_encode_set, is_special_query_percent_encode_set,
    is_userinfo_percent_encode_set, percent_encode, percent_encode_char,
};
use crate::url::{default_port_for_scheme, is_special_scheme, URL};
use crate::util;
use crate::validation_error::{ValidationError, ValidationErrorHandler};

#[derive(Clone, Copy, Debug)]
pub enum Error {
    Failure,
}

/// <https://url.spec.whatwg.org/#url-parsing> state names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserState {
    SchemeStart,
    Scheme,
    NoScheme,
    SpecialRelativeOrAuthority,
    PathOrAuthority,
    Relative,
    RelativeSlash,
    SpecialAuthoritySlashes,
    SpecialAuthorityIgnoreSlashes,
    Authority,
    Host,
    Hostname,
    Port,
    File,
    FileSlash,
    FileHost,
    PathStart,
    Path,
    OpaquePath,
    Query,
    Fragment,
}

enum StepResult {
    Continue,
    /// The state override contract was satisfied; stop without error.
    Return,
}

pub(crate) struct URLParser<'a, H: ValidationErrorHandler> {
    pub(crate) url: URL,
    pub(crate) base: Option<URL>,
    chars: Vec<char>,
    ptr: isize,
    pub(crate) state: ParserState,
    pub(crate) state_override: Option<ParserState>,
    pub(crate) buffer: String,
    pub(crate) at_sign_seen: bool,
    pub(crate) inside_brackets: bool,
    pub(crate) password_token_seen: bool,
    errors: &'a mut H,
    idna: IdnaToAscii,
}

impl<'a, H: ValidationErrorHandler> URLParser<'a, H> {
    pub(crate) fn new(
        input: &str,
        url: URL,
        base: Option<URL>,
        state_override: Option<ParserState>,
        errors: &'a mut H,
        idna: IdnaToAscii,
    ) -> Self {
        Self {
            url,
            base,
            chars: input.chars().collect(),
            ptr: 0,
            state: state_override.unwrap_or(ParserState::SchemeStart),
            state_override,
            buffer: String::new(),
            at_sign_seen: false,
            inside_brackets: false,
            password_token_seen: false,
            errors,
            idna,
        }
    }

    fn c(&self) -> Option<char> {
        if self.ptr < 0 {
            return None;
        }
        self.chars.get(self.ptr as usize).copied()
    }

    fn remaining_starts_with(&self, s: &str) -> bool {
        let start = (self.ptr + 1).max(0) as usize;
        self.chars
            .get(start..)
            .is_some_and(|rest| rest.iter().copied().take(s.chars().count()).eq(s.chars()))
    }

    fn error(&mut self, error: ValidationError) {
        self.errors.validation_error(error);
    }

    pub(crate) fn run_to_completion(mut self) -> Result<Self, Error> {
        loop {
            match self.step()? {
                StepResult::Continue => {},
                StepResult::Return => return Ok(self),
            }
            self.ptr += 1;
            if self.ptr > self.chars.len() as isize {
                break;
            }
        }
        Ok(self)
    }

    fn step(&mut self) -> Result<StepResult, Error> {
        match self.state {
            // https://url.spec.whatwg.org/#scheme-start-state
            ParserState::SchemeStart => match self.c() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.buffer.push(c.to_ascii_lowercase());
                    self.state = ParserState::Scheme;
                },
                _ => {
                    if self.state_override.is_none() {
                        self.state = ParserState::NoScheme;
                        self.ptr -= 1;
                    } else {
                        return Err(Error::Failure);
                    }
                },
            },

            // https://url.spec.whatwg.org/#scheme-state
            ParserState::Scheme => match self.c() {
                Some(c) if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.') => {
                    self.buffer.push(c.to_ascii_lowercase());
                },
                Some(':') => {
                    if let Some(state_override) = self.state_override {
                        let was_special = self.url.is_special();
                        let buffer_special = is_special_scheme(&self.buffer);
                        if was_special != buffer_special {
                            return Ok(StepResult::Return);
                        }

                        if (self.url.includes_credentials() || self.url.port.is_some())
                            && self.buffer == "file"
                        {
                            return Ok(StepResult::Return);
                        }

                        if self.url.scheme == "file" && self.url.host == Some(Host::Empty) {
                            return Ok(StepResult::Return);
                        }

                        self.url.scheme = std::mem::take(&mut self.buffer);

                        if self.url.port == default_port_for_scheme(&self.url.scheme) {
                            self.url.port = None;
                        }

                        let _ = state_override;
                        return Ok(StepResult::Return);
                    }

                    self.url.scheme = std::mem::take(&mut self.buffer);

                    if self.url.scheme == "file" {
                        if !self.remaining_starts_with("//") {
                            self.error(ValidationError::SpecialSchemeMissingFollowingSolidus);
                        }
                        self.state = ParserState::File;
                    } else if self.url.is_special()
                        && self.base.as_ref().is_some_and(|b| b.scheme == self.url.scheme)
                    {
                        self.state = ParserState::SpecialRelativeOrAuthority;
                    } else if self.url.is_special() {
                        self.state = ParserState::SpecialAuthoritySlashes;
                    } else if self.remaining_starts_with("/") {
                        self.state = ParserState::PathOrAuthority;
                        self.ptr += 1;
                    } else {
                        self.url.path = Path::Opaque(String::new());
                        self.state = ParserState::OpaquePath;
                    }
                },
                _ => {
                    if self.state_override.is_none() {
                        self.buffer.clear();
                        self.state = ParserState::NoScheme;
                        self.ptr = -1;
                    } else {
                        return Err(Error::Failure);
                    }
                },
            },

            // https://url.spec.whatwg.org/#no-scheme-state
            ParserState::NoScheme => {
                let has_opaque_base = self
                    .base
                    .as_ref()
                    .is_some_and(|b| b.has_opaque_path());

                if self.base.is_none() || (has_opaque_base && self.c() != Some('#')) {
                    self.error(ValidationError::MissingSchemeNonRelativeUrl);
                    return Err(Error::Failure);
                }

                let base = self.base.clone().unwrap();
                if has_opaque_base && self.c() == Some('#') {
                    self.url.scheme = base.scheme.clone();
                    self.url.path = base.path.clone();
                    self.url.query = base.query.clone();
                    self.url.fragment = Some(String::new());
                    self.state = ParserState::Fragment;
                } else if base.scheme != "file" {
                    self.state = ParserState::Relative;
                    self.ptr -= 1;
                } else {
                    self.state = ParserState::File;
                    self.ptr -= 1;
                }
            },

            // https://url.spec.whatwg.org/#special-relative-or-authority-state
            ParserState::SpecialRelativeOrAuthority => {
                if self.c() == Some('/') && self.remaining_starts_with("/") {
                    self.state = ParserState::SpecialAuthorityIgnoreSlashes;
                    self.ptr += 1;
                } else {
                    self.error(ValidationError::SpecialSchemeMissingFollowingSolidus);
                    self.state = ParserState::Relative;
                    self.ptr -= 1;
                }
            },

            // https://url.spec.whatwg.org/#path-or-authority-state
            ParserState::PathOrAuthority => {
                if self.c() == Some('/') {
                    self.state = ParserState::Authority;
                } else {
                    self.state = ParserState::Path;
                    self.ptr -= 1;
                }
            },

            // https://url.spec.whatwg.org/#relative-state
            ParserState::Relative => {
                let base = self.base.clone().expect("relative state requires a base");
                debug_assert_ne!(base.scheme, "file");

                self.url.scheme = base.scheme.clone();

                if self.c() == Some('/') {
                    self.state = ParserState::RelativeSlash;
                } else if self.url.is_special() && self.c() == Some('\\') {
                    self.error(ValidationError::InvalidReverseSolidus);
                    self.state = ParserState::RelativeSlash;
                } else {
                    self.url.username = base.username.clone();
                    self.url.password = base.password.clone();
                    self.url.host = base.host.clone();
                    self.url.port = base.port;
                    self.url.path = base.path.clone();
                    self.url.query = base.query.clone();

                    if self.c() == Some('?') {
                        self.url.query = Some(String::new());
                        self.state = ParserState::Query;
                    } else if self.c() == Some('#') {
                        self.url.fragment = Some(String::new());
                        self.state = ParserState::Fragment;
                    }
                }
            },

            // https://url.spec.whatwg.org/#relative-slash-state
            ParserState::RelativeSlash => {
                if self.url.is_special() && matches!(self.c(), Some('/') | Some('\\')) {
                    if self.c() == Some('\\') {
                        self.error(ValidationError::InvalidReverseSolidus);
                    }
                    self.state = ParserState::SpecialAuthorityIgnoreSlashes;
                } else if self.c() == Some('/') {
                    self.state = ParserState::Authority;
                } else {
                    let base = self.base.clone().expect("relative-slash state requires a base");
                    self.url.username = base.username.clone();
                    self.url.password = base.password.clone();
                    self.url.host = base.host.clone();
                    self.url.port = base.port;
                    self.state = ParserState::Path;
                    self.ptr -= 1;
                }
            },

            // https://url.spec.whatwg.org/#special-authority-slashes-state
            ParserState::SpecialAuthoritySlashes => {
                if self.c() == Some('/') && self.remaining_starts_with("/") {
                    self.state = ParserState::SpecialAuthorityIgnoreSlashes;
                    self.ptr += 1;
                } else {
                    self.error(ValidationError::SpecialSchemeMissingFollowingSolidus);
                    self.state = ParserState::SpecialAuthorityIgnoreSlashes;
                    self.ptr -= 1;
                }
            },

            // https://url.spec.whatwg.org/#special-authority-ignore-slashes-state
            ParserState::SpecialAuthorityIgnoreSlashes => {
                if !matches!(self.c(), Some('/') | Some('\\')) {
                    self.state = ParserState::Authority;
                    self.ptr -= 1;
                } else {
                    self.error(ValidationError::SpecialSchemeMissingFollowingSolidus);
                }
            },

            // https://url.spec.whatwg.org/#authority-state
            ParserState::Authority => {
                if self.c() == Some('@') {
                    self.error(ValidationError::InvalidCredentials);
                    if self.at_sign_seen {
                        self.buffer.insert_str(0, "%40");
                    }
                    self.at_sign_seen = true;

                    let buffer = std::mem::take(&mut self.buffer);
                    for code_point in buffer.chars() {
                        if code_point == ':' && !self.password_token_seen {
                            self.password_token_seen = true;
                            continue;
                        }

                        let encoded = percent_encode_char(code_point, is_userinfo_percent_encode_set);
                        if self.password_token_seen {
                            self.url.password.push_str(&encoded);
                        } else {
                            self.url.username.push_str(&encoded);
                        }
                    }
                } else if matches!(self.c(), None | Some('/') | Some('?') | Some('#'))
                    || (self.url.is_special() && self.c() == Some('\\'))
                {
                    if self.at_sign_seen && self.buffer.is_empty() {
                        self.error(ValidationError::HostMissing);
                        return Err(Error::Failure);
                    }

                    self.ptr -= self.buffer.chars().count() as isize + 1;
                    self.buffer.clear();
                    self.state = ParserState::Host;
                } else {
                    self.buffer.push(self.c().unwrap());
                }
            },

            // https://url.spec.whatwg.org/#host-state
            // https://url.spec.whatwg.org/#hostname-state
            ParserState::Host | ParserState::Hostname => {
                if self.state_override.is_some() && self.url.scheme == "file" {
                    self.ptr -= 1;
                    self.state = ParserState::FileHost;
                } else if self.c() == Some(':') && !self.inside_brackets {
                    if self.buffer.is_empty() {
                        self.error(ValidationError::HostMissing);
                        return Err(Error::Failure);
                    }

                    if self.state_override == Some(ParserState::Hostname) {
                        return Ok(StepResult::Return);
                    }

                    let host = Host::parse(
                        &self.buffer,
                        !self.url.is_special(),
                        &self.idna,
                        self.errors,
                    )
                    .map_err(|_| Error::Failure)?;
                    self.url.host = Some(host);
                    self.buffer.clear();
                    self.state = ParserState::Port;
                } else if matches!(self.c(), None | Some('/') | Some('?') | Some('#'))
                    || (self.url.is_special() && self.c() == Some('\\'))
                {
                    self.ptr -= 1;

                    if self.url.is_special() && self.buffer.is_empty() {
                        self.error(ValidationError::HostMissing);
                        return Err(Error::Failure);
                    } else if self.state_override.is_some()
                        && self.buffer.is_empty()
                        && (self.url.includes_credentials() || self.url.port.is_some())
                    {
                        return Ok(StepResult::Return);
                    }

                    let host = Host::parse(
                        &self.buffer,
                        !self.url.is_special(),
                        &self.idna,
                        self.errors,
                    )
                    .map_err(|_| Error::Failure)?;
                    self.url.host = Some(host);
                    self.buffer.clear();
                    self.state = ParserState::PathStart;

                    if self.state_override.is_some() {
                        return Ok(StepResult::Return);
                    }
                } else {
                    if self.c() == Some('[') {
                        self.inside_brackets = true;
                    } else if self.c() == Some(']') {
                        self.inside_brackets = false;
                    }
                    self.buffer.push(self.c().unwrap());
                }
            },

            // https://url.spec.whatwg.org/#port-state
            ParserState::Port => {
                let is_terminator = matches!(self.c(), None | Some('/') | Some('?') | Some('#'))
                    || (self.url.is_special() && self.c() == Some('\\'))
                    || self.state_override.is_some();

                if let Some(c) = self.c().filter(|c| c.is_ascii_digit()) {
                    self.buffer.push(c);
                } else if is_terminator {
                    if !self.buffer.is_empty() {
                        let port: u32 = self.buffer.parse().map_err(|_| Error::Failure)?;
                        if port > u16::MAX as u32 {
                            self.error(ValidationError::PortOutOfRange);
                            return Err(Error::Failure);
                        }

                        let port = port as u16;
                        self.url.port = if Some(port) == default_port_for_scheme(&self.url.scheme)
                        {
                            None
                        } else {
                            Some(port)
                        };
                        self.buffer.clear();
                    }

                    if self.state_override.is_some() {
                        return Ok(StepResult::Return);
                    }

                    self.state = ParserState::PathStart;
                    self.ptr -= 1;
                } else {
                    self.error(ValidationError::PortInvalid);
                    return Err(Error::Failure);
                }
            },

            // https://url.spec.whatwg.org/#file-state
            ParserState::File => {
                self.url.scheme = "file".to_string();
                self.url.host = Some(Host::Empty);

                if matches!(self.c(), Some('/') | Some('\\')) {
                    if self.c() == Some('\\') {
                        self.error(ValidationError::InvalidReverseSolidus);
                    }
                    self.state = ParserState::FileSlash;
                } else if self.base.as_ref().is_some_and(|b| b.scheme == "file") {
                    let base = self.base.clone().unwrap();
                    self.url.host = base.host.clone();
                    self.url.path = base.path.clone();
                    self.url.query = base.query.clone();

                    if self.c() == Some('?') {
                        self.url.query = Some(String::new());
                        self.state = ParserState::Query;
                    } else if self.c() == Some('#') {
                        self.url.fragment = Some(String::new());
                        self.state = ParserState::Fragment;
                    } else if self.c().is_some() {
                        self.url.query = None;
                        if !util::starts_with_windows_drive_letter(self.remaining()) {
                            self.url.path.shorten("file");
                        } else {
                            self.error(ValidationError::FileInvalidWindowsDriveLetter);
                            self.url.path = Path::Segments(Vec::new());
                        }
                        self.state = ParserState::Path;
                        self.ptr -= 1;
                    }
                } else {
                    self.state = ParserState::Path;
                    self.ptr -= 1;
                }
            },

            // https://url.spec.whatwg.org/#file-slash-state
            ParserState::FileSlash => {
                if matches!(self.c(), Some('/') | Some('\\')) {
                    if self.c() == Some('\\') {
                        self.error(ValidationError::InvalidReverseSolidus);
                    }
                    self.state = ParserState::FileHost;
                } else {
                    if let Some(base) = self.base.clone() {
                        if base.scheme == "file" {
                            self.url.host = base.host.clone();
                            if !util::starts_with_windows_drive_letter(self.remaining())
                                && base
                                    .path
                                    .segments()
                                    .first()
                                    .is_some_and(|s| util::is_normalized_windows_drive_letter(s))
                            {
                                let drive_letter = base.path.segments()[0].clone();
                                self.url.path = Path::Segments(vec![drive_letter]);
                            }
                        }
                    }
                    self.state = ParserState::Path;
                    self.ptr -= 1;
                }
            },

            // https://url.spec.whatwg.org/#file-host-state
            ParserState::FileHost => {
                if matches!(self.c(), None | Some('/') | Some('\\') | Some('?') | Some('#')) {
                    self.ptr -= 1;

                    if self.state_override.is_none() && util::is_windows_drive_letter(&self.buffer)
                    {
                        self.error(ValidationError::FileInvalidWindowsDriveLetterHost);
                        self.state = ParserState::Path;
                    } else if self.buffer.is_empty() {
                        self.url.host = Some(Host::Empty);

                        if self.state_override.is_some() {
                            return Ok(StepResult::Return);
                        }
                        self.state = ParserState::PathStart;
                    } else {
                        let mut host = Host::parse(&self.buffer, false, &self.idna, self.errors)
                            .map_err(|_| Error::Failure)?;
                        if host == Host::Domain("localhost".to_string()) {
                            host = Host::Empty;
                        }
                        self.url.host = Some(host);

                        if self.state_override.is_some() {
                            return Ok(StepResult::Return);
                        }

                        self.buffer.clear();
                        self.state = ParserState::PathStart;
                    }
                } else {
                    self.buffer.push(self.c().unwrap());
                }
            },

            // https://url.spec.whatwg.org/#path-start-state
            ParserState::PathStart => {
                if self.url.is_special() {
                    if self.c() == Some('\\') {
                        self.error(ValidationError::InvalidReverseSolidus);
                    }
                    self.state = ParserState::Path;
                    if !matches!(self.c(), Some('/') | Some('\\')) {
                        self.ptr -= 1;
                    }
                } else if self.state_override.is_none() && self.c() == Some('?') {
                    self.url.query = Some(String::new());
                    self.state = ParserState::Query;
                } else if self.state_override.is_none() && self.c() == Some('#') {
                    self.url.fragment = Some(String::new());
                    self.state = ParserState::Fragment;
                } else if self.c().is_some() {
                    self.state = ParserState::Path;
                    if self.c() != Some('/') {
                        self.ptr -= 1;
                    }
                } else if self.state_override.is_some() && self.url.host.is_none() {
                    self.url.path.segments_mut().push(String::new());
                }
            },

            // https://url.spec.whatwg.org/#path-state
            ParserState::Path => {
                let is_terminator = matches!(self.c(), None | Some('/'))
                    || (self.url.is_special() && self.c() == Some('\\'))
                    || (self.state_override.is_none() && matches!(self.c(), Some('?') | Some('#')));

                if is_terminator {
                    let double_backslash_special = self.url.is_special() && self.c() == Some('\\');
                    if double_backslash_special {
                        self.error(ValidationError::InvalidReverseSolidus);
                    }

                    if util::is_double_dot_path_segment(&self.buffer) {
                        self.url.path.shorten(&self.url.scheme.clone());
                        if !(self.c() == Some('/') || double_backslash_special) {
                            self.url.path.segments_mut().push(String::new());
                        }
                    } else if util::is_single_dot_path_segment(&self.buffer) {
                        if !(self.c() == Some('/') || double_backslash_special) {
                            self.url.path.segments_mut().push(String::new());
                        }
                    } else {
                        if self.url.scheme == "file"
                            && self.url.path.segments().is_empty()
                            && util::is_windows_drive_letter(&self.buffer)
                        {
                            if let Some(second) = self.buffer.chars().nth(1) {
                                if second == '|' {
                                    self.buffer.replace_range(1..2, ":");
                                }
                            }
                        }
                        let segment = std::mem::take(&mut self.buffer);
                        self.url.path.segments_mut().push(segment);
                    }

                    self.buffer.clear();

                    if self.c() == Some('?') {
                        self.url.query = Some(String::new());
                        self.state = ParserState::Query;
                    } else if self.c() == Some('#') {
                        self.url.fragment = Some(String::new());
                        self.state = ParserState::Fragment;
                    }
                } else {
                    if !util::is_url_codepoint_or_percent(self.c().unwrap()) {
                        self.error(ValidationError::InvalidUrlUnit);
                    }
                    if self.c() == Some('%') && !self.next_two_are_hex() {
                        self.error(ValidationError::InvalidUrlUnit);
                    }
                    let encoded = percent_encode_char(self.c().unwrap(), is_path_percent_encode_set);
                    self.buffer.push_str(&encoded);
                }
            },

            // https://url.spec.whatwg.org/#path-state (opaque variant)
            ParserState::OpaquePath => {
                let Path::Opaque(opaque) = &mut self.url.path else {
                    unreachable!("OpaquePath state requires an opaque path")
                };

                if self.c() == Some('?') {
                    self.url.query = Some(String::new());
                    self.state = ParserState::Query;
                } else if self.c() == Some('#') {
                    self.url.fragment = Some(String::new());
                    self.state = ParserState::Fragment;
                } else if let Some(c) = self.c() {
                    if !util::is_url_codepoint_or_percent(c) {
                        self.error(ValidationError::InvalidUrlUnit);
                    }
                    if c == '%' && !self.next_two_are_hex() {
                        self.error(ValidationError::InvalidUrlUnit);
                    }
                    let encoded = percent_encode_char(c, is_c0_percent_encode_set);
                    opaque.push_str(&encoded);
                }
            },

            // https://url.spec.whatwg.org/#query-state
            ParserState::Query => {
                let is_terminator =
                    self.c().is_none() || (self.state_override.is_none() && self.c() == Some('#'));

                if is_terminator {
                    let set = if self.url.is_special() {
                        is_special_query_percent_encode_set
                    } else {
                        is_query_percent_encode_set
                    };
                    let buffer = std::mem::take(&mut self.buffer);
                    let encoded = percent_encode(&buffer, set);
                    self.url.query.get_or_insert_with(String::new).push_str(&encoded);

                    if self.c() == Some('#') {
                        self.url.fragment = Some(String::new());
                        self.state = ParserState::Fragment;
                    }
                } else {
                    let c = self.c().unwrap();
                    if !util::is_url_codepoint_or_percent(c) {
                        self.error(ValidationError::InvalidUrlUnit);
                    }
                    if c == '%' && !self.next_two_are_hex() {
                        self.error(ValidationError::InvalidUrlUnit);
                    }
                    self.buffer.push(c);
                }
            },

            // https://url.spec.whatwg.org/#fragment-state
            ParserState::Fragment => {
                if let Some(c) = self.c() {
                    if !util::is_url_codepoint_or_percent(c) {
                        self.error(ValidationError::InvalidUrlUnit);
                    }
                    if c == '%' && !self.next_two_are_hex() {
                        self.error(ValidationError::InvalidUrlUnit);
                    }
                    let encoded = percent_encode_char(c, is_fragment_percent_encode_set);
                    self.url.fragment.get_or_insert_with(String::new).push_str(&encoded);
                }
            },
        }

        Ok(StepResult::Continue)
    }

    fn remaining(&self) -> String {
        let start = (self.ptr + 1).max(0) as usize;
        self.chars.get(start..).unwrap_or(&[]).iter().collect()
    }

    fn next_two_are_hex(&self) -> bool {
        let start = (self.ptr + 1).max(0) as usize;
        matches!(
            (self.chars.get(start), self.chars.get(start + 1)),
            (Some(a), Some(b)) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit()
        )
    }
}
