//! <https://url.spec.whatwg.org/#hosts-(domains-and-ip-addresses)>

use crate::idna::IdnaToAscii;
use crate::ip::{self, IpParseError};
use crate::percent_encode::{self, is_c0_percent_encode_set};
use crate::util::{is_c0_control, is_url_codepoint};
use crate::validation_error::{ValidationError, ValidationErrorHandler};

/// <https://url.spec.whatwg.org/#forbidden-host-code-point>
fn is_forbidden_host_code_point(c: char) -> bool {
    matches!(
        c,
        '\u{0000}'
            | '\u{0009}'
            | '\u{000A}'
            | '\u{000D}'
            | ' '
            | '#'
            | '/'
            | ':'
            | '<'
            | '>'
            | '?'
            | '@'
            | '['
            | '\\'
            | ']'
            | '^'
            | '|'
    )
}

/// <https://url.spec.whatwg.org/#forbidden-domain-code-point>
fn is_forbidden_domain_code_point(c: char) -> bool {
    is_forbidden_host_code_point(c) || is_c0_control(c) || matches!(c, '%' | '\u{007F}')
}

/// A nullable host is `Option<Host>`; `Host` itself carries the five
/// inhabited cases from <https://url.spec.whatwg.org/#concept-host>.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Host {
    Domain(String),
    Opaque(String),
    Empty,
    Ipv4(u32),
    Ipv6([u16; 8]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostParseError {
    MalformedBrackets,
    ForbiddenCodePoint,
    IdnaFailed,
    Ip(IpParseError),
}

impl Host {
    /// <https://url.spec.whatwg.org/#concept-host-parser>
    pub(crate) fn parse<H: ValidationErrorHandler>(
        input: &str,
        is_not_special: bool,
        idna: &IdnaToAscii,
        errors: &mut H,
    ) -> Result<Self, HostParseError> {
        if let Some(interior) = input.strip_prefix('[') {
            let Some(ipv6_text) = interior.strip_suffix(']') else {
                errors.validation_error(ValidationError::Ipv6Unclosed);
                return Err(HostParseError::MalformedBrackets);
            };
            let pieces = ip::ipv6_parse(ipv6_text, errors).map_err(HostParseError::Ip)?;
            return Ok(Host::Ipv6(pieces));
        }

        if is_not_special {
            return opaque_host_parse(input, errors);
        }

        debug_assert!(!input.is_empty());

        let decoded = percent_encode::percent_decode(input);
        let domain = String::from_utf8_lossy(&decoded).into_owned();

        let Some(ascii_domain) = idna(&domain, crate::idna::IdnaMode::Default) else {
            errors.validation_error(ValidationError::DomainInvalidCodepoint);
            return Err(HostParseError::IdnaFailed);
        };

        if ascii_domain.is_empty() {
            errors.validation_error(ValidationError::DomainInvalidCodepoint);
            return Err(HostParseError::IdnaFailed);
        }

        if ascii_domain.contains(is_forbidden_domain_code_point) {
            errors.validation_error(ValidationError::DomainInvalidCodepoint);
            return Err(HostParseError::ForbiddenCodePoint);
        }

        if ascii_domain.ends_with(|c: char| c.is_ascii_digit()) {
            return match ip::ipv4_parse(&ascii_domain, errors) {
                Ok(address) => Ok(Host::Ipv4(address)),
                Err(IpParseError::Ipv4NonNumericPart) => Ok(Host::Domain(ascii_domain)),
                Err(other) => Err(HostParseError::Ip(other)),
            };
        }

        Ok(Host::Domain(ascii_domain))
    }

    /// <https://url.spec.whatwg.org/#host-serializing>
    pub fn serialize(&self) -> String {
        match self {
            Host::Domain(domain) => domain.clone(),
            Host::Opaque(opaque) => opaque.clone(),
            Host::Empty => String::new(),
            Host::Ipv4(address) => serialize_ipv4(*address),
            Host::Ipv6(pieces) => format!("[{}]", serialize_ipv6(pieces)),
        }
    }
}

/// <https://url.spec.whatwg.org/#concept-opaque-host-parser>
fn opaque_host_parse<H: ValidationErrorHandler>(
    input: &str,
    errors: &mut H,
) -> Result<Host, HostParseError> {
    if input.contains(is_forbidden_host_code_point) {
        errors.validation_error(ValidationError::HostInvalidCodepoint);
        return Err(HostParseError::ForbiddenCodePoint);
    }

    if input.contains(|c| !is_url_codepoint(c) && c != '%') {
        errors.validation_error(ValidationError::InvalidUrlUnit);
    }

    for (i, c) in input.char_indices() {
        if c == '%' {
            let rest = &input[i + 1..];
            let valid = rest
                .as_bytes()
                .first()
                .zip(rest.as_bytes().get(1))
                .is_some_and(|(a, b)| a.is_ascii_hexdigit() && b.is_ascii_hexdigit());
            if !valid {
                errors.validation_error(ValidationError::InvalidUrlUnit);
            }
        }
    }

    Ok(Host::Opaque(percent_encode::percent_encode(
        input,
        is_c0_percent_encode_set,
    )))
}

/// <https://url.spec.whatwg.org/#concept-ipv4-serializer>
fn serialize_ipv4(address: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (address >> 24) & 0xFF,
        (address >> 16) & 0xFF,
        (address >> 8) & 0xFF,
        address & 0xFF
    )
}

/// <https://url.spec.whatwg.org/#concept-ipv6-serializer>
fn serialize_ipv6(pieces: &[u16; 8]) -> String {
    // Find the longest run of >= 2 zero pieces; ties favor the first run.
    let mut best_start = None;
    let mut best_len = 0;
    let mut cur_start = None;
    let mut cur_len = 0;
    for (i, &piece) in pieces.iter().enumerate() {
        if piece == 0 {
            if cur_start.is_none() {
                cur_start = Some(i);
            }
            cur_len += 1;
            if cur_len > best_len {
                best_len = cur_len;
                best_start = cur_start;
            }
        } else {
            cur_start = None;
            cur_len = 0;
        }
    }
    let compress = if best_len >= 2 { best_start } else { None };

    let mut output = String::new();
    let mut ignore0 = false;
    for (i, &piece) in pieces.iter().enumerate() {
        if ignore0 && piece == 0 {
            continue;
        } else if ignore0 {
            ignore0 = false;
        }

        if compress == Some(i) {
            output.push_str(if i == 0 { "::" } else { ":" });
            ignore0 = true;
            continue;
        }

        output.push_str(&format!("{piece:x}"));
        if i != 7 {
            output.push(':');
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idna::default_idna_to_ascii;
    use crate::validation_error::IgnoreValidationErrors;

    #[test]
    fn parse_domain() {
        let mut errs = IgnoreValidationErrors;
        let host = Host::parse("example.com", false, &default_idna_to_ascii(), &mut errs).unwrap();
        assert_eq!(host, Host::Domain("example.com".to_string()));
    }

    #[test]
    fn parse_ipv4_domain() {
        let mut errs = IgnoreValidationErrors;
        let host = Host::parse("0x7f.1", false, &default_idna_to_ascii(), &mut errs).unwrap();
        assert_eq!(host, Host::Ipv4(0x7F000001));
    }

    #[test]
    fn parse_bracketed_ipv6() {
        let mut errs = IgnoreValidationErrors;
        let host =
            Host::parse("[2001:db8::1]", false, &default_idna_to_ascii(), &mut errs).unwrap();
        assert_eq!(host, Host::Ipv6([0x2001, 0xdb8, 0, 0, 0, 0, 0, 1]));
    }

    #[test]
    fn parse_opaque_host() {
        let mut errs = IgnoreValidationErrors;
        let host = Host::parse("a b", true, &default_idna_to_ascii(), &mut errs).unwrap();
        assert_eq!(host, Host::Opaque("a%20b".to_string()));
    }

    #[test]
    fn serialize_ipv4_roundtrip() {
        assert_eq!(serialize_ipv4(0x7F000001), "127.0.0.1");
    }

    #[test]
    fn serialize_ipv6_compresses_longest_run() {
        assert_eq!(
            serialize_ipv6(&[0x2001, 0xdb8, 0, 0, 0, 0, 0, 1]),
            "2001:db8::1"
        );
        assert_eq!(serialize_ipv6(&[0, 0, 0, 0, 0, 0, 0, 1]), "::1");
        assert_eq!(serialize_ipv6(&[0, 0, 0, 0, 0, 0, 0, 0]), "::");
    }
}
