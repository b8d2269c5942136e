//! Non-fatal parse anomalies.
//!
//! Validation errors are the "reported, not fatal" tier of
//! <https://url.spec.whatwg.org/#validation-error>: the parser keeps going,
//! but a caller that cares (tests, strict embedders) can observe exactly
//! which step flagged the input.

/// A syntactic anomaly the parser tolerates. See
/// <https://url.spec.whatwg.org/#validation-error>.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    /// A domain contains a forbidden domain code point.
    DomainInvalidCodepoint,

    /// A host contains a forbidden host code point.
    HostInvalidCodepoint,

    /// An IPv4 address ends with a U+002E (.).
    Ipv4EmptyPart,

    /// An IPv4 address has more than four parts.
    Ipv4TooManyParts,

    /// An IPv4 address part is not numeric.
    Ipv4NonNumericPart,

    /// An IPv4 address part that is not supported by the parser.
    Ipv4NonDecimalPart,

    /// An IPv4 address part exceeds 255.
    Ipv4OutOfRangePart,

    /// An IPv6 address is missing a closing U+005D (]).
    Ipv6Unclosed,

    /// An IPv6 address begins with improper compression.
    Ipv6InvalidCompression,

    /// An IPv6 address has more than eight pieces.
    Ipv6TooManyPieces,

    /// An IPv6 address is compressed in more than one spot.
    Ipv6MultipleCompression,

    /// An IPv6 address contains a code point that is not a hex digit or U+003A (:).
    Ipv6InvalidCodepoint,

    /// An IPv6 address has fewer than eight pieces without compression.
    Ipv6TooFewPieces,

    /// An IPv6 address with an embedded IPv4 address has more than four pieces.
    Ipv4InIpv6TooManyPieces,

    /// An IPv6 address with an embedded IPv4 address has a part with a code
    /// point that is not an ASCII digit.
    Ipv4InIpv6InvalidCodepoint,

    /// An IPv6 address with an embedded IPv4 address has a part that exceeds 255.
    Ipv4InIpv6OutOfRangePart,

    /// An IPv6 address with an embedded IPv4 address has fewer than four parts.
    Ipv4InIpv6TooFewParts,

    /// A code point is found that is not a URL code point or U+0025 (%), in
    /// a context where that is not allowed.
    InvalidUrlUnit,

    /// The input's scheme is not followed by `//`, but it should be.
    SpecialSchemeMissingFollowingSolidus,

    /// The input is missing a scheme, because it does not begin with an
    /// ASCII alpha, and no base URL is provided.
    MissingSchemeNonRelativeUrl,

    /// The URL has a special scheme and it contains the backslash character.
    InvalidReverseSolidus,

    /// The input includes credentials.
    InvalidCredentials,

    /// The input has a special scheme but is missing a host.
    HostMissing,

    /// The input's port is out of range.
    PortOutOfRange,

    /// The input's port is not entirely numbers.
    PortInvalid,

    /// A file URL's path starts with a Windows drive letter and the host is
    /// non-empty.
    FileInvalidWindowsDriveLetterHost,

    /// The first path segment of a file URL is a Windows drive letter.
    FileInvalidWindowsDriveLetter,
}

/// Receives [ValidationError]s as the parser discovers them.
///
/// The default, [ValidationErrorList], routes each error through the `log`
/// facade rather than writing to stdout/stderr directly, so an embedder
/// controls where the diagnostics actually go.
pub trait ValidationErrorHandler {
    fn validation_error(&mut self, error: ValidationError);
}

/// Discards validation errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreValidationErrors;

impl ValidationErrorHandler for IgnoreValidationErrors {
    fn validation_error(&mut self, _error: ValidationError) {}
}

/// Collects validation errors into a `Vec`, for callers that want to inspect
/// them after a parse (tests, strict embedders).
#[derive(Debug, Default, Clone)]
pub struct ValidationErrorList(pub Vec<ValidationError>);

impl ValidationErrorHandler for ValidationErrorList {
    fn validation_error(&mut self, error: ValidationError) {
        log::debug!("URL validation error: {error:?}");
        self.0.push(error);
    }
}
