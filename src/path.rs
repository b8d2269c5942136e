//! <https://url.spec.whatwg.org/#url-path>

use crate::util::is_normalized_windows_drive_letter;

/// A URL's path: either a segment list (possibly empty) or a single opaque
/// string. <https://url.spec.whatwg.org/#url-path>
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Path {
    Opaque(String),
    Segments(Vec<String>),
}

impl Path {
    pub fn is_opaque(&self) -> bool {
        matches!(self, Path::Opaque(_))
    }

    pub(crate) fn segments(&self) -> &[String] {
        match self {
            Path::Segments(segments) => segments,
            Path::Opaque(_) => &[],
        }
    }

    pub(crate) fn segments_mut(&mut self) -> &mut Vec<String> {
        match self {
            Path::Segments(segments) => segments,
            Path::Opaque(_) => panic!("segments_mut called on an opaque path"),
        }
    }

    /// <https://url.spec.whatwg.org/#shorten-a-urls-path>
    ///
    /// The scheme is needed only for the Windows-drive-letter exception.
    pub(crate) fn shorten(&mut self, scheme: &str) {
        let Path::Segments(segments) = self else {
            panic!("shorten called on an opaque path");
        };

        if scheme == "file"
            && segments.len() == 1
            && is_normalized_windows_drive_letter(&segments[0])
        {
            return;
        }

        segments.pop();
    }

    /// <https://url.spec.whatwg.org/#url-path-serializer>
    pub fn serialize(&self) -> String {
        match self {
            Path::Opaque(opaque) => opaque.clone(),
            Path::Segments(segments) => {
                let mut output = String::new();
                for segment in segments {
                    output.push('/');
                    output.push_str(segment);
                }
                output
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorten_drops_last_segment() {
        let mut path = Path::Segments(vec!["a".to_string(), "b".to_string()]);
        path.shorten("http");
        assert_eq!(path, Path::Segments(vec!["a".to_string()]));
    }

    #[test]
    fn shorten_keeps_sole_drive_letter_for_file_scheme() {
        let mut path = Path::Segments(vec!["C:".to_string()]);
        path.shorten("file");
        assert_eq!(path, Path::Segments(vec!["C:".to_string()]));
    }

    #[test]
    fn serialize_opaque_verbatim() {
        assert_eq!(Path::Opaque("a/b?c".to_string()).serialize(), "a/b?c");
    }

    #[test]
    fn serialize_segments_joined() {
        let path = Path::Segments(vec!["foo".to_string(), "bar".to_string()]);
        assert_eq!(path.serialize(), "/foo/bar");
    }
}
