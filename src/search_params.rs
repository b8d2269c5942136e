//! <https://url.spec.whatwg.org/#interface-urlsearchparams>
//!
//! An ordered list of name-value pairs with `append`/`delete`/`get`/
//! `get_all`/`has`/`set`/`sort`/stringify. The living standard has
//! `URLSearchParams` keep a back-reference to its owning URL and write back
//! into it on every mutation; `URL::search_params` returns a detached
//! snapshot instead, and `URL::with_search_params_mut` provides the
//! write-back form scoped to a closure, since nothing else in this crate's
//! API holds `URL` behind shared, interior-mutable storage.

use std::cmp::Ordering;

use crate::percent_encode::{
    is_form_urlencoded_percent_encode_set, percent_decode, percent_encode_space_as_plus,
};

/// A single name-value pair. The list order is significant and is preserved
/// across all of `append`/`delete`/`set` per spec.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Pair {
    name: String,
    value: String,
}

/// <https://url.spec.whatwg.org/#concept-urlsearchparams-list>
#[derive(Clone, Debug, Default)]
pub struct URLSearchParams {
    list: Vec<Pair>,
}

impl URLSearchParams {
    /// Constructs from a query string. A single leading `?` is stripped,
    /// matching the constructor overload used when building from a URL's
    /// query.
    pub fn new(init: &str) -> Self {
        let init = init.strip_prefix('?').unwrap_or(init);
        Self::from_query_string(init)
    }

    /// As [URLSearchParams::new], but never strips a leading `?` — for
    /// callers that want `new URLSearchParams("?a=b")`'s literal behavior,
    /// where a leading `?` in the input is treated as an ordinary character.
    pub fn from_str_preserving_question_mark(init: &str) -> Self {
        Self::from_query_string(init)
    }

    pub(crate) fn from_query_string(init: &str) -> Self {
        Self {
            list: application_x_www_form_urlencoded_parse(init),
        }
    }

    /// Constructs from an ordered sequence of name-value pairs, e.g.
    /// `[("a", "1"), ("b", "2")]`.
    pub fn from_pairs<I, S1, S2>(init: I) -> Self
    where
        I: IntoIterator<Item = (S1, S2)>,
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            list: init
                .into_iter()
                .map(|(name, value)| Pair {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Constructs from a record/map. Iteration order is whatever the
    /// caller's iterator yields; a `BTreeMap` yields key order, which
    /// matches what most callers expect.
    pub fn from_record<I, S1, S2>(init: I) -> Self
    where
        I: IntoIterator<Item = (S1, S2)>,
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::from_pairs(init)
    }

    /// <https://url.spec.whatwg.org/#dom-urlsearchparams-append>
    pub fn append(&mut self, name: &str, value: &str) {
        self.list.push(Pair {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// <https://url.spec.whatwg.org/#dom-urlsearchparams-delete>
    ///
    /// The single-argument form; the two-argument `delete(name, value)`
    /// overload is handled by [URLSearchParams::delete_with_value].
    pub fn delete(&mut self, name: &str) {
        self.list.retain(|pair| pair.name != name);
    }

    pub fn delete_with_value(&mut self, name: &str, value: &str) {
        self.list
            .retain(|pair| !(pair.name == name && pair.value == value));
    }

    /// <https://url.spec.whatwg.org/#dom-urlsearchparams-get>
    pub fn get(&self, name: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|pair| pair.name == name)
            .map(|pair| pair.value.as_str())
    }

    /// <https://url.spec.whatwg.org/#dom-urlsearchparams-getall>
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.list
            .iter()
            .filter(|pair| pair.name == name)
            .map(|pair| pair.value.as_str())
            .collect()
    }

    /// <https://url.spec.whatwg.org/#dom-urlsearchparams-has>
    pub fn has(&self, name: &str) -> bool {
        self.list.iter().any(|pair| pair.name == name)
    }

    pub fn has_with_value(&self, name: &str, value: &str) -> bool {
        self.list
            .iter()
            .any(|pair| pair.name == name && pair.value == value)
    }

    /// <https://url.spec.whatwg.org/#dom-urlsearchparams-set>
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(index) = self.list.iter().position(|pair| pair.name == name) {
            self.list[index].value = value.to_string();
            let mut seen_first = false;
            self.list.retain(|pair| {
                if pair.name != name {
                    return true;
                }
                if !seen_first {
                    seen_first = true;
                    return true;
                }
                false
            });
        } else {
            self.append(name, value);
        }
    }

    /// <https://url.spec.whatwg.org/#dom-urlsearchparams-sort>
    ///
    /// Sorts by comparison of UTF-16 code units, per
    /// [compare_by_code_units], preserving relative order between pairs with
    /// equal names (a stable sort gives this for free).
    pub fn sort(&mut self) {
        self.list
            .sort_by(|a, b| compare_by_code_units(&a.name, &b.name));
    }

    /// <https://url.spec.whatwg.org/#urlsearchparams-stringification-behavior>
    pub fn stringify(&self) -> String {
        application_x_www_form_urlencoded_serialize(&self.list)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.list.iter().map(|pair| (pair.name.as_str(), pair.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// <https://url.spec.whatwg.org/#concept-urlencoded-parser>
fn application_x_www_form_urlencoded_parse(input: &str) -> Vec<Pair> {
    if input.is_empty() {
        return Vec::new();
    }

    input
        .split('&')
        .filter(|sequence| !sequence.is_empty())
        .map(|sequence| {
            let (name, value) = match sequence.split_once('=') {
                Some((name, value)) => (name, value),
                None => (sequence, ""),
            };
            Pair {
                name: form_urlencoded_decode(name),
                value: form_urlencoded_decode(value),
            }
        })
        .collect()
}

fn form_urlencoded_decode(input: &str) -> String {
    let replaced: String = input.chars().map(|c| if c == '+' { ' ' } else { c }).collect();
    String::from_utf8_lossy(&percent_decode(&replaced)).into_owned()
}

/// <https://url.spec.whatwg.org/#concept-urlencoded-serializer>
fn application_x_www_form_urlencoded_serialize(list: &[Pair]) -> String {
    let mut output = String::new();
    for pair in list {
        if !output.is_empty() {
            output.push('&');
        }
        output.push_str(&percent_encode_space_as_plus(
            &pair.name,
            is_form_urlencoded_percent_encode_set,
            true,
        ));
        output.push('=');
        output.push_str(&percent_encode_space_as_plus(
            &pair.value,
            is_form_urlencoded_percent_encode_set,
            true,
        ));
    }
    output
}

/// Compares two strings as sequences of UTF-16 code units, without actually
/// transcoding to UTF-16, per
/// <https://url.spec.whatwg.org/#concept-urlsearchparams-sort> ("code unit
/// less than"). ASCII bytes compare directly; non-ASCII bytes are decoded as
/// whole `char`s and mapped to the UTF-16 code unit they'd produce — code
/// points above U+FFFF map to their leading surrogate
/// `(code_point >> 10) + 0xD7C0`, with ties broken on the trailing surrogate
/// `code_point & 0x3FF`.
fn compare_by_code_units(lhs: &str, rhs: &str) -> Ordering {
    let mut a = lhs.chars();
    let mut b = rhs.chars();

    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) => {
                if x == y {
                    continue;
                }
                if x.is_ascii() || y.is_ascii() {
                    return (x as u32).cmp(&(y as u32));
                }

                let unit = |c: char| -> u32 {
                    let cp = c as u32;
                    if cp <= 0xFFFF {
                        cp
                    } else {
                        (cp >> 10) + 0xD7C0
                    }
                };
                let (ux, uy) = (unit(x), unit(y));
                if ux != uy {
                    return ux.cmp(&uy);
                }

                let trail = |cp: u32| -> u32 { cp & 0x3FF };
                return trail(x as u32).cmp(&trail(y as u32));
            },
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_query_string() {
        let params = URLSearchParams::new("a=1&b=2&c");
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), Some("2"));
        assert_eq!(params.get("c"), Some(""));
    }

    #[test]
    fn plus_decodes_to_space() {
        let params = URLSearchParams::new("q=hello+world");
        assert_eq!(params.get("q"), Some("hello world"));
    }

    #[test]
    fn append_get_all_preserves_order() {
        let mut params = URLSearchParams::new("");
        params.append("a", "1");
        params.append("a", "2");
        assert_eq!(params.get_all("a"), vec!["1", "2"]);
    }

    #[test]
    fn set_replaces_first_and_removes_rest() {
        let mut params = URLSearchParams::from_pairs([("a", "1"), ("b", "x"), ("a", "2")]);
        params.set("a", "new");
        assert_eq!(params.get_all("a"), vec!["new"]);
        assert_eq!(params.stringify(), "a=new&b=x");
    }

    #[test]
    fn delete_removes_all_matching() {
        let mut params = URLSearchParams::from_pairs([("a", "1"), ("b", "2"), ("a", "3")]);
        params.delete("a");
        assert!(!params.has("a"));
        assert_eq!(params.stringify(), "b=2");
    }

    #[test]
    fn sort_orders_by_code_unit_preserving_ties() {
        let mut params =
            URLSearchParams::from_pairs([("b", "1"), ("a", "1"), ("a", "2"), ("B", "3")]);
        params.sort();
        let names: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["B", "a", "a", "b"]);
    }

    #[test]
    fn stringify_percent_encodes_space_as_plus() {
        let params = URLSearchParams::from_pairs([("q", "a b")]);
        assert_eq!(params.stringify(), "q=a+b");
    }

    #[test]
    fn leading_question_mark_is_stripped_by_default() {
        let params = URLSearchParams::new("?a=1");
        assert_eq!(params.get("a"), Some("1"));

        let preserved = URLSearchParams::from_str_preserving_question_mark("?a=1");
        assert_eq!(preserved.get("?a"), Some("1"));
    }
}
