//! Single-pass scanner turning a path string into a [`Path`].
//!
//! Both dialects run through the same loop. They only disagree about when a
//! bracket opens a key span: in the XPath dialect it always does, in the DME
//! dialect only after a `?` query marker. Outside such a condition, DME
//! brackets are literal name text and a `/` between them does not split the
//! segment, so `/sys/intf/phys-[eth1/1]` keeps `phys-[eth1/1]` as one name.

use std::collections::BTreeMap;

use crate::error::{PathError, PathResult};
use crate::path::{Dialect, Path, PathElem};

/// Parse `path`, picking the dialect from `origin`.
///
/// The origin and target are recorded on the returned [`Path`]; empty
/// strings count as absent.
pub fn parse_path(origin: Option<&str>, path: &str, target: Option<&str>) -> PathResult<Path> {
    if !path.is_empty() && !path.starts_with('/') {
        return Err(PathError::MissingLeadingSlash(path.to_string()));
    }

    let dialect = Dialect::from_origin(origin);
    let elem = match Scanner::new(path, dialect).run() {
        Ok(elem) => elem,
        Err(offset) => {
            let byte = path.as_bytes().get(offset).map(|b| char::from(*b));
            tracing::debug!(%path, %dialect, offset, ?byte, "rejected path");
            return Err(PathError::Invalid(path.to_string()));
        }
    };
    tracing::trace!(%path, %dialect, elems = elem.len(), "parsed path");

    Ok(Path {
        origin: origin.filter(|o| !o.is_empty()).map(str::to_string),
        target: target.filter(|t| !t.is_empty()).map(str::to_string),
        elem,
    })
}

/// Where the scanner is inside a `[name=value]` key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeySpan {
    Closed,
    Name {
        start: usize,
    },
    Value {
        name_start: usize,
        name_end: usize,
        start: usize,
    },
}

/// Offset of the byte that could not continue the current span.
type Reject = usize;

struct Scanner<'a> {
    path: &'a str,
    dialect: Dialect,
    span: KeySpan,
    segment_start: usize,
    /// Frozen at the first key bracket, otherwise at the closing `/`.
    name_end: Option<usize>,
    key: BTreeMap<String, String>,
    /// DME only: inside a bracket that is part of the name.
    literal: bool,
    /// DME only: a `?` was seen and brackets are keys until the next `]`.
    condition: bool,
    elem: Vec<PathElem>,
}

impl<'a> Scanner<'a> {
    fn new(path: &'a str, dialect: Dialect) -> Self {
        Self {
            path,
            dialect,
            span: KeySpan::Closed,
            segment_start: 0,
            name_end: None,
            key: BTreeMap::new(),
            literal: false,
            condition: false,
            elem: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<PathElem>, Reject> {
        // All bytes we act on are ASCII, so every offset we slice at is a
        // char boundary.
        for (i, b) in self.path.bytes().enumerate() {
            self.step(i, b)?;
        }
        self.finish()?;
        Ok(self.elem)
    }

    fn keys_active(&self) -> bool {
        match self.dialect {
            Dialect::XPath => true,
            Dialect::Dme => self.condition,
        }
    }

    fn step(&mut self, i: usize, b: u8) -> Result<(), Reject> {
        if self.keys_active() {
            match b {
                b'[' => self.open_key(i)?,
                b'=' => self.open_value(i)?,
                b']' => self.close_key(i)?,
                // a `/` inside a key, or anywhere in a DME condition, is text
                b'/' if self.dialect == Dialect::XPath && self.span == KeySpan::Closed => {
                    self.end_segment(i)
                }
                _ => (),
            }
        } else {
            match b {
                b'[' => self.literal = true,
                b']' if self.literal => self.literal = false,
                b'/' if !self.literal => self.end_segment(i),
                b'?' if !self.literal => self.condition = true,
                _ => (),
            }
        }
        Ok(())
    }

    fn open_key(&mut self, i: usize) -> Result<(), Reject> {
        if self.span != KeySpan::Closed {
            return Err(i);
        }
        if self.name_end.is_none() {
            // a key needs a segment name to hang on
            if i == self.segment_start {
                return Err(i);
            }
            self.name_end = Some(i);
        }
        self.span = KeySpan::Name { start: i + 1 };
        Ok(())
    }

    fn open_value(&mut self, i: usize) -> Result<(), Reject> {
        match self.span {
            KeySpan::Name { start } => {
                self.span = KeySpan::Value {
                    name_start: start,
                    name_end: i,
                    start: i + 1,
                };
                Ok(())
            }
            // query conditions chain `k=v&k2=v2` inside one bracket
            KeySpan::Value { .. } if self.dialect == Dialect::Dme => Ok(()),
            _ => Err(i),
        }
    }

    fn close_key(&mut self, i: usize) -> Result<(), Reject> {
        let KeySpan::Value {
            name_start,
            name_end,
            start,
        } = self.span
        else {
            return Err(i);
        };
        let value = self.path[start..i].trim_matches(|c: char| c == '\'' || c == '"');
        self.key
            .insert(self.path[name_start..name_end].to_string(), value.to_string());
        self.span = KeySpan::Closed;
        self.condition = false;
        Ok(())
    }

    fn end_segment(&mut self, i: usize) {
        let end = self.name_end.unwrap_or(i);
        if end > self.segment_start {
            self.elem.push(PathElem {
                name: self.path[self.segment_start..end].to_string(),
                key: std::mem::take(&mut self.key),
                raw: self.path[self.segment_start..i].to_string(),
            });
        }
        self.segment_start = i + 1;
        self.name_end = None;
        self.span = KeySpan::Closed;
        self.condition = false;
        self.key.clear();
    }

    /// Flush the last segment as if a trailing `/` followed the input.
    fn finish(&mut self) -> Result<(), Reject> {
        let end = self.path.len();
        if self.span != KeySpan::Closed || self.literal {
            return Err(end);
        }
        self.end_segment(end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn names(path: &Path) -> Vec<&str> {
        path.names().collect()
    }

    #[test]
    fn empty_path_has_no_elements() {
        gnmi_path_trace::test_run().ok();
        let path = parse_path(None, "", None).unwrap();
        assert!(path.is_empty());
        assert_eq!(path.origin, None);
    }

    #[test_case(None ; "xpath")]
    #[test_case(Some("DME") ; "dme")]
    fn missing_leading_slash(origin: Option<&str>) {
        assert_eq!(
            parse_path(origin, "nofirstslash", None),
            Err(PathError::MissingLeadingSlash("nofirstslash".into()))
        );
    }

    #[test_case("/a[" ; "open key name")]
    #[test_case("/a[k=v" ; "open key value")]
    #[test_case("/a[k=v]/b[k2" ; "open key in later segment")]
    #[test_case("/a[[k=v]]" ; "nested bracket")]
    #[test_case("/a[k=v[x]" ; "bracket inside value")]
    #[test_case("/a]" ; "close without open")]
    #[test_case("/a[k]" ; "close without value")]
    #[test_case("/a=b" ; "equals outside key")]
    #[test_case("/a[k=v=w]" ; "second equals")]
    fn xpath_rejects(input: &str) {
        gnmi_path_trace::test_run().ok();
        let err = parse_path(None, input, None).unwrap_err();
        assert_eq!(err, PathError::Invalid(input.into()));
        assert_eq!(err.path(), input);
    }

    #[test]
    fn xpath_keys_per_element() {
        let path = parse_path(None, "/a[k=v]/b[k2=v2]", None).unwrap();
        assert_eq!(
            path.elem,
            vec![
                PathElem {
                    name: "a".into(),
                    key: btreemap! {"k".into() => "v".into()},
                    raw: "a[k=v]".into(),
                },
                PathElem {
                    name: "b".into(),
                    key: btreemap! {"k2".into() => "v2".into()},
                    raw: "b[k2=v2]".into(),
                },
            ]
        );
    }

    #[test]
    fn xpath_interface_counters() {
        let path = parse_path(
            Some("openconfig"),
            "/interfaces/interface[name=eth0]/state/counters",
            Some("router1"),
        )
        .unwrap();
        assert_eq!(
            names(&path),
            vec!["interfaces", "interface", "state", "counters"]
        );
        assert_eq!(path.elem[1].key, btreemap! {"name".into() => "eth0".into()});
        assert_eq!(path.origin.as_deref(), Some("openconfig"));
        assert_eq!(path.target.as_deref(), Some("router1"));
    }

    #[test_case("/a[name='eth0']", "eth0" ; "single quotes")]
    #[test_case("/a[name=\"eth0\"]", "eth0" ; "double quotes")]
    #[test_case("/a[name=eth1/1]", "eth1/1" ; "slash inside value")]
    #[test_case("/a[name=]", "" ; "empty value")]
    fn xpath_key_values(input: &str, expected: &str) {
        let path = parse_path(None, input, None).unwrap();
        assert_eq!(names(&path), vec!["a"]);
        assert_eq!(path.elem[0].key["name"], expected);
    }

    #[test]
    fn xpath_multiple_and_repeated_keys() {
        let path = parse_path(None, "/a[k1=v1][k2=v2][k1=v3]/b", None).unwrap();
        assert_eq!(
            path.elem[0].key,
            btreemap! {"k1".into() => "v3".into(), "k2".into() => "v2".into()}
        );
        assert!(path.elem[1].key.is_empty());
    }

    #[test]
    fn xpath_skips_empty_segments() {
        let path = parse_path(None, "//a///b/", None).unwrap();
        assert_eq!(names(&path), vec!["a", "b"]);
    }

    #[test_case(None, "/[k=v]/a" ; "xpath first segment")]
    #[test_case(None, "/a//[k=v]" ; "xpath after empty segment")]
    #[test_case(None, "/a[k=v]/[k2=v2]" ; "xpath later segment")]
    #[test_case(Some("openconfig"), "/[k=v]" ; "xpath with origin")]
    fn key_before_name_is_rejected(origin: Option<&str>, input: &str) {
        assert_eq!(
            parse_path(origin, input, None),
            Err(PathError::Invalid(input.into()))
        );
    }

    #[test]
    fn non_dme_origin_uses_xpath() {
        // the dialect tag is case sensitive, so this bracket must be a key
        assert_eq!(
            parse_path(Some("dme"), "/sys/intf/phys-[eth1/1]", None),
            Err(PathError::Invalid("/sys/intf/phys-[eth1/1]".into()))
        );
        let path = parse_path(Some("dme"), "/sys/intf[id=eth1/1]", None).unwrap();
        assert_eq!(names(&path), vec!["sys", "intf"]);
        assert_eq!(path.elem[1].key["id"], "eth1/1");
    }

    #[test]
    fn dme_bracket_is_literal() {
        let path = parse_path(Some("DME"), "/sys/intf/phys-[eth1/1]", None).unwrap();
        assert_eq!(names(&path), vec!["sys", "intf", "phys-[eth1/1]"]);
        assert_eq!(path.elem[2].raw, "phys-[eth1/1]");
        assert!(path.elem.iter().all(|e| e.key.is_empty()));
        assert_eq!(path.origin.as_deref(), Some("DME"));
    }

    #[test]
    fn dme_query_condition_is_key() {
        let path = parse_path(
            Some("DME"),
            "/sys/intf/?query-condition[query-target=subtree]",
            None,
        )
        .unwrap();
        assert_eq!(names(&path), vec!["sys", "intf", "?query-condition"]);
        assert_eq!(
            path.elem[2].key,
            btreemap! {"query-target".into() => "subtree".into()}
        );
        assert_eq!(path.elem[2].raw, "?query-condition[query-target=subtree]");
    }

    #[test]
    fn dme_chained_condition_keeps_rest_in_value() {
        let path = parse_path(
            Some("DME"),
            "/sys/intf/?query-condition[query-target=subtree&target-subtree-class=rmonDot3Stats]/",
            None,
        )
        .unwrap();
        assert_eq!(
            path.elem[2].key,
            btreemap! {
                "query-target".into() => "subtree&target-subtree-class=rmonDot3Stats".into()
            }
        );
    }

    #[test]
    fn dme_literal_then_condition() {
        let path = parse_path(
            Some("DME"),
            "/sys/intf/phys-[eth1/1]/?rsp-subtree[include=stats]",
            None,
        )
        .unwrap();
        assert_eq!(
            names(&path),
            vec!["sys", "intf", "phys-[eth1/1]", "?rsp-subtree"]
        );
        assert_eq!(path.elem[3].key["include"], "stats");
    }

    #[test]
    fn dme_condition_without_bracket_is_plain_text() {
        let path = parse_path(Some("DME"), "/a?x", None).unwrap();
        assert_eq!(names(&path), vec!["a?x"]);
    }

    #[test]
    fn dme_question_inside_literal() {
        let path = parse_path(Some("DME"), "/sys/phys-[a?b]", None).unwrap();
        assert_eq!(names(&path), vec!["sys", "phys-[a?b]"]);
        assert!(path.elem[1].key.is_empty());

        let path = parse_path(Some("DME"), "/sys/phys-[a?b]/x", None).unwrap();
        assert_eq!(names(&path), vec!["sys", "phys-[a?b]", "x"]);
    }

    #[test]
    fn dme_slash_in_condition_stays_in_segment() {
        let path = parse_path(Some("DME"), "/a?x/b", None).unwrap();
        assert_eq!(names(&path), vec!["a?x/b"]);

        let path = parse_path(Some("DME"), "/sys/?q/x[k=v]", None).unwrap();
        assert_eq!(names(&path), vec!["sys", "?q/x"]);
        assert_eq!(path.elem[1].key, btreemap! {"k".into() => "v".into()});
        assert_eq!(path.elem[1].raw, "?q/x[k=v]");
    }

    #[test_case("/sys/phys-[eth1" ; "open literal")]
    #[test_case("/sys/?q=x" ; "condition equals without key")]
    #[test_case("/sys/?q[k=v" ; "open condition value")]
    #[test_case("/sys/?q[k" ; "open condition name")]
    #[test_case("/sys/?q]" ; "condition close without open")]
    fn dme_rejects(input: &str) {
        gnmi_path_trace::test_run().ok();
        assert_eq!(
            parse_path(Some("DME"), input, None),
            Err(PathError::Invalid(input.into()))
        );
    }

    #[test]
    fn from_str_uses_xpath_without_origin() {
        let path: Path = "/a[k=v]/b".parse().unwrap();
        assert_eq!(path.origin, None);
        assert_eq!(path.to_string(), "/a[k=v]/b");
    }
}
