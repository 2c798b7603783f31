use std::borrow::Borrow;
use std::fmt;
use std::ops::{Deref, Range};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// String value with regex helpers whose results are `ReString` again, so calls chain.
///
/// Patterns use `regex` crate syntax; flags go inline (`(?i)`, `(?m)`, `(?s)`, `(?x)`),
/// replacement strings use `$1` / `${name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReString(String);

/// An owned match: whole text plus every capture group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReMatch {
    text: ReString,
    range: Range<usize>,
    groups: Vec<Option<ReString>>,
}

impl ReMatch {
    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let whole = caps.get(0)?;
        Some(Self {
            text: ReString::from(whole.as_str()),
            range: whole.range(),
            groups: caps
                .iter()
                .skip(1)
                .map(|g| g.map(|g| ReString::from(g.as_str())))
                .collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn text(&self) -> &ReString {
        &self.text
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Group `0` is the whole match; unmatched groups are `None`.
    pub fn group(&self, index: usize) -> Option<&ReString> {
        match index {
            0 => Some(&self.text),
            i => self.groups.get(i - 1)?.as_ref(),
        }
    }

    pub fn groups(&self) -> &[Option<ReString>] {
        &self.groups
    }
}

impl ReString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Match only at the beginning of the string.
    pub fn match_start(&self, pattern: &str) -> Result<Option<ReMatch>, regex::Error> {
        let re = Regex::new(&format!(r"\A(?:{pattern})"))?;
        Ok(re.captures(&self.0).as_ref().and_then(ReMatch::from_captures))
    }

    /// Match the whole string.
    pub fn fullmatch(&self, pattern: &str) -> Result<Option<ReMatch>, regex::Error> {
        let re = Regex::new(&format!(r"\A(?:{pattern})\z"))?;
        Ok(re.captures(&self.0).as_ref().and_then(ReMatch::from_captures))
    }

    /// First match anywhere.
    pub fn search(&self, pattern: &str) -> Result<Option<ReMatch>, regex::Error> {
        let re = Regex::new(pattern)?;
        Ok(re.captures(&self.0).as_ref().and_then(ReMatch::from_captures))
    }

    /// Replace up to `count` matches; `0` replaces all.
    pub fn sub(&self, pattern: &str, repl: &str, count: usize) -> Result<ReString, regex::Error> {
        Ok(self.subn(pattern, repl, count)?.0)
    }

    /// Like [`ReString::sub`], also returning how many replacements were made.
    pub fn subn(
        &self,
        pattern: &str,
        repl: &str,
        count: usize,
    ) -> Result<(ReString, usize), regex::Error> {
        let re = Regex::new(pattern)?;
        let limit = if count == 0 { usize::MAX } else { count };
        let made = re.find_iter(&self.0).take(limit).count();
        let out = re.replacen(&self.0, count, repl);
        Ok((ReString::from(out.into_owned()), made))
    }

    /// Split on matches, at most `maxsplit` times (`0` = no limit).
    /// Capture groups that took part in a match are kept in the output.
    pub fn resplit(&self, pattern: &str, maxsplit: usize) -> Result<Vec<ReString>, regex::Error> {
        let re = Regex::new(pattern)?;
        let mut out = Vec::new();
        let mut last = 0;

        for (n, caps) in re.captures_iter(&self.0).enumerate() {
            if maxsplit != 0 && n >= maxsplit {
                break;
            }
            let Some(whole) = caps.get(0) else { continue };
            out.push(ReString::from(&self.0[last..whole.start()]));
            out.extend(
                caps.iter()
                    .skip(1)
                    .flatten()
                    .map(|g| ReString::from(g.as_str())),
            );
            last = whole.end();
        }
        out.push(ReString::from(&self.0[last..]));
        Ok(out)
    }

    /// All non-overlapping matches. With exactly one group the group text is
    /// returned (empty when it did not participate); otherwise the whole match.
    /// With two or more groups this means whole matches, not per-group tuples.
    pub fn findall(&self, pattern: &str) -> Result<Vec<ReString>, regex::Error> {
        let re = Regex::new(pattern)?;
        let single_group = re.captures_len() == 2;

        Ok(re
            .captures_iter(&self.0)
            .filter_map(|caps| {
                let idx = if single_group { 1 } else { 0 };
                match caps.get(idx) {
                    Some(m) => Some(ReString::from(m.as_str())),
                    None if single_group => Some(ReString::default()),
                    None => None,
                }
            })
            .collect())
    }

    pub fn finditer(
        &self,
        pattern: &str,
    ) -> Result<impl Iterator<Item = ReMatch>, regex::Error> {
        let re = Regex::new(pattern)?;
        let matches: Vec<ReMatch> = re
            .captures_iter(&self.0)
            .filter_map(|caps| ReMatch::from_captures(&caps))
            .collect();
        Ok(matches.into_iter())
    }
}

impl Deref for ReString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ReString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ReString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ReString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ReString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<ReString> for String {
    fn from(value: ReString) -> Self {
        value.0
    }
}

impl PartialEq<str> for ReString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ReString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
