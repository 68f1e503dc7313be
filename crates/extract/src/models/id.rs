use crate::consts;
use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storefront catalog code (e.g. `RJ123456`) uniquely identifying a work.
///
/// Always holds a validated code: a known two-letter prefix followed by
/// either six or eight digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkId(String);
impl WorkId {
    /// Finds the first work code embedded in a folder (or any other) name.
    ///
    /// ```
    /// use dlorg_extract::models::WorkId;
    /// let id = WorkId::find_in("[Circle] RJ123456 Some Title").unwrap();
    /// assert_eq!(id.as_str(), "RJ123456");
    /// assert!(WorkId::find_in("XRJ123456").is_none());
    /// assert!(WorkId::find_in("RJ1234567").is_none());
    /// ```
    pub fn find_in(name: &str) -> Option<Self> {
        consts::WORK_ID_SEARCH_REGEX.captures(name).and_then(|c| c.get(1)).map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl FromStr for WorkId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !consts::WORK_ID_EXACT_REGEX.is_match(s) {
            exn::bail!(ErrorKind::ParseError { field: "id", value: s.to_string() });
        }
        Ok(Self(s.to_string()))
    }
}
impl TryFrom<String> for WorkId {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl AsRef<str> for WorkId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for WorkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
