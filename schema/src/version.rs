//! Format revisions and the version ranges that gate field applicability.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// An ordered sequence of integers identifying a format revision.
///
/// Versions compare lexicographically component-wise, so a shorter prefix
/// compares as less than a longer sequence with the same prefix. The empty
/// sequence is the "no version" sentinel and compares least.
///
/// ```
/// use byteform_schema::FormatVersion;
///
/// let old = FormatVersion::from([1, 46]);
/// let new: FormatVersion = "v1.47".parse().unwrap();
/// assert!(old < new);
/// assert_eq!(new.to_string(), "v1.47");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion(Vec<u32>);

impl FormatVersion {
    /// Creates a version from a sequence of components.
    pub fn new(components: impl Into<Vec<u32>>) -> Self {
        Self(components.into())
    }

    /// The "no version" sentinel (an empty component sequence).
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// The version's components.
    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v")?;
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl FromStr for FormatVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix('v').unwrap_or(s);
        trimmed
            .split('.')
            .map(|part| {
                part.parse::<u32>().map_err(|_| {
                    Error::Invalid("version".into(), format!("malformed component in {s:?}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl<const N: usize> From<[u32; N]> for FormatVersion {
    fn from(components: [u32; N]) -> Self {
        Self(components.to_vec())
    }
}

impl From<&[u32]> for FormatVersion {
    fn from(components: &[u32]) -> Self {
        Self(components.to_vec())
    }
}

/// An inclusive range of versions in which a field is active.
///
/// `max` of `None` means unbounded above.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionRange {
    min: FormatVersion,
    max: Option<FormatVersion>,
}

impl VersionRange {
    /// The range containing every version.
    pub fn all() -> Self {
        Self::default()
    }

    /// Versions `min` and above.
    pub fn since(min: impl Into<FormatVersion>) -> Self {
        Self {
            min: min.into(),
            max: None,
        }
    }

    /// Versions up to and including `max`.
    pub fn until(max: impl Into<FormatVersion>) -> Self {
        Self {
            min: FormatVersion::none(),
            max: Some(max.into()),
        }
    }

    /// Versions between `min` and `max`, inclusive on both ends.
    pub fn between(min: impl Into<FormatVersion>, max: impl Into<FormatVersion>) -> Self {
        Self {
            min: min.into(),
            max: Some(max.into()),
        }
    }

    /// True if `ver` falls within this range.
    pub fn contains(&self, ver: &FormatVersion) -> bool {
        if *ver < self.min {
            return false;
        }
        match &self.max {
            Some(max) => ver <= max,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_ordering() {
        assert!(FormatVersion::from([1, 46]) < FormatVersion::from([1, 47]));
        assert!(FormatVersion::from([1]) < FormatVersion::from([1, 0]));
        assert!(FormatVersion::none() < FormatVersion::from([0]));
        assert_eq!(FormatVersion::from([1, 47]), FormatVersion::new(vec![1, 47]));
    }

    #[test]
    fn test_display() {
        assert_eq!(FormatVersion::from([1, 47]).to_string(), "v1.47");
        assert_eq!(FormatVersion::from([3]).to_string(), "v3");
        assert_eq!(FormatVersion::none().to_string(), "v");
    }

    #[test]
    fn test_parse() {
        let parsed: FormatVersion = "1.47".parse().unwrap();
        assert_eq!(parsed, FormatVersion::from([1, 47]));
        let parsed: FormatVersion = "v2.0.1".parse().unwrap();
        assert_eq!(parsed, FormatVersion::from([2, 0, 1]));
        assert!("1.x".parse::<FormatVersion>().is_err());
        assert!("".parse::<FormatVersion>().is_err());
    }

    // Inclusive on both ends.
    #[test_case([0, 9], false; "below min")]
    #[test_case([1, 0], true; "at min")]
    #[test_case([1, 5], true; "inside")]
    #[test_case([2, 0], true; "at max")]
    #[test_case([2, 1], false; "above max")]
    fn test_range_bounds(ver: [u32; 2], expected: bool) {
        let range = VersionRange::between([1, 0], [2, 0]);
        assert_eq!(range.contains(&ver.into()), expected);
    }

    #[test]
    fn test_range_unbounded() {
        let range = VersionRange::all();
        assert!(range.contains(&FormatVersion::none()));
        assert!(range.contains(&FormatVersion::from([u32::MAX, u32::MAX])));

        let range = VersionRange::since([1, 47]);
        assert!(!range.contains(&FormatVersion::from([1, 46])));
        assert!(range.contains(&FormatVersion::from([9])));
    }
}
