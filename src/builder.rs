//! Cache configuration: capacity validation and the options builder.
//!
//! A cache is configured with a single setting, its maximum number of
//! entries. The raw setting may come from code, a config file, or an
//! environment variable, so it is carried as given (an exact `usize` or a
//! raw `f64`) and validated once when the cache is built.
//!
//! ## Example
//!
//! ```rust
//! use lrukit::builder::{Capacity, LruOptions};
//!
//! let mut cache = LruOptions::new().max(100).build::<String>().unwrap();
//! cache.set("hello", "world".to_string()).unwrap();
//! assert_eq!(cache.max(), Capacity::bounded(100).unwrap());
//!
//! // No `max` means the cache never evicts.
//! let unbounded = LruOptions::new().build::<u8>().unwrap();
//! assert_eq!(unbounded.max(), Capacity::Unbounded);
//!
//! // Validation rejects anything that is not a positive whole number.
//! assert!(LruOptions::new().max(2.5).build::<u8>().is_err());
//! assert!(LruOptions::new().max(0).build::<u8>().is_err());
//!
//! // `usize` limits go through `max_entries` and are kept exactly.
//! let limit: usize = 1 << 20;
//! let big = LruOptions::new().max_entries(limit).build::<u8>().unwrap();
//! assert_eq!(big.max().limit(), Some(limit));
//! ```

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::LruError;
use crate::policy::lru::LruCache;

/// Maximum number of distinct keys a cache holds at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capacity {
    /// At most `n` entries; inserting past `n` evicts the least recently used.
    Bounded(NonZeroUsize),
    /// No limit; eviction never triggers.
    Unbounded,
}

impl Capacity {
    /// Returns a bounded capacity, rejecting zero.
    pub fn bounded(max: usize) -> Result<Self, LruError> {
        NonZeroUsize::new(max)
            .map(Capacity::Bounded)
            .ok_or_else(|| LruError::invalid_config(max.to_string()))
    }

    /// Returns the entry limit, or `None` when unbounded.
    #[inline]
    pub fn limit(self) -> Option<usize> {
        match self {
            Capacity::Bounded(n) => Some(n.get()),
            Capacity::Unbounded => None,
        }
    }

    #[inline]
    pub fn is_bounded(self) -> bool {
        matches!(self, Capacity::Bounded(_))
    }

    /// Returns `true` if a cache currently holding `len` entries can take one
    /// more without evicting.
    #[inline]
    pub fn has_room(self, len: usize) -> bool {
        match self {
            Capacity::Bounded(n) => len < n.get(),
            Capacity::Unbounded => true,
        }
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::Unbounded
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Bounded(n) => write!(f, "{}", n),
            Capacity::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl From<NonZeroUsize> for Capacity {
    fn from(max: NonZeroUsize) -> Self {
        Capacity::Bounded(max)
    }
}

impl TryFrom<usize> for Capacity {
    type Error = LruError;

    fn try_from(max: usize) -> Result<Self, Self::Error> {
        Capacity::bounded(max)
    }
}

impl TryFrom<i64> for Capacity {
    type Error = LruError;

    fn try_from(max: i64) -> Result<Self, Self::Error> {
        if max <= 0 {
            return Err(LruError::invalid_config(max.to_string()));
        }
        let max = usize::try_from(max).map_err(|_| LruError::invalid_config(max.to_string()))?;
        Capacity::bounded(max)
    }
}

/// `+inf` maps to [`Capacity::Unbounded`]. NaN, `-inf`, fractions, zero,
/// negatives, and integers past `usize::MAX` are rejected.
impl TryFrom<f64> for Capacity {
    type Error = LruError;

    fn try_from(max: f64) -> Result<Self, Self::Error> {
        if max == f64::INFINITY {
            return Ok(Capacity::Unbounded);
        }
        if !max.is_finite() || max.fract() != 0.0 || max <= 0.0 {
            return Err(LruError::invalid_config(max.to_string()));
        }
        // usize::MAX as f64 rounds up to 2^64 (or 2^32), the first value that doesn't fit.
        if max >= usize::MAX as f64 {
            return Err(LruError::invalid_config(max.to_string()));
        }
        Capacity::bounded(max as usize)
    }
}

/// Accepts `unbounded`, `inf` or `infinity` (any case), or a number.
impl FromStr for Capacity {
    type Err = LruError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "unbounded" | "inf" | "infinity" => Ok(Capacity::Unbounded),
            _ => {
                let max: f64 = trimmed
                    .parse()
                    .map_err(|_| LruError::invalid_config(trimmed.to_string()))?;
                Capacity::try_from(max)
            },
        }
    }
}

/// A configured maximum as the caller supplied it.
///
/// Integer sources are kept as `usize` so large limits survive exactly; only
/// genuinely numeric input (fractions, NaN, infinities, negatives from a
/// config file) goes through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
enum MaxSetting {
    Entries(usize),
    Number(f64),
}

/// Construction options for [`LruCache`].
///
/// `max` is stored unvalidated; [`LruOptions::build`] (or
/// [`LruCache::new`]) checks it. Leaving it unset means unbounded.
///
/// With the `serde` feature this deserializes from `{ "max": 100 }` or `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct LruOptions {
    max: Option<MaxSetting>,
}

impl LruOptions {
    /// Options for an unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum entry count from any numeric type that widens to
    /// `f64` losslessly. It is validated at build time, so `2.5` or `-1`
    /// are accepted here and rejected there.
    pub fn max(mut self, max: impl Into<f64>) -> Self {
        self.max = Some(MaxSetting::Number(max.into()));
        self
    }

    /// Sets the maximum entry count exactly. Zero is rejected at build time.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max = Some(MaxSetting::Entries(max));
        self
    }

    /// Clears any configured maximum.
    pub fn unbounded(mut self) -> Self {
        self.max = None;
        self
    }

    /// Validates the configured maximum.
    pub fn capacity(&self) -> Result<Capacity, LruError> {
        match self.max {
            Some(MaxSetting::Entries(max)) => Capacity::bounded(max),
            Some(MaxSetting::Number(max)) => Capacity::try_from(max),
            None => Ok(Capacity::Unbounded),
        }
    }

    /// Validates the options and builds an empty cache.
    pub fn build<V>(self) -> Result<LruCache<V>, LruError> {
        LruCache::new(self)
    }
}

impl From<Capacity> for LruOptions {
    fn from(capacity: Capacity) -> Self {
        Self {
            max: capacity.limit().map(MaxSetting::Entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err_of(result: Result<Capacity, LruError>) -> LruError {
        result.expect_err("expected validation failure")
    }

    #[test]
    fn bounded_rejects_zero() {
        assert!(matches!(
            err_of(Capacity::bounded(0)),
            LruError::InvalidConfiguration(_)
        ));
        assert_eq!(Capacity::bounded(3).unwrap().limit(), Some(3));
    }

    #[test]
    fn float_validation_matches_whole_number_contract() {
        assert_eq!(Capacity::try_from(10.0).unwrap().limit(), Some(10));
        assert_eq!(Capacity::try_from(f64::INFINITY).unwrap(), Capacity::Unbounded);

        for bad in [0.0, -0.0, -10.0, 2.5, f64::NAN, f64::NEG_INFINITY, 1e300] {
            assert!(
                Capacity::try_from(bad).is_err(),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn signed_validation() {
        assert_eq!(Capacity::try_from(7i64).unwrap().limit(), Some(7));
        assert!(Capacity::try_from(0i64).is_err());
        assert!(Capacity::try_from(-1i64).is_err());
        assert!(Capacity::try_from(0usize).is_err());
    }

    #[test]
    fn parse_from_str() {
        assert_eq!("unbounded".parse::<Capacity>().unwrap(), Capacity::Unbounded);
        assert_eq!(" Infinity ".parse::<Capacity>().unwrap(), Capacity::Unbounded);
        assert_eq!("INF".parse::<Capacity>().unwrap(), Capacity::Unbounded);
        assert_eq!("64".parse::<Capacity>().unwrap().limit(), Some(64));
        assert!("-inf".parse::<Capacity>().is_err());
        assert!("1.5".parse::<Capacity>().is_err());
        assert!("lots".parse::<Capacity>().is_err());
        assert!("".parse::<Capacity>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for capacity in [Capacity::Unbounded, Capacity::bounded(12).unwrap()] {
            let text = capacity.to_string();
            assert_eq!(text.parse::<Capacity>().unwrap(), capacity);
        }
    }

    #[test]
    fn has_room_respects_limit() {
        let cap = Capacity::bounded(2).unwrap();
        assert!(cap.has_room(0));
        assert!(cap.has_room(1));
        assert!(!cap.has_room(2));
        assert!(Capacity::Unbounded.has_room(usize::MAX));
        assert!(cap.is_bounded());
        assert!(!Capacity::Unbounded.is_bounded());
    }

    #[test]
    fn options_default_to_unbounded() {
        let options = LruOptions::new();
        assert_eq!(options, LruOptions::default());
        assert_eq!(options.capacity().unwrap(), Capacity::Unbounded);
        assert_eq!(Capacity::default(), Capacity::Unbounded);
    }

    #[test]
    fn options_validate_at_build() {
        let options = LruOptions::new().max(-10);
        let err = options.build::<u8>().unwrap_err();
        assert!(err.to_string().contains("whole number"));

        let cache = LruOptions::new().max(10).build::<u8>().unwrap();
        assert_eq!(cache.max().limit(), Some(10));

        let cache = LruOptions::new().max(3).unbounded().build::<u8>().unwrap();
        assert_eq!(cache.max(), Capacity::Unbounded);
    }

    #[test]
    fn max_entries_takes_usize() {
        let limit: usize = 42;
        let cache = LruOptions::new().max_entries(limit).build::<u8>().unwrap();
        assert_eq!(cache.max().limit(), Some(42));

        let err = LruOptions::new().max_entries(0).build::<u8>().unwrap_err();
        assert!(matches!(err, LruError::InvalidConfiguration(_)));

        // The last setter wins.
        let options = LruOptions::new().max(2.5).max_entries(7);
        assert_eq!(options.capacity().unwrap().limit(), Some(7));
        let options = LruOptions::new().max_entries(7).max(2.5);
        assert!(options.capacity().is_err());
    }

    #[test]
    fn options_from_capacity() {
        let options = LruOptions::from(Capacity::bounded(5).unwrap());
        assert_eq!(options, LruOptions::new().max_entries(5));
        assert_eq!(LruOptions::from(Capacity::Unbounded), LruOptions::new());
    }

    #[test]
    fn large_capacities_survive_options_round_trip() {
        let huge = Capacity::bounded(usize::MAX).unwrap();
        assert_eq!(LruOptions::from(huge).capacity().unwrap(), huge);

        let cache = LruOptions::from(huge).build::<u8>().unwrap();
        assert_eq!(cache.max().limit(), Some(usize::MAX));

        for n in [usize::MAX - 1, (usize::MAX >> 1) + 1, 1 << 20] {
            let capacity = Capacity::bounded(n).unwrap();
            assert_eq!(LruOptions::from(capacity).capacity().unwrap(), capacity);
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn integers_past_f64_precision_are_exact() {
        // 2^53 + 1 is the first integer an f64 cannot hold.
        let n = (1usize << 53) + 1;
        let capacity = Capacity::bounded(n).unwrap();
        assert_eq!(LruOptions::from(capacity).capacity().unwrap().limit(), Some(n));
        assert_eq!(
            LruOptions::new().max_entries(n).capacity().unwrap().limit(),
            Some(n)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_deserialize_from_json() {
        let options: LruOptions = serde_json::from_str(r#"{ "max": 25 }"#).unwrap();
        assert_eq!(options.capacity().unwrap().limit(), Some(25));

        let options: LruOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.capacity().unwrap(), Capacity::Unbounded);

        let options: LruOptions = serde_json::from_str(r#"{ "max": 2.5 }"#).unwrap();
        assert!(options.capacity().is_err());

        let options: LruOptions = serde_json::from_str(r#"{ "max": -3 }"#).unwrap();
        assert!(options.capacity().is_err());

        assert!(serde_json::from_str::<LruOptions>(r#"{ "size": 4 }"#).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_serialize_large_integers_exactly() {
        let n = usize::MAX;
        let options = LruOptions::new().max_entries(n);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, format!(r#"{{"max":{}}}"#, n));

        let back: LruOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
        assert_eq!(back.capacity().unwrap().limit(), Some(n));
    }
}
