//! Stream Parameters
//!
//! Parameters for one fuel level stream session and the rules that turn
//! raw query values into them. Malformed input is never an error here:
//! anything missing, unparseable, or non-positive falls back to a default.

use std::num::{NonZeroU32, NonZeroU64};

/// Sampling cadence requested from the backend when none is given.
pub const DEFAULT_INTERVAL_SECS: NonZeroU32 = NonZeroU32::new(2).unwrap();

/// Update cap applied when the caller gives none.
pub const DEFAULT_MAX_UPDATES: NonZeroU64 = NonZeroU64::new(10).unwrap();

/// How many readings a stream session may relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateLimit {
    /// Relay until the backend ends the stream or the session is cancelled.
    Unbounded,
    /// Relay at most this many readings.
    AtMost(NonZeroU64),
}

impl UpdateLimit {
    /// Build a limit from a signed count, where `<= 0` means unbounded.
    #[must_use]
    pub fn from_count(count: i64) -> Self {
        u64::try_from(count)
            .ok()
            .and_then(NonZeroU64::new)
            .map_or(Self::Unbounded, Self::AtMost)
    }

    /// Whether `relayed` readings exhaust this limit.
    #[must_use]
    pub const fn is_reached(&self, relayed: u64) -> bool {
        match self {
            Self::Unbounded => false,
            Self::AtMost(max) => relayed >= max.get(),
        }
    }
}

/// Parameters of one stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamParams {
    /// Sampling cadence forwarded to the backend. The gateway does not tick.
    pub interval_secs: NonZeroU32,
    /// Cap on relayed readings.
    pub limit: UpdateLimit,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            limit: UpdateLimit::AtMost(DEFAULT_MAX_UPDATES),
        }
    }
}

impl StreamParams {
    /// Build parameters from raw `interval` and `max_updates` query values.
    ///
    /// Missing, non-numeric, zero, or negative values are replaced by
    /// [`DEFAULT_INTERVAL_SECS`] and [`DEFAULT_MAX_UPDATES`].
    #[must_use]
    pub fn from_query(interval: Option<&str>, max_updates: Option<&str>) -> Self {
        let interval_secs = interval
            .and_then(|raw| raw.parse::<u32>().ok())
            .and_then(NonZeroU32::new)
            .unwrap_or(DEFAULT_INTERVAL_SECS);
        let max_updates = max_updates
            .and_then(|raw| raw.parse::<u64>().ok())
            .and_then(NonZeroU64::new)
            .unwrap_or(DEFAULT_MAX_UPDATES);

        Self {
            interval_secs,
            limit: UpdateLimit::AtMost(max_updates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn nz(v: u64) -> NonZeroU64 {
        NonZeroU64::new(v).unwrap()
    }

    #[test_case(None, None => (2, 10); "both absent")]
    #[test_case(Some("1"), Some("3") => (1, 3); "both valid")]
    #[test_case(Some("0"), Some("0") => (2, 10); "zero values")]
    #[test_case(Some("-4"), Some("-1") => (2, 10); "negative values")]
    #[test_case(Some("abc"), Some("1.5") => (2, 10); "non numeric")]
    #[test_case(Some(""), Some("") => (2, 10); "empty strings")]
    #[test_case(Some("5"), None => (5, 10); "interval only")]
    #[test_case(None, Some("25") => (2, 25); "max updates only")]
    #[test_case(Some("99999999999"), Some("7") => (2, 7); "interval overflow")]
    #[test_case(Some("2"), Some("5000000000") => (2, 5_000_000_000); "max updates above u32")]
    #[test_case(Some("1"), Some("18446744073709551616") => (1, 10); "max updates overflow")]
    fn query_defaults(interval: Option<&str>, max_updates: Option<&str>) -> (u32, u64) {
        let params = StreamParams::from_query(interval, max_updates);
        let UpdateLimit::AtMost(max) = params.limit else {
            panic!("query parsing must always produce a bounded limit");
        };
        (params.interval_secs.get(), max.get())
    }

    #[test]
    fn default_params_match_query_defaults() {
        assert_eq!(StreamParams::default(), StreamParams::from_query(None, None));
    }

    #[test]
    fn update_limit_from_count() {
        assert_eq!(UpdateLimit::from_count(0), UpdateLimit::Unbounded);
        assert_eq!(UpdateLimit::from_count(-3), UpdateLimit::Unbounded);
        assert_eq!(UpdateLimit::from_count(4), UpdateLimit::AtMost(nz(4)));
    }

    #[test]
    fn update_limit_reached() {
        let limit = UpdateLimit::AtMost(nz(3));
        assert!(!limit.is_reached(0));
        assert!(!limit.is_reached(2));
        assert!(limit.is_reached(3));
        assert!(!UpdateLimit::Unbounded.is_reached(u64::MAX));
    }
}
