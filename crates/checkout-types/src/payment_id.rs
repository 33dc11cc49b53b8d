use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Identifier of a mock gateway payment, `test_<unix millis>` on the wire.
///
/// Identifiers issued by [`PaymentId::generate`] are strictly increasing within
/// a process: two payments in the same millisecond get consecutive values
/// instead of the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentId(u64);

static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Payment id must look like test_<millis>, got {0:?}")]
pub struct PaymentIdParseError(pub String);

impl PaymentId {
    pub const PREFIX: &'static str = "test_";

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Issues a fresh identifier based on the current wall clock.
    pub fn generate() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let issued = LAST_ISSUED
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            // The closure never returns None.
            .unwrap_or(now);
        Self(now.max(issued + 1))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl Display for PaymentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl FromStr for PaymentId {
    type Err = PaymentIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(Self::PREFIX)
            .and_then(|millis| millis.parse::<u64>().ok())
            .map(PaymentId)
            .ok_or_else(|| PaymentIdParseError(s.to_string()))
    }
}

impl Serialize for PaymentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PaymentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
