//! UTC-only timestamps.
//!
//! Every timestamp in the system is a [`Timestamp`]; there is no ambient
//! timezone. Construct the current time with [`now`].

use chrono::{DateTime, SubsecRound, Utc};

pub type Timestamp = DateTime<Utc>;

/// The current instant, truncated to the microsecond precision the stores
/// persist.
pub fn now() -> Timestamp { Utc::now().trunc_subsecs(6) }
