pub mod classifier;
pub mod quota;
pub mod session_builder;
pub mod sm2;

pub use classifier::classify;
pub use quota::{record_answer, remaining_quota, rollover_if_new_day};
pub use session_builder::{build_session, ReviewSession, SessionCounts, SessionEntry, SessionQuota};
pub use sm2::{advance, Sm2Result};
