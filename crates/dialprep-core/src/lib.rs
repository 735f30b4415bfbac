pub mod dedupe;
pub mod error;
pub mod excerpt;
pub mod record;
pub mod region;
pub mod resolve;

pub use dedupe::{dedupe, DedupKey, DedupSplit, RemovedRecord};
pub use error::CoreError;
pub use excerpt::{ExcerptResult, Markers};
pub use record::{BoundProfile, FieldProfile, Header, LeadRecord, TopSlotColumns};
pub use region::{classify, Classified, Region};
pub use resolve::{resolve, CallStatus, CandidateSlot, ResolvedCall, SelectedNumber};
