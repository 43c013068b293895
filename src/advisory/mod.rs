//! Advisory records and where they are persisted

mod record;
mod sink;

pub use record::AdvisoryRecord;
pub use sink::{read_records, AdvisorySink, JsonLinesSink, MemorySink, SinkError, SinkResult};
