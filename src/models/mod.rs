pub mod event;
pub mod query;

pub use event::{format_micros, parse_time, Event, Marker, Micros, TimeParseError};
pub use query::{PageResponse, QueryRow, QueryType};
