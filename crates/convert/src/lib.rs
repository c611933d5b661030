//! Boundary conversions between the string-typed declarative schema and
//! native JetStream types: durations, timestamps and policy enums.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod duration;
mod error;
mod policy;
mod time;

pub use duration::{format_duration, parse_duration, parse_optional_duration};
pub use error::{EnumFamily, Error};
pub use policy::SpecEnum;
pub use time::{format_timestamp, parse_optional_timestamp, parse_timestamp};
