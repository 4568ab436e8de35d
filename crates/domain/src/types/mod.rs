//! Resource payloads exchanged with the backend
//!
//! These are the `data` members of the response envelope. The envelope itself
//! never leaves the infrastructure crate.

pub mod driver;
pub mod league;
pub mod pagination;
pub mod user;

pub use driver::{Driver, DriverStatus, DriverUpdate, NewDriver};
pub use league::{League, LeagueUpdate, NewLeague, Standing};
pub use pagination::{PageLinks, PageMeta, PageRequest, Paginated};
pub use user::{ProfileUpdate, UserProfile};
