//! Data models shared by the engine and whatever sits in front of it

pub mod restaurant;
pub mod table_type;
pub mod waitlist;

pub use restaurant::{Restaurant, WaitStatus};
pub use table_type::TableType;
pub use waitlist::{EntryPatch, PartyInfo, RemoteJoinRequest, WaitlistEntry, WaitlistStatus};
