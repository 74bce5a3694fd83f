pub mod contact;
pub mod guestbook;
pub mod post;
pub mod stats;

pub use contact::{ContactStatus, ContactSubmission};
pub use guestbook::GuestbookEntry;
pub use post::{Post, PostDraft, PostStatus};
pub use stats::{StatCounters, VisitorStat};
