pub mod contact;
pub mod guestbook;
pub mod health;
pub mod posts;
pub mod stats;
