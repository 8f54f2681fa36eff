pub mod entries;
pub mod export;
pub mod guest;
pub mod insights;
pub mod notification;
pub mod photo;
pub mod rsvp;
pub mod seating;
pub mod song;
pub mod validation;
pub mod wish;

pub use guest::*;
pub use notification::*;
pub use photo::*;
pub use rsvp::*;
pub use seating::*;
pub use song::*;
pub use wish::*;
