//! Conversation controller - turns inbound channel messages into replies.

mod controller;
mod locks;
mod outcome;
mod usage;

pub use controller::ConversationController;
pub use locks::ChannelLocks;
pub use outcome::{HostNotify, Outcome, StateAction};
pub use usage::usage_text;
