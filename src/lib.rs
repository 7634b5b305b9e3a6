pub mod bot;
pub mod chatbot;
pub mod config;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod segment;
pub mod store;
pub mod text;
pub mod trigger;
pub mod types;

#[cfg(test)]
mod testing;

pub use bot::run;
