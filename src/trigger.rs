//! Decides whether an inbound message gets a reply.

use log::debug;
use strum::{Display, EnumString};

use crate::types::InboundMessage;

/// Commands recognised when the bot is mentioned and the remaining text
/// matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum Command {
    #[strum(serialize = "/bye")]
    Bye,
    #[strum(serialize = "/help")]
    Help,
}

/// Outcome of the trigger policy for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Command(Command),
    /// Bot was mentioned with a prompt.
    Mention,
    /// Unaddressed message that won the ambient draw.
    Ambient,
    Ignore,
}

/// Source of uniform draws over `0..upper`.
pub trait RandomSource: Send + Sync {
    fn below(&self, upper: u32) -> u32;
}

/// Thread-local generator from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, upper: u32) -> u32 {
        rand::random_range(0..upper)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResponseTrigger {
    ambient_chance: u32,
}

impl ResponseTrigger {
    /// Unaddressed messages are answered with probability `1 / ambient_chance`;
    /// zero turns ambient replies off.
    #[must_use]
    pub fn new(ambient_chance: u32) -> Self {
        Self { ambient_chance }
    }

    pub fn decide(
        &self,
        event: &InboundMessage,
        prompt: &str,
        random: &impl RandomSource,
    ) -> Trigger {
        if event.mentions_bot() {
            return match prompt.parse::<Command>() {
                Ok(command) => Trigger::Command(command),
                Err(_) => Trigger::Mention,
            };
        }

        if self.ambient_chance == 0 {
            return Trigger::Ignore;
        }

        if random.below(self.ambient_chance) == 0 {
            debug!("Ambient reply triggered in channel {}", event.channel_id);
            Trigger::Ambient
        } else {
            Trigger::Ignore
        }
    }
}
