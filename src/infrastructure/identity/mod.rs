pub mod user_agents;

pub use user_agents::{FixedUserAgent, RandomUserAgentPool, UserAgentSequence};
