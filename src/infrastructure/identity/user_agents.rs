use std::sync::atomic::{AtomicUsize, Ordering};

use rand::seq::SliceRandom;

use crate::domain::ports::IdentityProvider;

pub const DESKTOP_USER_AGENTS: [&str; 7] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.80 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.100 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.169 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.131 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.131 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.157 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.157 Safari/537.36",
];

/// Picks uniformly from a fixed pool on every call; no session affinity.
#[derive(Debug, Clone)]
pub struct RandomUserAgentPool {
    agents: Vec<String>,
}

impl RandomUserAgentPool {
    /// Falls back to the desktop pool when `agents` is empty.
    pub fn new(agents: Vec<String>) -> Self {
        if agents.is_empty() {
            return Self::default();
        }
        Self { agents }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

impl Default for RandomUserAgentPool {
    fn default() -> Self {
        Self {
            agents: DESKTOP_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

impl IdentityProvider for RandomUserAgentPool {
    fn user_agent(&self) -> String {
        let mut rng = rand::thread_rng();
        self.agents
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| DESKTOP_USER_AGENTS[0].to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FixedUserAgent(pub String);

impl IdentityProvider for FixedUserAgent {
    fn user_agent(&self) -> String {
        self.0.clone()
    }
}

/// Cycles through a fixed list in order.
#[derive(Debug)]
pub struct UserAgentSequence {
    agents: Vec<String>,
    next: AtomicUsize,
}

impl UserAgentSequence {
    pub fn new(agents: Vec<String>) -> Self {
        Self { agents, next: AtomicUsize::new(0) }
    }
}

impl IdentityProvider for UserAgentSequence {
    fn user_agent(&self) -> String {
        if self.agents.is_empty() {
            return String::new();
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        self.agents[i % self.agents.len()].clone()
    }
}
