//! In-process doubles shared by the application tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::{error::ScrapeError, models::HttpResponse, ports::HttpTransport};

#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(u16, Vec<u8>),
    Refuse,
    Hang,
}

impl Scripted {
    pub fn json(status: u16, value: &Value) -> Self {
        Scripted::Respond(status, serde_json::to_vec(value).unwrap())
    }
}

/// Replays a queue of outcomes per URL. The last queued outcome repeats.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, url: &str, outcomes: Vec<Scripted>) {
        self.scripts.lock().unwrap().insert(url.to_string(), outcomes.into());
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(u, _)| u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, ua)| ua.clone()).collect()
    }

    fn next(&self, url: &str) -> Option<Scripted> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(url)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, user_agent: &str) -> Result<HttpResponse, ScrapeError> {
        self.calls.lock().unwrap().push((url.to_string(), user_agent.to_string()));
        match self.next(url) {
            Some(Scripted::Respond(status, body)) => Ok(HttpResponse { status, body }),
            Some(Scripted::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Some(Scripted::Refuse) | None => Err(ScrapeError::Transport(format!("connection refused: {}", url))),
        }
    }
}

pub fn image_url(post_id: usize) -> String {
    format!("https://cdn.test/p/{}.jpg", post_id)
}

/// A profile payload with `posts` timeline edges; post ids are "1".."posts".
pub fn profile_document(posts: usize) -> Value {
    let edges: Vec<Value> = (1..=posts)
        .map(|i| {
            json!({"node": {
                "id": i.to_string(),
                "display_url": image_url(i),
                "is_video": i % 3 == 0,
                "edge_media_to_caption": {"edges": [{"node": {"text": format!("caption {}", i)}}]}
            }})
        })
        .collect();

    json!({
        "seo_category_infos": [["Science", "science"], ["Government Organization", "gov"]],
        "graphql": {"user": {
            "id": "528817151",
            "username": "nasa",
            "biography": "Explore the universe",
            "edge_followed_by": {"count": 97_000_000},
            "edge_follow": {"count": 81},
            "edge_owner_to_timeline_media": {"count": posts, "edges": edges}
        }}
    })
}
