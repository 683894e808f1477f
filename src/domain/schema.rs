//! Typed views over the remote profile payload.
//!
//! This is the only module that knows where fields live inside a
//! [`RawProfileDocument`]. Every view is deserialized straight from the raw
//! JSON value; a missing path or a mismatched type becomes
//! [`ScrapeError::Structure`].

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::{
    error::ScrapeError,
    models::{PostRecord, ProcessedProfile, RawProfileDocument, Username},
};

#[derive(Debug, Deserialize)]
struct Edges<T> {
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
struct Count {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct Graphql<U> {
    user: U,
}

#[derive(Debug, Deserialize)]
struct SummaryUser {
    id: String,
    biography: String,
    edge_followed_by: Count,
    edge_follow: Count,
}

#[derive(Debug, Deserialize)]
struct SummaryView {
    seo_category_infos: Vec<Vec<String>>,
    graphql: Graphql<SummaryUser>,
}

#[derive(Debug, Deserialize)]
struct TimelineUser {
    edge_owner_to_timeline_media: Edges<PostNode>,
}

#[derive(Debug, Deserialize)]
struct TimelineView {
    graphql: Graphql<TimelineUser>,
}

#[derive(Debug, Deserialize)]
struct CaptionNode {
    text: String,
}

#[derive(Debug, Deserialize)]
struct PostNode {
    id: String,
    display_url: String,
    is_video: bool,
    edge_media_to_caption: Edges<CaptionNode>,
}

fn view<T: DeserializeOwned>(raw: &RawProfileDocument, what: &str) -> Result<T, ScrapeError> {
    T::deserialize(raw.as_value()).map_err(|e| ScrapeError::Structure(format!("{}: {}", what, e)))
}

/// Extracts the processed profile fields.
pub fn profile_summary(username: &Username, raw: &RawProfileDocument) -> Result<ProcessedProfile, ScrapeError> {
    let summary: SummaryView = view(raw, "profile summary")?;

    let category = summary
        .seo_category_infos
        .into_iter()
        .enumerate()
        .map(|(i, info)| {
            info.into_iter()
                .next()
                .ok_or_else(|| ScrapeError::Structure(format!("seo_category_infos[{}] is empty", i)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let user = summary.graphql.user;
    Ok(ProcessedProfile {
        username: username.to_string(),
        category,
        id: user.id,
        biography: user.biography,
        num_followers: user.edge_followed_by.count,
        num_followees: user.edge_follow.count,
    })
}

/// Extracts one [`PostRecord`] per timeline edge, in document order.
pub fn timeline_posts(raw: &RawProfileDocument) -> Result<Vec<PostRecord>, ScrapeError> {
    let timeline: TimelineView = view(raw, "timeline")?;

    Ok(timeline
        .graphql
        .user
        .edge_owner_to_timeline_media
        .edges
        .into_iter()
        .map(|edge| {
            let post = edge.node;
            let caption = post
                .edge_media_to_caption
                .edges
                .into_iter()
                .next()
                .map(|caption| caption.node.text)
                .unwrap_or_default();
            PostRecord {
                img_url: post.display_url,
                post_id: post.id,
                is_video: post.is_video,
                caption,
            }
        })
        .collect())
}
