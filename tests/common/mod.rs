use serde_json::{json, Value};

/// A profile payload whose posts point at `image_url(post_id)`.
pub fn profile_with_images(post_ids: &[&str], image_url: impl Fn(&str) -> String) -> Value {
    let edges: Vec<Value> = post_ids
        .iter()
        .map(|id| {
            json!({"node": {
                "id": id,
                "display_url": image_url(id),
                "is_video": false,
                "edge_media_to_caption": {"edges": [{"node": {"text": format!("post {}", id)}}]}
            }})
        })
        .collect();

    json!({
        "seo_category_infos": [["Science", "science"]],
        "graphql": {"user": {
            "id": "528817151",
            "biography": "Explore the universe",
            "edge_followed_by": {"count": 1200},
            "edge_follow": {"count": 34},
            "edge_owner_to_timeline_media": {"count": edges.len(), "edges": edges}
        }}
    })
}

pub fn file_names(dir: &std::path::Path) -> std::collections::BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}
