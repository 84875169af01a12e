//! Feature assembly.
//!
//! Scoring artifacts carry the ordered list of feature names they were
//! trained with. The assembler resolves each name against the request,
//! the thumbnail features and the slot embeddings by pattern-matching the
//! name, in the same precedence the artifacts were built with. Names
//! nothing matches resolve to 0.0 — the set of expected columns is owned
//! by the artifact, not by this code.

use ytperf_models::{ThumbnailFeatures, VideoRequest};

use crate::text::{EmbedSlot, TextEmbedder, EMBED_DIM};

/// Embeddings for every text slot of one request.
pub struct SlotEmbeddings {
    pub title: Vec<f64>,
    pub description: Vec<f64>,
    pub tags: Vec<f64>,
    pub thumbnail_text: Vec<f64>,
}

impl SlotEmbeddings {
    /// Embed every slot of a request. Slots the request has no text for
    /// come out all-zero.
    pub fn for_request(embedder: &TextEmbedder, request: &VideoRequest) -> Self {
        Self {
            title: embedder.embed(EmbedSlot::Title, &request.title, EMBED_DIM),
            description: embedder.embed(EmbedSlot::Description, "", EMBED_DIM),
            tags: embedder.embed(EmbedSlot::Tags, "", EMBED_DIM),
            thumbnail_text: embedder.embed(EmbedSlot::ThumbnailText, "", EMBED_DIM),
        }
    }

    fn slot(&self, prefix: &str) -> Option<&[f64]> {
        match prefix {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            "tags" => Some(&self.tags),
            "thumbnail_text" => Some(&self.thumbnail_text),
            _ => None,
        }
    }
}

/// Resolve an ordered feature-name list into a value vector.
pub fn assemble(
    request: &VideoRequest,
    thumbnail: &ThumbnailFeatures,
    embeddings: &SlotEmbeddings,
    feature_names: &[String],
) -> Vec<f64> {
    feature_names
        .iter()
        .map(|name| resolve(request, thumbnail, embeddings, name))
        .collect()
}

fn resolve(
    request: &VideoRequest,
    thumbnail: &ThumbnailFeatures,
    embeddings: &SlotEmbeddings,
    name: &str,
) -> f64 {
    // Embedding columns: "{slot}_embed_{index}".
    if let Some(pos) = name.find("_embed_") {
        let (prefix, index) = (&name[..pos], &name[pos + "_embed_".len()..]);
        return match (embeddings.slot(prefix), index.parse::<usize>()) {
            (Some(vector), Ok(idx)) => vector.get(idx).copied().unwrap_or(0.0),
            _ => 0.0,
        };
    }

    // Exact thumbnail scalar names.
    if let Some(value) = thumbnail.scalar(name) {
        return value;
    }

    // Channel means under training-time aliases ("average_rgb" falls under
    // the red alias, as it did at training time).
    if name.contains("avg_r") || name.contains("average_r") {
        return thumbnail.avg_r();
    }
    if name.contains("avg_g") || name.contains("average_g") {
        return thumbnail.avg_g();
    }
    if name.contains("avg_b") || name.contains("average_b") {
        return thumbnail.avg_b();
    }

    // Visual feature substrings (covers prefixed names like
    // "thumbnail_brightness").
    if name.contains("brightness") {
        return thumbnail.brightness;
    }
    if name.contains("contrast") {
        return thumbnail.contrast;
    }
    if name.contains("saturation") {
        return thumbnail.saturation;
    }
    if name.contains("warm_cool") {
        return thumbnail.warm_cool;
    }
    if name.contains("face") {
        return thumbnail.face_area_percentage;
    }
    if name.contains("edge_density") {
        return thumbnail.edge_density;
    }

    // Genre one-hot columns.
    if name.starts_with("genre_") {
        return if name == request.genre.column_name() {
            1.0
        } else {
            0.0
        };
    }

    // Coarse baseline transforms; must precede the bare "duration" match.
    match name {
        "log_subs" => return (request.subscriber_count as f64).ln_1p(),
        "log_age" => return (request.age_days as f64).ln_1p(),
        "log_duration" => return (request.duration_seconds as f64).ln_1p(),
        _ => {}
    }

    if name.contains("duration") {
        return request.duration_seconds as f64;
    }

    if name.contains("title_length") {
        return request.title_length() as f64;
    }
    if name.contains("title_word_count") {
        return request.title_word_count() as f64;
    }

    // Literal request fields.
    match name {
        "channel_subscriber_count" | "subscriber_count" => request.subscriber_count as f64,
        "age_days" => request.age_days as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytperf_models::Genre;

    fn request() -> VideoRequest {
        VideoRequest::new("Big Title Here", Genre::Gaming, 100_000).with_duration(600)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_column_order_is_preserved() {
        let req = request();
        let thumb = ThumbnailFeatures::default();
        let emb = SlotEmbeddings::for_request(&TextEmbedder::empty(), &req);

        let vector = assemble(
            &req,
            &thumb,
            &emb,
            &names(&["brightness", "title_length", "channel_subscriber_count"]),
        );
        assert_eq!(vector, vec![128.0, 14.0, 100_000.0]);
    }

    #[test]
    fn test_genre_one_hot() {
        let req = request();
        let thumb = ThumbnailFeatures::default();
        let emb = SlotEmbeddings::for_request(&TextEmbedder::empty(), &req);

        let vector = assemble(
            &req,
            &thumb,
            &emb,
            &names(&["genre_gaming", "genre_catholic", "genre_unknown"]),
        );
        assert_eq!(vector, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_embedding_index_lookup() {
        let req = request();
        let thumb = ThumbnailFeatures::default();
        let emb = SlotEmbeddings::for_request(&TextEmbedder::empty(), &req);

        let vector = assemble(
            &req,
            &thumb,
            &emb,
            &names(&["title_embed_0", "title_embed_99999", "tags_embed_1"]),
        );
        // Fallback title features are non-zero at index 0; out-of-range and
        // empty-slot lookups are zero.
        assert!(vector[0] > 0.0);
        assert_eq!(vector[1], 0.0);
        assert_eq!(vector[2], 0.0);
    }

    #[test]
    fn test_log_transforms_and_duration() {
        let req = request();
        let thumb = ThumbnailFeatures::default();
        let emb = SlotEmbeddings::for_request(&TextEmbedder::empty(), &req);

        let vector = assemble(
            &req,
            &thumb,
            &emb,
            &names(&["log_subs", "log_age", "log_duration", "duration_seconds"]),
        );
        assert!((vector[0] - 100_001.0f64.ln()).abs() < 1e-9);
        assert_eq!(vector[1], 0.0);
        assert!((vector[2] - 601.0f64.ln()).abs() < 1e-9);
        assert_eq!(vector[3], 600.0);
    }

    #[test]
    fn test_unrecognized_names_default_to_zero() {
        let req = request();
        let thumb = ThumbnailFeatures::default();
        let emb = SlotEmbeddings::for_request(&TextEmbedder::empty(), &req);

        let vector = assemble(&req, &thumb, &emb, &names(&["mystery_column_42"]));
        assert_eq!(vector, vec![0.0]);
    }

    #[test]
    fn test_prefixed_visual_names() {
        let req = request();
        let thumb = ThumbnailFeatures::default();
        let emb = SlotEmbeddings::for_request(&TextEmbedder::empty(), &req);

        let vector = assemble(
            &req,
            &thumb,
            &emb,
            &names(&["thumbnail_brightness", "thumbnail_edge_density", "face_pct"]),
        );
        assert_eq!(vector, vec![128.0, 0.1, 0.0]);
    }
}
