//! Feature extraction for the YTPerf prediction pipeline.
//!
//! Three concerns live here:
//! - [`thumbnail`]: image decoding and the color/brightness/edge/face
//!   descriptors, with a never-fails contract
//! - [`text`]: per-slot text embeddings (saved TF-IDF vectorizers with a
//!   statistical fallback)
//! - [`assembler`]: turning an artifact's ordered feature-name list into
//!   a value vector

pub mod assembler;
pub mod error;
pub mod face;
pub mod text;
pub mod thumbnail;

pub use assembler::{assemble, SlotEmbeddings};
pub use error::{FeatureError, FeatureResult};
pub use face::{FaceDetector, SkinRegionDetector};
pub use text::{EmbedSlot, TextEmbedder, TfidfVectorizer, EMBED_DIM};
pub use thumbnail::ThumbnailExtractor;
