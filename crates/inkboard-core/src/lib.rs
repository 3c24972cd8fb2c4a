pub mod document;
pub mod geometry;
pub mod id;
pub mod model;
pub mod scene;

pub use document::{DOCUMENT_VERSION, Document, DocumentError};
pub use geometry::{Bounds, hit_test};
pub use id::ObjectId;
pub use model::*;
pub use scene::Scene;
