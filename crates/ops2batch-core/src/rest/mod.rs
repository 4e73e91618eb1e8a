//! REST family framing: per-site partitioning, multipart/changeset
//! serialization and the line-oriented response parser.

mod framing;
mod parse;
mod partition;

pub use framing::{frame_multipart, MultipartPayload};
pub use parse::apply_response;
pub use partition::{partition_by_site, site_of, SiteGroup, API_INFIX};
