pub mod collection;
pub mod renderer;
pub mod toc;

pub use collection::{load_collection, ContentDocument};
pub use renderer::{render, RenderedNode};
pub use toc::{build_toc_tree, TocEntry};
