//! Navigation controller and the reader chrome it drives.

mod chrome;
mod controller;
mod location;
mod view;

pub use chrome::humanize_section;
pub use controller::{Controller, Pipeline, ViewerSettings};
pub use location::{Location, MemoryHistory};
pub use view::PageView;
