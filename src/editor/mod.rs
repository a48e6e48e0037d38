//! Visual editing of generated pages.
//!
//! The overlay, edit session and commit step are written against
//! [`surface::EditSurface`], so the same protocol drives the live preview frame
//! in the browser and the owned markup tree in native tests.

mod commit;
mod frame;
mod overlay;
mod session;
mod surface;
mod visual;

pub(crate) use frame::NavigationGuard;
pub(crate) use overlay::scrub_html;
pub use visual::VisualEditor;
