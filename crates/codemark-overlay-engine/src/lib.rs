pub mod host;
pub mod layout;
pub mod models;
pub mod panel;
pub mod snapshot;

// Re-export key types for easier usage
pub use host::{EditorContext, EditorHost, HostError, HostNotification};
pub use layout::*;
pub use models::*;
pub use panel::{InlineCodemarksPanel, MarkerPlacement, PanelSettings, RenderPass, ViewStyle};
