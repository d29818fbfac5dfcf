use std::sync::Arc;

use win_ops::{OverlaySurface, WinOps};

use crate::finder::FinderRegistry;

/// Groups the long-lived collaborators a hint session needs, so they can be
/// swapped for mocks at construction sites.
#[derive(Clone)]
pub struct Services {
    /// Window, input and accessibility operations.
    pub ops: Arc<dyn WinOps>,
    /// Where overlays are drawn.
    pub surface: Arc<dyn OverlaySurface>,
    /// Finders exported by plugins.
    pub finders: Arc<FinderRegistry>,
}
