use crate::cli::Args;

/// Settings handed to the request router at construction time.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub max_page_size: usize,
    pub window_size: usize,
    pub rows_returned_default: u64,
    pub views_enabled: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_page_size: 5000,
            window_size: 5000,
            rows_returned_default: 25,
            views_enabled: true,
        }
    }
}

impl From<&Args> for RouterConfig {
    /// A window wider than the host's row ceiling would come back short and end
    /// the walk early, so the window is capped at the ceiling.
    fn from(args: &Args) -> Self {
        Self {
            max_page_size: args.max_page_size.max(1),
            window_size: args.window_size.clamp(1, args.row_ceiling.max(1)),
            rows_returned_default: args.rows_returned_default.max(1),
            views_enabled: !args.disable_views,
        }
    }
}
