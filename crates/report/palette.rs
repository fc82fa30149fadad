//! Dashboard color palette.

pub const BG: &str = "#1a1a1a";
pub const CARD: &str = "#242424";
pub const PRIMARY: &str = "#e50914";
pub const TEXT: &str = "#ffffff";
pub const GRID: &str = "#333333";
pub const ACCENT_GREEN: &str = "#00ff00";
pub const ACCENT_ORANGE: &str = "#ff9900";
