pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, error_line, heading, success, summary_row, warn};
pub use table::{channel_table, gap_table, touchpoint_table, truncate};
pub use theme::{Theme, theme};
