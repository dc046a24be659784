pub mod batch_planner;
pub mod query_window;

pub use batch_planner::{global_index, group_count, plan, PlannedGroup, GROUP_SIZE};
pub use query_window::QueryWindow;
