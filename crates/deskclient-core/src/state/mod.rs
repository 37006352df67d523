//! Client-side view state for the dashboard screens.
//!
//! - `DashboardPeriod`: which reporting period the dashboard is filtered to
//! - `TicketsView`: list/kanban layout and bulk-selection mode for tickets

pub mod period;
pub mod tickets_view;

pub use period::{DashboardPeriod, PeriodType};
pub use tickets_view::{TicketsView, ViewMode};
