//! Partnership dashboard: data model, data sources and the aggregated view.

pub mod model;
pub mod source;
pub mod view;

pub use model::{ActionStatus, DashboardData};
pub use source::{DashboardError, DashboardSource, RemoteDashboard};
pub use view::{build_view, ViewFilter};
