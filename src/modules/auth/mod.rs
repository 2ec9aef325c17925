pub mod model;
pub mod service;

pub use model::RefreshState;
pub use service::SessionManager;
