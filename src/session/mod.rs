// Public API - what other modules can use
pub use handlers::{
    add_route, delete_session, get_session, list_sessions, log_session, quick_log, remove_route,
    update_session,
};
pub use models::{ColorTag, Environment, ResultKind, RouteRecord, SessionRecord, ValidationError};
pub use repository::{InMemorySessionRepository, PostgresSessionRepository, SessionRepository};
pub use service::SessionService;
pub use types::{QuickLogRequest, RouteInput, SessionRequest, SessionResponse};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
