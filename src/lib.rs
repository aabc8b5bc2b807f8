pub mod config;
pub mod routes;
pub mod state;
pub mod view;

pub use config::{Config, ConfigError};
pub use routes::create_router;
pub use state::AppState;
pub use view::{spawn_view, ViewHandle};
