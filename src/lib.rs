pub mod app;
pub mod config;
pub mod datepicker;
pub mod day_view;
pub mod dom;
pub mod errors;
pub mod fragment;
pub mod handlers;
pub mod layout;
pub mod models;
pub mod notify;
pub mod state;
pub mod telemetry;
pub mod timer;
pub mod transport;
pub mod ui;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(test)]
mod testing;

pub use app::{Action, Dispatch, DomEvent, EventKind, route};
pub use config::BinderConfig;
pub use errors::ActionError;
pub use handlers::{initialize, run};
pub use notify::Severity;
pub use state::{AppState, Tooltips};
pub use transport::{HttpTransport, Transport};
