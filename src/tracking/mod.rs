mod app_state;
mod error;
mod generator;
mod issuer;
mod middleware;
mod params;
mod request_id;
mod server;
mod store;

pub use app_state::*;
pub use error::*;
pub use server::*;
