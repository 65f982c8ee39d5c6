//! Dispatch layer of the UTXO gateway.
//!
//! Every inbound call passes through two stages:
//!
//! - `CallInterceptor` logs the call and isolates panics raised while it is
//!   being handled, turning them into an internal `Status`.
//! - `ChainDispatcher` checks that the requested chain is registered and
//!   forwards the request to the bound adaptor, passing its result through.

pub mod dispatcher;
pub mod interceptor;

pub use dispatcher::ChainDispatcher;
pub use interceptor::{install_panic_hook, short_method_name, CallInterceptor};
