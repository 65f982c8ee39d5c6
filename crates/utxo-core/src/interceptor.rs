//! Per-call logging and panic isolation.
//!
//! `CallInterceptor::intercept` wraps one inbound call. The handler future is
//! polled under `catch_unwind`, so a panic inside an adaptor ends that call
//! with an internal `Status` while sibling calls and the registry are
//! untouched.

use futures::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::fmt::Debug;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use tracing::{debug, error, info};
use utxo_types::{HasChain, Status};

thread_local! {
	static LAST_PANIC_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Installs a panic hook that records the backtrace of each panic for the
/// thread it happened on, then runs the previously installed hook.
///
/// Calling it more than once has no further effect.
pub fn install_panic_hook() {
	PANIC_HOOK.call_once(|| {
		let previous = panic::take_hook();
		panic::set_hook(Box::new(move |info| {
			let backtrace = Backtrace::force_capture().to_string();
			LAST_PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
			previous(info);
		}));
	});
}

fn take_panic_backtrace() -> Option<String> {
	LAST_PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take())
}

/// Text after the last `/` of a full call path.
pub fn short_method_name(full_method: &str) -> &str {
	match full_method.rfind('/') {
		Some(pos) => &full_method[pos + 1..],
		None => full_method,
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic payload".to_string()
	}
}

/// Wraps every inbound call with structured logging and panic recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallInterceptor;

impl CallInterceptor {
	pub fn new() -> Self {
		Self
	}

	/// Runs `handler` for `request`, logging the call and converting both
	/// handler errors and panics into a `Status`.
	pub async fn intercept<Req, Resp, E, F, Fut>(
		&self,
		full_method: &str,
		request: Req,
		handler: F,
	) -> Result<Resp, Status>
	where
		Req: HasChain + Debug,
		Resp: Debug,
		E: Into<Status>,
		F: FnOnce(Req) -> Fut,
		Fut: Future<Output = Result<Resp, E>>,
	{
		let method = short_method_name(full_method);
		info!(method = %method, chain = %request.chain(), req = ?request, "Handling call");

		// Building the future is inside the guarded block too, so a handler
		// that panics before its first await is caught as well.
		let outcome = AssertUnwindSafe(async move { handler(request).await })
			.catch_unwind()
			.await;

		let result: Result<Resp, Status> = match outcome {
			Ok(result) => result.map_err(Into::into),
			Err(payload) => {
				let message = panic_message(payload.as_ref());
				error!(method = %method, panic = %message, "Panic error");
				if let Some(backtrace) = take_panic_backtrace() {
					debug!(method = %method, "{}", backtrace);
				}
				Err(Status::internal(format!("Panic err: {}", message)))
			}
		};

		debug!(
			method = %method,
			resp = ?result.as_ref().ok(),
			err = ?result.as_ref().err(),
			"Finish handling"
		);
		result
	}
}
