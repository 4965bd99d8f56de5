#![deny(clippy::mem_forget)]
#![forbid(unsafe_code)]

use std::future::Future;
use std::process::ExitCode;

/// `paths::walk` recurses once per instruction along a function's control
/// flow; the default 2MiB thread stack can run out on deeply nested or
/// adversarial inputs before `max_path_len` ever kicks in.
const THREAD_STACK_SIZE: usize = 8 * 1024 * 1024;

fn main() -> ExitCode {
	with_enough_stack(listing_cli::cli::init())
}

fn with_enough_stack<T>(fut: impl Future<Output = T> + Send) -> T {
	tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.thread_stack_size(THREAD_STACK_SIZE)
		.thread_name("listing-worker")
		.build()
		.unwrap()
		.block_on(fut)
}
