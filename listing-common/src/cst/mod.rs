/// The publicly visible name of the toolkit
#[allow(dead_code)]
pub const PKG_NAME: &str = "listing";

/// The publicly visible user-agent of the command-line tool
#[allow(dead_code)]
pub const SERVER_AGENT: &str = concat!("listing ", env!("CARGO_PKG_VERSION"));

/// The version identifier of this build
pub static PKG_VERSION: std::sync::LazyLock<String> =
	std::sync::LazyLock::new(|| match option_env!("LISTING_BUILD_METADATA") {
		Some(metadata) if !metadata.trim().is_empty() => {
			let version = env!("CARGO_PKG_VERSION");
			format!("{version}+{metadata}")
		}
		_ => env!("CARGO_PKG_VERSION").to_owned(),
	});
