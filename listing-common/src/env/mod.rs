use crate::cst::PKG_VERSION;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn os() -> &'static str {
	if cfg!(target_os = "windows") {
		"windows"
	} else if cfg!(target_os = "macos") {
		"macos"
	} else if cfg!(target_os = "ios") {
		"ios"
	} else if cfg!(target_os = "linux") {
		"linux"
	} else if cfg!(target_os = "android") {
		"android"
	} else if cfg!(target_os = "freebsd") {
		"freebsd"
	} else if cfg!(target_os = "openbsd") {
		"openbsd"
	} else if cfg!(target_os = "netbsd") {
		"netbsd"
	} else {
		"unknown"
	}
}

fn arch() -> &'static str {
	if cfg!(target_arch = "x86") {
		"x86"
	} else if cfg!(target_arch = "x86_64") {
		"x86_64"
	} else if cfg!(target_arch = "arm") {
		"arm"
	} else if cfg!(target_arch = "aarch64") {
		"aarch64"
	} else {
		"unknown"
	}
}

pub fn init() {
	info!("Running {}", release());
}

#[must_use]
pub fn release() -> String {
	format!("{} for {} on {}", *PKG_VERSION, os(), arch())
}
