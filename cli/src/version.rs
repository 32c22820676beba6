pub const GIT_COMMIT_HASH: &str = env!("GIT_COMMIT_HASH");

pub fn atspi() -> &'static str {
	if is_canary() {
		concat!(env!("CARGO_PKG_VERSION"), "+", env!("GIT_COMMIT_HASH_SHORT"))
	} else {
		env!("CARGO_PKG_VERSION")
	}
}

pub fn is_canary() -> bool {
	option_env!("ATSPI_CANARY").is_some()
}

