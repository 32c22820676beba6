fn main() {
	println!("cargo:rerun-if-env-changed=GIT_COMMIT_HASH");
	let hash = git_commit_hash();
	println!("cargo:rustc-env=GIT_COMMIT_HASH={}", hash);
	println!("cargo:rustc-env=GIT_COMMIT_HASH_SHORT={}", &hash[..hash.len().min(7)]);
}

fn git_commit_hash() -> String {
	if let Ok(hash) = std::env::var("GIT_COMMIT_HASH") {
		return hash
	}

	match std::process::Command::new("git").arg("rev-list").arg("-1").arg("HEAD").output() {
		Ok(output) if output.status.success() && output.stdout.len() >= 40 =>
			String::from_utf8_lossy(&output.stdout[..40]).into_owned(),
		// Not in a git repository, or no git command at all
		_ => "UNKNOWN".to_string(),
	}
}
