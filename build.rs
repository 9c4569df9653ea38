
use std::error::Error;
use vergen_gitcl::{Emitter, GitclBuilder};

/// Emits `VERGEN_GIT_DESCRIBE` from the local git checkout.
/// # Errors
/// * if `git` is not available or the source tree is not a git clone (e.g. a packaged tarball)
fn emit_git_describe() -> Result<(), Box<dyn Error>> {
    let gitcl = GitclBuilder::default()
        .describe(false, true, None)
        .build()?;

    Emitter::default()
        .fail_on_error()
        .add_instructions(&gitcl)?
        .emit()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    if emit_git_describe().is_err() {
        // packaged builds can pin the description, otherwise we fall back to "unknown"
        let git_desc = std::env::var("GWASMERGE_GIT_DESCRIBE")
            .unwrap_or_else(|_e| "unknown".to_string());
        println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE={git_desc}");
    }

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed=GWASMERGE_GIT_DESCRIBE");
    Ok(())
}
