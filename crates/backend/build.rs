use std::env;
use std::fs;
use std::path::Path;

// Places config.toml next to the compiled binary so the service finds it
// at startup without any environment setup.
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    // OUT_DIR sits under target/<profile>/build/backend-*/out; walk up to
    // the profile directory itself
    let out_dir = env::var("OUT_DIR").unwrap();
    let profile = env::var("PROFILE").unwrap();
    let out_path = Path::new(&out_dir);
    let profile_dir = out_path
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .expect("no profile directory above OUT_DIR");

    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root not found");

    let source = workspace_root.join("config.toml");
    if source.exists() {
        let dest = profile_dir.join("config.toml");
        fs::copy(&source, &dest)
            .unwrap_or_else(|e| panic!("copying config.toml failed: {}", e));
        println!("cargo:warning=config.toml staged at {:?}", dest);
    } else {
        println!(
            "cargo:warning=no config.toml at {:?}, embedded defaults will apply",
            source
        );
    }
}
