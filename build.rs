use std::env;

fn main() {
    // Version string baked into the user agent and `--version`
    let version = env::var("TUBEDL_VERSION_OVERRIDE")
        .unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap_or_default());
    println!("cargo:rustc-env=TUBEDL_VERSION={version}");

    println!("cargo:rerun-if-env-changed=TUBEDL_VERSION_OVERRIDE");
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
