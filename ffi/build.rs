fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    match cbindgen::generate(&crate_dir) {
        Ok(bindings) => {
            bindings.write_to_file(std::path::Path::new(&crate_dir).join("include/agentmail.h"));
        }
        // Header generation is best-effort; a parse hiccup must not fail the
        // library build itself.
        Err(err) => println!("cargo:warning=skipping header generation: {err}"),
    }
}
