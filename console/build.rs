// console/build.rs
use std::path::PathBuf;

fn main() {
    let target = std::env::var("TARGET").unwrap_or_default();

    // Same memory map as the firmware image; host test builds skip it
    if target.contains("riscv") {
        let script = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap())
            .join("../firmware/memory.ld");
        println!("cargo:rerun-if-changed={}", script.display());
        println!("cargo:rustc-link-arg=-T{}", script.display());
        println!("cargo:rustc-link-arg=-Map=console.map");
    }
}
