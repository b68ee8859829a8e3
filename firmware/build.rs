// firmware/build.rs
use std::path::PathBuf;

fn main() {
    let target = std::env::var("TARGET").unwrap_or_default();

    // Only use the linker script for the riscv firmware image, not for host tests
    if target.contains("riscv") {
        println!("cargo:rerun-if-changed=memory.ld");

        // Absolute path to memory.ld (robust across cargo working dirs)
        let script = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap()).join("memory.ld");

        println!("cargo:rustc-link-arg=-T{}", script.display());
        println!("cargo:rustc-link-arg=-Map=firmware.map");
    }
    println!("cargo:rerun-if-env-changed=FIRMWARE_BOOTARGS");
}
