/// Command-line entry point for native builds
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    use sectormap::cli::{Cli, run};

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
