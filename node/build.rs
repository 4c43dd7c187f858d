//! Build script - fixes the number of nodes on the bus for this firmware.

use std::env;
use std::fs;
use std::path::PathBuf;

const DEFAULT_NODES: u8 = 2;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let nodes = match env::var("RACEBUS_NODE_COUNT") {
        Ok(text) => text.trim().parse::<u8>()
            .expect("RACEBUS_NODE_COUNT must be a number of nodes between 1 and 253"),
        Err(_) => DEFAULT_NODES,
    };
    fs::write(
        out_dir.join("nodes.rs"),
        format!("/// nodes sharing the bus, all of them must be ready to start a game\npub const NODE_COUNT: u8 = {nodes};\n"),
        ).unwrap();

    println!("cargo:rerun-if-env-changed=RACEBUS_NODE_COUNT");
    println!("cargo:rerun-if-changed=build.rs");
}
