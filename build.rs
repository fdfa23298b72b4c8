//! Writes `packetlink.1` for the `serve`/`send` demo binary.

use std::{env, error::Error, fs, path::Path};

use clap::CommandFactory;

#[path = "src/cli.rs"]
mod cli;

const MAN_DIR: &str = "target/generated-man";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let name = env::var("CARGO_PKG_NAME")?;
    let page = Path::new(MAN_DIR).join(format!("{name}.1"));
    fs::create_dir_all(MAN_DIR)?;

    let mut rendered = Vec::new();
    clap_mangen::Man::new(cli::Cli::command()).render(&mut rendered)?;
    fs::write(page, rendered)?;
    Ok(())
}
