//! Build script rendering the `classicwire(1)` man page from the CLI
//! definition.

use std::{env, fs, path::PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
#[allow(dead_code, reason = "only the clap definition is needed here")]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = env::var_os("CLASSICWIRE_MAN_DIR")
        .map_or_else(|| PathBuf::from("target/generated-man"), PathBuf::from);
    fs::create_dir_all(&out_dir)?;

    let man = Man::new(cli::Cli::command()).section("1").manual("classicwire manual");
    let mut page = Vec::new();
    man.render(&mut page)?;
    fs::write(out_dir.join("classicwire.1"), page)?;

    Ok(())
}
