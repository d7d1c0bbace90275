use std::env;

use xaction::{cargo_toml, cmd, git, section, Result};

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {}", err);
        std::process::exit(1)
    }
}

fn try_main() -> Result<()> {
    let subcommand = env::args().nth(1);
    match subcommand.as_deref() {
        Some("ci") => ci(),
        Some("test") => test(),
        _ => {
            print_usage();
            Err("invalid arguments")?
        }
    }
}

fn test() -> Result<()> {
    {
        let _s = section("TEST");
        cmd!("cargo test --workspace -- --nocapture").run()?;
    }
    {
        let _s = section("TEST serde1");
        cmd!("cargo test --features serde1").run()?;
    }
    Ok(())
}

fn ci() -> Result<()> {
    let cargo_toml = cargo_toml()?;

    {
        let _s = section("BUILD");
        cmd!("cargo test --workspace --no-run").run()?;
    }

    test()?;

    let version = cargo_toml.version()?;
    let tag = format!("v{}", version);

    let dry_run =
        env::var("CI").is_err() || git::has_tag(&tag)? || git::current_branch()? != "main";
    xaction::set_dry_run(dry_run);

    {
        let _s = section("PUBLISH");
        cargo_toml.publish()?;
        git::tag(&tag)?;
        git::push_tags()?;
    }
    Ok(())
}

fn print_usage() {
    eprintln!(
        "\
Usage: cargo run -p xtask <SUBCOMMAND>

SUBCOMMANDS:
    ci      build, test and publish on a new version
    test    run the test suite with and without optional features
"
    )
}
