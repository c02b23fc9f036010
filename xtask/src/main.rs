use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for orbitlab")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy, tests, then the text-frame smoke run
    Check,
    /// cargo fmt --check
    Fmt,
    /// clippy with warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Run a few frames through the debug text renderer
    Frames,
    /// Render a few headless frames on the GPU
    Gpu,
}

/// One cargo invocation.
struct Step {
    title: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    title: "format",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    title: "clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    title: "tests",
    args: &["test", "--workspace"],
};
const FRAMES: Step = Step {
    title: "text frames",
    args: &["run", "-p", "orbitlab-cli", "--", "frames", "--count", "3", "--orbit", "0.1"],
};
const GPU: Step = Step {
    title: "headless GPU frames",
    args: &["run", "-p", "orbitlab-cli", "--", "gpu", "--frames", "3"],
};

fn run(step: &Step) -> Result<()> {
    println!("==> {}: cargo {}", step.title, step.args.join(" "));
    let status = Command::new("cargo").args(step.args).status()?;
    if !status.success() {
        anyhow::bail!("{} failed ({status})", step.title);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let steps: &[&Step] = match cli.command {
        Commands::Check => &[&FMT, &CLIPPY, &TEST, &FRAMES],
        Commands::Fmt => &[&FMT],
        Commands::Clippy => &[&CLIPPY],
        Commands::Test => &[&TEST],
        Commands::Frames => &[&FRAMES],
        Commands::Gpu => &[&GPU],
    };
    for step in steps {
        run(step)?;
    }
    Ok(())
}
