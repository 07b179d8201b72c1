// Thin CLI front-end over the policy administration surface. Reads and
// writes `.git3/pow-config.json` in the current directory.

use clap::{Parser, Subcommand};
use git3_pow::policy::{ConfigStore, JsonFileConfigStore, PolicyAdmin, PolicyResolver};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pow-config", about = "Inspect and edit proof-of-work difficulty policy")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List built-in pattern defaults and any branch overrides.
    List,
    /// Set the difficulty required for an exact branch name.
    Set { branch: String, bits: u32 },
    /// Remove a branch's exact override.
    Unset { branch: String },
    /// Set the global default difficulty.
    Default { bits: u32 },
    /// Set a pattern default (dev, feature, main, release).
    Pattern { pattern: String, bits: u32 },
}

fn config_path() -> std::path::PathBuf {
    std::path::Path::new(".git3").join("pow-config.json")
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match JsonFileConfigStore::open(config_path()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to open pow-config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::List => {
            let admin = PolicyAdmin::new(&mut config);
            let report = admin.list();
            for (pattern, bits) in &report.patterns {
                println!("{pattern}\t{bits}");
            }
            for (branch, bits) in &report.branch_overrides {
                println!("branch.{branch}\t{bits}");
            }
            Ok(())
        }
        Command::Set { branch, bits } => PolicyAdmin::new(&mut config).set(&branch, bits),
        Command::Unset { branch } => {
            PolicyAdmin::new(&mut config).unset(&branch);
            Ok(())
        }
        Command::Default { bits } => PolicyAdmin::new(&mut config).set_default(bits),
        Command::Pattern { pattern, bits } => {
            PolicyAdmin::new(&mut config).set_pattern(&pattern, bits)
        }
    };

    match result {
        Ok(()) => {
            let _ = PolicyResolver::new(&config);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
