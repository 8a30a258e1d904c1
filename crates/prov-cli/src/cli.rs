use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "prov",
    about = "Salted product-record commitments: anchor, verify, audit",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP service over in-memory collaborators
    Serve(ServeArgs),
    /// Commit, verify, and tamper with a sample record
    Demo(DemoArgs),
    /// Recompute leaves and root from persisted salts and field values
    Recompute(RecomputeArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML service configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Listen address, overriding the configuration file
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct DemoArgs {
    #[arg(long, default_value_t = 1)]
    pub id: u64,
    #[arg(long, default_value = "Widget")]
    pub name: String,
    #[arg(long, default_value = "2024-01-01")]
    pub mdate: String,
    #[arg(long, default_value = "B7")]
    pub batch: String,
}

#[derive(Args)]
pub struct RecomputeArgs {
    /// Hex salt, once per field in leaf order
    #[arg(long = "salt", required = true, num_args = 1)]
    pub salts: Vec<String>,
    /// Field value, once per field in leaf order
    #[arg(long = "value", required = true, num_args = 1)]
    pub values: Vec<String>,
    /// Anchored root to compare against
    #[arg(long)]
    pub expect: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["prov", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_with_overrides() {
        let cli =
            Cli::try_parse_from(["prov", "serve", "--config", "prov.toml", "--bind", "0.0.0.0:80"])
                .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("prov.toml")));
            assert_eq!(args.bind.as_deref(), Some("0.0.0.0:80"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_demo_defaults() {
        let cli = Cli::try_parse_from(["prov", "demo"]).unwrap();
        if let Command::Demo(args) = cli.command {
            assert_eq!(args.id, 1);
            assert_eq!(args.batch, "B7");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_recompute_keeps_order() {
        let cli = Cli::try_parse_from([
            "prov", "recompute", "--salt", "aa", "--value", "1", "--salt", "bb", "--value",
            "Widget",
        ])
        .unwrap();
        if let Command::Recompute(args) = cli.command {
            assert_eq!(args.salts, vec!["aa", "bb"]);
            assert_eq!(args.values, vec!["1", "Widget"]);
            assert!(args.expect.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn recompute_requires_salts() {
        assert!(Cli::try_parse_from(["prov", "recompute", "--value", "1"]).is_err());
    }

    #[test]
    fn global_flags() {
        let cli = Cli::try_parse_from(["prov", "demo", "-v", "--format", "json"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
