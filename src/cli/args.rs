use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tagsync::tags::parse_pair;
use tagsync::{KeyValueTags, OldTags, ServiceName, TagConfig, TagsyncError, UpdateRequest};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: ServiceCommand,
}

#[derive(clap::Args, Debug)]
pub struct GlobalArgs {
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Tag config file (default tags, ignored keys)
    #[arg(long, global = true, env = "TAGSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long = "default-tag", global = true, value_parser = parse_pair)]
    pub default_tags: Vec<(String, String)>,

    #[arg(long = "ignore-tag-key", global = true)]
    pub ignore_tag_keys: Vec<String>,

    #[arg(long = "ignore-tag-prefix", global = true)]
    pub ignore_tag_prefixes: Vec<String>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

impl GlobalArgs {
    /// Config file settings with command line overrides layered on top.
    pub fn tag_config(&self) -> Result<TagConfig, TagsyncError> {
        let default_tags: KeyValueTags = self.default_tags.iter().cloned().collect();
        default_tags.validate()?;

        Ok(TagConfig::load(self.config.as_deref())?
            .with_default_tags(&default_tags)
            .with_ignored(
                self.ignore_tag_keys.clone(),
                self.ignore_tag_prefixes.clone(),
            ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    /// Amazon FSx file systems, volumes and backups
    Fsx {
        #[command(subcommand)]
        command: TagCommand,
    },
    /// AWS Glue catalog, jobs and crawlers
    Glue {
        #[command(subcommand)]
        command: TagCommand,
    },
    /// Amazon QuickSight assets
    #[command(name = "quicksight")]
    QuickSight {
        #[command(subcommand)]
        command: TagCommand,
    },
}

impl ServiceCommand {
    pub fn into_parts(self) -> (ServiceName, TagCommand) {
        match self {
            Self::Fsx { command } => (ServiceName::Fsx, command),
            Self::Glue { command } => (ServiceName::Glue, command),
            Self::QuickSight { command } => (ServiceName::QuickSight, command),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// Show the tags a resource carries now
    List(ListArgs),
    /// Converge a resource's tags on a desired set
    Update(UpdateArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub identifier: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Resource ARN; taken from state when --state is used
    #[arg(long)]
    pub identifier: Option<String>,

    /// JSON file with the current tags; read from the service when omitted
    #[arg(long, conflicts_with = "state")]
    pub old: Option<PathBuf>,

    /// Terraform state to take the identifier and current tags from
    #[arg(long, requires = "address")]
    pub state: Option<PathBuf>,

    #[arg(long, requires = "state")]
    pub address: Option<String>,

    /// JSON file with the desired tags
    #[arg(long)]
    pub new: Option<PathBuf>,

    #[arg(long = "tag", value_parser = parse_pair)]
    pub tags: Vec<(String, String)>,

    #[arg(long)]
    pub dry_run: bool,
}

impl UpdateArgs {
    pub fn request(&self) -> UpdateRequest {
        let old = match (&self.state, &self.address, &self.old) {
            (Some(path), Some(address), _) => OldTags::State {
                path: path.clone(),
                address: address.clone(),
            },
            (_, _, Some(path)) => OldTags::File(path.clone()),
            _ => OldTags::Remote,
        };

        UpdateRequest {
            identifier: self.identifier.clone(),
            old,
            new: self.new.clone(),
            tags: self.tags.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;
    use std::io::Write;

    fn update_args(cli: Cli) -> (ServiceName, UpdateArgs) {
        match cli.command.into_parts() {
            (service, TagCommand::Update(args)) => (service, args),
            (_, other) => panic!("Expected Update command, got {:?}", other),
        }
    }

    #[test]
    fn test_list_args() {
        let cli = Cli::parse_from([
            "tagsync",
            "fsx",
            "list",
            "--identifier=arn:aws:fsx:us-east-1:123456789012:file-system/fs-1",
        ]);

        match cli.command.into_parts() {
            (ServiceName::Fsx, TagCommand::List(args)) => assert_eq!(
                args.identifier,
                "arn:aws:fsx:us-east-1:123456789012:file-system/fs-1"
            ),
            other => panic!("Expected fsx List command, got {:?}", other),
        }
    }

    #[test]
    fn test_quicksight_subcommand_name() {
        let cli = Cli::parse_from(["tagsync", "quicksight", "list", "--identifier=x"]);
        assert_eq!(cli.command.into_parts().0, ServiceName::QuickSight);
    }

    #[test]
    fn test_update_args_with_tags() {
        let cli = Cli::parse_from([
            "tagsync",
            "glue",
            "update",
            "--identifier=arn:aws:glue:us-east-1:123456789012:database/sales",
            "--tag",
            "env=prod",
            "--tag",
            "team=bi",
            "--dry-run",
        ]);
        let (service, args) = update_args(cli);

        assert_eq!(service, ServiceName::Glue);
        assert!(args.dry_run);
        assert_eq!(
            args.tags,
            vec![
                ("env".to_string(), "prod".to_string()),
                ("team".to_string(), "bi".to_string())
            ]
        );

        let request = args.request();
        assert_eq!(request.old, OldTags::Remote);
        assert_eq!(request.tags.get("team"), Some("bi"));
    }

    #[test]
    fn test_update_rejects_malformed_tag() {
        let result = Cli::try_parse_from(["tagsync", "fsx", "update", "--tag", "novalue"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_old_conflicts_with_state() {
        let result = Cli::try_parse_from([
            "tagsync",
            "fsx",
            "update",
            "--old=old.json",
            "--state=terraform.tfstate",
            "--address=aws_fsx_lustre_file_system.scratch",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_state_requires_address() {
        let result = Cli::try_parse_from(["tagsync", "fsx", "update", "--state=terraform.tfstate"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_without_source() {
        let cli = Cli::parse_from(["tagsync", "fsx", "update", "--new=tags.json"]);
        let (_, args) = update_args(cli);

        let request = args.request();
        assert_eq!(request.identifier, None);
        assert_eq!(request.old, OldTags::Remote);
        assert_eq!(request.new, Some(PathBuf::from("tags.json")));
    }

    #[test]
    fn test_update_request_from_state() {
        let cli = Cli::parse_from([
            "tagsync",
            "fsx",
            "update",
            "--state=terraform.tfstate",
            "--address=aws_fsx_lustre_file_system.scratch",
        ]);
        let (_, args) = update_args(cli);

        assert_eq!(
            args.request().old,
            OldTags::State {
                path: PathBuf::from("terraform.tfstate"),
                address: "aws_fsx_lustre_file_system.scratch".to_string(),
            }
        );
    }

    #[test]
    fn test_update_request_from_old_file() {
        let cli = Cli::parse_from([
            "tagsync",
            "glue",
            "update",
            "--identifier=arn:aws:glue:us-east-1:123456789012:database/sales",
            "--old=old.json",
        ]);
        let (_, args) = update_args(cli);

        assert_eq!(args.request().old, OldTags::File(PathBuf::from("old.json")));
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from([
            "tagsync",
            "fsx",
            "list",
            "--identifier=x",
            "--output=json",
            "--ignore-tag-key=Name",
            "--default-tag=owner=platform",
        ]);

        assert_eq!(cli.global.output, OutputFormat::Json);
        assert_eq!(cli.global.ignore_tag_keys, vec!["Name"]);
        assert_eq!(
            cli.global.default_tags,
            vec![("owner".to_string(), "platform".to_string())]
        );
    }

    #[test]
    fn test_output_defaults_to_table() {
        let cli = Cli::parse_from(["tagsync", "glue", "list", "--identifier=x"]);
        assert_eq!(cli.global.output, OutputFormat::Table);
    }

    #[test]
    fn test_tag_config_layers_cli_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"default_tags": {{"owner": "data", "env": "dev"}}, "ignore_tags": {{"keys": ["Name"]}}}}"#
        )
        .unwrap();

        let config_arg = format!("--config={}", file.path().display());
        let cli = Cli::parse_from([
            "tagsync",
            "fsx",
            "list",
            "--identifier=x",
            config_arg.as_str(),
            "--default-tag=owner=platform",
            "--ignore-tag-prefix=tmp:",
        ]);

        let config = cli.global.tag_config().unwrap();
        assert_eq!(config.default_tags.get("owner"), Some("platform"));
        assert_eq!(config.default_tags.get("env"), Some("dev"));
        assert_eq!(config.ignore_tags.keys, vec!["Name"]);
        assert_eq!(config.ignore_tags.key_prefixes, vec!["tmp:"]);
    }

    #[test]
    #[serial]
    fn test_region_from_env_var_fallback() {
        let region_backup = std::env::var("AWS_REGION").ok();

        unsafe {
            std::env::set_var("AWS_REGION", "eu-central-1");
        }

        let cli = Cli::parse_from(["tagsync", "fsx", "list", "--identifier=x"]);

        unsafe {
            match region_backup {
                Some(region) => std::env::set_var("AWS_REGION", region),
                None => std::env::remove_var("AWS_REGION"),
            }
        }

        assert_eq!(cli.global.region, Some("eu-central-1".to_string()));
    }

    #[test]
    #[serial]
    fn test_region_cli_flag_takes_precedence_over_env() {
        let region_backup = std::env::var("AWS_REGION").ok();

        unsafe {
            std::env::set_var("AWS_REGION", "eu-central-1");
        }

        let cli = Cli::parse_from([
            "tagsync",
            "fsx",
            "list",
            "--identifier=x",
            "--region=us-west-2",
        ]);

        unsafe {
            match region_backup {
                Some(region) => std::env::set_var("AWS_REGION", region),
                None => std::env::remove_var("AWS_REGION"),
            }
        }

        assert_eq!(cli.global.region, Some("us-west-2".to_string()));
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        let backup = std::env::var("TAGSYNC_CONFIG").ok();

        unsafe {
            std::env::set_var("TAGSYNC_CONFIG", "/etc/tagsync/config.json");
        }

        let cli = Cli::parse_from(["tagsync", "glue", "list", "--identifier=x"]);

        unsafe {
            match backup {
                Some(path) => std::env::set_var("TAGSYNC_CONFIG", path),
                None => std::env::remove_var("TAGSYNC_CONFIG"),
            }
        }

        assert_eq!(
            cli.global.config,
            Some(PathBuf::from("/etc/tagsync/config.json"))
        );
    }
}
