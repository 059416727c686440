mod cli;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ListArgs, OutputFormat, TagCommand, UpdateArgs};
use tagsync::config;
use tagsync::{KeyValueTags, TagConfig, TagReconciler, output, services};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let tag_config = cli.global.tag_config()?;
    let (service_name, command) = cli.command.into_parts();

    let sdk_config =
        config::load_sdk_config(cli.global.region.clone(), cli.global.endpoint_url.clone()).await;
    let reconciler = TagReconciler::new(services::get_service(service_name, &sdk_config));

    match command {
        TagCommand::List(args) => list(&reconciler, &tag_config, &args, cli.global.output).await,
        TagCommand::Update(args) => {
            update(&reconciler, &tag_config, &args, cli.global.output).await
        }
    }
}

async fn list(
    reconciler: &TagReconciler,
    tag_config: &TagConfig,
    args: &ListArgs,
    format: OutputFormat,
) -> Result<()> {
    let service = reconciler.service_name();
    service.check_identifier(&args.identifier)?;

    let remote = reconciler.list_tags(&args.identifier).await?;
    print_tags(&tag_config.read_tags(service, &remote), format)
}

async fn update(
    reconciler: &TagReconciler,
    tag_config: &TagConfig,
    args: &UpdateArgs,
    format: OutputFormat,
) -> Result<()> {
    let planned = reconciler
        .plan_update(tag_config, &args.request())
        .await
        .wrap_err("planning tag update")?;
    println!("{}", output::plan_tree(&planned.identifier, &planned.diff));

    if let Some(tags) = reconciler
        .apply_update(tag_config, &planned, args.dry_run)
        .await?
    {
        print_tags(&tags, format)?;
    }
    Ok(())
}

fn print_tags(tags: &KeyValueTags, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Table => output::tags_table(tags),
        OutputFormat::Json => output::tags_json(tags)?,
    };
    println!("{}", rendered);
    Ok(())
}
