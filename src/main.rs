use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kira_splicetrend::cli::{Cli, Commands, isoform_mode};
use kira_splicetrend::ctx::{Ctx, OutputPaths};
use kira_splicetrend::io;
use kira_splicetrend::io::annotation::AnnotationTable;
use kira_splicetrend::pipeline::Pipeline;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let version = env!("CARGO_PKG_VERSION");

    match cli.command {
        Commands::Consolidate(args) => {
            if args.groups.is_none() && !args.no_bf {
                anyhow::bail!("--groups is required unless --no-bf is given");
            }
            let mode = isoform_mode(args.multi_iso);
            let mut output = OutputPaths::single_file(&args.out);
            output.consolidated_path = Some(args.out);
            let mut ctx = Ctx::new(mode, output, version);
            ctx.summary_dir = Some(args.summary_dir);
            ctx.compare_dir = args.compare_dir;
            ctx.groups_path = args.groups;
            ctx.annotation_path = args.annotation;
            ctx.with_bf = !args.no_bf;

            Pipeline::standard().run(&mut ctx)?;
            eprint!("{}", io::summary::format_summary(&ctx));
        }
        Commands::Monotonic(args) => {
            let mode = isoform_mode(args.multi_iso);
            let mut output = OutputPaths::single_file(&args.out);
            output.trend_path = Some(args.out);
            output.json_path = args.json;
            let mut ctx = Ctx::new(mode, output, version);
            ctx.consolidated_input = Some(args.input);
            ctx.groups_path = Some(args.groups);
            ctx.trend_params = Some(args.trend.to_params(mode));

            Pipeline::standard().run(&mut ctx)?;
            eprint!("{}", io::summary::format_summary(&ctx));
        }
        Commands::Run(args) => {
            let mode = isoform_mode(args.multi_iso);
            let mut ctx = Ctx::new(mode, OutputPaths::run_dir(args.out), version);
            ctx.summary_dir = Some(args.summary_dir);
            ctx.compare_dir = args.compare_dir;
            ctx.groups_path = Some(args.groups);
            ctx.annotation_path = args.annotation;
            ctx.trend_params = Some(args.trend.to_params(mode));

            Pipeline::standard().run(&mut ctx)?;
            eprint!("{}", io::summary::format_summary(&ctx));
        }
        Commands::Annotate(args) => {
            let lookup = match &args.annotation {
                Some(path) => AnnotationTable::load(path)?,
                None => AnnotationTable::default(),
            };
            let written = io::miso_bf::annotate_comparisons(&args.input, &args.out, &lookup)?;
            if written.is_empty() {
                tracing::warn!(input = %args.input.display(), "no comparison directories found");
            }
            for path in written {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
