mod analyze;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use listing_common::env;

use crate::logging::{Custom as CustomEnvFilter, CustomEnvFilterParser};

const INFO: &str = r"
listing-cli: disassembler listing/function-path analysis toolkit
";

#[derive(Parser, Debug)]
#[command(name = "listing command-line interface", bin_name = "listing-cli")]
#[command(author, version, about = INFO)]
#[command(disable_version_flag = true, arg_required_else_help = true)]
struct Cli {
	#[arg(help = "The logging level")]
	#[arg(env = "LISTING_LOG", short = 'l', long = "log")]
	#[arg(default_value = "info")]
	#[arg(value_parser = CustomEnvFilterParser::new())]
	#[arg(global = true)]
	log: CustomEnvFilter,

	#[command(subcommand)]
	command: Option<Commands>,
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Subcommand)]
enum Commands {
	#[command(about = "Discover function paths over a listing and print a report")]
	Analyze(analyze::AnalyzeArgs),
	#[command(about = "Print extended version information")]
	Version,
}

pub(crate) fn prepare(log: CustomEnvFilter) -> Option<tracing_appender::non_blocking::WorkerGuard> {
	crate::logging::builder()
		.with_filter(log)
		.with_file_appender(std::path::PathBuf::from(".logs"))
		.build()
}

pub async fn init() -> ExitCode {
	env::init();

	let args = Cli::parse();

	if let Some(Commands::Version) = args.command {
		println!("{}", env::release());
		return ExitCode::SUCCESS;
	}

	let _guard = prepare(args.log);

	let output = match args.command {
		Some(Commands::Analyze(analyze_args)) => analyze::init(analyze_args).await.map_err(|e| e.to_string()),
		_ => Ok(()),
	};

	if let Err(e) = output {
		error!("{}", e);
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}
