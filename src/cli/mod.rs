// FILE: src/cli/mod.rs

mod config;
mod handlers;

use crate::error::Result;
use crate::InlineOptions;
use clap::{Arg, ArgAction, Command, ValueEnum};

#[derive(Debug, Clone, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

pub struct InlinerCli {
    config: config::ConfigFile,
}

impl InlinerCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"))?;

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        match matches.subcommand() {
            Some(("inline", sub_matches)) => handlers::handle_inline_command(self, sub_matches),
            Some(("scan", sub_matches)) => handlers::handle_scan_command(sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("inline")
                    .about("Inline styleUrls and templateUrl resources of component sources")
                    .arg(Arg::new("input").help("Source file or directory").required(true).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("PATH").help("Output file, or output directory for directory input"))
                    .arg(Arg::new("in-place").short('i').long("in-place").help("Overwrite the sources").action(ArgAction::SetTrue).conflicts_with("output"))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Process every source file under a directory").action(ArgAction::SetTrue))
                    .arg(Arg::new("base").short('b').long("base").value_name("DIR").help("Root for resolving resource URLs"))
                    .arg(Arg::new("relative").long("relative").help("Resolve resource URLs against each source file's directory").action(ArgAction::SetTrue))
                    .arg(Arg::new("include").short('I').long("include-path").value_name("DIR").help("Add SCSS include directory").action(ArgAction::Append))
                    .arg(Arg::new("compress").long("compress").help("Minify stylesheets and strip template comments").action(ArgAction::SetTrue))
                    .arg(Arg::new("template-only").long("template-only").help("Only inline templateUrl").action(ArgAction::SetTrue))
                    .arg(Arg::new("less-command").long("less-command").value_name("CMD").help("LESS compiler executable"))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch for file changes and re-run").action(ArgAction::SetTrue).conflicts_with("in-place")),
            )
            .subcommand(
                Command::new("scan")
                    .about("List the resource annotations of component sources")
                    .arg(Arg::new("input").help("Source file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Scan every source file under a directory").action(ArgAction::SetTrue))
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(ReportFormat)).default_value("text").help("Report format")),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
        Ok(())
    }

    /// Options from the config file, overridden by command-line flags
    pub fn build_inline_options(&self, matches: &clap::ArgMatches) -> InlineOptions {
        let mut options = self.config.to_options();

        if let Some(base) = matches.get_one::<String>("base") {
            options.base = base.clone();
        }
        options.relative = matches.get_flag("relative") || options.relative;
        options.compress = matches.get_flag("compress") || options.compress;
        options.parse_only_template = matches.get_flag("template-only") || options.parse_only_template;
        if let Some(command) = matches.get_one::<String>("less-command") {
            options.less_command = command.clone();
        }

        let mut include_paths: Vec<String> = matches
            .get_many::<String>("include")
            .map(|dirs| dirs.cloned().collect())
            .unwrap_or_default();
        include_paths.append(&mut options.include_paths);
        options.include_paths = include_paths;

        options.normalized()
    }
}

impl Default for InlinerCli {
    fn default() -> Self {
        Self::new()
    }
}
