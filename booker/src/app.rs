use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use console::Term;
use eyre::OptionExt;
use itertools::Itertools;
use std::{collections::HashMap, str::FromStr};

use crate::{masking, ListReporter, NullReporter, Reporter, Runner};

/// Built-in reporters selectable with `--reporters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ReporterType {
    List,
    Null,
}

/// Build the CLI with clap's builder pattern
fn build_cli<'a>(third_party_reporters: impl Iterator<Item = &'a String>) -> ClapCommand {
    let reporter_choices = <ReporterType as strum::IntoEnumIterator>::iter()
        .map(|r| r.to_string())
        .chain(third_party_reporters.cloned())
        .join(", ");
    ClapCommand::new("booker")
        .about("booker runs end-to-end scenarios against a booking service")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .subcommand(
            ClapCommand::new("test")
                .about("Run scenarios")
                .arg(Arg::new("capture-http")
                    .long("capture-http")
                    .help("Print every HTTP request and response of each scenario")
                    .action(ArgAction::SetTrue))
                .arg(Arg::new("capture-rust")
                    .long("capture-rust")
                    .help("Print booker's own tracing logs, filtered with RUST_LOG")
                    .action(ArgAction::SetTrue))
                .arg(Arg::new("modules")
                    .short('m')
                    .long("modules")
                    .help("Specify modules to run in comma-separated string. --modules create,read")
                    .value_delimiter(',')
                    .action(ArgAction::Append))
                .arg(Arg::new("tests")
                    .short('t')
                    .long("tests")
                    .help("Specify scenarios to run in comma-separated string. e.g. --tests a,b")
                    .value_delimiter(',')
                    .action(ArgAction::Append))
                .arg(Arg::new("reporters")
                    .long("reporters")
                    .help(format!("Specify the reporters to use in comma-separated string. Default is \"list\". [possible values: {reporter_choices}]"))
                    .value_delimiter(',')
                    .action(ArgAction::Append))
                .arg(Arg::new("show-sensitive")
                    .long("show-sensitive")
                    .help("Print tokens and passwords in captured HTTP logs instead of masking them")
                    .action(ArgAction::SetTrue))
                .arg(Arg::new("color")
                    .long("color")
                    .help("Produce color output. Default is \"auto\" [env: CARGO_TERM_COLOR]")
                    .value_parser(["auto", "always", "never"]))
        )
        .subcommand(
            ClapCommand::new("ls")
                .about("List scenarios")
        )
}

fn values(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default()
}

/// booker CLI.
#[derive(Default)]
pub struct App {
    third_party_reporters: HashMap<String, Box<dyn Reporter + 'static + Send>>,
}

impl App {
    pub fn new() -> App {
        App {
            third_party_reporters: HashMap::new(),
        }
    }

    /// Install a third-party reporter.
    pub fn install_reporter(
        &mut self,
        name: impl Into<String>,
        reporter: impl Reporter + 'static + Send,
    ) {
        self.third_party_reporters
            .insert(name.into(), Box::new(reporter));
    }

    /// Parse command-line args and run the sub command.
    pub async fn run(self, runner: Runner) -> eyre::Result<()> {
        let matches = build_cli(self.third_party_reporters.keys()).get_matches();
        color_eyre::install()?;
        self.dispatch(&matches, runner).await
    }

    async fn dispatch(mut self, matches: &ArgMatches, mut runner: Runner) -> eyre::Result<()> {
        let term = Term::stdout();

        match matches.subcommand() {
            Some(("test", test_matches)) => {
                let capture_http = test_matches.get_flag("capture-http");
                let modules = values(test_matches, "modules");
                let tests = values(test_matches, "tests");
                let reporters_arg = values(test_matches, "reporters");
                let color_command = test_matches
                    .get_one::<String>("color")
                    .and_then(|s| Color::from_str(s).ok());

                if capture_http {
                    runner.capture_http();
                }
                if test_matches.get_flag("capture-rust") {
                    runner.capture_rust();
                }
                masking::set_mask_sensitive(!test_matches.get_flag("show-sensitive"));
                runner.terminate_channel();

                let mut reporters = std::mem::take(&mut self.third_party_reporters);
                reporters.extend([
                    (
                        ReporterType::List.to_string(),
                        Box::new(ListReporter::new(capture_http)),
                    ),
                    (ReporterType::Null.to_string(), Box::new(NullReporter)),
                ]
                    as [(String, Box<dyn Reporter + 'static + Send>); 2]);

                let reporters_arg = if reporters_arg.is_empty() {
                    vec![ReporterType::List.to_string()]
                } else {
                    reporters_arg
                };
                for reporter in reporters_arg {
                    runner.add_boxed_reporter(
                        reporters
                            .remove(&reporter)
                            .ok_or_else(|| eyre::eyre!("Unknown reporter: {reporter}"))?,
                    );
                }

                let color_env = std::env::var("CARGO_TERM_COLOR").ok();
                apply_color(resolve_color(color_command, color_env.as_deref()));

                runner.run(&modules, &tests).await
            }
            Some(("ls", _)) => {
                let list = runner.list();
                let test_case_by_module = list.iter().into_group_map_by(|test| test.module.clone());
                for module in test_case_by_module.keys().sorted() {
                    term.write_line(&format!("* {module}"))?;
                    for test_case in test_case_by_module
                        .get(module)
                        .ok_or_eyre("module not found")?
                        .iter()
                        .sorted_by_key(|test| test.name.clone())
                    {
                        let mark = if runner.is_ignored(test_case) {
                            " (ignored)"
                        } else {
                            ""
                        };
                        term.write_line(&format!("  - {}{mark}", test_case.full_name()))?;
                    }
                }

                Ok(())
            }
            _ => unreachable!("Subcommand required is set to true"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

/// An explicit `--color always|never` wins over `CARGO_TERM_COLOR`.
fn resolve_color(command: Option<Color>, env: Option<&str>) -> Color {
    match (command, env) {
        (Some(color @ (Color::Always | Color::Never)), _) => color,
        (_, Some(color)) => Color::from_str(color).unwrap_or_default(),
        _ => Color::Auto,
    }
}

fn apply_color(color: Color) {
    match color {
        Color::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        }
        Color::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }
        Color::Auto => {}
    }
}
