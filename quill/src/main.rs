use std::path::PathBuf;
use std::process::ExitCode;

use quire::{archetype, BuildOptions, SiteConfig, SitePaths};
use tracing_subscriber::EnvFilter;

mod flags;

fn main() -> ExitCode {
    let flags = flags::Quill::from_env_or_exit();
    let filter = match flags.verbose {
        true => EnvFilter::new("info"),
        false => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let source = flags.source.unwrap_or_else(|| PathBuf::from("."));
    let mut paths = SitePaths::new(source);
    if let Some(output) = flags.output {
        paths = paths.with_output(output);
    }

    match flags.subcommand {
        flags::QuillCmd::Build(cmd) => {
            let options = BuildOptions {
                recursive: cmd.shallow.then_some(false),
                drafts: cmd.drafts.then_some(true),
            };

            match quire::build(paths, options) {
                Ok(report) => println!("{report}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        flags::QuillCmd::New(cmd) => {
            let today = chrono::Local::now().date_naive();
            let result = SiteConfig::read(paths.config())
                .and_then(|config| archetype::new_document(&paths, &config, &cmd.title, today));

            match result {
                Ok(path) => println!("created {}", path.display()),
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
