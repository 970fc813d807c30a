use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fftransformer::core::command::CommandBuilder;
use fftransformer::core::error::TransformError;
use fftransformer::core::stream::StreamType;
use fftransformer::util::load_profile;

#[derive(Debug, Parser)]
#[command(name = "fftransformer", version, about = "Compose ffmpeg commands without running them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the command that would transcode the inputs
    Plan(PlanArgs),
    /// Print a profile in canonical form
    Normalize(NormalizeArgs),
}

#[derive(Debug, Parser)]
pub struct PlanArgs {
    #[arg(short = 'i', long = "input", required = true)]
    pub inputs: Vec<String>,
    #[arg(short = 'o', long = "output")]
    pub output: String,
    /// Profile document (.json or .toml)
    #[arg(long = "profile", value_name = "FILE")]
    pub profile: Option<PathBuf>,
    #[arg(short = 'y', long = "overwrite")]
    pub overwrite: bool,
    #[arg(long = "no-audio")]
    pub no_audio: bool,
    /// Print the arguments as a JSON array
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct NormalizeArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

pub fn plan_command(args: &PlanArgs) -> Result<CommandBuilder, TransformError> {
    let mut builder = CommandBuilder::new();
    if args.overwrite {
        builder.overwrite();
    }

    let mut sources = Vec::new();
    for path in &args.inputs {
        let input = builder.add_input(path.as_str());
        let file = builder.input_mut(input)?;
        sources.push((input, file.add_stream(StreamType::Video).id()));
        if !args.no_audio {
            sources.push((input, file.add_stream(StreamType::Audio).id()));
        }
    }

    let output = builder.add_output(args.output.as_str());
    match &args.profile {
        Some(path) => {
            let profile = load_profile(path)?;
            builder.apply_profile(output, &profile, &sources)?;
        }
        None => {
            for (input, stream) in sources {
                builder.map(output, input, stream)?;
            }
        }
    }

    Ok(builder)
}

pub fn execute(command: Commands) -> Result<(), TransformError> {
    match command {
        Commands::Plan(args) => {
            let builder = plan_command(&args)?;
            if args.json {
                let tokens = builder.build()?;
                let rendered = serde_json::to_string_pretty(&tokens)?;
                println!("{rendered}");
            } else {
                println!("{}", builder.to_display_string()?);
            }
        }
        Commands::Normalize(args) => {
            let profile = load_profile(&args.file)?;
            let rendered = serde_json::to_string_pretty(&profile.to_value())?;
            println!("{rendered}");
        }
    }
    Ok(())
}
