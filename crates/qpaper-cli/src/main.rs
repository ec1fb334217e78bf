//! qpaper CLI: assemble exam papers from a course question bank.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "qpaper", version, about = "Assemble exam papers from a question bank")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a course's questions, optionally filtered
    Questions {
        /// Course ID
        #[arg(long)]
        course: String,

        /// Unit numbers (comma-separated)
        #[arg(long)]
        unit: Option<String>,

        /// Course outcomes (comma-separated)
        #[arg(long)]
        co: Option<String>,

        /// Bloom's taxonomy levels (comma-separated)
        #[arg(long)]
        bt: Option<String>,

        /// Marks (comma-separated integers)
        #[arg(long)]
        marks: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a question paper document
    Generate {
        /// Course ID
        #[arg(long)]
        course: String,

        /// Question IDs for Part A (comma-separated)
        #[arg(long, default_value = "")]
        part_a: String,

        /// Question IDs for Part B (comma-separated)
        #[arg(long, default_value = "")]
        part_b: String,

        /// Exam type: CIE, SEE, IMPROVEMENT, MAKEUP
        #[arg(long, default_value = "CIE")]
        exam_type: String,

        /// Exam date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Maximum marks
        #[arg(long)]
        max_marks: String,

        /// Duration (e.g. "3 hours")
        #[arg(long)]
        duration: String,

        /// Semester label
        #[arg(long)]
        semester: String,

        /// Mark the paper as an improvement CIE
        #[arg(long)]
        improvement_cie: bool,

        /// Output directory (default: from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qpaper=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Questions {
            course,
            unit,
            co,
            bt,
            marks,
            config,
        } => commands::questions::execute(course, unit, co, bt, marks, config).await,
        Commands::Generate {
            course,
            part_a,
            part_b,
            exam_type,
            date,
            max_marks,
            duration,
            semester,
            improvement_cie,
            output,
            config,
        } => {
            commands::generate::execute(commands::generate::GenerateArgs {
                course,
                part_a,
                part_b,
                exam_type,
                date,
                max_marks,
                duration,
                semester,
                improvement_cie,
                output,
                config,
            })
            .await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
