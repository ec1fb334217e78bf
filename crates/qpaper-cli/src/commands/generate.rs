//! The `qpaper generate` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};

use qpaper_client::config::{create_client, load_config_from};
use qpaper_core::error::AssemblyError;
use qpaper_core::ledger::{Section, SelectionLedger};
use qpaper_core::model::{ExamType, QuestionId};
use qpaper_core::session::AssemblySession;

pub struct GenerateArgs {
    pub course: String,
    pub part_a: String,
    pub part_b: String,
    pub exam_type: String,
    pub date: Option<String>,
    pub max_marks: String,
    pub duration: String,
    pub semester: String,
    pub improvement_cie: bool,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    let exam_type: ExamType = args.exam_type.parse().map_err(anyhow::Error::msg)?;

    if let Some(date) = &args.date {
        chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{date}', expected YYYY-MM-DD"))?;
    }

    // Checked before anything touches the network.
    let selection = build_selection(&args.part_a, &args.part_b)?;
    if selection.is_empty() {
        return Err(AssemblyError::EmptySelection.into());
    }

    let config = load_config_from(args.config.as_deref())?;
    let client = create_client(&config.service);

    let mut form = AssemblySession::open(config.service.session(), client, &args.course).await?;
    for (id, section) in selection.iter() {
        form.toggle(id, section);
    }

    form.metadata.exam_type = exam_type;
    if let Some(date) = args.date {
        form.metadata.date = date;
    }
    form.metadata.max_marks = args.max_marks;
    form.metadata.duration = args.duration;
    form.metadata.semester = args.semester;
    form.metadata.is_improvement_cie = args.improvement_cie;

    eprintln!(
        "Generating {} paper for {} ({}): {} in Part A, {} in Part B",
        exam_type,
        form.metadata.course_code(),
        form.metadata.course_title(),
        form.ledger().count_in(Section::PartA),
        form.ledger().count_in(Section::PartB),
    );

    let paper = form.submit().await?;

    let output = args.output.unwrap_or(config.output_dir);
    let path = paper
        .save_to(&output)
        .await
        .with_context(|| format!("failed to save paper to {}", output.display()))?;
    println!("Paper saved to: {}", path.display());

    Ok(())
}

/// Toggle each distinct Part A ID, then each distinct Part B ID.
fn build_selection(part_a: &str, part_b: &str) -> Result<SelectionLedger> {
    let mut ledger = SelectionLedger::new();
    for (raw, section) in [(part_a, Section::PartA), (part_b, Section::PartB)] {
        for id in parse_ids(raw).with_context(|| format!("invalid {section} question list"))? {
            ledger.toggle(id, section);
        }
    }
    Ok(ledger)
}

fn parse_ids(raw: &str) -> Result<BTreeSet<QuestionId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<QuestionId>().map_err(anyhow::Error::msg))
        .collect()
}
