//! The `qpaper questions` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use qpaper_client::config::{create_client, load_config_from};
use qpaper_core::filter::FilterCriteria;
use qpaper_core::model::Question;
use qpaper_core::pool::{FilterOutcome, QuestionPool};

pub async fn execute(
    course: String,
    unit: Option<String>,
    co: Option<String>,
    bt: Option<String>,
    marks: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let client = create_client(&config.service);

    let criteria = FilterCriteria {
        units: unit.unwrap_or_default(),
        cos: co.unwrap_or_default(),
        bts: bt.unwrap_or_default(),
        marks: marks.unwrap_or_default(),
    };

    let mut pool = QuestionPool::new(course.clone());
    pool.load(client.as_ref())
        .await
        .with_context(|| format!("could not load questions for course {course}"))?;

    if !criteria.is_blank() {
        let outcome = pool.apply_filter(client.as_ref(), &criteria).await?;
        if let FilterOutcome::Applied(n) = outcome {
            tracing::debug!(matched = n, "filter applied");
        }
    }

    print_questions(pool.filtered());
    eprintln!(
        "{} of {} questions shown for {course}",
        pool.filtered().len(),
        pool.all().len()
    );

    Ok(())
}

fn print_questions(questions: &[Question]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["ID", "Unit", "CO", "BT", "Marks", "Question"]);

    for q in questions {
        table.add_row(vec![
            Cell::new(q.id),
            Cell::new(&q.unit_id),
            Cell::new(&q.co),
            Cell::new(&q.bt),
            Cell::new(q.marks),
            Cell::new(truncate(&q.text, 60)),
        ]);
    }

    println!("{table}");
}

fn truncate(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max_chars {
        flat.chars().take(max_chars).collect::<String>() + "..."
    } else {
        flat
    }
}
