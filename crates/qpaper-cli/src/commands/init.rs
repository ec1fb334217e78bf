//! The `qpaper init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("qpaper.toml").exists() {
        println!("qpaper.toml already exists, skipping.");
    } else {
        std::fs::write("qpaper.toml", SAMPLE_CONFIG)?;
        println!("Created qpaper.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set QPAPER_TOKEN or edit the token in qpaper.toml");
    println!("  2. Run: qpaper questions --course <COURSE_ID>");
    println!("  3. Run: qpaper generate --course <COURSE_ID> --part-a 1,2 --part-b 3 \\");
    println!("            --max-marks 50 --duration \"90 minutes\" --semester V");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# qpaper configuration

output_dir = "./generated_papers"

[service]
base_url = "http://localhost:8000/api"
token = "${QPAPER_TOKEN}"
role = "faculty"
timeout_secs = 120
"#;
