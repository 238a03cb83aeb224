mod forecast;
mod gpa;
mod models;
mod reader;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use csv::Writer;
use models::{Config, CourseRecord};
use reader::TranscriptReader;
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    let matches = Command::new("transcript-analyzer")
        .version("1.0")
        .about("Parses university transcripts and computes GPA statistics")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("transcript")
                .short('t')
                .long("transcript")
                .value_name("FILE")
                .help("Extracted transcript text, pages separated by form feeds"),
        )
        .get_matches();

    let config_file = matches.get_one::<String>("config").unwrap();

    // Load or create configuration
    let config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        let default_config = Config::default();
        default_config.save_to_file(config_file)?;
        println!(
            "⚠️  Please edit {} to pick an institution and transcript file, then run the program again.",
            config_file
        );
        return Ok(());
    };

    let reader = reader::for_institution(&config.institution)
        .with_context(|| format!("no transcript grammar for {:?}", config.institution))?;
    println!("🏫 Institution: {}", reader.institution());

    let output_dir = config.output_directory.as_deref().unwrap_or("output");
    fs::create_dir_all(output_dir)?;

    // CLI flag overrides the configured transcript path.
    let transcript_file = matches
        .get_one::<String>("transcript")
        .cloned()
        .or_else(|| config.transcript_file.clone());

    let lines = match &transcript_file {
        Some(path) => {
            println!("📄 Reading transcript text from: {}", path);
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read transcript text: {}", path))?;
            let pages: Vec<String> = content.split('\u{c}').map(String::from).collect();
            reader.segment_lines(&pages)
        }
        None => {
            println!("📄 No transcript file configured, using the built-in sample");
            reader.sample_lines()
        }
    };

    if lines.is_empty() {
        println!("❌ No text could be extracted from the transcript.");
        return Ok(());
    }

    let rows = reader.tokenize(&lines);
    let all_courses = match reader.clean(&rows) {
        Ok(records) => records,
        Err(error) => {
            println!("❌ Transcript read error: {}", error);
            println!(
                "   Please verify that the provided transcript matches the selected institution."
            );
            return Ok(());
        }
    };

    if all_courses.is_empty() {
        println!("❌ No completed courses found — the transcript may be unreadable or from a different institution.");
        return Ok(());
    }

    let gpa_courses = reader.remove_replacements(&all_courses);
    let conversion_table = reader.conversion_table();

    let average = gpa::credit_weighted_average(&gpa_courses);
    let points_gpa = gpa::points_table_gpa(&gpa_courses, conversion_table);
    let credits = gpa::total_credits(&gpa_courses);
    let overall_average = gpa::credit_weighted_average(&all_courses);

    println!("\n📊 Courses counted toward GPA: {}", gpa_courses.len());
    println!("   Grade point average: {}", average);
    println!("   Points-table GPA: {:.2}", points_gpa);
    println!("   Total credits earned: {}", credits);
    println!("\n📚 Total courses completed: {}", all_courses.len());
    println!("   Overall average: {}", overall_average);
    println!(
        "   Recovered by replacements: {:.4}",
        average - overall_average
    );

    write_course_csv(&all_courses, &Path::new(output_dir).join("all_courses.csv"))?;
    write_course_csv(&gpa_courses, &Path::new(output_dir).join("gpa_courses.csv"))?;

    if !config.forecast_courses.is_empty() {
        let summary = forecast::simulate(&gpa_courses, &config.forecast_courses, conversion_table);
        print_forecast_summary(&summary);
        write_forecast_csv(&summary.courses, &Path::new(output_dir).join("forecast.csv"))?;
    }

    println!("\n✅ Analysis complete!");
    println!("📂 Reports written to: {}", output_dir);
    Ok(())
}

fn print_forecast_summary(summary: &forecast::ForecastSummary) {
    println!("\n🔮 Forecast summary");
    if summary.replacing.is_empty() {
        println!("   Replacing courses: none");
    } else {
        println!("   Replacing courses: {}", summary.replacing.join(", "));
    }
    if summary.adding.is_empty() {
        println!("   Adding courses: none");
    } else {
        println!("   Adding courses: {}", summary.adding.join(", "));
    }
    println!(
        "   Forecasted average: {} ({} from {})",
        summary.simulated_average,
        signed(summary.average_delta),
        summary.baseline_average
    );
    println!(
        "   Forecasted GPA: {:.2} ({} from {:.2})",
        summary.simulated_gpa,
        signed(summary.gpa_delta),
        summary.baseline_gpa
    );
    println!(
        "   Credits after completion: {} ({} from {})",
        summary.simulated_credits,
        signed(summary.credits_delta),
        summary.baseline_credits
    );
}

fn signed(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{}", delta)
    } else {
        format!("{}", delta)
    }
}

fn write_course_csv(records: &[CourseRecord], csv_path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(csv_path)?;

    writer.write_record([
        "Course Code",
        "Course Name",
        "Credits",
        "Grade",
        "Letter Grade",
        "Replaced",
    ])?;

    for record in records {
        let credits = record.credits.to_string();
        let grade = record.grade.to_string();
        writer.write_record([
            record.course_code.as_str(),
            record.course_name.as_str(),
            credits.as_str(),
            grade.as_str(),
            record.letter_grade.as_deref().unwrap_or(""),
            record.replaced.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_forecast_csv(records: &[CourseRecord], csv_path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(csv_path)?;

    writer.write_record(["Course Code", "Course Name", "Credits", "Grade"])?;

    for record in records {
        let credits = record.credits.to_string();
        let grade = record.grade.to_string();
        writer.write_record([
            record.course_code.as_str(),
            record.course_name.as_str(),
            credits.as_str(),
            grade.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
