use crate::core::reconcile::{cost_check, series_matrix, SeriesMetric};
use crate::core::tech::{aggregate_tech, TechAggregation};
use crate::error::{FcaError, FcaResult};
use crate::layout::SheetLayout;
use crate::session::{load_product, load_products, Selection, Session};
use crate::types::{ParseNote, Product};
use crate::writer::{write_report, ComparisonReport};
use colored::Colorize;
use std::path::PathBuf;

/// Format a number for display, removing unnecessary decimal places.
/// Missing values print as a dash.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "–".to_string();
    }
    let rounded = (n * 100.0).round() / 100.0;
    format!("{:.2}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn format_weight(w: f64) -> String {
    if w.is_nan() {
        "–".to_string()
    } else {
        format!("{:.0}%", w * 100.0)
    }
}

fn format_option(v: Option<f64>) -> String {
    v.map(format_number).unwrap_or_else(|| "–".to_string())
}

fn print_notes(notes: &[ParseNote]) {
    if notes.is_empty() {
        return;
    }
    println!("\n{}", "⚠️  Parsing notes:".bold().yellow());
    for note in notes {
        if note.kind.is_fatal() {
            println!("   {} {}", "❌".red(), note.to_string().red());
        } else {
            println!("   {} {}", "•".yellow(), note);
        }
    }
}

/// Load several files, print their notes, fail only if nothing loaded.
fn load_session(files: &[PathBuf], layout: &SheetLayout) -> FcaResult<Session> {
    let session = load_products(files, layout);
    print_notes(&session.notes);
    if session.products.is_empty() {
        return Err(FcaError::Selection(
            "no product could be loaded".to_string(),
        ));
    }
    Ok(session)
}

fn print_product(product: &Product) {
    println!(
        "\n{} {}",
        "📊 Main functions (H1):".bold().cyan(),
        product.cost_sheet.bright_black()
    );
    println!("{}", "─".repeat(72));
    println!(
        "{:<28} {:>10} {:>8} {:>12} {:>10}",
        "H1".bold(),
        "Columns".bold(),
        "Weight".bold(),
        "Cost".bold(),
        "H2".bold()
    );
    println!("{}", "─".repeat(72));
    for block in &product.h1 {
        let children = product.children(block).count();
        let child_str = if block.has_children {
            children.to_string().normal()
        } else {
            "none".yellow()
        };
        println!(
            "{:<28} {:>10} {:>8} {:>12} {:>10}",
            block.label.bright_blue(),
            format!("{}-{}", block.start_col, block.end_col),
            format_weight(block.weight),
            format_number(block.cost),
            child_str
        );
    }

    println!("\n{}", "📋 Sub-functions (H2):".bold().cyan());
    println!("{}", "─".repeat(82));
    println!(
        "{:<24} {:<28} {:>8} {:>12} {:>6}",
        "H1".bold(),
        "H2".bold(),
        "Weight".bold(),
        "Cost".bold(),
        "Tech".bold()
    );
    println!("{}", "─".repeat(82));
    for entry in &product.h2 {
        println!(
            "{:<24} {:<28} {:>8} {:>12} {:>6}",
            entry.parent_h1,
            entry.label.bright_blue(),
            format_weight(entry.weight),
            format_number(entry.cost),
            format_option(entry.tech_score)
        );
    }
}

/// Execute the inspect command
pub fn inspect(file: PathBuf, layout: &SheetLayout) -> FcaResult<()> {
    println!("{}", "🔎 FCA - Inspect".bold().green());
    println!("   File: {}", file.display());

    let parsed = load_product(&file, layout)?;
    let product = &parsed.product;
    println!("   Product: {}", product.name.bold());
    if let Some(tech) = &product.tech_sheet {
        println!("   Tech sheet: {} ({} scores)", tech, product.tech.len());
    }

    print_product(product);

    println!("\n{}", "🧮 H1 cost vs. sum of H2 costs:".bold().cyan());
    println!("{}", "─".repeat(66));
    println!(
        "{:<28} {:>12} {:>12} {:>12}",
        "H1".bold(),
        "H1 cost".bold(),
        "Σ H2".bold(),
        "Delta".bold()
    );
    println!("{}", "─".repeat(66));
    for check in cost_check(product) {
        let delta = format_number(check.delta);
        let delta = if check.delta.abs() > 0.005 {
            delta.red()
        } else {
            delta.green()
        };
        println!(
            "{:<28} {:>12} {:>12} {:>12}",
            check.h1.bright_blue(),
            format_number(check.h1_cost),
            format_number(check.h2_sum),
            delta
        );
    }

    print_notes(&parsed.notes);
    println!();
    Ok(())
}

/// Execute the tech command - tech scores per main function for every product
pub fn tech(files: Vec<PathBuf>, layout: &SheetLayout, mode: TechAggregation) -> FcaResult<()> {
    println!("{}", "🔧 FCA - Technical Evaluation".bold().green());
    let session = load_session(&files, layout)?;

    for product in &session.products {
        println!("\n{} {}", "📦".bold(), product.name.bold().cyan());
        if !product.has_tech() {
            println!("   {}", "no tech scores".yellow());
            continue;
        }
        println!("{}", "─".repeat(62));
        println!(
            "{:<28} {:>10} {:>10} {:>10}",
            "H1".bold(),
            "Mean".bold(),
            "Weighted".bold(),
            "Scored".bold()
        );
        println!("{}", "─".repeat(62));
        for agg in aggregate_tech(&product.h1, &product.h2) {
            let selected = format_option(agg.value(mode)).bold();
            let (mean, weighted) = match mode {
                TechAggregation::Mean => (selected, format_option(agg.weighted).normal()),
                TechAggregation::Weighted => (format_option(agg.mean).normal(), selected),
            };
            println!(
                "{:<28} {:>10} {:>10} {:>10}",
                agg.h1.bright_blue(),
                mean,
                weighted,
                agg.scored
            );
        }
    }

    print_series(&session, SeriesMetric::Tech);
    println!();
    Ok(())
}

fn print_series(session: &Session, metric: SeriesMetric) {
    let title = match metric {
        SeriesMetric::Cost => "📈 Sub-function costs across products:",
        SeriesMetric::Tech => "📈 Sub-function tech scores across products:",
    };
    let rows = series_matrix(&session.products, metric);
    println!("\n{}", title.bold().cyan());
    if rows.is_empty() {
        println!("   {}", "no sub-functions found".yellow());
        return;
    }

    let width = 28 + 14 * session.products.len();
    println!("{}", "─".repeat(width));
    print!("{:<28}", "H2".bold());
    for name in session.names() {
        print!(" {:>13}", name.bold());
    }
    println!();
    println!("{}", "─".repeat(width));
    for row in rows {
        print!("{:<28}", row.h2.bright_blue());
        for value in &row.values {
            print!(" {:>13}", format_option(*value));
        }
        println!();
    }
}

/// Execute the matrix command
pub fn matrix(files: Vec<PathBuf>, layout: &SheetLayout, metric: SeriesMetric) -> FcaResult<()> {
    println!("{}", "🔥 FCA - Product Matrix".bold().green());
    let session = load_session(&files, layout)?;
    print_series(&session, metric);
    println!();
    Ok(())
}

/// Execute the compare command - top cost deviations between two products
pub fn compare(
    product_a: PathBuf,
    product_b: PathBuf,
    layout: &SheetLayout,
    top: Option<usize>,
    show_h1: bool,
    output: Option<PathBuf>,
    annotations: Vec<String>,
) -> FcaResult<()> {
    println!("{}", "🔥 FCA - Top Cost Deviations".bold().green());
    println!("   Product A: {}", product_a.display());
    println!("   Product B: {}", product_b.display());

    let session = load_session(&[product_a, product_b], layout)?;
    let top_n = top.unwrap_or(layout.top_n);
    if top_n == 0 {
        return Err(FcaError::Selection("--top must be at least 1".to_string()));
    }
    let selection: Selection = session.default_selection(top_n)?;
    let rows = session.compare(&selection)?;
    let h1_rows = session.compare_h1(&selection)?;

    println!(
        "\n{} {} → {} (top {})",
        "📊 H2 deviations:".bold().cyan(),
        selection.product_a.bold(),
        selection.product_b.bold(),
        selection.top_n
    );
    println!("{}", "─".repeat(90));
    println!(
        "{:<22} {:<26} {:>12} {:>12} {:>12}",
        "H1".bold(),
        "H2".bold(),
        "Cost A".bold(),
        "Cost B".bold(),
        "Delta".bold()
    );
    println!("{}", "─".repeat(90));
    for row in &rows {
        let delta = format_number(row.delta);
        let delta = if row.delta > 0.0 {
            delta.red()
        } else if row.delta < 0.0 {
            delta.green()
        } else {
            delta.normal()
        };
        let mut h2 = row.h2.bright_blue().to_string();
        if !row.in_a {
            h2.push_str(" (B only)");
        } else if !row.in_b {
            h2.push_str(" (A only)");
        }
        println!(
            "{:<22} {:<26} {:>12} {:>12} {:>12}",
            row.h1,
            h2,
            format_number(row.cost_a),
            format_number(row.cost_b),
            delta
        );
    }
    if rows.is_empty() {
        println!("   {}", "no comparable sub-functions".yellow());
    }

    if show_h1 {
        println!("\n{}", "📊 H1 deviations:".bold().cyan());
        println!("{}", "─".repeat(64));
        for row in &h1_rows {
            println!(
                "{:<26} {:>12} {:>12} {:>12}",
                row.h1.bright_blue(),
                format_number(row.cost_a),
                format_number(row.cost_b),
                format_number(row.delta)
            );
        }
    }

    if let Some(path) = output {
        let report = ComparisonReport::new(selection, rows, h1_rows, annotations);
        write_report(&path, &report)?;
        println!(
            "\n{}",
            format!("✅ Report exported to {}", path.display())
                .bold()
                .green()
        );
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234.5), "1234.5");
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(-0.456), "-0.46");
        assert_eq!(format_number(f64::NAN), "–");
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(0.45), "45%");
        assert_eq!(format_weight(f64::NAN), "–");
    }

    #[test]
    fn test_format_option() {
        assert_eq!(format_option(Some(1.5)), "1.5");
        assert_eq!(format_option(None), "–");
    }
}
