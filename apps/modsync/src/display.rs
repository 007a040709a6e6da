//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use modsync_ops::{InstallReport, ModuleSummary, OperationResult, UpdateReport, VerifyReport};
use modsync_types::{ColorChoice, Freshness, ModuleStatus, Validity};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    /// Render as formatted table
    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::InstallReport(report) => self.render_install_report(report),
            OperationResult::VerifyReport(report) => self.render_verify_report(report),
            OperationResult::UpdateReport(report) => self.render_update_report(report),
        }
    }

    fn render_install_report(&self, report: &InstallReport) -> io::Result<()> {
        println!(
            "{} Installed {} into {}",
            self.styled("✔", Style::new().green()),
            self.bold(&report.modules.join(", ")),
            report.root.display()
        );
        println!(
            "  {} files, {} in {}ms",
            report.files.len(),
            format_size(report.bytes),
            report.duration_ms
        );

        let unchecked = report.files.iter().filter(|file| file.unchecked).count();
        if unchecked > 0 {
            println!("  {unchecked} files had no published checksum");
        }
        self.render_warnings(&report.warnings);
        Ok(())
    }

    fn render_verify_report(&self, report: &VerifyReport) -> io::Result<()> {
        if report.modules.is_empty() {
            println!("No modules evaluated.");
            self.render_warnings(&report.errors);
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Module").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Files").add_attribute(Attribute::Bold),
            Cell::new("Problems").add_attribute(Attribute::Bold),
        ]);

        for module in &report.modules {
            table.add_row(vec![
                Cell::new(&module.module),
                self.format_status(module.status),
                Cell::new(file_count(module)),
                Cell::new(problems(module)),
            ]);
        }

        println!("{table}");
        println!(
            "Checked {} in {}ms{}",
            report.root.display(),
            report.duration_ms,
            if report.remote {
                " against local and latest manifests"
            } else {
                ""
            }
        );
        self.render_warnings(&report.errors);
        Ok(())
    }

    fn render_update_report(&self, report: &UpdateReport) -> io::Result<()> {
        if !report.before.is_empty() {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                Cell::new("Module").add_attribute(Attribute::Bold),
                Cell::new("Before").add_attribute(Attribute::Bold),
                Cell::new("Action").add_attribute(Attribute::Bold),
            ]);

            for (module, status) in &report.before {
                let action = if report.refreshed.contains(module) {
                    Cell::new("refreshed").fg(Color::Green)
                } else if report.current.contains(module) {
                    Cell::new("kept")
                } else {
                    Cell::new("skipped").fg(Color::Yellow)
                };
                table.add_row(vec![Cell::new(module), self.format_status(*status), action]);
            }
            println!("{table}");
        }

        if report.is_noop() {
            println!(
                "{} Everything in {} is up to date",
                self.styled("=", Style::new().green()),
                report.root.display()
            );
        } else {
            println!(
                "{} Refreshed {}: {} files, {} in {}ms",
                self.styled("↑", Style::new().cyan()),
                self.bold(&report.refreshed.join(", ")),
                report.files.len(),
                format_size(report.bytes),
                report.duration_ms
            );
        }
        self.render_warnings(&report.warnings);
        Ok(())
    }

    fn render_warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        println!();
        for warning in warnings {
            println!("{} {warning}", self.styled("!", Style::new().yellow()));
        }
    }

    /// Status cell with one glyph per facet
    fn format_status(&self, status: ModuleStatus) -> Cell {
        let text = format!("{} {status}", status_glyphs(status));
        let cell = Cell::new(text);
        if !self.supports_color() {
            return cell;
        }
        match (status.validity, status.freshness) {
            (Some(Validity::Invalid), _) => cell.fg(Color::Red),
            (_, Some(Freshness::Upgradable)) => cell.fg(Color::Yellow),
            (Some(Validity::Valid), _) => cell.fg(Color::Green),
            _ => cell,
        }
    }

    fn bold(&self, text: &str) -> String {
        self.styled(text, Style::new().bold())
    }

    fn styled(&self, text: &str, style: Style) -> String {
        if self.supports_color() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

/// `✔`/`✖` for validity, `=`/`↑` for freshness, `?` when nothing is known
pub fn status_glyphs(status: ModuleStatus) -> String {
    let mut glyphs = String::new();
    match status.validity {
        Some(Validity::Valid) => glyphs.push('✔'),
        Some(Validity::Invalid) => glyphs.push('✖'),
        None => {}
    }
    match status.freshness {
        Some(Freshness::UpToDate) => glyphs.push('='),
        Some(Freshness::Upgradable) => glyphs.push('↑'),
        None => {}
    }
    if glyphs.is_empty() {
        glyphs.push('?');
    }
    glyphs
}

fn file_count(module: &ModuleSummary) -> String {
    match (&module.local, &module.remote) {
        (Some(local), Some(remote)) => format!("{} / {}", local.files, remote.files),
        (Some(checked), None) | (None, Some(checked)) => checked.files.to_string(),
        (None, None) => "-".to_string(),
    }
}

/// First failure of the check that decided validity, plus a count of the rest
fn problems(module: &ModuleSummary) -> String {
    let failures = module
        .local
        .as_ref()
        .or(module.remote.as_ref())
        .map(|check| check.failures.as_slice())
        .unwrap_or_default();

    match failures {
        [] => String::new(),
        [only] => only.clone(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

/// Format file size in human-readable format
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{size:.0} {}", UNITS[unit_index])
    } else {
        format!("{size:.1} {}", UNITS[unit_index])
    }
}
