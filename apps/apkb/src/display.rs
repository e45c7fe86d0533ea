//! Output rendering and formatting

use crate::cli::ColorChoice;
use apkb_builder::{PipelineReport, Stage};
use apkb_config::Properties;
use apkb_platform::Tool;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use std::io;
use std::path::Path;

/// Shown instead of secret property values
const MASK: &str = "******";

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Whether styling escapes are written
    colors: bool,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        let term = Term::stdout();
        let colors = match color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => term.features().colors_supported(),
        };
        console::set_colors_enabled(colors);
        Self {
            json_output,
            colors,
            term,
        }
    }

    /// Render the stages a build would run
    pub fn render_plan(&self, stages: &[Stage]) -> io::Result<()> {
        if self.json_output {
            let value: Vec<_> = stages
                .iter()
                .map(|stage| {
                    serde_json::json!({
                        "stage": stage.name(),
                        "tool": stage.tool().map(Tool::binary_name),
                    })
                })
                .collect();
            return self.print_json(&serde_json::Value::Array(value));
        }

        let mut table = self.table();
        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Tool").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
        ]);
        for (index, stage) in stages.iter().enumerate() {
            table.add_row(vec![
                Cell::new(index + 1),
                self.accent(Cell::new(stage.name()), Color::Cyan),
                Cell::new(stage.tool().map_or("-", Tool::binary_name)),
                Cell::new(stage.description()),
            ]);
        }
        self.term.write_line(&table.to_string())
    }

    /// Render a property set, masking passwords
    pub fn render_properties(&self, props: &Properties) -> io::Result<()> {
        let masked = props
            .iter()
            .map(|(key, value)| (key.as_str(), display_value(key, value)));

        if self.json_output {
            let map: serde_json::Map<_, _> = masked
                .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
                .collect();
            return self.print_json(&serde_json::Value::Object(map));
        }

        let mut table = self.table();
        table.set_header(vec![
            Cell::new("Property").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
        for (key, value) in masked {
            table.add_row(vec![Cell::new(key), Cell::new(value)]);
        }
        self.term.write_line(&table.to_string())
    }

    /// Render a finished build
    pub fn render_build_report(&self, report: &PipelineReport) -> io::Result<()> {
        if self.json_output {
            return self.print_json(&serde_json::json!({
                "artifact": report.artifact.display().to_string(),
                "stages": report.completed,
                "duration_ms": u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
            }));
        }

        let style = Style::new().green().bold();
        self.term.write_line(&format!(
            "{} {} ({} stages in {:.2}s)",
            style.apply_to("Built"),
            report.artifact.display(),
            report.completed.len(),
            report.duration.as_secs_f64()
        ))
    }

    /// Render a success message
    pub fn render_success(&self, message: &str) -> io::Result<()> {
        if self.json_output {
            return self.print_json(&serde_json::json!({ "success": message }));
        }
        let style = Style::new().green();
        self.term
            .write_line(&format!("{} {message}", style.apply_to("[OK]")))
    }

    /// Note that no properties file was found
    pub fn render_missing_config(&self, path: &Path) {
        if !self.json_output {
            let style = Style::new().yellow();
            eprintln!(
                "{} {} not found, using defaults",
                style.apply_to("warning:"),
                path.display()
            );
        }
    }

    fn print_json(&self, value: &serde_json::Value) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors {
            table.force_no_tty();
        }
        table
    }

    fn accent(&self, cell: Cell, color: Color) -> Cell {
        if self.colors {
            cell.fg(color)
        } else {
            cell
        }
    }
}

fn display_value<'a>(key: &str, value: &'a str) -> &'a str {
    if key.ends_with("Password") && !value.is_empty() {
        MASK
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passwords_masked() {
        assert_eq!(display_value("keyConfig.keystore.storePassword", "hunter2"), MASK);
        assert_eq!(display_value("keyConfig.keystore.keyPassword", ""), "");
        assert_eq!(display_value("keyConfig.keystore.alias", "release"), "release");
    }
}
