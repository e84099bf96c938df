use crate::error::{UserFriendlyError, VamaError};
use crate::parser::OutcomeStatus;
use crate::session::RunReport;
use crate::sink::{LogEntry, LogLevel};
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// Prints one status line coming from a run.
    pub fn log_entry(&self, entry: &LogEntry) {
        match entry.level {
            LogLevel::Success => self.success(&entry.message),
            LogLevel::Error => self.error(&entry.message),
            LogLevel::Warning => self.warning(&entry.message),
            LogLevel::Info => self.info(&entry.message),
        }
    }

    pub fn print_user_friendly_error(&self, error: &VamaError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_run_report(&self, report: &RunReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => {
                let json_output = serde_json::to_string_pretty(&serde_json::json!({
                    "type": "report",
                    "report": report,
                }))
                .unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_report(&self, report: &RunReport) {
        println!();
        self.print_separator();

        let title = if report.has_skipped() {
            "CSV written, some PDFs were skipped"
        } else {
            "CSV written"
        };
        if self.use_colors {
            println!("{}{}", CHECKMARK, style(title).green().bold());
        } else {
            println!("✓ {}", title);
        }

        println!();
        let variant = if report.variant_detected {
            format!("{} (detected)", report.variant)
        } else {
            report.variant.to_string()
        };
        self.print_field("Variant:", &variant);
        self.print_field("PDF files:", &report.pdf_count.to_string());
        self.print_field("Parsed:", &report.parsed_count().to_string());
        if report.failed_count() > 0 {
            self.print_field("Failed:", &report.failed_count().to_string());
        }
        if report.wrong_structure_count() > 0 {
            self.print_field("Wrong structure:", &report.wrong_structure_count().to_string());
        }
        self.print_field("Rows written:", &report.rows_written.to_string());
        self.print_field("Output:", &report.output_path.display().to_string());
        self.print_field(
            "Time taken:",
            &format_duration(Duration::from_millis(report.duration_ms)),
        );

        if self.verbose_level > 0 && !report.declarations.is_empty() {
            println!();
            println!("Declarations:");
            for parsed in &report.declarations {
                let d = &parsed.declaration;
                println!(
                    "  {}: MRN {} | CIF {} | articles {} | container {}",
                    parsed.source_name,
                    d.movement_reference_number,
                    d.consignee_id,
                    d.article_count,
                    d.container_number
                );
            }
        }

        let skipped: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| o.status != OutcomeStatus::Parsed)
            .collect();
        if !skipped.is_empty() {
            println!();
            println!("Skipped files:");
            for outcome in skipped {
                println!("  - {}", outcome.status_line());
            }
        }

        self.print_separator();
    }

    fn print_field(&self, label: &str, value: &str) {
        if self.use_colors {
            println!("  {:<17}{}", label, style(value).cyan().bold());
        } else {
            println!("  {:<17}{}", label, value);
        }
    }

    fn print_plain_report(&self, report: &RunReport) {
        println!("REPORT: CSV written");
        println!("Variant: {}", report.variant);
        println!("PDF files: {}", report.pdf_count);
        println!("Parsed: {}", report.parsed_count());
        println!("Failed: {}", report.failed_count());
        println!("Wrong structure: {}", report.wrong_structure_count());
        println!("Rows: {}", report.rows_written);
        println!("Output: {}", report.output_path.display());
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Prints through the formatter without tearing an active spinner.
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn log_entry(&self, entry: &LogEntry) {
        self.suspend_and_print(|f| f.log_entry(entry));
    }
}
