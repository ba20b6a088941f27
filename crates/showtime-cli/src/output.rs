use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;
use showtime_models::ProbeReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "✓".green(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "success",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors are shown even in quiet mode
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", "✗".red(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "error",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "⚠".yellow(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "warning",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{}", msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "info",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    /// Structured payload; ignored in human mode, where callers print lines
    pub fn data<T: Serialize>(&self, value: &T) {
        if self.is_human() || self.quiet {
            return;
        }
        match serde_json::to_value(value) {
            Ok(data) => self.print_json(&data),
            Err(e) => self.error(format!("Failed to serialize output: {}", e)),
        }
    }

    /// Human-readable lines for a probe report
    pub fn report(&self, report: &ProbeReport) {
        if !self.is_human() || self.quiet {
            return;
        }

        let verdict = if report.available {
            "available".green().bold().to_string()
        } else {
            "unavailable".yellow().to_string()
        };
        println!("Verdict:            {}", verdict);
        println!("Strategy:           {}", report.strategy);
        println!("Film:               {}", report.film_presence);
        println!("Venue present:      {}", report.venue_present);
        println!("Reservation signal: {}", report.reservation_signal);
        if report.showtimes.is_empty() {
            println!("Showtimes:          none");
        } else {
            println!("Showtimes:          {} ({})", report.showtime_count, report.showtimes.join(", "));
        }
        if report.matched_responses > 0 {
            println!("Matched responses:  {}", report.matched_responses);
        }
        if let Some(url) = &report.film_page_url {
            println!("Film page:          {}", url);
        }
        println!("Consent dismissed:  {}", report.consent_dismissed);
        println!("Elapsed:            {} ms", report.elapsed_ms);
        if let Some(error) = &report.error {
            println!("{} {}", "Error:".red(), error);
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Human => {
                println!("{}", data);
            }
        }
    }
}
