use async_trait::async_trait;
use colored::Colorize;
use mission_client::ParseFailure;
use mission_core::AgentEvent;
use mission_loop::{MissionObserver, MissionOutcome};

/// Prints each event as a console line.
pub struct ConsoleObserver {
    debug: bool,
    event_count: usize,
}

impl ConsoleObserver {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            event_count: 0,
        }
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn compact(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl MissionObserver for ConsoleObserver {
    async fn on_event(&mut self, event: &AgentEvent) {
        self.event_count += 1;
        let time = chrono::Local::now().format("%H:%M:%S");

        match event {
            AgentEvent::Start { thread_id, run_id } => {
                let mut line = format!("{time} 🚀 Workflow started: {}", short_id(thread_id));
                if let Some(run_id) = run_id {
                    line.push_str(&format!(" (run {run_id})"));
                }
                println!("{}", line.cyan().bold());
            }
            AgentEvent::ToolStart { tool, input } => {
                println!("{}", format!("{time} ➜ Executing tool: {tool}").yellow());
                if self.debug {
                    println!("{}", format!("   Input: {}", compact(input)).dimmed());
                }
            }
            AgentEvent::ToolEnd { tool, output } => {
                println!("{}", format!("{time} ✔ Completed: {tool}").green());
                if self.debug {
                    println!("{}", format!("   Output: {}", compact(output)).dimmed());
                }
            }
            AgentEvent::Source { title } => {
                println!("{}", format!("{time} 📄 Source: {title}").blue());
            }
            AgentEvent::Complete { .. } => {
                println!("{}", format!("{time} ✨ Mission complete").green().bold());
            }
            AgentEvent::SearchComplete { total_results, .. } => {
                println!(
                    "{}",
                    format!("{time} ✨ Search complete ({total_results} results)")
                        .green()
                        .bold()
                );
            }
            AgentEvent::Error { message } => {
                println!("{}", format!("{time} ✖ Error: {message}").red());
            }
        }
    }

    async fn on_diagnostic(&mut self, failure: &ParseFailure) {
        if self.debug {
            eprintln!("{}", format!("[DEBUG] {failure}").dimmed());
        }
    }

    async fn on_done(&mut self, outcome: MissionOutcome) {
        if self.debug {
            eprintln!(
                "{}",
                format!(
                    "[DEBUG] Mission finished ({outcome:?}) after {} events",
                    self.event_count
                )
                .dimmed()
            );
        }
    }
}
