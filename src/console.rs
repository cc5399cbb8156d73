//! Terminal rendering of run events.

use owo_colors::OwoColorize;

use osutool::{Event, EventKind, EventSink};

/// Prints events to stdout, coloured or as JSON lines
pub struct ConsoleSink {
    json: bool,
}

impl ConsoleSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: Event) {
        if self.json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Failed to serialize event: {}", e),
            }
        } else {
            println!("{}", render(&event));
        }
    }
}

/// ` [KIND]   | message`, tag padded to eight columns
pub fn render(event: &Event) -> String {
    let label = event.kind.label();
    let tag = format!("[{label}]");
    let tag = match event.kind {
        EventKind::Running => tag.bright_black().to_string(),
        EventKind::Success => tag.bright_green().to_string(),
        EventKind::Notice => tag.bright_yellow().to_string(),
        EventKind::Error => tag.bright_red().to_string(),
    };
    let body = event.render_with(|name| format!("[{name}]").bright_cyan().to_string());
    let pad = " ".repeat(8usize.saturating_sub(label.len()));
    format!(" {tag}{pad}| {body}")
}

/// Prompt line for interactive input, styled like the event output
pub fn render_prompt(template: &str, names: &[&str]) -> String {
    let event = Event::new(
        EventKind::Running,
        template,
        names.iter().map(|n| n.to_string()).collect(),
    );
    let body = event.render_with(|name| format!("[{name}]").bright_cyan().to_string());
    let pad = " ".repeat(8 - "INPUT".len());
    format!(" {}{pad}| {body}", "[INPUT]".magenta())
}
