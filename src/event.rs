//! Progress and result events emitted by a run.
//!
//! Messages are templates where each `[]` is replaced, in order, by one name.
//! Presentation (colours, JSON, logging) is left to the [`EventSink`].

use serde::Serialize;

/// Severity of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Progress, e.g. the folder being checked
    Running,
    /// A package was created or extracted
    Success,
    /// Recoverable condition worth telling the user about
    Notice,
    /// An item failed; the run carries on
    Error,
}

impl EventKind {
    /// Upper-case tag shown in console output
    pub fn label(self) -> &'static str {
        match self {
            EventKind::Running => "RUNNING",
            EventKind::Success => "SUCCESS",
            EventKind::Notice => "NOTICE",
            EventKind::Error => "ERROR",
        }
    }
}

/// A single event with its message template and substituted names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    /// Message with one `[]` per name
    pub template: String,
    /// File or folder names substituted into the template, in order
    pub names: Vec<String>,
}

impl Event {
    /// Build an event of any kind
    pub fn new(kind: EventKind, template: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            kind,
            template: template.into(),
            names,
        }
    }

    /// Progress event without names
    pub fn running(template: impl Into<String>) -> Self {
        Self::new(EventKind::Running, template, Vec::new())
    }

    /// Success event naming one file or folder
    pub fn success(template: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(EventKind::Success, template, vec![name.into()])
    }

    /// Notice event
    pub fn notice(template: impl Into<String>, names: Vec<String>) -> Self {
        Self::new(EventKind::Notice, template, names)
    }

    /// Error event; generic failures pass the error text with no names
    pub fn error(template: impl Into<String>, names: Vec<String>) -> Self {
        Self::new(EventKind::Error, template, names)
    }

    /// Fill the placeholders, passing each name through `decorate`.
    ///
    /// Surplus placeholders are left as-is; surplus names are ignored.
    pub fn render_with(&self, decorate: impl Fn(&str) -> String) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        let mut names = self.names.iter();

        while let Some(idx) = rest.find("[]") {
            let Some(name) = names.next() else { break };
            out.push_str(&rest[..idx]);
            out.push_str(&decorate(name));
            rest = &rest[idx + 2..];
        }
        out.push_str(rest);
        out
    }

    /// Plain rendering with names shown as `[name]`
    pub fn message(&self) -> String {
        self.render_with(|name| format!("[{name}]"))
    }
}

/// Receives events as a run progresses
pub trait EventSink {
    /// Handle one event
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_in_order() {
        let event = Event::new(
            EventKind::Running,
            "Set mode to []ompile or []xtract.",
            vec!["c".into(), "e".into()],
        );
        assert_eq!(event.message(), "Set mode to [c]ompile or [e]xtract.");
        assert_eq!(
            event.render_with(|n| n.to_uppercase()),
            "Set mode to Compile or Extract."
        );
    }

    #[test]
    fn test_render_mismatched_counts() {
        let event = Event::notice("[] and []", vec!["only".into()]);
        assert_eq!(event.message(), "[only] and []");

        let event = Event::success("Created!", "extra");
        assert_eq!(event.message(), "Created!");
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<Event> = Vec::new();
        sink.emit(Event::running("Checking folder: (root)"));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].kind, EventKind::Running);
    }

    #[test]
    fn test_serialize_kind() -> anyhow::Result<()> {
        let json = serde_json::to_string(&Event::success("Created []!", "SongA.osz"))?;
        assert!(json.contains("\"kind\":\"success\""));
        assert!(json.contains("SongA.osz"));
        Ok(())
    }
}
