use crate::config::RendererMode;

#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub auto_probe: bool,
    pub requested_renderer: RendererMode,
    pub renderer: RendererMode,
    notes: Vec<String>,
}

impl CapabilityReport {
    pub fn changed(&self) -> bool {
        self.renderer != self.requested_renderer
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn status_label(&self) -> String {
        if !self.auto_probe {
            return format!("off ({:?})", self.renderer);
        }
        if self.changed() {
            return format!("fallback {:?}->{:?}", self.requested_renderer, self.renderer);
        }
        format!("ok ({:?})", self.renderer)
    }
}

/// Picks a renderer the current terminal can display.
pub fn probe_renderer(requested: RendererMode, auto_probe: bool) -> CapabilityReport {
    probe_with(requested, auto_probe, |key| std::env::var(key).ok())
}

pub(crate) fn probe_with(
    requested: RendererMode,
    auto_probe: bool,
    env: impl Fn(&str) -> Option<String>,
) -> CapabilityReport {
    let mut report = CapabilityReport {
        auto_probe,
        requested_renderer: requested,
        renderer: requested,
        notes: Vec::new(),
    };

    if !auto_probe {
        report.notes.push("capability probe disabled by --auto-probe=false".into());
        return report;
    }

    if requested == RendererMode::Kitty && !kitty_graphics_available(&env) {
        report.renderer = RendererMode::HalfBlock;
        report
            .notes
            .push("kitty graphics unavailable in this terminal; falling back to half-block renderer".into());
    }

    for note in &report.notes {
        log::warn!("{note}");
    }
    report
}

fn kitty_graphics_available(env: &impl Fn(&str) -> Option<String>) -> bool {
    if let Some(v) = env("ROSE_BLOOM_FORCE_KITTY") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => return true,
            "0" | "false" | "no" | "off" => return false,
            _ => {}
        }
    }

    if env("KITTY_WINDOW_ID").is_some() {
        return true;
    }

    let term = env("TERM").unwrap_or_default().to_ascii_lowercase();
    let term_program = env("TERM_PROGRAM").unwrap_or_default().to_ascii_lowercase();
    term.contains("kitty") || term_program.contains("ghostty") || term_program.contains("kitty")
}
