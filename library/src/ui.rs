//! Terminal rendering of the catalog, the briefing panels and the status overlay.

use std::fmt::Write;

use rihlah_core::{Catalog, CatalogEntry, SessionStatus};

/// Numbered catalog listing, marking `active` as loaded.
pub fn render_library(catalog: &Catalog, active: Option<&str>) -> String {
    let mut out = String::from("PLAYABLE LIBRARY\n");
    for (index, entry) in catalog.entries().iter().enumerate() {
        let marker = if Some(entry.id.as_str()) == active {
            "Loaded"
        } else {
            "Load"
        };
        let _ = writeln!(
            out,
            "{:>3}. {} ({}) [{}] {}",
            index + 1,
            entry.title,
            entry.year,
            entry.id,
            marker
        );
        let _ = writeln!(out, "     {} | {}", entry.genre, entry.tagline);
    }
    out
}

/// Mission briefing, controls, launch checklist and the fact strip.
pub fn render_briefing(entry: &CatalogEntry) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "MISSION BRIEFING");
    let _ = writeln!(out, "{}", entry.title);
    let _ = writeln!(out, "{}", entry.description);
    if !entry.mood.is_empty() {
        let _ = writeln!(out, "{}", entry.mood);
    }

    if !entry.controls.is_empty() {
        let _ = writeln!(out, "\nCONTROLS");
        for control in &entry.controls {
            let _ = writeln!(out, "  input  {}", control);
        }
    }

    if !entry.instructions.is_empty() {
        let _ = writeln!(out, "\nLAUNCH CHECKLIST");
        for (index, step) in entry.instructions.iter().enumerate() {
            let _ = writeln!(out, "  Step {}  {}", index + 1, step);
        }
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "Released {} | Developer {}",
        entry.year, entry.developer
    );
    if let Some(publisher) = &entry.publisher {
        let _ = write!(out, " | Publisher {}", publisher);
    }
    let _ = writeln!(out, " | Play time {}", entry.runtime);
    out
}

/// One-line status overlay.
pub fn render_status(status: &SessionStatus) -> String {
    format!("[{}] {}", status.label(), status.message())
}
