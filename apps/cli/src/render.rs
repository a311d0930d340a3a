//! Plain-text rendering of the view binding.

use std::fmt::Write as _;

use client_core::ViewBinding;

pub fn modal(view: &ViewBinding) -> String {
    let modal = &view.modal;
    if !modal.visible {
        return String::new();
    }
    let mut out = String::new();
    let _ = writeln!(out, "Result: {}", modal.status_text);
    let _ = writeln!(out, "{}", modal.confidence_text);
    if let Some(icon) = modal.status_icon {
        let _ = writeln!(out, "Icon: {icon}");
    }
    if let Some(description) = modal.description {
        let _ = writeln!(out, "{description}");
    }
    out
}

pub fn history(view: &ViewBinding) -> String {
    let mut out = String::from("#  Date        Result\n");
    if let Some(placeholder) = view.history.placeholder() {
        let _ = writeln!(out, "{placeholder}");
        return out;
    }
    for row in view.history.rows() {
        let _ = write!(out, "{:<2} {:<11} {}", row.index, row.date, row.result);
        if let Some(url) = &row.image_url {
            let _ = write!(out, "  {url}");
        }
        out.push('\n');
    }
    out
}
