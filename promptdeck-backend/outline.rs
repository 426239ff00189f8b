//! Plain-text listing of the library for the `list` command.

use std::collections::HashSet;
use std::fmt::Write;

use crate::folders::Folder;
use crate::prompts::Prompt;

const UNFILED: &str = "Unfiled";

/// Prompts grouped under their folders, folders in stored order. Prompts
/// without a folder, or whose folder no longer exists, go under "Unfiled".
/// Empty folders are still listed.
pub fn render(folders: &[Folder], prompts: &[Prompt]) -> String {
    let known: HashSet<&str> = folders.iter().map(|f| f.id.as_str()).collect();
    let mut out = String::new();

    for folder in folders {
        let _ = writeln!(out, "{} ({})", folder.name, folder.id);
        let members = prompts
            .iter()
            .filter(|p| p.folder_id.as_deref() == Some(folder.id.as_str()));
        write_prompts(&mut out, members);
    }

    let unfiled: Vec<&Prompt> = prompts
        .iter()
        .filter(|p| p.folder_id.as_deref().is_none_or(|id| !known.contains(id)))
        .collect();
    if !unfiled.is_empty() {
        let _ = writeln!(out, "{UNFILED}");
        write_prompts(&mut out, unfiled.into_iter());
    }

    out
}

fn write_prompts<'a>(out: &mut String, prompts: impl Iterator<Item = &'a Prompt>) {
    for prompt in prompts {
        let _ = writeln!(
            out,
            "  - {} ({}, updated {})",
            prompt.title,
            prompt.id,
            prompt.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}
