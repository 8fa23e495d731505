//! Command implementations. Each writes its report to `out` and returns a
//! summary; the binary turns summaries into exit codes.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use branchline_dsl::codec::{character_resource, dtl, timeline};
use branchline_dsl::{generate, load_file, save, validate_dialogue, DialogueStore, Project};

/// Lines of timeline text shown per dialogue by a dry run
pub const PREVIEW_LINES: usize = 10;

/// Result of a command that processes a whole project
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Dialogues that passed (and were written, for convert)
    pub ok: usize,

    /// Files that failed to load plus dialogues with diagnostics
    pub errors: usize,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }
}

fn load_project(src_dir: &Path, out: &mut impl Write) -> anyhow::Result<(Project, Summary)> {
    let project = Project::load(src_dir)
        .with_context(|| format!("Failed to read dialogue directory {}", src_dir.display()))?;

    let mut summary = Summary::default();
    for failure in project.failures() {
        writeln!(out, "{}: {}", failure.path.display(), failure.error)?;
        summary.errors += 1;
    }
    Ok((project, summary))
}

/// Print diagnostics for one dialogue; returns true when it is clean
fn report(store: &DialogueStore, out: &mut impl Write) -> anyhow::Result<bool> {
    let diagnostics = validate_dialogue(store.dialogue());
    let name = store
        .source_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| store.dialogue().id.clone());

    for diagnostic in &diagnostics {
        writeln!(out, "{}: {}", name, diagnostic)?;
    }
    Ok(diagnostics.is_empty())
}

/// Validate every dialogue in `src_dir`
pub fn validate(src_dir: &Path, out: &mut impl Write) -> anyhow::Result<Summary> {
    let (project, mut summary) = load_project(src_dir, out)?;

    for store in project.iter() {
        if report(store, out)? {
            summary.ok += 1;
        } else {
            summary.errors += 1;
        }
    }

    writeln!(out, "{} valid, {} with errors", summary.ok, summary.errors)?;
    info!(valid = summary.ok, errors = summary.errors, "Validation finished");
    Ok(summary)
}

/// Convert every valid dialogue in `src_dir` into timeline and character files
pub fn convert(
    src_dir: &Path,
    out_dir: &Path,
    dry_run: bool,
    out: &mut impl Write,
) -> anyhow::Result<Summary> {
    let (project, mut summary) = load_project(src_dir, out)?;

    for store in project.iter() {
        let dialogue = store.dialogue();
        if !report(store, out)? {
            writeln!(out, "Skipping {}: dialogue has errors", dialogue.id)?;
            summary.errors += 1;
            continue;
        }

        if let Some(id) = std::iter::once(&dialogue.id)
            .chain(dialogue.characters.keys())
            .find(|id| !is_safe_file_stem(id))
        {
            writeln!(out, "Skipping {}: '{}' cannot be used as a file name", dialogue.id, id)?;
            summary.errors += 1;
            continue;
        }

        let events = generate(dialogue);
        let text = dtl::render(&events);
        let characters = character_resource::render_all(dialogue);

        if dry_run {
            writeln!(out, "--- {}.dtl ---", dialogue.id)?;
            let lines: Vec<&str> = text.lines().collect();
            for line in lines.iter().take(PREVIEW_LINES) {
                writeln!(out, "{}", line)?;
            }
            if lines.len() > PREVIEW_LINES {
                writeln!(out, "... ({} more lines)", lines.len() - PREVIEW_LINES)?;
            }
            summary.ok += 1;
            continue;
        }

        let char_dir = out_dir.join("characters");
        fs::create_dir_all(&char_dir)
            .with_context(|| format!("Failed to create {}", char_dir.display()))?;

        let dtl_path = out_dir.join(format!("{}.dtl", dialogue.id));
        fs::write(&dtl_path, format!("{}\n", text))
            .with_context(|| format!("Failed to write {}", dtl_path.display()))?;

        let json_path = out_dir.join(format!("{}.timeline.json", dialogue.id));
        fs::write(&json_path, timeline::to_json(&events)?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;

        for (char_id, resource) in &characters {
            let path = char_dir.join(format!("{}.dch", char_id));
            fs::write(&path, resource).with_context(|| format!("Failed to write {}", path.display()))?;
        }

        debug!(dialogue_id = %dialogue.id, events = events.len(), "Converted dialogue");
        writeln!(out, "Converted {} -> {}", dialogue.id, dtl_path.display())?;
        summary.ok += 1;
    }

    writeln!(out, "{} converted, {} with errors", summary.ok, summary.errors)?;
    info!(converted = summary.ok, errors = summary.errors, dry_run, "Conversion finished");
    Ok(summary)
}

/// Ids become output file names, so they must stay inside the output directory
pub fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(|c: char| c == '/' || c == '\\' || c == ':' || c.is_control())
}

/// Rewrite one dialogue file in canonical form
pub fn format(file: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let mut store = load_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?
        .with_context(|| format!("{} is empty", file.display()))?;

    let path = save(&mut store, None)?;
    writeln!(out, "Formatted {}", path.display())?;
    Ok(())
}
