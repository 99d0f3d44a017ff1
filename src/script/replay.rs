use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::editor::session::Editor;
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{GearError, GearResult};
use crate::scene::model::OverlayId;
use crate::script::action::{Action, SessionScript};

/// What a replay produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Files written by `export` actions, in order.
    pub exported: Vec<PathBuf>,
    /// Overlays that were successfully added, in order.
    pub overlays_added: Vec<OverlayId>,
}

/// Replay `script` against `editor`.
///
/// Paths in the script resolve against `base_dir`. Exports are written into `out_dir`; with
/// `None` they still run (and clear the selection) but nothing is written.
/// Unreadable files abort the replay. Files that fail to decode are skipped with a warning,
/// the way the interactive handlers treat them.
#[tracing::instrument(
    level = "info",
    skip(editor, script),
    fields(actions = script.actions.len())
)]
pub fn replay(
    editor: &mut Editor,
    script: &SessionScript,
    base_dir: &Path,
    out_dir: Option<&Path>,
) -> GearResult<ScriptReport> {
    let mut report = ScriptReport::default();
    let mut names: HashMap<String, OverlayId> = HashMap::new();

    for (step, action) in script.actions.iter().enumerate() {
        tracing::debug!(step, ?action, "replay");
        match action {
            Action::Upload { path } => {
                let bytes = read_input(base_dir, path)?;
                editor.handle_upload(Some(&bytes));
            }
            Action::AddGear { gear, name } => {
                if let Some(id) = editor.handle_add_gear(*gear) {
                    bind(&mut names, name.as_deref(), id);
                    report.overlays_added.push(id);
                }
            }
            Action::AddOverlayFile { path, name } => {
                let bytes = read_input(base_dir, path)?;
                let label = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                match editor.add_overlay_bytes(label, bytes) {
                    Ok(id) => {
                        bind(&mut names, name.as_deref(), id);
                        report.overlays_added.push(id);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "overlay not added")
                    }
                }
            }
            Action::Click { x, y } => {
                editor.click(Point::new(*x, *y));
            }
            Action::Drag { from, to } => {
                editor.pointer_down(Point::new(from[0], from[1]));
                editor.pointer_move(Point::new(to[0], to[1]));
                editor.pointer_up();
            }
            Action::Resize {
                overlay,
                anchor,
                dx,
                dy,
            } => {
                let id = lookup(&names, overlay, step)?;
                editor.resize(id, *anchor, Vec2::new(*dx, *dy));
            }
            Action::Rotate { overlay, degrees } => {
                let id = lookup(&names, overlay, step)?;
                editor.rotate(id, degrees.to_radians());
            }
            Action::Select { overlay } => {
                let id = lookup(&names, overlay, step)?;
                editor.select(id);
            }
            Action::Deselect => editor.deselect_all(),
            Action::Remove { overlay } => {
                let id = lookup(&names, overlay, step)?;
                editor.remove(id);
            }
            Action::Export => {
                let image = editor.export()?;
                match out_dir {
                    Some(dir) => report.exported.push(image.write_to_dir(dir)?),
                    None => tracing::debug!(step, "export not written"),
                }
            }
        }
    }

    tracing::info!(
        exported = report.exported.len(),
        overlays = editor.scene().len(),
        "replay finished"
    );
    Ok(report)
}

fn read_input(base_dir: &Path, path: &Path) -> GearResult<Vec<u8>> {
    let full = base_dir.join(path);
    let bytes = std::fs::read(&full).with_context(|| format!("read '{}'", full.display()))?;
    Ok(bytes)
}

fn bind(names: &mut HashMap<String, OverlayId>, name: Option<&str>, id: OverlayId) {
    if let Some(name) = name {
        names.insert(name.to_string(), id);
    }
}

fn lookup(names: &HashMap<String, OverlayId>, name: &str, step: usize) -> GearResult<OverlayId> {
    names.get(name).copied().ok_or_else(|| {
        GearError::validation(format!("action {step}: unknown overlay name '{name}'"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/script/replay.rs"]
mod tests;
