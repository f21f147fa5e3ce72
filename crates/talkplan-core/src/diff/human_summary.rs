//! Human-readable summary renderer for schedule change sets.

use chrono_tz::Tz;

use crate::diff::model::{ChangeAction, ChangeSet};
use crate::model::Slot;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render a Markdown summary of a [`ChangeSet`] for organizer review.
///
/// Informational only; the structured change set stays authoritative.
pub fn render_change_summary(changes: &ChangeSet, tz: Tz) -> String {
    let mut out = String::new();

    out.push_str("## Schedule Changes\n\n");

    let action_label = match changes.action {
        ChangeAction::Create => "Create",
        ChangeAction::Update => "Update",
    };
    out.push_str(&format!(
        "**Action**: {action_label}  \n**Changes**: {}\n\n",
        changes.count
    ));

    if changes.action == ChangeAction::Create {
        out.push_str("_First release of this schedule._\n");
        return out;
    }
    if changes.is_empty() {
        out.push_str("_No changes detected._\n");
        return out;
    }

    if !changes.new_talks.is_empty() {
        out.push_str(&format!("### New Talks ({})\n\n", changes.new_talks.len()));
        for slot in &changes.new_talks {
            out.push_str(&format!("- {}\n", describe_slot(slot, tz)));
        }
        out.push('\n');
    }

    if !changes.canceled_talks.is_empty() {
        out.push_str(&format!(
            "### Canceled Talks ({})\n\n",
            changes.canceled_talks.len()
        ));
        for slot in &changes.canceled_talks {
            out.push_str(&format!("- {}\n", describe_slot(slot, tz)));
        }
        out.push('\n');
    }

    if !changes.moved_talks.is_empty() {
        out.push_str(&format!(
            "### Moved Talks ({})\n\n",
            changes.moved_talks.len()
        ));
        for moved in &changes.moved_talks {
            out.push_str(&format!(
                "- `{}`: {} at {} -> {} at {}\n",
                moved.submission_id,
                moved.old_room_name,
                moved.old_start.format(TIME_FORMAT),
                moved.new_room_name,
                moved.new_start.format(TIME_FORMAT),
            ));
        }
        out.push('\n');
    }

    out
}

fn describe_slot(slot: &Slot, tz: Tz) -> String {
    let room = slot.room.as_ref().map(|r| r.name.as_str()).unwrap_or("?");
    let start = slot
        .start
        .map(|s| s.with_timezone(&tz).format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "?".to_string());
    format!("`{}` in {} at {}", slot.submission_id, room, start)
}
