use super::{actions::FormCommand, session::FormSession};

/// Apply one command to the open session; `false` when it changed nothing.
pub fn apply_command(session: &mut FormSession, command: FormCommand) -> bool {
    match command {
        FormCommand::NextTab => session.advance_tab(),
        FormCommand::PrevTab => session.retreat_tab(),
        FormCommand::SetText { field, value } => session.set_text(&field, value),
        FormCommand::SetBool { field, value } => session.set_bool(&field, value),
        FormCommand::CycleChoice { field, delta } => session.cycle_choice(&field, delta),
        FormCommand::AddItem { collection } => session.add_item(&collection),
        FormCommand::UpdateItem {
            collection,
            index,
            field,
            value,
        } => session.update_item(&collection, index, &field, value),
        FormCommand::RemoveItem { collection, index } => session.remove_item(&collection, index),
    }
}
