use armory_client::Backend;
use armory_core::{Entity, Phase};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{KeyOutcome, PanelApp, ResourceTab};

pub fn handle_event(app: &mut PanelApp, event: Event) {
    if let Event::Key(key) = event {
        if key.kind == KeyEventKind::Press {
            handle_key(app, key);
        }
    }
}

fn handle_key(app: &mut PanelApp, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        app.should_quit = true;
        return;
    }

    if app.current_tab_mut().handle_key(key) == KeyOutcome::Handled {
        return;
    }

    match key.code {
        KeyCode::Tab | KeyCode::Right => app.next_tab(),
        KeyCode::BackTab | KeyCode::Left => app.prev_tab(),
        KeyCode::F(5) => app.refresh_current(),
        KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

pub fn handle_tab_key<E: Entity, B: Backend + 'static>(
    tab: &mut ResourceTab<E, B>,
    key: KeyEvent,
) -> KeyOutcome {
    match tab.screen.phase() {
        Phase::Ready => handle_list_key(tab, key),
        Phase::Editing(_) => {
            if tab.picker.is_some() {
                handle_picker_key(tab, key);
            } else {
                handle_editor_key(tab, key);
            }
            KeyOutcome::Handled
        }
        Phase::ConfirmingDelete { .. } => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => tab.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => tab.cancel(),
                _ => {}
            }
            KeyOutcome::Handled
        }
        Phase::Submitting(_) | Phase::Deleting { .. } => KeyOutcome::Handled,
        Phase::Idle | Phase::Loading | Phase::Failed(_) => KeyOutcome::Ignored,
    }
}

fn handle_list_key<E: Entity, B: Backend + 'static>(
    tab: &mut ResourceTab<E, B>,
    key: KeyEvent,
) -> KeyOutcome {
    match (key.code, key.modifiers) {
        (KeyCode::Up, _) => tab.screen.select_prev(),
        (KeyCode::Down, _) => tab.screen.select_next(),
        (KeyCode::F(2) | KeyCode::Insert, _) => tab.open_editor(true),
        (KeyCode::Enter, _) => tab.open_editor(false),
        (KeyCode::Delete | KeyCode::F(8), _) => tab.request_delete(),
        (KeyCode::Backspace, _) => tab.screen.pop_query(),
        (KeyCode::Esc, _) if !tab.screen.query().is_empty() => tab.screen.set_query(""),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            tab.screen.clear_notice();
            tab.screen.push_query(c);
        }
        _ => return KeyOutcome::Ignored,
    }
    KeyOutcome::Handled
}

fn handle_editor_key<E: Entity, B: Backend + 'static>(tab: &mut ResourceTab<E, B>, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => tab.cancel(),
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => tab.submit(),
        (KeyCode::Enter, _) => {
            let on_reference = tab
                .form
                .as_ref()
                .is_some_and(|form| form.focused_reference().is_some());
            if on_reference {
                tab.open_picker();
            } else {
                tab.submit();
            }
        }
        (KeyCode::Up | KeyCode::BackTab, _) => {
            if let Some(form) = tab.form.as_mut() {
                form.focus_prev();
            }
        }
        (KeyCode::Down | KeyCode::Tab, _) => {
            if let Some(form) = tab.form.as_mut() {
                form.focus_next();
            }
        }
        (code, modifiers) => {
            let Some(input) = tab.form.as_mut().and_then(|form| form.focused_input()) else {
                return;
            };
            match (code, modifiers) {
                (KeyCode::Backspace, _) => input.backspace(),
                (KeyCode::Delete, _) => input.delete(),
                (KeyCode::Left, _) => input.left(),
                (KeyCode::Right, _) => input.right(),
                (KeyCode::Home, _) => input.home(),
                (KeyCode::End, _) => input.end(),
                (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => input.insert(c),
                _ => {}
            }
        }
    }
}

fn handle_picker_key<E: Entity, B: Backend + 'static>(tab: &mut ResourceTab<E, B>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => tab.picker = None,
        KeyCode::Enter => tab.choose_picked(),
        KeyCode::Up => {
            if let Some(picker) = tab.picker.as_mut() {
                picker.up();
            }
        }
        KeyCode::Down => {
            if let Some(picker) = tab.picker.as_mut() {
                picker.down();
            }
        }
        _ => {}
    }
}
