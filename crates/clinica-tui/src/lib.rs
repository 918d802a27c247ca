// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use clinica_app::{
    AppCommand, AppEvent, AppMode, AppState, Child, ChildFormInput, ChildId, DashboardCounts,
    Doctor, DoctorFormInput, DoctorId, DoctorPosition, FormKind, FormPayload, Medicine,
    MedicineFormInput, Mother, MotherFormInput, MotherId, Staff, StaffFormInput, StaffId,
    StaffRole, TabKind, VaccinationFormInput, Vaccine, VaccineCategory, VaccineFormInput,
    VaccineId, filter_records,
};
use clinica_store::{LookupValue, lookup_name};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// One screen's worth of records, fetched whole on every refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum TabSnapshot {
    Doctors(Vec<Doctor>),
    Staff(Vec<Staff>),
    Children(Vec<Child>),
    Mothers(Vec<Mother>),
    Vaccines(Vec<Vaccine>),
    Medicine(Vec<Medicine>),
}

impl TabSnapshot {
    pub const fn tab_kind(&self) -> TabKind {
        match self {
            Self::Doctors(_) => TabKind::Doctors,
            Self::Staff(_) => TabKind::Staff,
            Self::Children(_) => TabKind::Children,
            Self::Mothers(_) => TabKind::Mothers,
            Self::Vaccines(_) => TabKind::Vaccines,
            Self::Medicine(_) => TabKind::Medicine,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Doctors(rows) => rows.len(),
            Self::Staff(rows) => rows.len(),
            Self::Children(rows) => rows.len(),
            Self::Mothers(rows) => rows.len(),
            Self::Vaccines(rows) => rows.len(),
            Self::Medicine(rows) => rows.len(),
        }
    }
}

/// Reference data for form pickers: foreign-key lookups plus the full vaccine
/// list, which the vaccination overlay filters by category and stock.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickerData {
    pub doctors: Vec<LookupValue<DoctorId>>,
    pub staff: Vec<LookupValue<StaffId>>,
    pub children: Vec<LookupValue<ChildId>>,
    pub mothers: Vec<LookupValue<MotherId>>,
    pub vaccines: Vec<Vaccine>,
}

pub trait AppRuntime {
    fn load_dashboard_counts(&mut self) -> Result<DashboardCounts>;
    fn load_tab_snapshot(&mut self, tab: TabKind) -> Result<Option<TabSnapshot>>;
    fn load_pickers(&mut self) -> Result<PickerData>;
    fn create_record(&mut self, payload: &FormPayload) -> Result<()>;
    fn update_record(&mut self, row_id: i64, payload: &FormPayload) -> Result<()>;
    fn delete_record(&mut self, tab: TabKind, row_id: i64) -> Result<()>;
    fn record_vaccination(&mut self, input: &VaccinationFormInput) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq)]
struct TableRowProjection {
    row_id: i64,
    cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct TableProjection {
    headers: Vec<&'static str>,
    rows: Vec<TableRowProjection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct LoginUiState {
    email: String,
    password: String,
    field_cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormFieldKind {
    Text,
    Integer,
    Date,
    OptionalDate,
    Position,
    Role,
    Category,
    DoctorRef,
    StaffRef,
}

impl FormFieldKind {
    const fn is_choice(self) -> bool {
        matches!(
            self,
            Self::Position | Self::Role | Self::Category | Self::DoctorRef | Self::StaffRef
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormFieldSpec {
    label: &'static str,
    kind: FormFieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormUiState {
    kind: FormKind,
    editing_id: Option<i64>,
    field_cursor: usize,
    values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeleteConfirm {
    tab: TabKind,
    row_id: i64,
}

/// Working state for the vaccination overlay. Both target ids survive a mode
/// flip; only the one matching the active mode goes into the submitted input.
#[derive(Debug, Clone, PartialEq, Eq)]
struct VaccinationUiState {
    mode: VaccineCategory,
    child_choice: Option<ChildId>,
    mother_choice: Option<MotherId>,
    vaccine_choice: Option<VaccineId>,
    field_cursor: usize,
    date_text: String,
    notes: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    dashboard_counts: DashboardCounts,
    pickers: PickerData,
    active_tab_snapshot: Option<TabSnapshot>,
    selected_row: usize,
    filter_query: String,
    login: LoginUiState,
    form: Option<FormUiState>,
    confirm_delete: Option<DeleteConfirm>,
    vaccination: Option<VaccinationUiState>,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(state, runtime, &mut view_data) {
        state.dispatch(AppCommand::SetStatus(format!("load failed: {error}")));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(state: &mut AppState, view_data: &ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if !state.session.is_authenticated() {
        return handle_login_key(state, runtime, view_data, internal_tx, key);
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.confirm_delete.is_some() {
        handle_confirm_delete_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.vaccination.is_some() {
        handle_vaccination_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.form.is_some() {
        handle_form_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if state.mode == AppMode::Filter {
        handle_filter_key(state, view_data, key);
        return false;
    }

    handle_nav_key(state, runtime, view_data, internal_tx, key)
}

/// Presence is the whole credential check; any non-empty pair is accepted.
fn accepted_login(email: &str, password: &str) -> Option<String> {
    let email = email.trim();
    if email.is_empty() || password.trim().is_empty() {
        return None;
    }
    Some(email.to_owned())
}

fn handle_login_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            view_data.login.field_cursor = 1 - view_data.login.field_cursor;
        }
        KeyCode::Backspace => {
            let field = if view_data.login.field_cursor == 0 {
                &mut view_data.login.email
            } else {
                &mut view_data.login.password
            };
            field.pop();
        }
        KeyCode::Char(value) => {
            let field = if view_data.login.field_cursor == 0 {
                &mut view_data.login.email
            } else {
                &mut view_data.login.password
            };
            field.push(value);
        }
        KeyCode::Enter => {
            let Some(email) = accepted_login(&view_data.login.email, &view_data.login.password)
            else {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "enter an email and a password to sign in",
                );
                return false;
            };
            view_data.login = LoginUiState::default();
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::SignIn { email },
                internal_tx,
            );
        }
        _ => {}
    }
    false
}

fn handle_confirm_delete_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(confirm) = view_data.confirm_delete else {
        return;
    };
    match key.code {
        KeyCode::Char('y') => {
            view_data.confirm_delete = None;
            match runtime.delete_record(confirm.tab, confirm.row_id) {
                Ok(()) => {
                    refresh_after_write(state, runtime, view_data, internal_tx, "record deleted");
                }
                Err(error) => {
                    emit_status(state, view_data, internal_tx, format!("delete failed: {error}"));
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            view_data.confirm_delete = None;
        }
        _ => {}
    }
}

fn handle_filter_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            view_data.filter_query.clear();
            view_data.selected_row = 0;
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Backspace => {
            view_data.filter_query.pop();
            view_data.selected_row = 0;
        }
        KeyCode::Char(value) => {
            view_data.filter_query.push(value);
            view_data.selected_row = 0;
        }
        _ => {}
    }
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('f'), KeyModifiers::NONE) => {
            change_tab(state, runtime, view_data, internal_tx, AppCommand::NextTab);
        }
        (KeyCode::Char('b'), KeyModifiers::NONE) => {
            change_tab(state, runtime, view_data, internal_tx, AppCommand::PrevTab);
        }
        (KeyCode::Char(digit @ '1'..='7'), KeyModifiers::NONE) => {
            let index = digit as usize - '1' as usize;
            let tab = TabKind::ALL[index];
            change_tab(state, runtime, view_data, internal_tx, AppCommand::SelectTab(tab));
        }
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            move_row(view_data, 1);
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            move_row(view_data, -1);
        }
        (KeyCode::Char('/'), KeyModifiers::NONE) => {
            if state.active_tab != TabKind::Dashboard {
                state.dispatch(AppCommand::EnterFilter);
            }
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            if let Some(kind) = form_for_tab(state.active_tab) {
                open_add_form(state, view_data, kind);
            }
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            open_edit_form(state, view_data, internal_tx);
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            if let Some(row_id) = selected_row_id(view_data) {
                view_data.confirm_delete = Some(DeleteConfirm {
                    tab: state.active_tab,
                    row_id,
                });
            }
        }
        (KeyCode::Char('v'), KeyModifiers::NONE) => {
            if state.active_tab == TabKind::Vaccines {
                open_vaccination_overlay(state, view_data);
            }
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            if let Err(error) = refresh_view_data(state, runtime, view_data) {
                emit_status(state, view_data, internal_tx, format!("load failed: {error}"));
            } else {
                emit_status(state, view_data, internal_tx, "refreshed");
            }
        }
        (KeyCode::Char('L'), _) => {
            view_data.filter_query.clear();
            view_data.selected_row = 0;
            view_data.form = None;
            view_data.vaccination = None;
            view_data.confirm_delete = None;
            dispatch_and_refresh(state, runtime, view_data, AppCommand::LogOut, internal_tx);
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        _ => {}
    }
    false
}

fn change_tab<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    view_data.filter_query.clear();
    view_data.selected_row = 0;
    dispatch_and_refresh(state, runtime, view_data, command, internal_tx);
}

fn move_row(view_data: &mut ViewData, delta: isize) {
    let row_count = active_projection(view_data)
        .map(|projection| projection.rows.len())
        .unwrap_or(0);
    if row_count == 0 {
        view_data.selected_row = 0;
        return;
    }
    let current = view_data.selected_row as isize;
    let next = (current + delta).clamp(0, row_count as isize - 1);
    view_data.selected_row = next as usize;
}

fn selected_row_id(view_data: &ViewData) -> Option<i64> {
    let projection = active_projection(view_data)?;
    projection
        .rows
        .get(view_data.selected_row)
        .map(|row| row.row_id)
}

const fn form_for_tab(tab: TabKind) -> Option<FormKind> {
    match tab {
        TabKind::Dashboard => None,
        TabKind::Doctors => Some(FormKind::Doctor),
        TabKind::Staff => Some(FormKind::Staff),
        TabKind::Children => Some(FormKind::Child),
        TabKind::Mothers => Some(FormKind::Mother),
        TabKind::Vaccines => Some(FormKind::Vaccine),
        TabKind::Medicine => Some(FormKind::Medicine),
    }
}

fn open_add_form(state: &mut AppState, view_data: &mut ViewData, kind: FormKind) {
    let payload = FormPayload::blank_for(kind);
    view_data.form = Some(FormUiState {
        kind,
        editing_id: None,
        field_cursor: 0,
        values: form_values_for(&payload),
    });
    state.dispatch(AppCommand::OpenForm(kind));
}

fn open_edit_form(
    state: &mut AppState,
    view_data: &mut ViewData,
    _internal_tx: &Sender<InternalEvent>,
) {
    let Some(kind) = form_for_tab(state.active_tab) else {
        return;
    };
    let Some(row_id) = selected_row_id(view_data) else {
        return;
    };
    let Some(snapshot) = &view_data.active_tab_snapshot else {
        return;
    };
    let Some(payload) = payload_for_row(snapshot, row_id) else {
        return;
    };
    view_data.form = Some(FormUiState {
        kind,
        editing_id: Some(row_id),
        field_cursor: 0,
        values: form_values_for(&payload),
    });
    state.dispatch(AppCommand::OpenForm(kind));
}

fn open_vaccination_overlay(state: &mut AppState, view_data: &mut ViewData) {
    let mode = VaccineCategory::Child;
    let child_choice = view_data.pickers.children.first().map(|value| value.id);
    let vaccine_choice = vaccine_choices(&view_data.pickers.vaccines, mode)
        .first()
        .map(|vaccine| vaccine.id);
    view_data.vaccination = Some(VaccinationUiState {
        mode,
        child_choice,
        mother_choice: None,
        vaccine_choice,
        field_cursor: 0,
        date_text: OffsetDateTime::now_utc().date().to_string(),
        notes: String::new(),
    });
    state.dispatch(AppCommand::OpenForm(FormKind::Vaccination));
}

/// Doses offered by the picker: in stock and matching the active mode.
pub fn vaccine_choices(vaccines: &[Vaccine], mode: VaccineCategory) -> Vec<&Vaccine> {
    vaccines
        .iter()
        .filter(|vaccine| vaccine.category == mode && vaccine.quantity > 0)
        .collect()
}

fn handle_vaccination_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(mut overlay) = view_data.vaccination.clone() else {
        return;
    };

    match key.code {
        KeyCode::Esc => {
            view_data.vaccination = None;
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Down | KeyCode::Tab => {
            overlay.field_cursor = (overlay.field_cursor + 1).min(3);
        }
        KeyCode::Up => {
            overlay.field_cursor = overlay.field_cursor.saturating_sub(1);
        }
        KeyCode::Left if overlay.field_cursor == 0 => {
            cycle_vaccination_target(&mut overlay, &view_data.pickers, -1);
        }
        KeyCode::Right if overlay.field_cursor == 0 => {
            cycle_vaccination_target(&mut overlay, &view_data.pickers, 1);
        }
        KeyCode::Left if overlay.field_cursor == 1 => {
            cycle_vaccination_vaccine(&mut overlay, &view_data.pickers, -1);
        }
        KeyCode::Right if overlay.field_cursor == 1 => {
            cycle_vaccination_vaccine(&mut overlay, &view_data.pickers, 1);
        }
        KeyCode::Char('m') if overlay.field_cursor < 2 => {
            flip_vaccination_mode(&mut overlay, &view_data.pickers);
        }
        KeyCode::Backspace if overlay.field_cursor == 2 => {
            overlay.date_text.pop();
        }
        KeyCode::Backspace if overlay.field_cursor == 3 => {
            overlay.notes.pop();
        }
        KeyCode::Char(value) if overlay.field_cursor == 2 => {
            overlay.date_text.push(value);
        }
        KeyCode::Char(value) if overlay.field_cursor == 3 => {
            overlay.notes.push(value);
        }
        KeyCode::Enter => {
            let input = match vaccination_input_from(&overlay) {
                Ok(input) => input,
                Err(error) => {
                    view_data.vaccination = Some(overlay);
                    emit_status(state, view_data, internal_tx, error.to_string());
                    return;
                }
            };
            if let Err(error) = input.validate() {
                view_data.vaccination = Some(overlay);
                emit_status(state, view_data, internal_tx, error.to_string());
                return;
            }
            view_data.vaccination = None;
            state.dispatch(AppCommand::ExitToNav);
            match runtime.record_vaccination(&input) {
                Ok(()) => {
                    refresh_after_write(
                        state,
                        runtime,
                        view_data,
                        internal_tx,
                        "vaccination recorded",
                    );
                }
                Err(error) => {
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("vaccination failed: {error}"),
                    );
                }
            }
            return;
        }
        _ => {}
    }
    view_data.vaccination = Some(overlay);
}

fn flip_vaccination_mode(overlay: &mut VaccinationUiState, pickers: &PickerData) {
    overlay.mode = match overlay.mode {
        VaccineCategory::Child => VaccineCategory::Mother,
        VaccineCategory::Mother => VaccineCategory::Child,
    };
    // The inactive target id is kept as-is so flipping back restores it.
    match overlay.mode {
        VaccineCategory::Child if overlay.child_choice.is_none() => {
            overlay.child_choice = pickers.children.first().map(|value| value.id);
        }
        VaccineCategory::Mother if overlay.mother_choice.is_none() => {
            overlay.mother_choice = pickers.mothers.first().map(|value| value.id);
        }
        _ => {}
    }
    // The vaccine subset changes with the mode, so the pick is re-seeded.
    overlay.vaccine_choice = vaccine_choices(&pickers.vaccines, overlay.mode)
        .first()
        .map(|vaccine| vaccine.id);
}

fn cycle_vaccination_target(overlay: &mut VaccinationUiState, pickers: &PickerData, delta: isize) {
    match overlay.mode {
        VaccineCategory::Child => {
            overlay.child_choice = cycle_id(
                pickers.children.iter().map(|value| value.id),
                overlay.child_choice,
                delta,
            );
        }
        VaccineCategory::Mother => {
            overlay.mother_choice = cycle_id(
                pickers.mothers.iter().map(|value| value.id),
                overlay.mother_choice,
                delta,
            );
        }
    }
}

fn cycle_vaccination_vaccine(overlay: &mut VaccinationUiState, pickers: &PickerData, delta: isize) {
    overlay.vaccine_choice = cycle_id(
        vaccine_choices(&pickers.vaccines, overlay.mode)
            .iter()
            .map(|vaccine| vaccine.id),
        overlay.vaccine_choice,
        delta,
    );
}

fn cycle_id<Id: PartialEq + Copy>(
    options: impl Iterator<Item = Id>,
    current: Option<Id>,
    delta: isize,
) -> Option<Id> {
    let options: Vec<Id> = options.collect();
    if options.is_empty() {
        return None;
    }
    let current_index = current
        .and_then(|id| options.iter().position(|option| *option == id))
        .unwrap_or(0) as isize;
    let next = (current_index + delta).rem_euclid(options.len() as isize) as usize;
    Some(options[next])
}

fn vaccination_input_from(overlay: &VaccinationUiState) -> Result<VaccinationFormInput> {
    let date = if overlay.date_text.trim().is_empty() {
        None
    } else {
        Some(parse_date(overlay.date_text.trim())?)
    };
    Ok(VaccinationFormInput {
        mode: overlay.mode,
        child_id: overlay.child_choice,
        mother_id: overlay.mother_choice,
        vaccine_id: overlay.vaccine_choice,
        date,
        notes: overlay.notes.clone(),
    })
}

fn form_field_specs(kind: FormKind) -> &'static [FormFieldSpec] {
    const fn field(label: &'static str, kind: FormFieldKind) -> FormFieldSpec {
        FormFieldSpec { label, kind }
    }

    match kind {
        FormKind::Doctor => &const { [
            field("name", FormFieldKind::Text),
            field("registration no", FormFieldKind::Text),
            field("position", FormFieldKind::Position),
            field("contact", FormFieldKind::Text),
            field("email", FormFieldKind::Text),
        ] },
        FormKind::Staff => &const { [
            field("name", FormFieldKind::Text),
            field("role", FormFieldKind::Role),
            field("contact", FormFieldKind::Text),
            field("address", FormFieldKind::Text),
            field("profile image", FormFieldKind::Text),
        ] },
        FormKind::Child => &const { [
            field("name", FormFieldKind::Text),
            field("mother", FormFieldKind::Text),
            field("contact", FormFieldKind::Text),
            field("address", FormFieldKind::Text),
            field("age (months)", FormFieldKind::Integer),
            field("vaccine status", FormFieldKind::Text),
            field("doctor", FormFieldKind::DoctorRef),
            field("staff", FormFieldKind::StaffRef),
        ] },
        FormKind::Mother => &const { [
            field("name", FormFieldKind::Text),
            field("age", FormFieldKind::Integer),
            field("address", FormFieldKind::Text),
            field("contact", FormFieldKind::Text),
            field("gravidity", FormFieldKind::Integer),
            field("register date", FormFieldKind::Date),
            field("delivery date", FormFieldKind::OptionalDate),
            field("clinic date", FormFieldKind::OptionalDate),
            field("doctor", FormFieldKind::DoctorRef),
            field("staff", FormFieldKind::StaffRef),
        ] },
        FormKind::Vaccine => &const { [
            field("name", FormFieldKind::Text),
            field("batch no", FormFieldKind::Text),
            field("brand", FormFieldKind::Text),
            field("category", FormFieldKind::Category),
            field("quantity", FormFieldKind::Integer),
            field("expiry", FormFieldKind::Date),
        ] },
        FormKind::Medicine => &const { [
            field("name", FormFieldKind::Text),
            field("batch no", FormFieldKind::Text),
            field("brand", FormFieldKind::Text),
            field("quantity", FormFieldKind::Integer),
            field("expiry", FormFieldKind::Date),
        ] },
        FormKind::Vaccination => &[],
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(mut form) = view_data.form.clone() else {
        return;
    };
    let specs = form_field_specs(form.kind);
    let field_kind = specs[form.field_cursor].kind;

    match key.code {
        KeyCode::Esc => {
            view_data.form = None;
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Down | KeyCode::Tab => {
            form.field_cursor = (form.field_cursor + 1).min(specs.len() - 1);
        }
        KeyCode::Up => {
            form.field_cursor = form.field_cursor.saturating_sub(1);
        }
        KeyCode::Left if field_kind.is_choice() => {
            cycle_form_choice(&mut form, &view_data.pickers, -1);
        }
        KeyCode::Right if field_kind.is_choice() => {
            cycle_form_choice(&mut form, &view_data.pickers, 1);
        }
        KeyCode::Backspace if !field_kind.is_choice() => {
            form.values[form.field_cursor].pop();
        }
        KeyCode::Char(value) if !field_kind.is_choice() => {
            form.values[form.field_cursor].push(value);
        }
        KeyCode::Enter => {
            let payload = match parse_form_payload(form.kind, &form.values) {
                Ok(payload) => payload,
                Err(error) => {
                    view_data.form = Some(form);
                    emit_status(state, view_data, internal_tx, error.to_string());
                    return;
                }
            };
            if let Err(error) = payload.validate() {
                view_data.form = Some(form);
                emit_status(state, view_data, internal_tx, error.to_string());
                return;
            }
            let editing_id = form.editing_id;
            view_data.form = None;
            state.dispatch(AppCommand::ExitToNav);
            let outcome = match editing_id {
                Some(row_id) => runtime.update_record(row_id, &payload),
                None => runtime.create_record(&payload),
            };
            match outcome {
                Ok(()) => {
                    refresh_after_write(state, runtime, view_data, internal_tx, "record saved");
                }
                Err(error) => {
                    emit_status(state, view_data, internal_tx, format!("save failed: {error}"));
                }
            }
            return;
        }
        _ => {}
    }
    view_data.form = Some(form);
}

fn form_choice_options(kind: FormFieldKind, pickers: &PickerData) -> Vec<String> {
    match kind {
        FormFieldKind::Position => DoctorPosition::ALL
            .iter()
            .map(|position| position.as_str().to_owned())
            .collect(),
        FormFieldKind::Role => StaffRole::ALL
            .iter()
            .map(|role| role.as_str().to_owned())
            .collect(),
        FormFieldKind::Category => VaccineCategory::ALL
            .iter()
            .map(|category| category.as_str().to_owned())
            .collect(),
        FormFieldKind::DoctorRef => pickers
            .doctors
            .iter()
            .map(|value| value.id.get().to_string())
            .collect(),
        FormFieldKind::StaffRef => pickers
            .staff
            .iter()
            .map(|value| value.id.get().to_string())
            .collect(),
        _ => Vec::new(),
    }
}

fn cycle_form_choice(form: &mut FormUiState, pickers: &PickerData, delta: isize) {
    let specs = form_field_specs(form.kind);
    let options = form_choice_options(specs[form.field_cursor].kind, pickers);
    if options.is_empty() {
        return;
    }
    let current = &form.values[form.field_cursor];
    let current_index = options
        .iter()
        .position(|option| option == current)
        .unwrap_or(0) as isize;
    let next = (current_index + delta).rem_euclid(options.len() as isize) as usize;
    form.values[form.field_cursor] = options[next].clone();
}

/// Values shown in the form editor, one string per field spec.
fn form_values_for(payload: &FormPayload) -> Vec<String> {
    match payload {
        FormPayload::Doctor(doctor) => vec![
            doctor.name.clone(),
            doctor.registration_number.clone(),
            doctor.position.as_str().to_owned(),
            doctor.contact.clone(),
            doctor.email.clone(),
        ],
        FormPayload::Staff(staff) => vec![
            staff.name.clone(),
            staff.role.as_str().to_owned(),
            staff.contact.clone(),
            staff.address.clone(),
            staff.profile_image_ref.clone(),
        ],
        FormPayload::Child(child) => vec![
            child.name.clone(),
            child.mother_name.clone(),
            child.contact.clone(),
            child.address.clone(),
            child.age_months.to_string(),
            child.vaccine_status.clone(),
            ref_value(child.doctor_id.get()),
            ref_value(child.staff_id.get()),
        ],
        FormPayload::Mother(mother) => vec![
            mother.name.clone(),
            mother.age.to_string(),
            mother.address.clone(),
            mother.contact.clone(),
            mother.gravidity.to_string(),
            optional_date_value(mother.register_date),
            optional_date_value(mother.delivery_date),
            optional_date_value(mother.clinic_date),
            ref_value(mother.doctor_id.get()),
            ref_value(mother.staff_id.get()),
        ],
        FormPayload::Vaccine(vaccine) => vec![
            vaccine.name.clone(),
            vaccine.batch_number.clone(),
            vaccine.brand.clone(),
            vaccine.category.as_str().to_owned(),
            vaccine.quantity.to_string(),
            optional_date_value(vaccine.date),
        ],
        FormPayload::Medicine(medicine) => vec![
            medicine.name.clone(),
            medicine.batch_number.clone(),
            medicine.brand.clone(),
            medicine.quantity.to_string(),
            optional_date_value(medicine.date),
        ],
        FormPayload::Vaccination(_) => Vec::new(),
    }
}

fn ref_value(id: i64) -> String {
    if id <= 0 { String::new() } else { id.to_string() }
}

fn date_value(date: Date) -> String {
    date.to_string()
}

fn optional_date_value(date: Option<Date>) -> String {
    date.map(|value| value.to_string()).unwrap_or_default()
}

fn parse_form_payload(kind: FormKind, values: &[String]) -> Result<FormPayload> {
    match kind {
        FormKind::Doctor => Ok(FormPayload::Doctor(DoctorFormInput {
            name: values[0].clone(),
            registration_number: values[1].clone(),
            position: DoctorPosition::parse(&values[2])
                .ok_or_else(|| anyhow!("unknown position {:?}", values[2]))?,
            contact: values[3].clone(),
            email: values[4].clone(),
        })),
        FormKind::Staff => Ok(FormPayload::Staff(StaffFormInput {
            name: values[0].clone(),
            role: StaffRole::parse(&values[1])
                .ok_or_else(|| anyhow!("unknown role {:?}", values[1]))?,
            contact: values[2].clone(),
            address: values[3].clone(),
            profile_image_ref: values[4].clone(),
        })),
        FormKind::Child => Ok(FormPayload::Child(ChildFormInput {
            name: values[0].clone(),
            mother_name: values[1].clone(),
            contact: values[2].clone(),
            address: values[3].clone(),
            age_months: parse_i32("age", &values[4])?,
            vaccine_status: values[5].clone(),
            doctor_id: DoctorId::new(parse_ref("doctor", &values[6])?),
            staff_id: StaffId::new(parse_ref("staff", &values[7])?),
        })),
        FormKind::Mother => Ok(FormPayload::Mother(MotherFormInput {
            name: values[0].clone(),
            age: parse_i32("age", &values[1])?,
            address: values[2].clone(),
            contact: values[3].clone(),
            gravidity: parse_i32("gravidity", &values[4])?,
            register_date: parse_optional_date("register date", &values[5])?,
            delivery_date: parse_optional_date("delivery date", &values[6])?,
            clinic_date: parse_optional_date("clinic date", &values[7])?,
            doctor_id: DoctorId::new(parse_ref("doctor", &values[8])?),
            staff_id: StaffId::new(parse_ref("staff", &values[9])?),
        })),
        FormKind::Vaccine => Ok(FormPayload::Vaccine(VaccineFormInput {
            name: values[0].clone(),
            batch_number: values[1].clone(),
            brand: values[2].clone(),
            category: VaccineCategory::parse(&values[3])
                .ok_or_else(|| anyhow!("unknown category {:?}", values[3]))?,
            quantity: parse_i64("quantity", &values[4])?,
            date: parse_optional_date("expiry", &values[5])?,
        })),
        FormKind::Medicine => Ok(FormPayload::Medicine(MedicineFormInput {
            name: values[0].clone(),
            batch_number: values[1].clone(),
            brand: values[2].clone(),
            quantity: parse_i64("quantity", &values[3])?,
            date: parse_optional_date("expiry", &values[4])?,
        })),
        FormKind::Vaccination => bail!("vaccinations are recorded through the vaccinate overlay"),
    }
}

fn parse_i32(label: &str, value: &str) -> Result<i32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| anyhow!("{label} must be a whole number, got {trimmed:?}"))
}

fn parse_i64(label: &str, value: &str) -> Result<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| anyhow!("{label} must be a whole number, got {trimmed:?}"))
}

fn parse_ref(label: &str, value: &str) -> Result<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| anyhow!("{label} reference must be a record id, got {trimmed:?}"))
}

fn parse_date(value: &str) -> Result<Date> {
    Date::parse(value, &format_description!("[year]-[month]-[day]"))
        .map_err(|_| anyhow!("dates use YYYY-MM-DD, got {value:?}"))
}

fn parse_optional_date(label: &str, value: &str) -> Result<Option<Date>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_date(trimmed)
        .map(Some)
        .map_err(|_| anyhow!("{label} uses YYYY-MM-DD, got {trimmed:?}"))
}

/// Template payload for editing the row with this id. The id itself travels
/// separately; the payload only carries field values.
fn payload_for_row(snapshot: &TabSnapshot, row_id: i64) -> Option<FormPayload> {
    match snapshot {
        TabSnapshot::Doctors(rows) => rows
            .iter()
            .find(|doctor| doctor.id.get() == row_id)
            .map(|doctor| {
                FormPayload::Doctor(DoctorFormInput {
                    name: doctor.name.clone(),
                    registration_number: doctor.registration_number.clone(),
                    position: doctor.position,
                    contact: doctor.contact.clone(),
                    email: doctor.email.clone(),
                })
            }),
        TabSnapshot::Staff(rows) => rows
            .iter()
            .find(|member| member.id.get() == row_id)
            .map(|member| {
                FormPayload::Staff(StaffFormInput {
                    profile_image_ref: member.profile_image_ref.clone(),
                    name: member.name.clone(),
                    contact: member.contact.clone(),
                    address: member.address.clone(),
                    role: member.role,
                })
            }),
        TabSnapshot::Children(rows) => rows
            .iter()
            .find(|child| child.id.get() == row_id)
            .map(|child| {
                FormPayload::Child(ChildFormInput {
                    name: child.name.clone(),
                    mother_name: child.mother_name.clone(),
                    contact: child.contact.clone(),
                    address: child.address.clone(),
                    age_months: child.age_months,
                    vaccine_status: child.vaccine_status.clone(),
                    doctor_id: child.doctor_id,
                    staff_id: child.staff_id,
                })
            }),
        TabSnapshot::Mothers(rows) => rows
            .iter()
            .find(|mother| mother.id.get() == row_id)
            .map(|mother| {
                FormPayload::Mother(MotherFormInput {
                    name: mother.name.clone(),
                    age: mother.age,
                    address: mother.address.clone(),
                    contact: mother.contact.clone(),
                    gravidity: mother.gravidity,
                    register_date: Some(mother.register_date),
                    delivery_date: mother.delivery_date,
                    clinic_date: mother.clinic_date,
                    doctor_id: mother.doctor_id,
                    staff_id: mother.staff_id,
                })
            }),
        TabSnapshot::Vaccines(rows) => rows
            .iter()
            .find(|vaccine| vaccine.id.get() == row_id)
            .map(|vaccine| {
                FormPayload::Vaccine(VaccineFormInput {
                    name: vaccine.name.clone(),
                    batch_number: vaccine.batch_number.clone(),
                    brand: vaccine.brand.clone(),
                    category: vaccine.category,
                    quantity: vaccine.quantity,
                    date: Some(vaccine.date),
                })
            }),
        TabSnapshot::Medicine(rows) => rows
            .iter()
            .find(|medicine| medicine.id.get() == row_id)
            .map(|medicine| {
                FormPayload::Medicine(MedicineFormInput {
                    name: medicine.name.clone(),
                    batch_number: medicine.batch_number.clone(),
                    brand: medicine.brand.clone(),
                    quantity: medicine.quantity,
                    date: Some(medicine.date),
                })
            }),
    }
}

fn refresh_after_write<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    success_message: &str,
) {
    if let Err(error) = refresh_view_data(state, runtime, view_data) {
        emit_status(state, view_data, internal_tx, format!("load failed: {error}"));
        return;
    }
    emit_status(state, view_data, internal_tx, success_message);
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    if should_refresh_view(&events)
        && let Err(error) = refresh_view_data(state, runtime, view_data)
    {
        emit_status(state, view_data, internal_tx, format!("load failed: {error}"));
    }
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn should_refresh_view(events: &[AppEvent]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            AppEvent::TabChanged(_) | AppEvent::SessionStarted(_) | AppEvent::SessionEnded
        )
    })
}

fn refresh_view_data<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    view_data.dashboard_counts = runtime.load_dashboard_counts()?;
    view_data.pickers = runtime.load_pickers()?;
    view_data.active_tab_snapshot = runtime.load_tab_snapshot(state.active_tab)?;
    clamp_row_cursor(view_data);
    Ok(())
}

fn clamp_row_cursor(view_data: &mut ViewData) {
    let row_count = active_projection(view_data)
        .map(|projection| projection.rows.len())
        .unwrap_or(0);
    if row_count == 0 {
        view_data.selected_row = 0;
    } else {
        view_data.selected_row = view_data.selected_row.min(row_count - 1);
    }
}

fn active_projection(view_data: &ViewData) -> Option<TableProjection> {
    view_data
        .active_tab_snapshot
        .as_ref()
        .map(|snapshot| projection_for_snapshot(snapshot, &view_data.filter_query, &view_data.pickers))
}

fn projection_for_snapshot(
    snapshot: &TabSnapshot,
    query: &str,
    pickers: &PickerData,
) -> TableProjection {
    match snapshot {
        TabSnapshot::Doctors(rows) => TableProjection {
            headers: vec!["id", "name", "reg no", "position", "contact", "email"],
            rows: filter_records(rows, query)
                .into_iter()
                .map(|doctor| TableRowProjection {
                    row_id: doctor.id.get(),
                    cells: vec![
                        doctor.id.get().to_string(),
                        doctor.name.clone(),
                        doctor.registration_number.clone(),
                        doctor.position.label().to_owned(),
                        doctor.contact.clone(),
                        doctor.email.clone(),
                    ],
                })
                .collect(),
        },
        TabSnapshot::Staff(rows) => TableProjection {
            headers: vec!["id", "name", "role", "contact", "address"],
            rows: filter_records(rows, query)
                .into_iter()
                .map(|member| TableRowProjection {
                    row_id: member.id.get(),
                    cells: vec![
                        member.id.get().to_string(),
                        member.name.clone(),
                        member.role.label().to_owned(),
                        member.contact.clone(),
                        member.address.clone(),
                    ],
                })
                .collect(),
        },
        TabSnapshot::Children(rows) => TableProjection {
            headers: vec![
                "id", "name", "mother", "age (mo)", "status", "doctor", "staff",
            ],
            rows: filter_records(rows, query)
                .into_iter()
                .map(|child| TableRowProjection {
                    row_id: child.id.get(),
                    cells: vec![
                        child.id.get().to_string(),
                        child.name.clone(),
                        child.mother_name.clone(),
                        child.age_months.to_string(),
                        child.vaccine_status.clone(),
                        lookup_name(&pickers.doctors, child.doctor_id),
                        lookup_name(&pickers.staff, child.staff_id),
                    ],
                })
                .collect(),
        },
        TabSnapshot::Mothers(rows) => TableProjection {
            headers: vec![
                "id",
                "name",
                "age",
                "gravidity",
                "registered",
                "delivery",
                "clinic",
                "doctor",
                "staff",
            ],
            rows: filter_records(rows, query)
                .into_iter()
                .map(|mother| TableRowProjection {
                    row_id: mother.id.get(),
                    cells: vec![
                        mother.id.get().to_string(),
                        mother.name.clone(),
                        mother.age.to_string(),
                        mother.gravidity.to_string(),
                        mother.register_date.to_string(),
                        optional_date_value(mother.delivery_date),
                        optional_date_value(mother.clinic_date),
                        lookup_name(&pickers.doctors, mother.doctor_id),
                        lookup_name(&pickers.staff, mother.staff_id),
                    ],
                })
                .collect(),
        },
        TabSnapshot::Vaccines(rows) => TableProjection {
            headers: vec![
                "id", "name", "batch", "brand", "category", "quantity", "expiry",
            ],
            rows: filter_records(rows, query)
                .into_iter()
                .map(|vaccine| TableRowProjection {
                    row_id: vaccine.id.get(),
                    cells: vec![
                        vaccine.id.get().to_string(),
                        vaccine.name.clone(),
                        vaccine.batch_number.clone(),
                        vaccine.brand.clone(),
                        vaccine.category.label().to_owned(),
                        vaccine.quantity.to_string(),
                        vaccine.date.to_string(),
                    ],
                })
                .collect(),
        },
        TabSnapshot::Medicine(rows) => TableProjection {
            headers: vec!["id", "name", "batch", "brand", "quantity", "expiry"],
            rows: filter_records(rows, query)
                .into_iter()
                .map(|medicine| TableRowProjection {
                    row_id: medicine.id.get(),
                    cells: vec![
                        medicine.id.get().to_string(),
                        medicine.name.clone(),
                        medicine.batch_number.clone(),
                        medicine.brand.clone(),
                        medicine.quantity.to_string(),
                        medicine.date.to_string(),
                    ],
                })
                .collect(),
        },
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab.label().to_owned())
        .collect::<Vec<String>>();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("clinica").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    if state.active_tab == TabKind::Dashboard {
        let body = Paragraph::new(render_dashboard_text(state, view_data))
            .block(Block::default().borders(Borders::ALL).title("dashboard"));
        frame.render_widget(body, layout[1]);
    } else {
        render_table(frame, layout[1], state, view_data);
    }

    let status = status_text(state, view_data);
    let status_widget = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if !state.session.is_authenticated() {
        let area = centered_rect(50, 40, frame.area());
        frame.render_widget(Clear, area);
        let login = Paragraph::new(render_login_text(&view_data.login)).block(
            Block::default()
                .title("sign in")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(login, area);
        return;
    }

    if let Some(form) = &view_data.form {
        let area = centered_rect(60, 62, frame.area());
        frame.render_widget(Clear, area);
        let title = form_overlay_title(form);
        let body = Paragraph::new(render_form_text(form, &view_data.pickers))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(body, area);
    }

    if let Some(overlay) = &view_data.vaccination {
        let area = centered_rect(60, 55, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(render_vaccination_text(overlay, &view_data.pickers))
            .block(Block::default().title("vaccinate").borders(Borders::ALL));
        frame.render_widget(body, area);
    }

    if let Some(confirm) = view_data.confirm_delete {
        let area = centered_rect(44, 20, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(format!(
            "delete {} record {}? (y/n)",
            confirm.tab.label(),
            confirm.row_id
        ))
        .block(Block::default().title("confirm").borders(Borders::ALL));
        frame.render_widget(body, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 62, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_dashboard_text(state: &AppState, view_data: &ViewData) -> String {
    let counts = &view_data.dashboard_counts;
    [
        format!(
            "signed in as: {}",
            state.session.operator_email().unwrap_or("-")
        ),
        String::new(),
        format!("doctors: {}", counts.doctors),
        format!("staff: {}", counts.staff),
        format!("children: {}", counts.children),
        format!("mothers: {}", counts.mothers),
        format!("vaccines in stock: {}", counts.vaccines_available),
        format!("medicine units: {}", counts.medicine_units),
    ]
    .join("\n")
}

fn render_login_text(login: &LoginUiState) -> String {
    let email_marker = if login.field_cursor == 0 { ">" } else { " " };
    let password_marker = if login.field_cursor == 1 { ">" } else { " " };
    [
        format!("{email_marker} email: {}", login.email),
        format!(
            "{password_marker} password: {}",
            "*".repeat(login.password.chars().count())
        ),
        String::new(),
        "Enter sign in  Tab switch field".to_owned(),
    ]
    .join("\n")
}

fn form_overlay_title(form: &FormUiState) -> String {
    let noun = match form.kind {
        FormKind::Doctor => "doctor",
        FormKind::Staff => "staff",
        FormKind::Child => "child",
        FormKind::Mother => "mother",
        FormKind::Vaccine => "vaccine",
        FormKind::Medicine => "medicine",
        FormKind::Vaccination => "vaccination",
    };
    match form.editing_id {
        Some(row_id) => format!("edit {noun} {row_id}"),
        None => format!("add {noun}"),
    }
}

fn render_form_text(form: &FormUiState, pickers: &PickerData) -> String {
    let specs = form_field_specs(form.kind);
    let mut lines = Vec::with_capacity(specs.len() + 2);
    for (index, spec) in specs.iter().enumerate() {
        let marker = if index == form.field_cursor { ">" } else { " " };
        let value = form_field_display(spec.kind, &form.values[index], pickers);
        lines.push(format!("{marker} {}: {value}", spec.label));
    }
    lines.push(String::new());
    lines.push("Enter save  Esc cancel  Left/Right choices".to_owned());
    lines.join("\n")
}

fn form_field_display(kind: FormFieldKind, value: &str, pickers: &PickerData) -> String {
    match kind {
        FormFieldKind::Position => DoctorPosition::parse(value)
            .map(|position| position.label().to_owned())
            .unwrap_or_else(|| value.to_owned()),
        FormFieldKind::Role => StaffRole::parse(value)
            .map(|role| role.label().to_owned())
            .unwrap_or_else(|| value.to_owned()),
        FormFieldKind::Category => VaccineCategory::parse(value)
            .map(|category| category.label().to_owned())
            .unwrap_or_else(|| value.to_owned()),
        FormFieldKind::DoctorRef => value
            .parse()
            .ok()
            .map(|id: i64| format!("{id} ({})", lookup_name(&pickers.doctors, DoctorId::new(id))))
            .unwrap_or_else(|| "(none)".to_owned()),
        FormFieldKind::StaffRef => value
            .parse()
            .ok()
            .map(|id: i64| format!("{id} ({})", lookup_name(&pickers.staff, StaffId::new(id))))
            .unwrap_or_else(|| "(none)".to_owned()),
        _ => value.to_owned(),
    }
}

fn render_vaccination_text(overlay: &VaccinationUiState, pickers: &PickerData) -> String {
    let marker = |index: usize| if overlay.field_cursor == index { ">" } else { " " };
    let target = match overlay.mode {
        VaccineCategory::Child => overlay
            .child_choice
            .map(|id| format!("{} ({})", id.get(), lookup_name(&pickers.children, id)))
            .unwrap_or_else(|| "(none)".to_owned()),
        VaccineCategory::Mother => overlay
            .mother_choice
            .map(|id| format!("{} ({})", id.get(), lookup_name(&pickers.mothers, id)))
            .unwrap_or_else(|| "(none)".to_owned()),
    };
    let vaccine = overlay
        .vaccine_choice
        .and_then(|id| pickers.vaccines.iter().find(|vaccine| vaccine.id == id))
        .map(|vaccine| format!("{} ({} in stock)", vaccine.name, vaccine.quantity))
        .unwrap_or_else(|| "(none available)".to_owned());
    [
        format!("mode: {} (press m to switch)", overlay.mode.label()),
        String::new(),
        format!("{} target: {target}", marker(0)),
        format!("{} vaccine: {vaccine}", marker(1)),
        format!("{} date: {}", marker(2), overlay.date_text),
        format!("{} notes: {}", marker(3), overlay.notes),
        String::new(),
        "Enter record  Esc cancel  Left/Right choices".to_owned(),
    ]
    .join("\n")
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let Some(projection) = active_projection(view_data) else {
        let empty = Paragraph::new("no data loaded")
            .block(Block::default().borders(Borders::ALL).title("records"));
        frame.render_widget(empty, area);
        return;
    };

    let header = Row::new(
        projection
            .headers
            .iter()
            .map(|label| Cell::from(*label))
            .collect::<Vec<Cell>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = projection
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let cells = row
                .cells
                .iter()
                .map(|cell| Cell::from(cell.clone()))
                .collect::<Vec<Cell>>();
            let mut table_row = Row::new(cells);
            if index == view_data.selected_row {
                table_row = table_row.style(Style::default().add_modifier(Modifier::REVERSED));
            }
            table_row
        })
        .collect::<Vec<Row>>();

    let column_count = projection.headers.len() as u32;
    let widths = projection
        .headers
        .iter()
        .map(|_| Constraint::Ratio(1, column_count))
        .collect::<Vec<Constraint>>();

    let title = table_title(state, view_data, projection.rows.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

fn table_title(state: &AppState, view_data: &ViewData, visible_rows: usize) -> String {
    let total = view_data
        .active_tab_snapshot
        .as_ref()
        .map(TabSnapshot::row_count)
        .unwrap_or(0);
    if view_data.filter_query.is_empty() {
        format!("{} ({total})", state.active_tab.label())
    } else {
        format!(
            "{} ({visible_rows}/{total}, filter: {})",
            state.active_tab.label(),
            view_data.filter_query
        )
    }
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(status) = &state.status_line {
        return status.clone();
    }
    if !state.session.is_authenticated() {
        return "enter any email and password to sign in".to_owned();
    }
    match state.mode {
        AppMode::Filter => format!("filter: {}▏ (Enter keep, Esc clear)", view_data.filter_query),
        AppMode::Form(_) => "Up/Down fields  Enter save  Esc cancel".to_owned(),
        AppMode::Nav => {
            "f/b tabs  j/k rows  / filter  a add  e edit  d delete  v vaccinate  L sign out  ? help  q quit"
                .to_owned()
        }
    }
}

fn help_overlay_text() -> &'static str {
    concat!(
        "navigation\n",
        "  f / b        next / previous tab\n",
        "  1-7          jump to tab\n",
        "  j / k        move row selection\n",
        "  r            reload from storage\n",
        "\n",
        "records\n",
        "  /            filter the current screen\n",
        "  a            add a record\n",
        "  e            edit the selected record\n",
        "  d            delete the selected record (asks y/n)\n",
        "  v            record a vaccination (vaccines tab)\n",
        "\n",
        "session\n",
        "  L            sign out\n",
        "  q / ctrl-q   quit\n",
    )
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, FormUiState, PickerData, TabSnapshot, VaccinationUiState, ViewData,
        cycle_form_choice, flip_vaccination_mode, form_field_specs, form_values_for,
        handle_login_key, parse_date, parse_form_payload, parse_optional_date, payload_for_row,
        projection_for_snapshot, vaccination_input_from, vaccine_choices,
    };
    use anyhow::Result;
    use clinica_app::{
        AppState, ChildId, DashboardCounts, DoctorId, FormKind, FormPayload, MotherId, StaffId,
        TabKind, VaccinationFormInput, VaccineCategory, VaccineId,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::mpsc;
    use clinica_store::{doctor_lookup, staff_lookup};
    use clinica_testkit::{
        sample_children, sample_doctors, sample_staff_members, sample_vaccines,
    };

    fn pickers() -> PickerData {
        let doctors = sample_doctors(3);
        let staff = sample_staff_members(4);
        PickerData {
            doctors: doctor_lookup(&doctors),
            staff: staff_lookup(&staff),
            children: sample_children(3, 3, 4)
                .iter()
                .map(|child| clinica_store::LookupValue {
                    id: child.id,
                    name: child.name.clone(),
                })
                .collect(),
            mothers: Vec::new(),
            vaccines: sample_vaccines(10),
        }
    }

    struct StaticRuntime;

    impl AppRuntime for StaticRuntime {
        fn load_dashboard_counts(&mut self) -> Result<DashboardCounts> {
            Ok(DashboardCounts::default())
        }

        fn load_tab_snapshot(&mut self, _tab: TabKind) -> Result<Option<TabSnapshot>> {
            Ok(None)
        }

        fn load_pickers(&mut self) -> Result<PickerData> {
            Ok(PickerData::default())
        }

        fn create_record(&mut self, _payload: &FormPayload) -> Result<()> {
            Ok(())
        }

        fn update_record(&mut self, _row_id: i64, _payload: &FormPayload) -> Result<()> {
            Ok(())
        }

        fn delete_record(&mut self, _tab: TabKind, _row_id: i64) -> Result<()> {
            Ok(())
        }

        fn record_vaccination(&mut self, _input: &VaccinationFormInput) -> Result<()> {
            Ok(())
        }
    }

    fn submit_login(email: &str, password: &str) -> AppState {
        let mut state = AppState::default();
        let mut runtime = StaticRuntime;
        let mut view_data = ViewData::default();
        let (internal_tx, _internal_rx) = mpsc::channel();

        view_data.login.email = email.to_owned();
        view_data.login.password = password.to_owned();
        handle_login_key(
            &mut state,
            &mut runtime,
            &mut view_data,
            &internal_tx,
            KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
        );
        state
    }

    #[test]
    fn sign_in_without_a_password_is_rejected() {
        let state = submit_login("admin@clinic.test", "");
        assert!(!state.session.is_authenticated());
        assert_eq!(
            state.status_line.as_deref(),
            Some("enter an email and a password to sign in")
        );
    }

    #[test]
    fn sign_in_with_a_blank_email_is_rejected() {
        let state = submit_login("   ", "hunter2");
        assert!(!state.session.is_authenticated());
        assert_eq!(
            state.status_line.as_deref(),
            Some("enter an email and a password to sign in")
        );
    }

    #[test]
    fn sign_in_with_both_fields_present_starts_a_session() {
        let state = submit_login(" admin@clinic.test ", "hunter2");
        assert!(state.session.is_authenticated());
        assert_eq!(state.session.operator_email(), Some("admin@clinic.test"));
    }

    #[test]
    fn doctor_projection_keeps_every_row_for_an_empty_query() {
        let doctors = sample_doctors(4);
        let snapshot = TabSnapshot::Doctors(doctors.clone());
        let projection = projection_for_snapshot(&snapshot, "", &PickerData::default());
        assert_eq!(projection.rows.len(), 4);
        assert_eq!(projection.rows[0].cells[1], doctors[0].name);
    }

    #[test]
    fn doctor_projection_narrows_by_name_substring() {
        let mut doctors = sample_doctors(3);
        doctors[1].name = "Dr. Jane Smith".to_owned();
        let snapshot = TabSnapshot::Doctors(doctors);
        let projection = projection_for_snapshot(&snapshot, "smith", &PickerData::default());
        assert_eq!(projection.rows.len(), 1);
        assert_eq!(projection.rows[0].cells[1], "Dr. Jane Smith");
    }

    #[test]
    fn child_projection_renders_dangling_references_as_placeholder() {
        let mut children = sample_children(1, 3, 4);
        children[0].doctor_id = DoctorId::new(99);
        let snapshot = TabSnapshot::Children(children);
        let projection = projection_for_snapshot(&snapshot, "", &pickers());
        assert_eq!(projection.rows[0].cells[5], "N/A");
        assert_ne!(projection.rows[0].cells[6], "N/A");
    }

    #[test]
    fn vaccine_choices_require_stock_and_matching_category() {
        let vaccines = sample_vaccines(10);
        for choice in vaccine_choices(&vaccines, VaccineCategory::Child) {
            assert!(choice.quantity > 0);
            assert_eq!(choice.category, VaccineCategory::Child);
        }
        let child_count = vaccine_choices(&vaccines, VaccineCategory::Child).len();
        let mother_count = vaccine_choices(&vaccines, VaccineCategory::Mother).len();
        assert!(child_count + mother_count < vaccines.len());
    }

    #[test]
    fn form_values_round_trip_through_parsing() {
        let doctors = sample_doctors(2);
        let snapshot = TabSnapshot::Doctors(doctors.clone());
        let payload = payload_for_row(&snapshot, 2).expect("row 2 exists");

        let values = form_values_for(&payload);
        assert_eq!(values.len(), form_field_specs(FormKind::Doctor).len());
        let reparsed = parse_form_payload(FormKind::Doctor, &values).expect("values parse back");
        assert_eq!(reparsed, payload);
    }

    #[test]
    fn mother_form_accepts_blank_optional_dates() {
        let values = vec![
            "Maya Reed".to_owned(),
            "29".to_owned(),
            "4 Elm Street".to_owned(),
            "071 222 3333".to_owned(),
            "2".to_owned(),
            "2026-02-10".to_owned(),
            String::new(),
            String::new(),
            "1".to_owned(),
            "1".to_owned(),
        ];
        let payload = parse_form_payload(FormKind::Mother, &values).expect("values parse");
        let FormPayload::Mother(mother) = payload else {
            panic!("expected a mother payload");
        };
        assert!(mother.delivery_date.is_none());
        assert!(mother.clinic_date.is_none());
        assert!(mother.validate().is_ok());
    }

    #[test]
    fn date_parsing_rejects_other_layouts() {
        assert!(parse_date("2026-03-20").is_ok());
        assert!(parse_date("20/03/2026").is_err());
        assert!(parse_optional_date("expiry", "").expect("blank allowed").is_none());
        assert!(parse_optional_date("expiry", "soon").is_err());
    }

    #[test]
    fn choice_cycling_wraps_over_the_option_list() {
        let pickers = pickers();
        let mut form = FormUiState {
            kind: FormKind::Doctor,
            editing_id: None,
            field_cursor: 2,
            values: form_values_for(&FormPayload::blank_for(FormKind::Doctor)),
        };
        assert_eq!(form.values[2], "general_physician");

        cycle_form_choice(&mut form, &pickers, -1);
        assert_eq!(form.values[2], "neurologist");
        cycle_form_choice(&mut form, &pickers, 1);
        assert_eq!(form.values[2], "general_physician");
    }

    #[test]
    fn mode_flip_keeps_the_inactive_target_choice() {
        let pickers = pickers();
        let mut overlay = VaccinationUiState {
            mode: VaccineCategory::Child,
            child_choice: Some(ChildId::new(2)),
            mother_choice: None,
            vaccine_choice: Some(VaccineId::new(1)),
            field_cursor: 0,
            date_text: "2026-05-01".to_owned(),
            notes: "routine".to_owned(),
        };

        flip_vaccination_mode(&mut overlay, &pickers);
        assert_eq!(overlay.mode, VaccineCategory::Mother);
        assert_eq!(overlay.child_choice, Some(ChildId::new(2)));

        flip_vaccination_mode(&mut overlay, &pickers);
        assert_eq!(overlay.mode, VaccineCategory::Child);
        assert_eq!(overlay.child_choice, Some(ChildId::new(2)));
    }

    #[test]
    fn vaccination_input_carries_both_target_ids() {
        let overlay = VaccinationUiState {
            mode: VaccineCategory::Mother,
            child_choice: Some(ChildId::new(3)),
            mother_choice: Some(MotherId::new(5)),
            vaccine_choice: Some(VaccineId::new(3)),
            field_cursor: 0,
            date_text: "2026-04-12".to_owned(),
            notes: "tetanus booster".to_owned(),
        };
        let input = vaccination_input_from(&overlay).expect("input builds");
        assert_eq!(input.mode, VaccineCategory::Mother);
        assert_eq!(input.child_id, Some(ChildId::new(3)));
        assert_eq!(input.mother_id, Some(MotherId::new(5)));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn child_form_parses_foreign_key_references() {
        let values = vec![
            "Avery Walker".to_owned(),
            "Jordan Walker".to_owned(),
            "071 555 1234".to_owned(),
            "9 Pine Street".to_owned(),
            "18".to_owned(),
            "pending".to_owned(),
            "2".to_owned(),
            "3".to_owned(),
        ];
        let payload = parse_form_payload(FormKind::Child, &values).expect("values parse");
        let FormPayload::Child(child) = payload else {
            panic!("expected a child payload");
        };
        assert_eq!(child.doctor_id, DoctorId::new(2));
        assert_eq!(child.staff_id, StaffId::new(3));
    }
}
