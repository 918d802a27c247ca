// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FormKind, TabKind};

/// Process-wide session, created unauthenticated at startup and torn down on
/// logout. Screens only read it; the two session commands are the sole writers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    operator_email: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.operator_email.is_some()
    }

    pub fn operator_email(&self) -> Option<&str> {
        self.operator_email.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Filter,
    Form(FormKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub session: Session,
    pub mode: AppMode,
    pub active_tab: TabKind,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: Session::default(),
            mode: AppMode::Nav,
            active_tab: TabKind::Dashboard,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SignIn { email: String },
    LogOut,
    NextTab,
    PrevTab,
    SelectTab(TabKind),
    OpenForm(FormKind),
    EnterFilter,
    ExitToNav,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    SessionStarted(String),
    SessionEnded,
    ModeChanged(AppMode),
    TabChanged(TabKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SignIn { email } => {
                self.session = Session {
                    operator_email: Some(email.clone()),
                };
                vec![
                    AppEvent::SessionStarted(email),
                    self.set_status("signed in"),
                ]
            }
            AppCommand::LogOut => {
                // Logging out always lands back on the dashboard.
                self.session = Session::default();
                self.mode = AppMode::Nav;
                self.active_tab = TabKind::Dashboard;
                vec![
                    AppEvent::SessionEnded,
                    AppEvent::TabChanged(self.active_tab),
                    self.set_status("signed out"),
                ]
            }
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::SelectTab(tab) => {
                self.active_tab = tab;
                vec![AppEvent::TabChanged(tab)]
            }
            AppCommand::OpenForm(kind) => {
                self.mode = AppMode::Form(kind);
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::EnterFilter => {
                self.mode = AppMode::Filter;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![AppEvent::TabChanged(self.active_tab)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
