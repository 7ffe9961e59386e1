mod query_editor;

use crate::domain::{
    FileChange, MessageView, ProjectSummary, SearchResult, SessionDetail, SessionSource,
    SessionSummary, TimelineGroup, UsageDetail, UsageSummary, assemble_transcript, group_sessions,
};
use crate::infra::{Preferences, UsageCache, ViewMode};
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::BTreeSet;
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;
use time::Date;

pub use query_editor::QueryEditor;

pub const COPY_FEEDBACK_TTL: Duration = Duration::from_secs(2);
pub const DAY_RANGES: &[u32] = &[7, 30, 90, 365];

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ResolveStateDir(#[from] crate::infra::ResolveStateDirError),
}

/// Side effects requested by the model; the main loop executes them and
/// feeds results back through the `apply_*` methods.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppCommand {
    FetchHome {
        seq: u64,
        project: Option<String>,
        source: SessionSource,
    },
    FetchSearch {
        seq: u64,
        query: String,
        source: SessionSource,
    },
    FetchSessionDetail {
        seq: u64,
        id: String,
        source: SessionSource,
    },
    FetchUsageSummary {
        seq: u64,
        source: SessionSource,
    },
    FetchUsageDetail {
        seq: u64,
        days: u32,
        source: SessionSource,
    },
    /// Fetch the compacted context, then place it on the clipboard.
    FetchContext {
        seq: u64,
        session_id: String,
    },
    /// Synchronous clipboard write of a message body.
    CopyMessage {
        uuid: String,
        text: String,
    },
    SavePreferences,
    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HomePayload {
    pub sessions: Vec<SessionSummary>,
    pub projects: Vec<ProjectSummary>,
}

/// Sidebar usage summary state on the home view.
#[derive(Clone, Debug, PartialEq)]
pub enum UsagePanel {
    Loading,
    Ready(UsageSummary),
    Failed(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HomeRow {
    GroupHeader(usize),
    TimelineSession { group: usize, index: usize },
    Session(usize),
    SearchResult(usize),
}

#[derive(Clone, Debug)]
pub struct HomeView {
    pub loading: bool,
    pub error: Option<String>,
    pub sessions: Vec<SessionSummary>,
    pub projects: Vec<ProjectSummary>,
    pub selected_project: Option<String>,
    pub groups: Vec<TimelineGroup>,
    pub collapsed: BTreeSet<String>,
    pub search: QueryEditor,
    pub searching: bool,
    pub search_loading: bool,
    pub search_results: Option<(String, Vec<SearchResult>)>,
    pub selected: usize,
    pub usage: UsagePanel,
}

impl HomeView {
    fn new() -> Self {
        Self {
            loading: true,
            error: None,
            sessions: Vec::new(),
            projects: Vec::new(),
            selected_project: None,
            groups: Vec::new(),
            collapsed: BTreeSet::new(),
            search: QueryEditor::default(),
            searching: false,
            search_loading: false,
            search_results: None,
            selected: 0,
            usage: UsagePanel::Loading,
        }
    }

    /// The navigable rows for the current mode, in render order.
    pub fn rows(&self, view_mode: ViewMode) -> Vec<HomeRow> {
        if let Some((_, results)) = &self.search_results {
            return (0..results.len()).map(HomeRow::SearchResult).collect();
        }

        match view_mode {
            ViewMode::Projects => (0..self.sessions.len()).map(HomeRow::Session).collect(),
            ViewMode::Timeline => {
                let mut rows = Vec::new();
                for (group_index, group) in self.groups.iter().enumerate() {
                    rows.push(HomeRow::GroupHeader(group_index));
                    if self.collapsed.contains(&group.label.title()) {
                        continue;
                    }
                    for index in 0..group.sessions.len() {
                        rows.push(HomeRow::TimelineSession {
                            group: group_index,
                            index,
                        });
                    }
                }
                rows
            }
        }
    }

    pub fn session_at(&self, row: HomeRow) -> Option<&SessionSummary> {
        match row {
            HomeRow::Session(index) => self.sessions.get(index),
            HomeRow::TimelineSession { group, index } => self
                .groups
                .get(group)
                .and_then(|group| group.sessions.get(index)),
            HomeRow::GroupHeader(_) | HomeRow::SearchResult(_) => None,
        }
    }

    fn rebuild_groups(&mut self, today: Date) {
        self.groups = group_sessions(today, &self.sessions);
    }

    fn clamp_selection(&mut self, view_mode: ViewMode) {
        let row_count = self.rows(view_mode).len();
        if row_count == 0 {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(row_count - 1);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionRow {
    Message(usize),
    Tool { message: usize, tool: usize },
    FileChange(usize),
}

/// Transient copy state for the "copy compacted context" action.
#[derive(Clone, Debug, PartialEq)]
pub enum ContextCopyState {
    Idle,
    Loading,
    Copied(Instant),
    Failed(String, Instant),
}

#[derive(Clone, Debug)]
pub struct SessionView {
    pub session_id: String,
    pub source: SessionSource,
    pub loading: bool,
    pub error: Option<String>,
    pub title: String,
    pub project_name: String,
    pub messages: Vec<MessageView>,
    pub file_changes: Vec<FileChange>,
    pub selected: usize,
    /// Expanded tool-call cards, by tool-call id.
    pub expanded: BTreeSet<String>,
    /// Message uuid with an active "copied" indicator.
    pub copied: Option<(String, Instant)>,
    pub context_copy: ContextCopyState,
}

impl SessionView {
    fn new(session_id: String, source: SessionSource) -> Self {
        Self {
            session_id,
            source,
            loading: true,
            error: None,
            title: String::new(),
            project_name: String::new(),
            messages: Vec::new(),
            file_changes: Vec::new(),
            selected: 0,
            expanded: BTreeSet::new(),
            copied: None,
            context_copy: ContextCopyState::Idle,
        }
    }

    pub fn rows(&self) -> Vec<SessionRow> {
        let mut rows = Vec::new();
        for (message_index, message) in self.messages.iter().enumerate() {
            rows.push(SessionRow::Message(message_index));
            for tool_index in 0..message.tool_calls.len() {
                rows.push(SessionRow::Tool {
                    message: message_index,
                    tool: tool_index,
                });
            }
        }
        for index in 0..self.file_changes.len() {
            rows.push(SessionRow::FileChange(index));
        }
        rows
    }

    pub fn is_copied(&self, uuid: &str) -> bool {
        self.copied
            .as_ref()
            .is_some_and(|(copied_uuid, _)| copied_uuid == uuid)
    }

    fn clamp_selection(&mut self) {
        let row_count = self.rows().len();
        if row_count == 0 {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(row_count - 1);
        }
    }
}

#[derive(Clone, Debug)]
pub struct UsageView {
    pub source: SessionSource,
    pub days: u32,
    pub loading: bool,
    pub error: Option<String>,
    pub summary: Option<UsageSummary>,
    pub detail: Option<UsageDetail>,
}

#[derive(Clone, Debug)]
pub enum Route {
    Home,
    Session(SessionView),
    Usage(UsageView),
}

pub struct AppModel {
    pub home: HomeView,
    pub route: Route,
    pub prefs: Preferences,
    pub usage_cache: UsageCache,
    pub notice: Option<String>,
    /// When set, the notice auto-clears 2 seconds after this instant.
    notice_shown_at: Option<Instant>,
    pub help_open: bool,

    // Request-sequence tokens: only the response matching the latest issued
    // token for its fetch kind may update visible state.
    next_seq: u64,
    home_seq: u64,
    search_seq: u64,
    detail_seq: u64,
    usage_summary_seq: u64,
    usage_detail_seq: u64,
    context_seq: u64,
}

impl AppModel {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            home: HomeView::new(),
            route: Route::Home,
            prefs,
            usage_cache: UsageCache::default(),
            notice: None,
            notice_shown_at: None,
            help_open: false,
            next_seq: 0,
            home_seq: 0,
            search_seq: 0,
            detail_seq: 0,
            usage_summary_seq: 0,
            usage_detail_seq: 0,
            context_seq: 0,
        }
    }

    fn issue_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    pub fn set_transient_notice(&mut self, text: String, now: Instant) {
        self.notice = Some(text);
        self.notice_shown_at = Some(now);
    }

    /// Commands to run at startup: initial session list plus the sidebar
    /// usage summary (cache first).
    pub fn initial_commands(&mut self, now: SystemTime) -> Vec<AppCommand> {
        let mut commands = vec![self.command_fetch_home()];
        commands.extend(self.command_usage_panel(now, false));
        commands
    }

    fn command_fetch_home(&mut self) -> AppCommand {
        let seq = self.issue_seq();
        self.home_seq = seq;
        self.home.loading = true;
        self.home.error = None;
        AppCommand::FetchHome {
            seq,
            project: self.home.selected_project.clone(),
            source: self.prefs.source,
        }
    }

    // Sidebar usage: serve from the cache when fresh, otherwise fetch.
    fn command_usage_panel(&mut self, now: SystemTime, force: bool) -> Vec<AppCommand> {
        if force {
            self.usage_cache.invalidate(self.prefs.source);
        }
        if let Some(summary) = self.usage_cache.get(self.prefs.source, now) {
            self.home.usage = UsagePanel::Ready(summary);
            return Vec::new();
        }
        self.home.usage = UsagePanel::Loading;
        let seq = self.issue_seq();
        self.usage_summary_seq = seq;
        vec![AppCommand::FetchUsageSummary {
            seq,
            source: self.prefs.source,
        }]
    }

    pub fn handle_key(&mut self, key: KeyEvent, today: Date, now: SystemTime) -> Vec<AppCommand> {
        if self.help_open {
            self.help_open = false;
            return Vec::new();
        }
        if key.code == KeyCode::Char('?') && !self.is_search_input_active() {
            self.help_open = true;
            return Vec::new();
        }

        match &self.route {
            Route::Home => self.handle_home_key(key, today, now),
            Route::Session(_) => self.handle_session_key(key),
            Route::Usage(_) => self.handle_usage_key(key, now),
        }
    }

    fn is_search_input_active(&self) -> bool {
        matches!(self.route, Route::Home) && self.home.searching
    }

    fn handle_home_key(&mut self, key: KeyEvent, today: Date, now: SystemTime) -> Vec<AppCommand> {
        if self.home.searching {
            return self.handle_search_input(key);
        }

        let view_mode = self.prefs.view_mode;
        match key.code {
            KeyCode::Char('q') => vec![AppCommand::Quit],
            KeyCode::Esc => {
                if self.home.search_results.is_some() {
                    self.home.search_results = None;
                    self.home.search.clear();
                    self.home.clamp_selection(view_mode);
                    Vec::new()
                } else {
                    vec![AppCommand::Quit]
                }
            }
            KeyCode::Char('/') => {
                self.home.searching = true;
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.home.selected = self.home.selected.saturating_sub(1);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.home.selected += 1;
                self.home.clamp_selection(view_mode);
                Vec::new()
            }
            KeyCode::Enter => self.open_selected_home_row(),
            KeyCode::Char('t') => {
                self.prefs.view_mode = self.prefs.view_mode.toggle();
                if self.prefs.view_mode == ViewMode::Timeline {
                    // Timeline shows every session, without project filter.
                    self.home.selected_project = None;
                    self.home.rebuild_groups(today);
                    let mut commands = vec![self.command_fetch_home()];
                    commands.push(AppCommand::SavePreferences);
                    return commands;
                }
                self.home.clamp_selection(self.prefs.view_mode);
                vec![AppCommand::SavePreferences]
            }
            KeyCode::Char('s') => {
                self.prefs.source = self.prefs.source.cycle();
                self.home.search_results = None;
                self.home.search.clear();
                self.home.selected_project = None;
                self.home.selected = 0;
                let mut commands = vec![self.command_fetch_home()];
                commands.extend(self.command_usage_panel(now, false));
                commands.push(AppCommand::SavePreferences);
                commands
            }
            KeyCode::Char('p') => {
                if self.prefs.view_mode != ViewMode::Projects {
                    return Vec::new();
                }
                self.home.selected_project = next_project_filter(
                    &self.home.projects,
                    self.home.selected_project.as_deref(),
                );
                self.home.selected = 0;
                vec![self.command_fetch_home()]
            }
            KeyCode::Char('u') => self.open_usage_view(now),
            KeyCode::Char('r') => vec![self.command_fetch_home()],
            KeyCode::Char('R') => self.command_usage_panel(now, true),
            KeyCode::Char('c') => self.copy_selected_session_context(),
            _ => Vec::new(),
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent) -> Vec<AppCommand> {
        match key.code {
            KeyCode::Esc => {
                self.home.searching = false;
                self.home.search.clear();
                self.home.search_results = None;
                self.home.clamp_selection(self.prefs.view_mode);
                Vec::new()
            }
            KeyCode::Enter => {
                let query = self.home.search.text().to_string();
                self.home.searching = false;
                if query.trim().is_empty() {
                    self.home.search_results = None;
                    return Vec::new();
                }
                self.home.search_loading = true;
                self.home.selected = 0;
                let seq = self.issue_seq();
                self.search_seq = seq;
                vec![AppCommand::FetchSearch {
                    seq,
                    query,
                    source: self.prefs.source,
                }]
            }
            KeyCode::Backspace => {
                self.home.search.backspace();
                Vec::new()
            }
            KeyCode::Left => {
                self.home.search.move_left();
                Vec::new()
            }
            KeyCode::Right => {
                self.home.search.move_right();
                Vec::new()
            }
            KeyCode::Char(ch) => {
                self.home.search.insert_char(ch);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn open_selected_home_row(&mut self) -> Vec<AppCommand> {
        let rows = self.home.rows(self.prefs.view_mode);
        let Some(row) = rows.get(self.home.selected).copied() else {
            return Vec::new();
        };

        match row {
            HomeRow::GroupHeader(group_index) => {
                if let Some(group) = self.home.groups.get(group_index) {
                    let title = group.label.title();
                    if !self.home.collapsed.remove(&title) {
                        self.home.collapsed.insert(title);
                    }
                    self.home.clamp_selection(self.prefs.view_mode);
                }
                Vec::new()
            }
            HomeRow::SearchResult(index) => {
                let target = self
                    .home
                    .search_results
                    .as_ref()
                    .and_then(|(_, results)| results.get(index))
                    .map(|result| {
                        (
                            result.session_id.clone(),
                            result.source.unwrap_or(self.prefs.source),
                        )
                    });
                match target {
                    Some((id, source)) => self.open_session(id, source),
                    None => Vec::new(),
                }
            }
            HomeRow::Session(_) | HomeRow::TimelineSession { .. } => {
                let target = self.home.session_at(row).map(|session| {
                    (
                        session.id.clone(),
                        session.source.unwrap_or(self.prefs.source),
                    )
                });
                match target {
                    Some((id, source)) => self.open_session(id, source),
                    None => Vec::new(),
                }
            }
        }
    }

    fn open_session(&mut self, id: String, source: SessionSource) -> Vec<AppCommand> {
        let seq = self.issue_seq();
        self.detail_seq = seq;
        self.route = Route::Session(SessionView::new(id.clone(), source));
        vec![AppCommand::FetchSessionDetail { seq, id, source }]
    }

    fn open_usage_view(&mut self, _now: SystemTime) -> Vec<AppCommand> {
        let source = self.prefs.source;
        let days = DAY_RANGES.get(1).copied().unwrap_or(30);
        self.route = Route::Usage(UsageView {
            source,
            days,
            loading: true,
            error: None,
            summary: None,
            detail: None,
        });
        self.fetch_usage_view(days, source)
    }

    // The usage view always fetches fresh; the cache only backs the home
    // sidebar panel.
    fn fetch_usage_view(&mut self, days: u32, source: SessionSource) -> Vec<AppCommand> {
        let summary_seq = self.issue_seq();
        self.usage_summary_seq = summary_seq;
        let detail_seq = self.issue_seq();
        self.usage_detail_seq = detail_seq;
        vec![
            AppCommand::FetchUsageSummary {
                seq: summary_seq,
                source,
            },
            AppCommand::FetchUsageDetail {
                seq: detail_seq,
                days,
                source,
            },
        ]
    }

    fn copy_selected_session_context(&mut self) -> Vec<AppCommand> {
        let rows = self.home.rows(self.prefs.view_mode);
        let Some(row) = rows.get(self.home.selected).copied() else {
            return Vec::new();
        };
        let session_id = match row {
            HomeRow::SearchResult(index) => self
                .home
                .search_results
                .as_ref()
                .and_then(|(_, results)| results.get(index))
                .map(|result| result.session_id.clone()),
            _ => self.home.session_at(row).map(|session| session.id.clone()),
        };
        let Some(session_id) = session_id else {
            return Vec::new();
        };
        let seq = self.issue_seq();
        self.context_seq = seq;
        self.notice = Some("fetching context...".to_string());
        self.notice_shown_at = None;
        vec![AppCommand::FetchContext { seq, session_id }]
    }

    fn handle_session_key(&mut self, key: KeyEvent) -> Vec<AppCommand> {
        let Route::Session(view) = &mut self.route else {
            return Vec::new();
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.route = Route::Home;
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                view.selected = view.selected.saturating_sub(1);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                view.selected += 1;
                view.clamp_selection();
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let rows = view.rows();
                if let Some(SessionRow::Tool { message, tool }) =
                    rows.get(view.selected).copied()
                {
                    let id = view
                        .messages
                        .get(message)
                        .and_then(|msg| msg.tool_calls.get(tool))
                        .map(|tool_view| tool_view.id.clone());
                    if let Some(id) = id {
                        if !view.expanded.remove(&id) {
                            view.expanded.insert(id);
                        }
                    }
                }
                Vec::new()
            }
            KeyCode::Char('y') => {
                let rows = view.rows();
                let message_index = match rows.get(view.selected).copied() {
                    Some(SessionRow::Message(index)) => Some(index),
                    Some(SessionRow::Tool { message, .. }) => Some(message),
                    _ => None,
                };
                let Some(message) = message_index.and_then(|index| view.messages.get(index))
                else {
                    return Vec::new();
                };
                vec![AppCommand::CopyMessage {
                    uuid: message.uuid.clone(),
                    text: message.content.clone(),
                }]
            }
            KeyCode::Char('c') => {
                view.context_copy = ContextCopyState::Loading;
                let session_id = view.session_id.clone();
                let seq = self.issue_seq();
                self.context_seq = seq;
                vec![AppCommand::FetchContext { seq, session_id }]
            }
            KeyCode::Char('r') => {
                let id = view.session_id.clone();
                let source = view.source;
                view.loading = true;
                view.error = None;
                let seq = self.issue_seq();
                self.detail_seq = seq;
                vec![AppCommand::FetchSessionDetail { seq, id, source }]
            }
            _ => Vec::new(),
        }
    }

    fn handle_usage_key(&mut self, key: KeyEvent, now: SystemTime) -> Vec<AppCommand> {
        let Route::Usage(view) = &mut self.route else {
            return Vec::new();
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.route = Route::Home;
                // The home sidebar may be stale for the source browsed here.
                self.command_usage_panel(now, false)
            }
            KeyCode::Char('d') => {
                let next = next_day_range(view.days);
                view.days = next;
                view.loading = true;
                view.error = None;
                let source = view.source;
                self.fetch_usage_view(next, source)
            }
            KeyCode::Char('s') => {
                view.source = view.source.cycle();
                view.loading = true;
                view.error = None;
                let days = view.days;
                let source = view.source;
                self.fetch_usage_view(days, source)
            }
            KeyCode::Char('r') => {
                view.loading = true;
                view.error = None;
                let days = view.days;
                let source = view.source;
                self.fetch_usage_view(days, source)
            }
            _ => Vec::new(),
        }
    }

    pub fn apply_home_loaded(
        &mut self,
        seq: u64,
        result: Result<HomePayload, String>,
        today: Date,
    ) {
        if seq != self.home_seq {
            return;
        }
        self.home.loading = false;
        match result {
            Ok(payload) => {
                self.home.sessions = payload.sessions;
                self.home.projects = payload.projects;
                self.home.error = None;
                self.home.rebuild_groups(today);
                self.home.clamp_selection(self.prefs.view_mode);
            }
            Err(error) => {
                self.home.error = Some(error);
            }
        }
    }

    pub fn apply_search_loaded(
        &mut self,
        seq: u64,
        query: String,
        result: Result<Vec<SearchResult>, String>,
    ) {
        if seq != self.search_seq {
            return;
        }
        self.home.search_loading = false;
        match result {
            Ok(results) => {
                self.home.search_results = Some((query, results));
                self.home.selected = 0;
            }
            Err(error) => {
                self.home.error = Some(error);
            }
        }
    }

    pub fn apply_detail_loaded(&mut self, seq: u64, result: Result<SessionDetail, String>) {
        if seq != self.detail_seq {
            return;
        }
        let Route::Session(view) = &mut self.route else {
            return;
        };
        view.loading = false;
        match result {
            Ok(detail) => {
                view.title = detail.title.clone();
                view.project_name = detail.project_name.clone();
                view.messages = assemble_transcript(&detail);
                view.file_changes = detail.file_changes;
                view.error = None;
                view.clamp_selection();
            }
            Err(error) => {
                view.error = Some(error);
            }
        }
    }

    pub fn apply_usage_summary_loaded(
        &mut self,
        seq: u64,
        source: SessionSource,
        result: Result<UsageSummary, String>,
        now: SystemTime,
    ) {
        if seq != self.usage_summary_seq {
            return;
        }
        match result {
            Ok(summary) => {
                self.usage_cache.insert(source, summary, now);
                if let Route::Usage(view) = &mut self.route {
                    if view.source == source {
                        view.summary = Some(summary);
                        view.loading = view.detail.is_none();
                    }
                }
                if source == self.prefs.source {
                    self.home.usage = UsagePanel::Ready(summary);
                }
            }
            Err(error) => {
                if let Route::Usage(view) = &mut self.route {
                    if view.source == source {
                        view.loading = false;
                        view.error = Some(error.clone());
                    }
                }
                if source == self.prefs.source {
                    self.home.usage = UsagePanel::Failed(error);
                }
            }
        }
    }

    pub fn apply_usage_detail_loaded(&mut self, seq: u64, result: Result<UsageDetail, String>) {
        if seq != self.usage_detail_seq {
            return;
        }
        let Route::Usage(view) = &mut self.route else {
            return;
        };
        match result {
            Ok(detail) => {
                view.detail = Some(detail);
                view.loading = false;
                view.error = None;
            }
            Err(error) => {
                view.loading = false;
                view.error = Some(error);
            }
        }
    }

    pub fn apply_context_copied(&mut self, seq: u64, result: Result<(), String>, now: Instant) {
        if seq != self.context_seq {
            return;
        }
        self.notice = None;
        self.notice_shown_at = None;
        match &mut self.route {
            Route::Session(view) => {
                view.context_copy = match result {
                    Ok(()) => ContextCopyState::Copied(now),
                    Err(error) => ContextCopyState::Failed(error, now),
                };
            }
            _ => {
                let text = match result {
                    Ok(()) => "context copied".to_string(),
                    Err(error) => format!("copy failed: {error}"),
                };
                self.set_transient_notice(text, now);
            }
        }
    }

    pub fn apply_message_copied(&mut self, uuid: String, result: Result<(), String>, now: Instant) {
        let Route::Session(view) = &mut self.route else {
            return;
        };
        match result {
            Ok(()) => view.copied = Some((uuid, now)),
            Err(error) => {
                view.copied = None;
                self.set_transient_notice(format!("copy failed: {error}"), now);
            }
        }
    }

    /// Clears transient indicators that have outlived their 2-second window.
    pub fn tick(&mut self, now: Instant) {
        if let Some(at) = self.notice_shown_at {
            if now.duration_since(at) >= COPY_FEEDBACK_TTL {
                self.notice = None;
                self.notice_shown_at = None;
            }
        }
        if let Route::Session(view) = &mut self.route {
            if let Some((_, at)) = &view.copied {
                if now.duration_since(*at) >= COPY_FEEDBACK_TTL {
                    view.copied = None;
                }
            }
            match &view.context_copy {
                ContextCopyState::Copied(at) | ContextCopyState::Failed(_, at) => {
                    if now.duration_since(*at) >= COPY_FEEDBACK_TTL {
                        view.context_copy = ContextCopyState::Idle;
                    }
                }
                _ => {}
            }
        }
    }
}

fn next_project_filter(projects: &[ProjectSummary], current: Option<&str>) -> Option<String> {
    if projects.is_empty() {
        return None;
    }
    match current {
        None => projects.first().map(|project| project.path.clone()),
        Some(path) => {
            let position = projects.iter().position(|project| project.path == path);
            match position {
                Some(index) if index + 1 < projects.len() => {
                    Some(projects[index + 1].path.clone())
                }
                _ => None,
            }
        }
    }
}

fn next_day_range(days: u32) -> u32 {
    let position = DAY_RANGES.iter().position(|range| *range == days);
    match position {
        Some(index) => DAY_RANGES[(index + 1) % DAY_RANGES.len()],
        None => DAY_RANGES[0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use time::macros::date;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn summary(id: &str, updated_at: &str) -> SessionSummary {
        SessionSummary {
            id: id.to_string(),
            project_path: "/p".to_string(),
            project_name: "p".to_string(),
            title: format!("session {id}"),
            created_at: updated_at.to_string(),
            updated_at: updated_at.to_string(),
            message_count: 1,
            tool_calls: Vec::new(),
            source: None,
        }
    }

    fn loaded_model() -> AppModel {
        let mut model = AppModel::new(Preferences::default());
        let _ = model.initial_commands(SystemTime::UNIX_EPOCH);
        model.apply_home_loaded(
            1,
            Ok(HomePayload {
                sessions: vec![
                    summary("a", "2025-06-15T10:00:00Z"),
                    summary("b", "2025-06-14T10:00:00Z"),
                ],
                projects: vec![ProjectSummary {
                    path: "/p".to_string(),
                    name: "p".to_string(),
                    session_count: 2,
                }],
            }),
            date!(2025 - 06 - 15),
        );
        model
    }

    #[test]
    fn stale_home_response_is_discarded() {
        let mut model = loaded_model();
        // Issue a refresh; its seq supersedes the initial fetch.
        let commands = model.handle_key(
            key(KeyCode::Char('r')),
            date!(2025 - 06 - 15),
            SystemTime::UNIX_EPOCH,
        );
        assert!(matches!(commands[0], AppCommand::FetchHome { .. }));

        // A late response carrying the old token must not clobber state.
        model.apply_home_loaded(
            1,
            Ok(HomePayload {
                sessions: Vec::new(),
                projects: Vec::new(),
            }),
            date!(2025 - 06 - 15),
        );
        assert_eq!(model.home.sessions.len(), 2);
    }

    #[test]
    fn enter_on_session_row_opens_detail() {
        let mut model = loaded_model();
        let commands = model.handle_key(
            key(KeyCode::Enter),
            date!(2025 - 06 - 15),
            SystemTime::UNIX_EPOCH,
        );
        assert!(matches!(
            commands.as_slice(),
            [AppCommand::FetchSessionDetail { id, .. }] if id == "a"
        ));
        assert!(matches!(model.route, Route::Session(_)));
    }

    #[test]
    fn fetch_failure_surfaces_inline_not_fatal() {
        let mut model = AppModel::new(Preferences::default());
        let _ = model.initial_commands(SystemTime::UNIX_EPOCH);
        model.apply_home_loaded(1, Err("request failed: refused".to_string()), date!(2025 - 06 - 15));
        assert_eq!(
            model.home.error.as_deref(),
            Some("request failed: refused")
        );
        assert!(!model.home.loading);
    }

    #[test]
    fn copy_feedback_reverts_after_two_seconds() {
        let mut model = loaded_model();
        let _ = model.handle_key(
            key(KeyCode::Enter),
            date!(2025 - 06 - 15),
            SystemTime::UNIX_EPOCH,
        );
        let start = Instant::now();
        model.apply_message_copied("m1".to_string(), Ok(()), start);
        let Route::Session(view) = &model.route else {
            panic!("expected session route");
        };
        assert!(view.is_copied("m1"));

        model.tick(start + Duration::from_millis(1999));
        let Route::Session(view) = &model.route else {
            panic!("expected session route");
        };
        assert!(view.is_copied("m1"));

        model.tick(start + Duration::from_secs(2));
        let Route::Session(view) = &model.route else {
            panic!("expected session route");
        };
        assert!(!view.is_copied("m1"));
    }

    #[test]
    fn usage_panel_serves_from_cache_within_ttl() {
        let mut model = loaded_model();
        let now = SystemTime::UNIX_EPOCH;
        model.apply_usage_summary_loaded(2, SessionSource::Claude, Ok(UsageSummary::default()), now);
        assert!(matches!(model.home.usage, UsagePanel::Ready(_)));

        // Cycling source and back within the TTL issues no summary fetch for
        // the cached source.
        let commands = model.command_usage_panel(now, false);
        assert!(commands.is_empty());

        let commands = model.command_usage_panel(now, true);
        assert!(matches!(
            commands.as_slice(),
            [AppCommand::FetchUsageSummary { .. }]
        ));
    }

    #[test]
    fn stale_usage_detail_is_discarded_after_range_change() {
        let mut model = loaded_model();
        let _ = model.handle_key(
            key(KeyCode::Char('u')),
            date!(2025 - 06 - 15),
            SystemTime::UNIX_EPOCH,
        );
        let Route::Usage(view) = &model.route else {
            panic!("expected usage route");
        };
        assert_eq!(view.days, 30);
        let first_detail_seq = model.usage_detail_seq;

        // Change the day range while the first fetch is still in flight.
        let _ = model.handle_key(
            key(KeyCode::Char('d')),
            date!(2025 - 06 - 15),
            SystemTime::UNIX_EPOCH,
        );
        model.apply_usage_detail_loaded(first_detail_seq, Ok(UsageDetail::default()));
        let Route::Usage(view) = &model.route else {
            panic!("expected usage route");
        };
        assert!(view.detail.is_none());
        assert!(view.loading);

        model.apply_usage_detail_loaded(model.usage_detail_seq, Ok(UsageDetail::default()));
        let Route::Usage(view) = &model.route else {
            panic!("expected usage route");
        };
        assert!(view.detail.is_some());
    }

    #[test]
    fn group_header_toggle_collapses_sessions() {
        let mut model = loaded_model();
        model.prefs.view_mode = ViewMode::Timeline;
        model.home.rebuild_groups(date!(2025 - 06 - 15));
        let rows = model.home.rows(ViewMode::Timeline);
        assert!(matches!(rows[0], HomeRow::GroupHeader(0)));
        let before = rows.len();

        model.home.selected = 0;
        let _ = model.handle_key(
            key(KeyCode::Enter),
            date!(2025 - 06 - 15),
            SystemTime::UNIX_EPOCH,
        );
        let after = model.home.rows(ViewMode::Timeline).len();
        assert!(after < before);
    }

    #[test]
    fn day_ranges_cycle_in_order() {
        assert_eq!(next_day_range(7), 30);
        assert_eq!(next_day_range(365), 7);
        assert_eq!(next_day_range(42), 7);
    }
}
