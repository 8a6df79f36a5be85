//! Terminal client: draws what the navigator presents and turns keys into session actions.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Handle;

use crate::error::ApplinError;
use crate::model::ActionSpec;
use crate::navigation::EntryId;
use crate::session::Session;

mod draw;
mod keymap;
use keymap::{UiCommand, map_key};

pub mod presenter;
pub use presenter::{
    OverlayView, PageView, Row, Screen, SharedScreen, TermWidget, TerminalPresenter, lock_screen,
};

/// Runs the UI on the current (blocking) thread until the user quits.
///
/// Session operations are spawned onto `handle`.
pub fn run(session: Session<TerminalPresenter>, screen: SharedScreen, handle: Handle) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("applin requires an interactive terminal (TTY)");
    }

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut app = App::new(session, screen, handle);
    let res = run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

pub(crate) struct App {
    session: Session<TerminalPresenter>,
    screen: SharedScreen,
    handle: Handle,
    errors_tx: mpsc::Sender<String>,
    errors_rx: mpsc::Receiver<String>,
    seen_top: Option<EntryId>,
    seen_overlay: Option<OverlayView>,
    pub(crate) selected: usize,
    pub(crate) modal_selected: usize,
    pub(crate) status: Option<String>,
    quit: bool,
}

impl App {
    fn new(session: Session<TerminalPresenter>, screen: SharedScreen, handle: Handle) -> Self {
        let (errors_tx, errors_rx) = mpsc::channel();
        Self {
            session,
            screen,
            handle,
            errors_tx,
            errors_rx,
            seen_top: None,
            seen_overlay: None,
            selected: 0,
            modal_selected: 0,
            status: None,
            quit: false,
        }
    }

    /// Resets selections when a different page or overlay comes up.
    fn sync_selection(&mut self, screen: &Screen) {
        let top = screen.top().map(|p| p.entry);
        if top != self.seen_top {
            self.seen_top = top;
            self.selected = 0;
        }
        if screen.overlay != self.seen_overlay {
            self.seen_overlay = screen.overlay.clone();
            self.modal_selected = 0;
        }
        while let Ok(msg) = self.errors_rx.try_recv() {
            self.status = Some(msg);
        }
    }

    fn spawn_op<F>(&self, label: &'static str, op: impl FnOnce(Session<TerminalPresenter>) -> F)
    where
        F: Future<Output = Result<(), ApplinError>> + Send + 'static,
    {
        let fut = op(self.session.clone());
        let errors = self.errors_tx.clone();
        self.handle.spawn(async move {
            if let Err(err) = fut.await {
                tracing::warn!(%err, op = label, "ui operation failed");
                errors.send(err.to_string()).ok();
            }
        });
    }

    fn run_actions(&self, actions: Vec<ActionSpec>) {
        if actions.is_empty() {
            return;
        }
        self.spawn_op("actions", move |session| async move {
            session.do_actions(&actions).await
        });
    }

    fn handle_key(&mut self, key: KeyEvent, screen: &Screen) {
        let cmd = map_key(key);
        if cmd != UiCommand::None {
            self.status = None;
        }
        match (&screen.overlay, cmd) {
            (_, UiCommand::Quit) => self.quit = true,
            (_, UiCommand::None) => {}

            // Only quitting gets through while the working indicator is up.
            (Some(OverlayView::Working(_)), _) => {}

            (Some(OverlayView::Modal { buttons, .. }), cmd) => {
                let n = buttons.len();
                match cmd {
                    UiCommand::PrevButton | UiCommand::Up if n > 0 => {
                        self.modal_selected = (self.modal_selected + n - 1) % n;
                    }
                    UiCommand::NextButton | UiCommand::Down if n > 0 => {
                        self.modal_selected = (self.modal_selected + 1) % n;
                    }
                    UiCommand::Activate => {
                        if let Some((_, actions)) = buttons.get(self.modal_selected) {
                            self.run_actions(actions.clone());
                        }
                    }
                    _ => {}
                }
            }

            (None, UiCommand::Up) => self.selected = self.selected.saturating_sub(1),
            (None, UiCommand::Down) => {
                let rows = screen.top().map(|p| p.rows.len()).unwrap_or(0);
                if self.selected + 1 < rows {
                    self.selected += 1;
                }
            }
            (None, UiCommand::Activate) => self.activate_row(screen),
            (None, UiCommand::Back) => self.back(screen),
            (None, UiCommand::Poll) => self.run_actions(vec![ActionSpec::Poll]),
            (None, UiCommand::PrevButton | UiCommand::NextButton) => {}
        }
    }

    fn activate_row(&self, screen: &Screen) {
        let Some(row) = screen.top().and_then(|p| p.rows.get(self.selected)) else {
            return;
        };
        let actions = row.actions.clone();
        match (row.toggle(), &row.checkbox) {
            (Some(checked), Some((var_name, _))) => {
                let var_name = var_name.clone();
                self.spawn_op("checkbox", move |session| async move {
                    session
                        .set_var(var_name, crate::model::Var::Bool(checked))
                        .await;
                    if actions.is_empty() {
                        return Ok(());
                    }
                    session.do_actions(&actions).await
                });
            }
            _ => self.run_actions(actions),
        }
    }

    fn back(&self, screen: &Screen) {
        let Some(page) = screen.top() else {
            return;
        };
        let entry = page.entry;
        if page.back.is_some() {
            self.spawn_op("back", move |session| async move { session.back(entry).await });
        } else {
            self.spawn_op("back", move |session| async move {
                if session.navigator().allow_back_swipe().await {
                    session.do_actions(&[ActionSpec::Pop]).await
                } else {
                    Ok(())
                }
            });
        }
    }
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let screen = lock_screen(&app.screen).clone();
        app.sync_selection(&screen);

        terminal
            .draw(|f| draw::draw(f, app, &screen))
            .context("draw")?;
        if app.quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(50)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => app.handle_key(k, &screen),
                _ => {}
            }
        }
    }
}
