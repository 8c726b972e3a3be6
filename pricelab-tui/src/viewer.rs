//! Blocking chart viewer.
//!
//! Shows the price chart, the returns chart and the correlation heatmap one
//! after the other in the alternate screen. Each chart stays up until the
//! user dismisses it; Ctrl-C closes the viewer without showing the rest.

use std::io::{self, stdout};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use pricelab_core::analysis::CorrelationMatrix;
use pricelab_core::data::PriceTable;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use thiserror::Error;
use tracing::debug;

use crate::panels::{CorrelationHeatmap, LineChartPanel, ValueFormat};
use crate::theme::Theme;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// The three charts, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Prices,
    Returns,
    Correlation,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Prices, ChartKind::Returns, ChartKind::Correlation];

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Prices => "Price Evolution",
            ChartKind::Returns => "Period Returns",
            ChartKind::Correlation => "Correlation Matrix",
        }
    }
}

/// Data shown by the viewer.
#[derive(Debug, Clone, Copy)]
pub struct ChartSet<'a> {
    pub prices: &'a PriceTable,
    pub returns: &'a PriceTable,
    pub correlation: &'a CorrelationMatrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Dismiss the current chart.
    Next,
    /// Close the viewer.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerOutcome {
    /// Every chart was shown and dismissed.
    Completed,
    /// Closed early; the number of charts dismissed before that.
    Aborted { dismissed: usize },
}

/// Map a key press to a viewer action. Releases and unbound keys map to `None`.
pub fn key_action(key: KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Abort)
        }
        KeyCode::Char('q' | 'n' | ' ') | KeyCode::Esc | KeyCode::Enter | KeyCode::Right => {
            Some(KeyAction::Next)
        }
        _ => None,
    }
}

/// Draw one chart with a footer line telling which chart this is.
pub fn draw(frame: &mut Frame, charts: &ChartSet<'_>, kind: ChartKind, position: usize, theme: &Theme) {
    let [body, footer] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

    match kind {
        ChartKind::Prices => frame.render_widget(
            LineChartPanel::new(charts.prices, kind.title(), "Price (USD)", ValueFormat::Price, theme),
            body,
        ),
        ChartKind::Returns => frame.render_widget(
            LineChartPanel::new(charts.returns, kind.title(), "Return", ValueFormat::Percent, theme),
            body,
        ),
        ChartKind::Correlation => frame.render_widget(
            CorrelationHeatmap::new(charts.correlation, kind.title(), theme),
            body,
        ),
    }

    let help = Line::from(vec![
        Span::styled(
            format!(" [{}/{}] ", position + 1, ChartKind::ALL.len()),
            Style::default().fg(theme.accent),
        ),
        Span::styled(
            "q/Enter/Space: next chart   Ctrl-C: close",
            Style::default().fg(theme.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(help), footer);
}

/// Show every chart in order on `terminal`, waiting on `next_action` after
/// each draw. `Ok(None)` from `next_action` redraws the current chart.
pub fn run<B, F>(
    terminal: &mut Terminal<B>,
    charts: &ChartSet<'_>,
    theme: &Theme,
    mut next_action: F,
) -> io::Result<ViewerOutcome>
where
    B: Backend,
    F: FnMut() -> io::Result<Option<KeyAction>>,
{
    for (position, kind) in ChartKind::ALL.into_iter().enumerate() {
        debug!(chart = kind.title(), "showing chart");
        loop {
            terminal.draw(|f| draw(f, charts, kind, position, theme))?;
            match next_action()? {
                Some(KeyAction::Next) => break,
                Some(KeyAction::Abort) => {
                    return Ok(ViewerOutcome::Aborted {
                        dismissed: position,
                    })
                }
                None => continue,
            }
        }
    }
    Ok(ViewerOutcome::Completed)
}

/// Next action from the terminal's event stream; resizes and other events
/// yield `None` so the caller redraws.
fn read_action() -> io::Result<Option<KeyAction>> {
    match event::read()? {
        Event::Key(key) => Ok(key_action(key)),
        _ => Ok(None),
    }
}

/// Restore the terminal before the default panic message is printed.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));
}

/// Take over the terminal and show the three charts, blocking until the
/// last one is dismissed.
pub fn show(charts: &ChartSet<'_>, theme: &Theme) -> Result<ViewerOutcome, ViewerError> {
    enable_raw_mode()?;
    let mut out = stdout();
    if let Err(e) = execute!(out, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }

    let result = Terminal::new(CrosstermBackend::new(out)).and_then(|mut terminal| {
        terminal.clear()?;
        let outcome = run(&mut terminal, charts, theme, read_action);
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        outcome
    });

    // Restore terminal
    let restored = disable_raw_mode();
    let outcome = result?;
    restored?;
    Ok(outcome)
}
