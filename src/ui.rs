//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Panels read a fresh
//! [`FetchState`](crate::controller::FetchState) snapshot whenever a frame is
//! drawn; `main` draws again as soon as a controller publishes.
//!
//! ## For contributors
//!
//! * The layout is a vertical stack: header with the Show/Hide buttons, the
//!   two gist panels side by side, the FAQ item, and a one-line status bar.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, GistPanel, FAQ_ANSWER};
use crate::source::Gist;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [header_area, main_area, faq_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(4),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(app, frame, header_area);
    draw_gists(app, frame, main_area);
    draw_faq(app, frame, faq_area);
    draw_status_bar(app, frame, status_area);
}

fn button(key: &str, label: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("[{key}]"), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(" {label}  "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]
}

fn draw_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    spans.extend(button("s", "Show"));
    spans.extend(button("h", "Hide"));
    spans.extend(button("space", app.page.label("Show", "Hide")));

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Gist Hooks Lab ")
            .borders(Borders::ALL),
    );
    frame.render_widget(header, area);
}

fn draw_gists(app: &mut App, frame: &mut Frame, area: Rect) {
    if !app.page.is_open() {
        let hidden = Paragraph::new("Gists hidden. Press space to show them.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(hidden, area);
        return;
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let focus = app.focus;
    draw_panel(&mut app.public, focus == Focus::Public, frame, left);
    draw_panel(&mut app.user, focus == Focus::User, frame, right);
}

/// Render one gist panel in whichever of its three states it is in.
fn draw_panel(panel: &mut GistPanel, focused: bool, frame: &mut Frame, area: Rect) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(format!(" {} ", panel.title))
        .borders(Borders::ALL)
        .border_style(border);

    let state = panel.state();

    if state.loading {
        let loading = Paragraph::new(panel.loading_text.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    if let Some(error) = &state.error {
        let message = Paragraph::new(format!("Error fetching gists: {error}"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(message, area);
        return;
    }

    let gists = state.data.as_deref().unwrap_or_default();
    let list_items: Vec<ListItem> = gists
        .iter()
        .map(|gist| {
            let files = match gist.file_count() {
                1 => "1 file".to_string(),
                n => format!("{n} files"),
            };
            ListItem::new(vec![
                Line::from(Span::styled(
                    gist.label().to_string(),
                    Style::default().fg(Color::White),
                )),
                Line::from(vec![
                    Span::styled(
                        format!("  {}", gist.html_url),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw("  "),
                    Span::styled(files, Style::default().fg(Color::Cyan)),
                    Span::raw("  "),
                    Span::styled(byline(gist), Style::default().fg(Color::DarkGray)),
                ]),
            ])
        })
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut panel.list_state);
}

/// Owner and creation date, whichever are known.
fn byline(gist: &Gist) -> String {
    let date = gist.created_at.map(|d| d.format("%Y-%m-%d").to_string());
    match (gist.owner_login(), date) {
        (Some(owner), Some(date)) => format!("{owner} · {date}"),
        (Some(owner), None) => owner.to_string(),
        (None, Some(date)) => date,
        (None, None) => String::new(),
    }
}

fn draw_faq(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines = vec![Line::from(button(
        "a",
        app.faq.label("Show Answer", "Hide Answer"),
    ))];
    if app.faq.is_open() {
        lines.push(Line::from(FAQ_ANSWER));
    }

    let faq = Paragraph::new(lines).block(Block::default().title(" FAQ ").borders(Borders::ALL));
    frame.render_widget(faq, area);
}

/// One-word summary of a panel for the status bar.
fn panel_summary(panel: &GistPanel) -> String {
    if !panel.is_mounted() {
        return "hidden".into();
    }
    let state = panel.state();
    if state.loading {
        "loading".into()
    } else if state.error.is_some() {
        "error".into()
    } else {
        format!("{} gists", state.data.map_or(0, |g| g.len()))
    }
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!(
                "public: {}  {}: {}",
                panel_summary(&app.public),
                app.current_user(),
                panel_summary(&app.user)
            ),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  tab: focus  u: user  r: reload"),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::scripted::{make_gist as gist, Scripted};
    use crate::source::{FetchError, GistOwner, Retrieve};
    use chrono::{TimeZone, Utc};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::runtime::Handle;

    const PUBLIC: &str = "https://api.github.com/gists/public";
    const GAEARON: &str = "https://api.github.com/users/gaearon/gists";

    fn make_app(source: Scripted<Vec<Gist>>) -> App {
        let source: Arc<dyn Retrieve<Vec<Gist>>> = Arc::new(source);
        App::new("https://api.github.com", vec!["gaearon".into()], source, Handle::current())
    }

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(140, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();

        let buf = terminal.backend().buffer().clone();
        let width = buf.area.width as usize;
        let cells: Vec<char> = buf
            .content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect();
        cells
            .chunks(width)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn settle(app: &App) {
        for _ in 0..200 {
            if !app.public.state().loading && !app.user.state().loading {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("panels never settled");
    }

    #[tokio::test]
    async fn hidden_page_shows_hint_and_show_button() {
        let mut app = make_app(Scripted::new());
        let text = render(&mut app);

        assert!(text.contains("Gist Hooks Lab"));
        assert!(text.contains("Gists hidden"));
        assert!(text.contains("[space] Show"));
        assert!(text.contains("public: hidden"));
    }

    #[tokio::test]
    async fn loading_text_is_shown_per_panel() {
        let mut app = make_app(Scripted::new());
        app.toggle_page();
        let text = render(&mut app);

        assert!(text.contains("Loading public gists..."));
        assert!(text.contains("Loading gaearon's gists..."));
        assert!(text.contains("[space] Hide"));
    }

    #[tokio::test]
    async fn loaded_gists_render_labels_with_fallback() {
        let source = Scripted::new()
            .ok(PUBLIC, vec![gist("g1", Some("Dotfiles")), gist("g2", None)])
            .ok(GAEARON, vec![]);
        let mut app = make_app(source);
        app.toggle_page();
        settle(&app).await;

        let text = render(&mut app);
        assert!(text.contains("Public Gists"));
        assert!(text.contains("Dotfiles"));
        assert!(text.contains("No description"));
        assert!(text.contains("https://gist.github.com/g1"));
        assert!(text.contains("https://gist.github.com/g2"));
        assert!(text.contains("gaearon's Gists"));
        assert!(text.contains("public: 2 gists"));
        assert!(text.contains("gaearon: 0 gists"));
    }

    #[tokio::test]
    async fn failed_retrieval_renders_error_message() {
        let source = Scripted::new()
            .fail(PUBLIC, FetchError::Status(403, "Forbidden".into()))
            .ok(GAEARON, vec![]);
        let mut app = make_app(source);
        app.toggle_page();
        settle(&app).await;

        let text = render(&mut app);
        assert!(text.contains("Error fetching gists:"));
        assert!(text.contains("403"));
        assert!(text.contains("public: error"));
    }

    #[tokio::test]
    async fn faq_answer_follows_its_accordion() {
        let mut app = make_app(Scripted::new());
        let text = render(&mut app);
        assert!(text.contains("Show Answer"));
        assert!(!text.contains(FAQ_ANSWER));

        app.toggle_faq();
        let text = render(&mut app);
        assert!(text.contains("Hide Answer"));
        assert!(text.contains(FAQ_ANSWER));
    }

    #[tokio::test]
    async fn draw_does_not_panic_on_tiny_terminal() {
        let mut app = make_app(Scripted::new());
        app.toggle_page();
        let backend = TestBackend::new(10, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();
    }

    #[test]
    fn byline_combines_owner_and_date() {
        let mut g = gist("x", None);
        assert_eq!(byline(&g), "");

        g.owner = Some(GistOwner { login: "octocat".into() });
        assert_eq!(byline(&g), "octocat");

        g.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap());
        assert_eq!(byline(&g), "octocat · 2024-03-09");
    }
}
