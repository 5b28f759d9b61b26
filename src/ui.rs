use anyhow::Result;
use clear_ballot::{Election, RegionId, ResultsReport};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Regions,
    Results,
    Voters,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Regions => Page::Results,
            Page::Results => Page::Voters,
            Page::Voters => Page::Regions,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Regions => Page::Voters,
            Page::Results => Page::Regions,
            Page::Voters => Page::Results,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Regions => "Regions",
            Page::Results => "Results",
            Page::Voters => "Voters",
        }
    }
}

pub struct RegionRow {
    pub name: String,
    pub code: String,
    pub parties: usize,
    pub candidates: Vec<String>,
    pub voters: usize,
    pub votes: u32,
}

/// One voter line; never shows contact details or ballot choice
pub struct VoterRow {
    pub unique_id: u32,
    pub name: String,
    pub age: u32,
    pub region: String,
    pub voted: bool,
}

/// Read-only snapshot of an election, detached from the model
pub struct App {
    pub title: String,
    pub regions: Vec<RegionRow>,
    /// Flat ballot first (when present), then one report per region
    pub scopes: Vec<ResultsReport>,
    pub voters: Vec<VoterRow>,
    pub current_page: Page,
    pub current_scope: usize,
    pub show_detail: bool,
    pub state: TableState,
}

impl App {
    pub fn new(election: &Election) -> Self {
        let parties = election.parties();

        let regions = election
            .regions()
            .iter()
            .map(|r| RegionRow {
                name: r.name().to_string(),
                code: r.code().to_string(),
                parties: r.parties().len(),
                candidates: r.candidates().iter().map(|c| c.label(parties)).collect(),
                voters: r.voters().len(),
                votes: r.total_votes(),
            })
            .collect();

        let mut scopes = Vec::new();
        if !election.candidates().is_empty() || election.regions().is_empty() {
            scopes.push(election.results());
        }
        for index in 0..election.regions().len() {
            if let Ok(report) = election.results_in_region(RegionId(index)) {
                scopes.push(report);
            }
        }

        let voters = election
            .all_voters()
            .map(|v| VoterRow {
                unique_id: v.unique_id(),
                name: v.full_name(),
                age: v.age(),
                region: v
                    .region()
                    .and_then(|id| election.region(id))
                    .map(|r| r.code().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                voted: v.has_voted(),
            })
            .collect();

        let mut app = Self {
            title: election.title().to_string(),
            regions,
            scopes,
            voters,
            current_page: Page::Regions,
            current_scope: 0,
            show_detail: false,
            state: TableState::default(),
        };
        app.reset_selection();
        app
    }

    /// Rows on the current page
    pub fn row_count(&self) -> usize {
        match self.current_page {
            Page::Regions => self.regions.len(),
            Page::Results => self.scopes.get(self.current_scope).map_or(0, |s| s.rows.len()),
            Page::Voters => self.voters.len(),
        }
    }

    fn reset_selection(&mut self) {
        let first = (self.row_count() > 0).then_some(0);
        self.state.select(first);
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.show_detail = false;
        self.reset_selection();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.show_detail = false;
        self.reset_selection();
    }

    pub fn next_scope(&mut self) {
        if !self.scopes.is_empty() {
            self.current_scope = (self.current_scope + 1) % self.scopes.len();
            self.reset_selection();
        }
    }

    pub fn previous_scope(&mut self) {
        if !self.scopes.is_empty() {
            self.current_scope = (self.current_scope + self.scopes.len() - 1) % self.scopes.len();
            self.reset_selection();
        }
    }

    pub fn toggle_detail(&mut self) {
        if self.current_page == Page::Regions {
            self.show_detail = !self.show_detail;
        }
    }

    pub fn selected_region(&self) -> Option<&RegionRow> {
        self.state.selected().and_then(|i| self.regions.get(i))
    }

    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn voted_count(&self) -> usize {
        self.voters.iter().filter(|v| v.voted).count()
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Right | KeyCode::Char('l') => app.next_scope(),
                KeyCode::Left | KeyCode::Char('h') => app.previous_scope(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Regions {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_regions(f, content_chunks[0], app);
        render_region_detail(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Regions => render_regions(f, chunks[1], app),
            Page::Results => render_results(f, chunks[1], app),
            Page::Voters => render_voters(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn table_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn highlight() -> Style {
    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Regions, Page::Results, Page::Voters].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(app.title.clone(), Style::default().fg(Color::White)));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Voted {}/{}", app.voted_count(), app.voters.len()),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_regions(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.regions.iter().map(|r| {
        Row::new(vec![
            Cell::from(r.code.clone()),
            Cell::from(r.name.clone()),
            Cell::from(r.parties.to_string()),
            Cell::from(r.candidates.len().to_string()),
            Cell::from(r.voters.to_string()),
            Cell::from(r.votes.to_string()).style(Style::default().fg(Color::Green)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(28),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(9),
        ],
    )
    .header(header_row(&["Code", "Name", "Parties", "Candidates", "Voters", "Votes"]))
    .block(table_block(" Regions ".to_string()))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_region_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Ballot ");

    let Some(region) = app.selected_region() else {
        f.render_widget(Paragraph::new("No region selected").block(block), area);
        return;
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {} ({})", region.name, region.code),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if region.candidates.is_empty() {
        content.push(Line::from("  No candidates registered."));
    }
    for (i, label) in region.candidates.iter().enumerate() {
        content.push(Line::from(vec![
            Span::styled(format!("  {}. ", i), Style::default().fg(Color::Yellow)),
            Span::raw(label.clone()),
        ]));
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_results(f: &mut Frame, area: Rect, app: &mut App) {
    let Some(report) = app.scopes.get(app.current_scope) else {
        f.render_widget(
            Paragraph::new("No results to show").block(table_block(" Results ".to_string())),
            area,
        );
        return;
    };

    let winner = report.winner().map(|w| w.rank);
    let rows: Vec<Row> = report
        .rows
        .iter()
        .map(|row| {
            let style = if Some(row.rank) == winner {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(row.rank.to_string()),
                Cell::from(row.name.clone()),
                Cell::from(row.party.clone()),
                Cell::from(row.votes.to_string()),
                Cell::from(format!("{:.1}%", row.percentage)),
            ])
            .style(style)
        })
        .collect();

    let title = format!(
        " {} ({}/{}) - {} votes, turnout {:.1}% ",
        report.heading,
        app.current_scope + 1,
        app.scopes.len(),
        report.total_votes,
        report.turnout()
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(28),
            Constraint::Length(20),
            Constraint::Length(8),
            Constraint::Length(9),
        ],
    )
    .header(header_row(&["Rank", "Candidate", "Party", "Votes", "Share"]))
    .block(table_block(title))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_voters(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.voters.iter().map(|v| {
        let (voted, color) = if v.voted {
            ("Yes", Color::Green)
        } else {
            ("No", Color::DarkGray)
        };
        Row::new(vec![
            Cell::from(v.unique_id.to_string()),
            Cell::from(v.name.clone()),
            Cell::from(v.age.to_string()),
            Cell::from(v.region.clone()),
            Cell::from(voted).style(Style::default().fg(color)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(30),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(7),
        ],
    )
    .header(header_row(&["ID", "Name", "Age", "Region", "Voted"]))
    .block(table_block(" Voters ".to_string()))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.row_count()),
        Style::default().fg(Color::Cyan),
    )];

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    match app.current_page {
        Page::Regions => {
            status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Ballot | "));
        }
        Page::Results => {
            status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Scope | "));
        }
        Page::Voters => {}
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
