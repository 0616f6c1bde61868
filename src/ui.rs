use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, Wrap,
    },
    Frame, Terminal,
};
use sme_analytics::{
    charts::{BarChartView, DashboardView, GroupedBarChartView, LineChartView, TableView},
    insights::ActionLevel,
    kpi::{DeltaDirection, KpiTile},
    validate, DashboardData, DashboardSource,
};
use std::io;

const SERIES_COLORS: [Color; 4] = [Color::Blue, Color::Yellow, Color::Green, Color::Red];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Breakdown,
    Explanation,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Overview => Page::Breakdown,
            Page::Breakdown => Page::Explanation,
            Page::Explanation => Page::Overview,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Overview => Page::Explanation,
            Page::Breakdown => Page::Overview,
            Page::Explanation => Page::Breakdown,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Overview => "Overview",
            Page::Breakdown => "Detailed Breakdown",
            Page::Explanation => "Explanation & Actions",
        }
    }
}

pub struct App {
    pub source: Box<dyn DashboardSource>,
    pub data: DashboardData,
    pub view: DashboardView,
    pub current_page: Page,
    pub status_message: String,
}

impl App {
    pub fn new(source: Box<dyn DashboardSource>, data: DashboardData) -> Self {
        let view = DashboardView::build(&data);
        let status_message = validate(&data).summary();

        Self {
            source,
            data,
            view,
            current_page: Page::Overview,
            status_message,
        }
    }

    /// Re-run the source; on failure keep showing the previous data
    pub fn reload(&mut self) {
        match self.source.load() {
            Ok(data) => {
                self.view = DashboardView::build(&data);
                self.status_message = format!("Reloaded - {}", validate(&data).summary());
                self.data = data;
                tracing::info!(source = self.source.name(), "dashboard reloaded");
            }
            Err(e) => {
                tracing::error!("Reload failed: {:#}", e);
                self.status_message = format!("Reload failed: {:#}", e);
            }
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
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

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

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
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('1') => app.current_page = Page::Overview,
                KeyCode::Char('2') => app.current_page = Page::Breakdown,
                KeyCode::Char('3') => app.current_page = Page::Explanation,
                KeyCode::Char('r') => app.reload(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Length(5), // KPI row
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_kpis(f, chunks[1], &app.view.kpis);

    match app.current_page {
        Page::Overview => render_overview(f, chunks[2], &app.view),
        Page::Breakdown => render_breakdown(f, chunks[2], &app.view),
        Page::Explanation => render_explanation(f, chunks[2], app),
    }

    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Overview, Page::Breakdown, Page::Explanation];

    let mut tab_spans = vec![Span::styled(
        format!("{}  ", app.view.title),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        tab_spans.push(Span::styled(format!(" {} ", page.title()), style));
    }

    let header = Paragraph::new(Line::from(tab_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" SME Analytics & Market Prediction "),
    );
    f.render_widget(header, area);
}

fn render_kpis(f: &mut Frame, area: Rect, tiles: &[KpiTile]) {
    let constraints: Vec<Constraint> = tiles
        .iter()
        .map(|_| Constraint::Ratio(1, tiles.len().max(1) as u32))
        .collect();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (tile, col) in tiles.iter().zip(cols.iter()) {
        let delta_color = match tile.direction {
            DeltaDirection::Up => Color::Green,
            DeltaDirection::Down => Color::Red,
            DeltaDirection::Neutral => Color::Gray,
        };

        let text = vec![
            Line::from(Span::styled(
                tile.value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(tile.delta.clone(), Style::default().fg(delta_color))),
        ];

        let widget = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", tile.label)),
        );
        f.render_widget(widget, *col);
    }
}

fn render_overview(f: &mut Frame, area: Rect, view: &DashboardView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_bar_chart(f, top[0], &view.branches);
    render_line_chart(f, top[1], &view.forecast, Color::Cyan);
    render_line_chart(f, rows[1], &view.monthly, Color::Green);
}

fn render_breakdown(f: &mut Frame, area: Rect, view: &DashboardView) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_table(f, cols[0], &view.forecast_table);
    render_grouped_bar_chart(f, cols[1], &view.status);
}

fn render_explanation(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let drivers: Vec<Line> = app
        .data
        .insights
        .price_drivers
        .iter()
        .map(|d| Line::from(format!("• {}", d)))
        .collect();
    let left = Paragraph::new(drivers)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Why is the price changing? "),
        );
    f.render_widget(left, cols[0]);

    let actions: Vec<Line> = app
        .data
        .insights
        .actions
        .iter()
        .map(|a| {
            let (icon, color) = match a.level {
                ActionLevel::Success => ("✔", Color::Green),
                ActionLevel::Warning => ("⚠", Color::Yellow),
            };
            Line::from(Span::styled(
                format!("{} {}", icon, a.message),
                Style::default().fg(color),
            ))
        })
        .collect();
    let right = Paragraph::new(actions)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Recommended Actions "),
        );
    f.render_widget(right, cols[1]);
}

fn render_bar_chart(f: &mut Frame, area: Rect, chart: &BarChartView) {
    // Bar values are u64; keep one decimal by scaling x10
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let shade = 200u8.saturating_sub((i as u8).saturating_mul(12));
            Bar::default()
                .value((b.value * 10.0).round().max(0.0) as u64)
                .label(Line::from(truncate(&b.label, 14)))
                .text_value(format!("{:.1}", b.value))
                .style(Style::default().fg(Color::Rgb(20, shade, 60)))
        })
        .collect();

    let widget = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", chart.title))
                .title(Title::from(chart.value_axis.clone()).position(Position::Bottom)),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max((chart.max_value() * 10.0).round().max(1.0) as u64)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(widget, area);
}

fn render_line_chart(f: &mut Frame, area: Rect, chart: &LineChartView, color: Color) {
    let points: Vec<(f64, f64)> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();

    let (lo, hi) = chart.y_bounds().unwrap_or((0.0, 1.0));
    let margin = ((hi - lo) * 0.1).max(1.0);
    let (lo, hi) = (lo - margin, hi + margin);

    let datasets = vec![Dataset::default()
        .name(chart.y_axis.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let x_labels = axis_labels(chart);
    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", chart.title)),
        )
        .x_axis(
            Axis::default()
                .title(chart.x_axis.clone())
                .bounds([0.0, (points.len().max(2) - 1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_axis.clone())
                .bounds([lo, hi])
                .labels(vec![
                    Span::raw(compact_number(lo)),
                    Span::raw(compact_number(hi)),
                ]),
        );

    f.render_widget(widget, area);
}

/// First, middle and last x labels (all labels crowd small terminals)
fn axis_labels(chart: &LineChartView) -> Vec<Span<'static>> {
    let n = chart.points.len();
    if n == 0 {
        return vec![];
    }
    let mut picks = vec![0, n / 2, n - 1];
    picks.dedup();
    picks
        .into_iter()
        .map(|i| Span::raw(chart.points[i].label.clone()))
        .collect()
}

fn render_grouped_bar_chart(f: &mut Frame, area: Rect, chart: &GroupedBarChartView) {
    let mut legend = vec![Span::raw(format!("{}: ", chart.legend_title))];
    for (i, series) in chart.series.iter().enumerate() {
        legend.push(Span::styled(
            format!("■ {} ", series.name),
            Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]),
        ));
    }

    let groups: Vec<Vec<Bar>> = chart
        .categories
        .iter()
        .enumerate()
        .map(|(ci, _)| {
            chart
                .series
                .iter()
                .enumerate()
                .map(|(si, series)| {
                    let value = series.values.get(ci).copied().unwrap_or(0.0);
                    Bar::default()
                        .value((value / 1_000_000.0).round().max(0.0) as u64)
                        .text_value(compact_number(value))
                        .style(Style::default().fg(SERIES_COLORS[si % SERIES_COLORS.len()]))
                })
                .collect()
        })
        .collect();

    let mut widget = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", chart.title))
                .title(Title::from(Line::from(legend)).position(Position::Bottom)),
        )
        .bar_width(5)
        .bar_gap(1)
        .group_gap(3)
        .max((chart.max_value() / 1_000_000.0).round().max(1.0) as u64);

    for (i, (category, bars)) in chart.categories.iter().zip(groups.iter()).enumerate() {
        let label = match chart.category_totals.get(i) {
            Some(total) => format!("{} ({})", category, compact_number(*total)),
            None => category.clone(),
        };
        widget = widget.data(
            BarGroup::default()
                .label(Line::from(label))
                .bars(bars),
        );
    }

    f.render_widget(widget, area);
}

fn render_table(f: &mut Frame, area: Rect, view: &TableView) {
    let header = Row::new(
        view.columns
            .iter()
            .map(|c| Cell::from(c.clone()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    .bottom_margin(1);

    let rows: Vec<Row> = view
        .rows
        .iter()
        .map(|r| Row::new(r.iter().map(|c| Cell::from(c.clone())).collect::<Vec<_>>()))
        .collect();

    let widths = vec![Constraint::Percentage(50); view.columns.len().max(1)];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", view.title)),
    );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let status = Line::from(vec![
        Span::styled(
            format!(" source: {} ", app.source.name()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("│ "),
        Span::raw(app.status_message.clone()),
        Span::raw(" │ "),
        Span::styled(
            "Tab/1-3: pages  r: reload  q: quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let widget = Paragraph::new(status).block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn compact_number(v: f64) -> String {
    if v.abs() >= 1_000_000.0 {
        format!("{:.0}M", v / 1_000_000.0)
    } else {
        format!("{:.1}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use sme_analytics::StaticSource;

    fn app() -> App {
        let source = StaticSource::new();
        let data = source.load().unwrap();
        App::new(Box::new(source), data)
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Overview.next().next().next(), Page::Overview);
        assert_eq!(Page::Overview.previous(), Page::Explanation);
    }

    #[test]
    fn test_overview_renders_kpis_and_charts() {
        let screen = render(&app());
        assert!(screen.contains("6.06%"));
        assert!(screen.contains("Disbursement per Branch"));
        assert!(screen.contains("Market Price Forecast"));
    }

    #[test]
    fn test_breakdown_and_explanation_render() {
        let mut app = app();
        app.next_page();
        let screen = render(&app);
        assert!(screen.contains("Price Forecast Table"));
        assert!(screen.contains("M+5"));
        assert!(screen.contains("Employed ("));

        app.next_page();
        let screen = render(&app);
        assert!(screen.contains("Recommended Actions"));
    }

    #[test]
    fn test_reload_keeps_data() {
        let mut app = app();
        let before = app.data.clone();
        app.reload();
        assert_eq!(app.data, before);
        assert!(app.status_message.starts_with("Reloaded"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Alexanderhaven", 14), "Alexanderhaven");
        assert_eq!(truncate("Alexanderhaven", 6), "Alexa…");
    }
}
