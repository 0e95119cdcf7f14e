use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::model::UIData;

pub const STATUSLINE_HEIGHT: u16 = 1;
pub const FILTERBAR_HEIGHT: u16 = 1;
pub const INFO_HEIGHT: u16 = 1;

#[derive(Debug, Default)]
pub struct TableUI {
    state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, data: &UIData, frame: &mut Frame) {
        let [filter_area, info_area, table_area, status_area] = Layout::vertical([
            Constraint::Length(FILTERBAR_HEIGHT),
            Constraint::Length(INFO_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        frame.render_widget(Self::filter_bar(data), filter_area);
        frame.render_widget(Self::info_line(data), info_area);
        self.render_table(data, table_area, frame);
        frame.render_widget(Self::status_line(data), status_area);

        if data.show_popup {
            let area = Self::popup_area(frame.area(), 60, 60);
            let popup = Paragraph::new(Text::from(data.popup_message.as_str()))
                .block(Block::bordered().title(" Help ".bold()));
            frame.render_widget(Clear, area);
            frame.render_widget(popup, area);
        }
    }

    fn filter_bar(data: &UIData) -> Paragraph<'_> {
        let active = Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let idle = Style::default().fg(Color::Gray);
        Paragraph::new(Line::from(vec![
            Span::styled(
                " Show all (a) ",
                if data.show_all_active { active } else { idle },
            ),
            Span::raw(" "),
            Span::styled(
                " Show filtered (f) ",
                if data.show_filtered_active {
                    active
                } else {
                    idle
                },
            ),
            Span::raw("   "),
            data.username.as_str().cyan(),
        ]))
    }

    fn info_line(data: &UIData) -> Paragraph<'_> {
        let mut spans = vec![
            Span::raw(format!("{} ", data.info_label)),
            data.counter.as_str().bold().yellow(),
        ];
        if data.bulk_available {
            spans.push(Span::raw("   "));
            spans.push(" Mark all as viewed (A) ".black().on_green());
        }
        Paragraph::new(Line::from(spans))
    }

    fn render_table(&mut self, data: &UIData, area: Rect, frame: &mut Frame) {
        let header = Row::new(data.headers.iter().enumerate().map(|(cidx, h)| {
            let cell = Cell::from(h.as_str());
            if cidx == data.selected_column {
                cell.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                cell
            }
        }))
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = data
            .rows
            .iter()
            .map(|r| Row::new(r.iter().map(|c| Cell::from(c.as_str()))));
        let widths = data
            .widths
            .iter()
            .map(|&w| Constraint::Length(u16::try_from(w).unwrap_or(u16::MAX)));

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .block(Block::bordered().title(" Channels ".bold()))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        if data.rows.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(data.selected_row));
        }
        frame.render_stateful_widget(table, area, &mut self.state);
    }

    fn status_line(data: &UIData) -> Paragraph<'_> {
        let mut line = vec![Span::raw(data.status_message.as_str())];
        if data.pending > 0 {
            line.push(Span::raw("  "));
            line.push(format!("[{} pending]", data.pending).dark_gray());
        }
        Paragraph::new(Line::from(line))
    }

    fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
        let horizontal =
            Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
        let [area] = vertical.areas(area);
        let [area] = horizontal.areas(area);
        area
    }
}
