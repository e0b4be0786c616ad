use std::time::SystemTime;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::game::{FoodTier, GameSnapshot, GameState, GridPoint};
use crate::leaderboard::{format_age, GameScore};

/// What occupies a board cell, in drawing precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Head,
    Body,
    Food,
    BonusFood,
    GateOpen,
    GateClosed,
    Wall,
    Empty,
}

pub fn cell_at(snapshot: &GameSnapshot, pos: GridPoint) -> Cell {
    let board = &snapshot.board;
    if pos == snapshot.snake.head() {
        Cell::Head
    } else if snapshot.snake.occupies(pos) {
        Cell::Body
    } else if let Some(food) = snapshot.food.filter(|food| food.position() == pos) {
        match food.tier() {
            FoodTier::Normal => Cell::Food,
            FoodTier::Bonus => Cell::BonusFood,
        }
    } else if pos == board.gate_position() {
        if board.is_gate_open() {
            Cell::GateOpen
        } else {
            Cell::GateClosed
        }
    } else if board.is_obstacle(pos) {
        Cell::Wall
    } else {
        Cell::Empty
    }
}

impl Cell {
    fn span(self) -> Span<'static> {
        match self {
            Cell::Head => Span::styled(
                "■ ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::Body => Span::styled("□ ", Style::default().fg(Color::Green)),
            Cell::Food => Span::styled(
                "O ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Cell::BonusFood => Span::styled(
                "★ ",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::GateOpen => Span::styled(
                "◎ ",
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::GateClosed => Span::styled("▣ ", Style::default().fg(Color::DarkGray)),
            Cell::Wall => Span::styled("█ ", Style::default().fg(Color::Gray)),
            Cell::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
        }
    }
}

/// Leaderboard data shown next to the board
#[derive(Debug, Clone, Default)]
pub struct ScorePanel {
    pub player_name: String,
    pub top_scores: Vec<GameScore>,
    /// Result of saving the last finished game
    pub save_message: Option<String>,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, snapshot: &GameSnapshot, panel: &ScorePanel) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board + leaderboard
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(snapshot), chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(chunks[1]);

        frame.render_widget(self.render_grid(snapshot), body[0]);
        frame.render_widget(self.render_scores(panel), body[1]);

        if let Some(overlay) = self.render_overlay(snapshot, panel) {
            let area = centered(body[0], 44, 9);
            frame.render_widget(Clear, area);
            frame.render_widget(overlay, area);
        }

        frame.render_widget(self.render_controls(snapshot.state), chunks[2]);
    }

    fn render_grid(&self, snapshot: &GameSnapshot) -> Paragraph<'static> {
        let board = &snapshot.board;
        let lines: Vec<Line> = (0..board.height())
            .map(|y| {
                let spans: Vec<Span> = (0..board.width())
                    .map(|x| cell_at(snapshot, GridPoint::new(x, y)).span())
                    .collect();
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(format!(" Level {} ", snapshot.current_level)),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, snapshot: &GameSnapshot) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let gate = if snapshot.board.is_gate_open() {
            Span::styled("OPEN", Style::default().fg(Color::LightGreen))
        } else {
            Span::styled(
                format!(
                    "{}/{}",
                    snapshot.apples_eaten_in_level, snapshot.apples_to_open_gate
                ),
                value,
            )
        };

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                snapshot.score.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Level: ", label),
            Span::styled(snapshot.current_level.to_string(), value),
            Span::raw("    "),
            Span::styled("Gate: ", label),
            gate,
            Span::raw("    "),
            Span::styled("Cleared: ", label),
            Span::styled(snapshot.total_levels_completed.to_string(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(format!("{}ms", snapshot.tick_interval.as_millis()), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_scores(&self, panel: &ScorePanel) -> Paragraph<'static> {
        let now = SystemTime::now();
        let mut lines = Vec::new();

        if panel.top_scores.is_empty() {
            lines.push(Line::from(Span::styled(
                "No scores yet",
                Style::default().fg(Color::DarkGray),
            )));
        }

        for (rank, entry) in panel.top_scores.iter().enumerate() {
            let is_player = entry.player_name.to_lowercase() == panel.player_name.to_lowercase();
            let style = if is_player {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:>2}. ", rank + 1), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{:<12.12} {:>5}", entry.player_name, entry.score), style),
            ]));
            lines.push(Line::from(Span::styled(
                format!(
                    "    L{} · {}",
                    entry.total_levels_completed,
                    format_age(entry.achieved_at_ms, now)
                ),
                Style::default().fg(Color::DarkGray),
            )));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" High Scores "),
        )
    }

    fn render_overlay(
        &self,
        snapshot: &GameSnapshot,
        panel: &ScorePanel,
    ) -> Option<Paragraph<'static>> {
        let key = |k: &'static str| {
            Span::styled(
                k,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let hint = |t: &'static str| Span::styled(t, Style::default().fg(Color::Gray));

        let (title, color, mut text) = match snapshot.state {
            GameState::Playing => return None,
            GameState::Menu => (
                "GATE SNAKE",
                Color::Cyan,
                vec![
                    Line::from(format!("Player: {}", panel.player_name)),
                    Line::from(""),
                    Line::from(vec![hint("Press "), key("Enter"), hint(" to start")]),
                ],
            ),
            GameState::Paused => (
                "PAUSED",
                Color::Yellow,
                vec![Line::from(vec![hint("Press "), key("Space"), hint(" to resume")])],
            ),
            GameState::GameOver => {
                let mut text = vec![Line::from(vec![
                    Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                    Span::styled(
                        snapshot.score.to_string(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("   Levels: {}", snapshot.total_levels_completed),
                        Style::default().fg(Color::Yellow),
                    ),
                ])];
                if let Some(message) = &panel.save_message {
                    text.push(Line::from(Span::styled(
                        message.clone(),
                        Style::default().fg(Color::Cyan),
                    )));
                }
                text.push(Line::from(""));
                text.push(Line::from(vec![
                    hint("Press "),
                    key("Enter"),
                    hint(" to play again or "),
                    Span::styled(
                        "Q",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    hint(" to quit"),
                ]));
                ("GAME OVER", Color::Red, text)
            }
        };

        text.insert(0, Line::from(""));
        text.insert(
            1,
            Line::from(Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        );
        text.insert(2, Line::from(""));

        Some(
            Paragraph::new(text).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
        )
    }

    fn render_controls(&self, state: GameState) -> Paragraph<'static> {
        let pause = if state == GameState::Paused {
            " to resume | "
        } else {
            " to pause | "
        };
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(pause),
            Span::styled("Enter", Style::default().fg(Color::Cyan)),
            Span::raw(" new game | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
