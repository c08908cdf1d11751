//! Voice pool view: one row per slot, state and gain pair at a glance.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use polyvoice::engine::VoiceSnapshot;
use polyvoice::voice::pan::VOICE_SCALE;
use polyvoice::voice::slot::SlotState;

pub fn draw(frame: &mut Frame, voices: &[VoiceSnapshot]) {
    let [header, body] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());

    let active = voices
        .iter()
        .filter(|v| v.state != SlotState::Free)
        .count();
    frame.render_widget(
        Paragraph::new(Line::from(format!(
            " voicemon - {active}/{} voices sounding - q quits",
            voices.len()
        ))),
        header,
    );

    draw_pool(frame, body, voices);
}

fn draw_pool(frame: &mut Frame, area: Rect, voices: &[VoiceSnapshot]) {
    let rows = voices.iter().map(|v| {
        let (state_text, style) = match v.state {
            SlotState::Free => ("free", Style::default().fg(Color::DarkGray)),
            SlotState::Active => (
                "active",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            SlotState::Releasing => ("releasing", Style::default().fg(Color::Yellow)),
        };
        let key = v
            .key
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string());
        Row::new(vec![
            Cell::from(format!("{:2}", v.index)),
            Cell::from(key),
            Cell::from(state_text).style(style),
            Cell::from(meter(v.gain.0)),
            Cell::from(meter(v.gain.1)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Min(10),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["slot", "key", "state", "left", "right"])
            .style(Style::default().add_modifier(Modifier::UNDERLINED)),
    )
    .block(Block::default().borders(Borders::ALL).title("voice pool"));

    frame.render_widget(table, area);
}

/// Eight-cell bar scaled to the per-voice gain ceiling.
fn meter(gain: f32) -> String {
    let cells = ((gain / VOICE_SCALE) * 8.0).round() as usize;
    let mut bar = String::new();
    for i in 0..8 {
        bar.push(if i < cells { '█' } else { '·' });
    }
    bar
}
