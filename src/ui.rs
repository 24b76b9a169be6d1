//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::audio::OutputState;
use crate::metadata::TrackMetadata;

/// Spacer inserted between repetitions of a scrolling title.
const MARQUEE_SPACER: &str = "   —   ";
/// Width budget for the now-playing title in the status line.
const TITLE_WIDTH: usize = 40;

/// Snapshot of playback state for one frame.
pub struct PlaybackView {
    pub state: OutputState,
    pub title: String,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub volume: u8,
    pub muted: bool,
    pub speed: u16,
    pub repeat: bool,
    pub play_all: bool,
    pub fading: bool,
    /// Marquee offset, advanced by the event loop.
    pub marquee_offset: usize,
}

fn controls_text() -> String {
    [
        "[j/k] up/down",
        "[enter] play selected",
        "[space] play/pause",
        "[h/l] prev/next",
        "[left/right] seek -/+5s",
        "[-/+] speed",
        "[[/]] volume",
        "[m] mute",
        "[r] repeat",
        "[a] play all",
        "[esc] reset",
        "[/] filter",
        "[K] metadata",
        "[q] quit",
    ]
    .join(" | ")
}

/// Format milliseconds as `MM:SS`.
fn format_mmss(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Window `text` to `width` characters, scrolling it by `offset` when it
/// does not fit.
fn marquee(text: &str, width: usize, offset: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if width == 0 || chars.len() <= width {
        return text.to_string();
    }
    let looped: Vec<char> = text.chars().chain(MARQUEE_SPACER.chars()).collect();
    let len = looped.len();
    let start = offset % len;
    (0..width).map(|i| looped[(start + i) % len]).collect()
}

/// First component of a possibly `"3/12"`-style track number.
fn primary_track_number(raw: &str) -> &str {
    raw.split('/').next().unwrap_or(raw).trim()
}

/// Compute a centered rectangle with the given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn metadata_text(app: &App) -> String {
    let meta: &TrackMetadata = &app.metadata;
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        format!("Title: {}", or_dash(&meta.title)),
        format!("Artist: {}", or_dash(&meta.artist)),
        format!("Album: {}", or_dash(&meta.album)),
        format!(
            "Track: {}",
            meta.track_number
                .as_deref()
                .map(primary_track_number)
                .unwrap_or("-")
        ),
        format!("Year: {}", or_dash(&meta.date)),
        format!("Genre: {}", or_dash(&meta.genre)),
        format!("Composer: {}", or_dash(&meta.composer)),
        format!("Copyright: {}", or_dash(&meta.copyright)),
        format!("ISRC: {}", or_dash(&meta.isrc)),
        format!(
            "Duration: {}",
            format_mmss((meta.duration_secs * 1000.0) as u64)
        ),
    ];
    if let Some(kbps) = meta.bitrate_kbps {
        lines.push(format!("Bitrate: {kbps} kbps"));
    }
    if let Some(hz) = meta.sample_rate_hz {
        lines.push(format!("Sample rate: {hz} Hz"));
    }
    if let Some(ch) = meta.channels {
        lines.push(format!("Channels: {ch}"));
    }
    match app.cover_art_bytes {
        Some(bytes) => lines.push(format!("Cover art: embedded ({bytes} bytes)")),
        None => lines.push("Cover art: none".to_string()),
    }
    if let Some(path) = &app.metadata_path {
        lines.push(format!("Path: {}", path.display()));
    }
    lines.join("\n")
}

fn status_text(app: &App, view: &PlaybackView) -> String {
    let mut parts: Vec<String> = Vec::new();

    let state = match view.state {
        OutputState::Playing if view.fading => "Fading",
        OutputState::Playing => "Playing",
        OutputState::Paused => "Paused",
        OutputState::Stopped => "Stopped",
    };
    parts.push(format!(" {state}"));

    if !view.title.is_empty() {
        parts.push(format!(
            "Song: {} [{} / {}]",
            marquee(&view.title, TITLE_WIDTH, view.marquee_offset),
            format_mmss(view.position_ms),
            format_mmss(view.duration_ms),
        ));
    }

    let vol = if view.muted {
        "Vol: muted".to_string()
    } else {
        format!("Vol: {}%", view.volume)
    };
    parts.push(vol);
    parts.push(format!("Speed: {}%", view.speed));

    if view.repeat {
        parts.push("Repeat: ON".to_string());
    }
    if view.play_all {
        parts.push("Play all: ON".to_string());
    }

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    if let Some(root) = app.catalog.root() {
        parts.push(format!("Dir: {}", root.display()));
    }

    if let Some(warning) = &app.status_message {
        parts.push(format!("! {warning}"));
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, display: &[usize], view: &PlaybackView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new("a folder-based mini player")
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" miniplayer ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status_par = Paragraph::new(status_text(app, view))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Track list: window around the selection so long folders stay cheap
    // to render.
    {
        let total = display.len();
        let list_height = chunks[2].height as usize;
        let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = if sel_pos > half { sel_pos - half } else { 0 };
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = display[start..end]
            .iter()
            .map(|&i| {
                let text = app
                    .catalog
                    .track(i)
                    .map(|t| t.display().to_string())
                    .unwrap_or_default();
                ListItem::new(text)
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Overlay metadata popup (keeps the list visible under it).
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 18, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let meta_paragraph = Paragraph::new(metadata_text(app))
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
