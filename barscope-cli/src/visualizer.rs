use std::{num::NonZeroUsize, ops::Range};

use anyhow::Context;
use barscope_audio::{
    cpal::SampleRate, fetcher::Fetcher, Error, MappingConfig, SmootherConfig, VisualizationEngine,
};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup},
    Frame,
};
use tracing::{debug, warn};

use crate::{
    axis::BarLayout,
    source::{Sensitivity, Source},
    Action, Ctx,
};

const BAR_GAP: u16 = 1;
const MAX_BAR_WIDTH: u16 = 300;

pub struct Visualizer {
    engine: VisualizationEngine,
    fetcher: Option<Box<dyn Fetcher>>,

    source: Source,
    sensitivity: Sensitivity,

    block_size: usize,
    freq_range: Range<f32>,

    block: Vec<f32>,
    levels: Vec<f32>,

    layout: BarLayout,
    color: Color,
}

impl Visualizer {
    pub fn new(ctx: &Ctx) -> anyhow::Result<Self> {
        let engine = VisualizationEngine::new(SmootherConfig {
            gain: ctx.gain,
            ..Default::default()
        })
        .context("Invalid bar settings")?;

        let fetcher = match ctx.source.open() {
            Ok(fetcher) => Some(fetcher),
            Err(err) => {
                warn!("Couldn't open the {:?} audio source: {}", ctx.source, err);
                None
            }
        };

        Ok(Self {
            engine,
            fetcher,

            source: Source::new(ctx.source),
            sensitivity: Sensitivity::new(ctx.source.default_sensitivity()),

            block_size: ctx.block_size,
            freq_range: ctx.min_freq..ctx.max_freq,

            block: Vec::new(),
            levels: Vec::new(),

            layout: BarLayout {
                bar_width: ctx.bar_width.clamp(1, MAX_BAR_WIDTH),
                bar_gap: BAR_GAP,
                width: 0,
            },
            color: ctx.color,
        })
    }

    /// Fetches the newest samples and computes the bar heights of them.
    pub fn update(&mut self) {
        if let Some(fetcher) = self.fetcher.as_mut() {
            fetcher.fetch_samples(&mut self.block);
        }

        self.levels.clear();
        match self.engine.process(&self.block, self.sensitivity.value()) {
            Ok(levels) => self.levels.extend_from_slice(levels),
            // no audio source yet, so just draw empty bars
            Err(Error::NotConfigured) => {}
            Err(err) => warn!("Couldn't process the samples: {}", err),
        }
        self.levels.resize(self.layout.amount_bars(), 0.);
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let [status_area, chart_area, tick_area, zone_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        if chart_area.width != self.layout.width {
            self.layout.width = chart_area.width;
            self.reconfigure();
        }

        let status = Line::styled(
            format!(
                "SOURCE: {} | SENS: {:.2}",
                self.source.label(),
                self.sensitivity.value()
            ),
            Style::new().add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status, status_area);

        let max_display = self.engine.smoother_config().max_display;
        let bars: Vec<Bar> = self
            .levels
            .iter()
            .map(|&level| {
                Bar::default()
                    .text_value("".to_string())
                    .value(level.round() as u64)
            })
            .collect();

        let bar_chart = BarChart::default()
            .bar_width(self.layout.bar_width)
            .bar_gap(self.layout.bar_gap)
            .bar_style(Style::new().fg(self.color))
            .data(BarGroup::default().bars(&bars))
            .max(max_display as u64);
        frame.render_widget(&bar_chart, chart_area);

        if let Some(table) = self.engine.table() {
            let label_style = Style::new().fg(Color::DarkGray);

            frame.render_widget(
                Line::styled(self.layout.tick_line(table), label_style),
                tick_area,
            );
            frame.render_widget(
                Line::styled(self.layout.zone_line(table), label_style),
                zone_area,
            );
        }
    }

    pub fn handle_event(&mut self, event: Event) -> Action {
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
                KeyCode::Tab | KeyCode::Char('s') => self.toggle_source(),
                KeyCode::Up => self.sensitivity.increase(),
                KeyCode::Down => self.sensitivity.decrease(),
                KeyCode::Char('+') => self.set_bar_width(self.layout.bar_width + 1),
                KeyCode::Char('-') => {
                    self.set_bar_width(self.layout.bar_width.saturating_sub(1))
                }
                _ => {}
            }
        }

        Action::None
    }

    fn toggle_source(&mut self) {
        let target = self.source.next_mode();

        let switched = target
            .open()
            .map_err(anyhow::Error::from)
            .and_then(|fetcher| self.switch_fetcher(fetcher).map_err(anyhow::Error::from));

        match switched {
            Ok(()) => {
                self.sensitivity = Sensitivity::new(target.default_sensitivity());
                self.source = self.source.switched(target, true);
            }
            Err(err) => {
                warn!("Couldn't switch to the {:?} audio source: {}", target, err);
                self.source = self.source.switched(target, false);
            }
        }

        debug!("Source: {}", self.source.label());
    }

    /// Adjusts the engine to the sample rate of `fetcher` and only starts to read from it if that worked.
    fn switch_fetcher(&mut self, fetcher: Box<dyn Fetcher>) -> Result<(), Error> {
        self.configure_for(fetcher.sample_rate())?;
        self.fetcher = Some(fetcher);
        Ok(())
    }

    fn set_bar_width(&mut self, bar_width: u16) {
        let bar_width = bar_width.clamp(1, MAX_BAR_WIDTH);
        if bar_width == self.layout.bar_width {
            return;
        }

        debug!("Bar width: {}", bar_width);
        self.layout.bar_width = bar_width;
        self.reconfigure();
    }

    /// Adjusts the engine to the current audio source and terminal width.
    fn reconfigure(&mut self) {
        let Some(sample_rate) = self.fetcher.as_ref().map(|fetcher| fetcher.sample_rate()) else {
            return;
        };

        if let Err(err) = self.configure_for(sample_rate) {
            warn!("Couldn't adjust the bars: {}", err);
        }
    }

    /// Adjusts the engine to the given sample rate and the current terminal width.
    ///
    /// Does nothing if no bar fits into the terminal yet.
    fn configure_for(&mut self, sample_rate: SampleRate) -> Result<(), Error> {
        let Some(amount_bars) = NonZeroUsize::new(self.layout.amount_bars()) else {
            return Ok(());
        };

        let mut config = MappingConfig {
            sample_rate,
            block_size: self.block_size,
            amount_bars,
            freq_range: self.freq_range.clone(),
        };

        let nyquist = config.nyquist();
        if config.freq_range.end > nyquist {
            warn!(
                "The sample rate of the source only allows frequencies up to {}Hz, lowering the highest frequency from {}Hz",
                nyquist, config.freq_range.end
            );
            config.freq_range.end = nyquist;
        }

        self.engine.reconfigure(config)?;
        self.block.clear();
        self.block.resize(self.block_size, 0.);
        Ok(())
    }
}
