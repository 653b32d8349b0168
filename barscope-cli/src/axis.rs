//! The frequency labels below the bars.
use barscope_audio::MappingTable;

const TICKS: [(f32, &str); 7] = [
    (60., "60"),
    (200., "200"),
    (500., "500"),
    (1_000., "1k"),
    (2_500., "2.5k"),
    (5_000., "5k"),
    (10_000., "10k"),
];

// Frequency borders of the LOW, MID and HIGH zones.
const LOW_MID_BORDER: f32 = 250.;
const MID_HIGH_BORDER: f32 = 4_000.;

/// The horizontal arrangement of the bars in the terminal.
#[derive(Debug, Clone, Copy)]
pub struct BarLayout {
    pub bar_width: u16,
    pub bar_gap: u16,
    pub width: u16,
}

impl BarLayout {
    /// The amount of bars which fit into the width.
    pub fn amount_bars(&self) -> usize {
        usize::from((self.width + self.bar_gap) / (self.bar_width + self.bar_gap))
    }

    /// The column in the middle of the given bar.
    fn bar_center(&self, bar_idx: usize) -> usize {
        bar_idx * usize::from(self.bar_width + self.bar_gap) + usize::from(self.bar_width / 2)
    }

    /// The column of the bar which is the closest one to `freq`.
    fn freq_column(&self, table: &MappingTable, freq: f32) -> usize {
        self.bar_center(table.closest_bar(freq))
    }

    /// Labels like `60`, `1k` or `10k` below the bar which they belong to.
    pub fn tick_line(&self, table: &MappingTable) -> String {
        let range = &table.config().freq_range;
        let mut line = vec![' '; usize::from(self.width)];

        for (freq, label) in TICKS {
            if range.contains(&freq) {
                place(&mut line, self.freq_column(table, freq), label);
            }
        }

        line.into_iter().collect()
    }

    /// `LOW`, `MID` and `HIGH` centered within their frequency zones.
    pub fn zone_line(&self, table: &MappingTable) -> String {
        let range = &table.config().freq_range;
        let width = usize::from(self.width);
        let mut line = vec![' '; width];

        let border = |freq: f32| {
            if freq <= range.start {
                0
            } else if freq >= range.end {
                width
            } else {
                self.freq_column(table, freq)
            }
        };
        let low_mid = border(LOW_MID_BORDER);
        let mid_high = border(MID_HIGH_BORDER);

        for (start, end, label) in [
            (0, low_mid, "LOW"),
            (low_mid, mid_high, "MID"),
            (mid_high, width, "HIGH"),
        ] {
            if start < end {
                place(&mut line, (start + end) / 2, label);
            }
        }

        line.into_iter().collect()
    }
}

/// Writes `label` centered at `center` unless it would overlap another label.
fn place(line: &mut [char], center: usize, label: &str) {
    let len = label.chars().count();
    if len > line.len() {
        return;
    }

    let start = center.saturating_sub(len / 2).min(line.len() - len);
    let end = start + len;

    // keep at least one space between two labels
    let surrounding = &line[start.saturating_sub(1)..(end + 1).min(line.len())];
    if surrounding.iter().any(|&c| c != ' ') {
        return;
    }

    for (slot, c) in line[start..end].iter_mut().zip(label.chars()) {
        *slot = c;
    }
}
