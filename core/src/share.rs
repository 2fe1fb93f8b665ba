use crate::*;

/// 3x5 pixel font for the digits 0-9, one row per entry, most significant bit on the left.
const DIGIT_FONT: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

pub const DIGIT_ROWS: usize = 5;
pub const DIGIT_COLUMNS: usize = 3;

/// `(lit, unlit)` glyphs used to draw the pixel art for `mode`.
pub const fn glyphs(mode: Mode) -> (char, char) {
    match mode {
        Mode::Normal => ('🟩', '⬜'),
        Mode::Hard => ('🟪', '⬛'),
    }
}

/// Draws `moves` as pixel art, five rows tall, with a blank column between digits.
pub fn render_digits(moves: u32, mode: Mode) -> String {
    let (lit, unlit) = glyphs(mode);
    let digits: Vec<usize> = moves
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();

    let mut art = String::new();
    for row in 0..DIGIT_ROWS {
        if row > 0 {
            art.push('\n');
        }
        for (i, &digit) in digits.iter().enumerate() {
            if i > 0 {
                art.push(unlit);
            }
            let bits = DIGIT_FONT[digit][row];
            for column in 0..DIGIT_COLUMNS {
                let mask = 1 << (DIGIT_COLUMNS - 1 - column);
                art.push(if bits & mask != 0 { lit } else { unlit });
            }
        }
    }
    art
}

pub fn caption(score: &Score, mode: Mode) -> String {
    format!(
        "{}: all pairs found in {} moves and {}s",
        mode.title(),
        score.moves,
        score.time
    )
}

/// Full text offered to the player for sharing a result.
pub fn share_text(score: &Score, mode: Mode) -> String {
    format!(
        "{}\n\n{}",
        render_digits(score.moves, mode),
        caption(score, mode)
    )
}

/// Somewhere share text can be copied to, such as the system clipboard.
pub trait ShareSink {
    fn copy(&mut self, text: &str) -> core::result::Result<(), ShareError>;
}

/// How share text finally reached the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareDelivery {
    Copied,
    CopiedWithFallback,
    /// Neither sink worked; the text must be shown so it can be copied by hand.
    Failed { text: String },
}

/// Settles a share attempt: keeps the primary result if it worked, otherwise tries `fallback`.
pub fn settle_share(
    text: &str,
    primary: core::result::Result<(), ShareError>,
    fallback: &mut impl ShareSink,
) -> ShareDelivery {
    let Err(err) = primary else {
        return ShareDelivery::Copied;
    };
    log::warn!("Primary share failed: {}", err);

    match fallback.copy(text) {
        Ok(()) => ShareDelivery::CopiedWithFallback,
        Err(err) => {
            log::warn!("Fallback share failed: {}", err);
            ShareDelivery::Failed {
                text: text.to_string(),
            }
        }
    }
}

/// Copies with `primary`, then `fallback`.
pub fn deliver_share(
    text: &str,
    primary: &mut impl ShareSink,
    fallback: &mut impl ShareSink,
) -> ShareDelivery {
    let primary_result = primary.copy(text);
    settle_share(text, primary_result, fallback)
}
