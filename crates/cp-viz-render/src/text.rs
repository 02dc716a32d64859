//! Axis and title labels.
//!
//! Labels arrive in ROOT TLatex syntax (`#theta_{e}`, `#color[64]{CTOF}`)
//! or matplotlib mathtext (`$\Delta P_{e}$`). Both are parsed into styled
//! runs: Greek letters become Unicode, `_`/`^` groups become sub/superscript
//! runs drawn with a baseline shift.

use crate::color::Color;

/// Vertical placement of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Normal,
    Sub,
    Super,
}

/// A piece of label text with one style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub shift: Shift,
    pub color: Option<Color>,
}

/// Relative size of sub- and superscripts.
pub const SCRIPT_SCALE: f64 = 0.7;

/// Average glyph advance as a fraction of the font size.
const ADVANCE: f64 = 0.56;

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

fn greek(name: &str) -> Option<char> {
    let c = match name {
        "alpha" => 'α',
        "beta" => 'β',
        "gamma" => 'γ',
        "Gamma" => 'Γ',
        "delta" => 'δ',
        "Delta" => 'Δ',
        "epsilon" | "varepsilon" => 'ε',
        "eta" => 'η',
        "theta" => 'θ',
        "Theta" => 'Θ',
        "lambda" => 'λ',
        "Lambda" => 'Λ',
        "mu" => 'μ',
        "nu" => 'ν',
        "pi" => 'π',
        "Pi" => 'Π',
        "rho" => 'ρ',
        "sigma" => 'σ',
        "Sigma" => 'Σ',
        "tau" => 'τ',
        "phi" | "varphi" => 'φ',
        "Phi" => 'Φ',
        "chi" => 'χ',
        "psi" => 'ψ',
        "omega" => 'ω',
        "Omega" => 'Ω',
        "pm" => '±',
        "times" => '×',
        "circ" | "degree" => '°',
        "sqrt" => '√',
        "rightarrow" | "to" => '→',
        "infty" | "infinity" => '∞',
        _ => return None,
    };
    Some(c)
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    runs: Vec<TextRun>,
    /// Inside `$...$`, where spaces are not drawn.
    math: bool,
}

impl Parser<'_> {
    fn push(&mut self, ch: char, shift: Shift, color: Option<Color>) {
        if self.math && ch == ' ' {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.shift == shift && last.color == color => last.text.push(ch),
            _ => self.runs.push(TextRun { text: ch.to_string(), shift, color }),
        }
    }

    fn command(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            name.push(c);
            self.chars.next();
        }
        name
    }

    fn bracketed(&mut self) -> Option<String> {
        if self.chars.peek() != Some(&'[') {
            return None;
        }
        self.chars.next();
        let mut arg = String::new();
        for c in self.chars.by_ref() {
            if c == ']' {
                break;
            }
            arg.push(c);
        }
        Some(arg)
    }

    /// Parse one `{...}` group or a single token.
    fn argument(&mut self, shift: Shift, color: Option<Color>) {
        match self.chars.peek() {
            Some('{') => {
                self.chars.next();
                self.sequence(shift, color, true);
            }
            Some(_) => self.token(shift, color),
            None => {}
        }
    }

    fn sequence(&mut self, shift: Shift, color: Option<Color>, in_group: bool) {
        while let Some(&c) = self.chars.peek() {
            if c == '}' {
                self.chars.next();
                if in_group {
                    return;
                }
                continue;
            }
            self.token(shift, color);
        }
    }

    fn token(&mut self, shift: Shift, color: Option<Color>) {
        let Some(c) = self.chars.next() else { return };
        match c {
            '$' => self.math = !self.math,
            '{' => self.sequence(shift, color, true),
            '_' | '^' => {
                // Scripts inside scripts keep the outer placement.
                let inner = match (shift, c) {
                    (Shift::Normal, '_') => Shift::Sub,
                    (Shift::Normal, _) => Shift::Super,
                    (s, _) => s,
                };
                self.argument(inner, color);
            }
            '#' | '\\' => {
                let name = self.command();
                if name.is_empty() {
                    // `\,` and friends, or an escaped character.
                    match self.chars.next() {
                        Some(',' | ';' | '!' | ' ') | None => {}
                        Some(next) => self.push(next, shift, color),
                    }
                    return;
                }
                if name == "color" {
                    let picked = self.bracketed().and_then(|arg| Color::parse(&arg)).or(color);
                    self.argument(shift, picked);
                } else if let Some(g) = greek(&name) {
                    self.push(g, shift, color);
                }
                // Font switches (`#it`, `\mathrm`) are dropped; their
                // argument is parsed as ordinary text.
            }
            _ => self.push(c, shift, color),
        }
    }
}

/// Split a label into styled runs.
pub fn parse_label(label: &str) -> Vec<TextRun> {
    let mut p = Parser { chars: label.chars().peekable(), runs: Vec::new(), math: false };
    p.sequence(Shift::Normal, None, false);
    p.runs
}

/// Label text without markup.
pub fn plain_text(label: &str) -> String {
    parse_label(label).into_iter().map(|r| r.text).collect()
}

/// Estimated extent of `label` at `size_pt`.
pub fn measure_label(label: &str, size_pt: f64) -> TextMetrics {
    let width = parse_label(label)
        .iter()
        .map(|r| {
            let scale = if r.shift == Shift::Normal { 1.0 } else { SCRIPT_SCALE };
            r.text.chars().count() as f64 * size_pt * ADVANCE * scale
        })
        .sum();
    TextMetrics { width, height: size_pt * 1.2, ascent: size_pt * 0.9 }
}
