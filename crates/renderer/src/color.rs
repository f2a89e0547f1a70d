//! CSS-style color strings to normalized RGB.

/// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()/rgba()` and
/// `hsl()/hsla()` into normalized `[0, 1]` channels. Alpha is accepted but
/// ignored. Returns `None` for anything else.
pub fn parse_color(input: &str) -> Option<[f32; 3]> {
    let trimmed = input.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = trimmed.to_ascii_lowercase();
    if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
        return parse_rgb_args(&args);
    }
    if let Some(args) = function_args(&lower, "hsla").or_else(|| function_args(&lower, "hsl")) {
        return parse_hsl_args(&args);
    }
    None
}

fn parse_hex(hex: &str) -> Option<[f32; 3]> {
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    let (r, g, b) = match hex.len() {
        3 | 4 => {
            let expand = |index: usize| channel(&hex[index..index + 1]).map(|v| v * 17);
            (expand(0)?, expand(1)?, expand(2)?)
        }
        6 | 8 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        _ => return None,
    };
    Some([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
}

/// Returns the comma/space separated arguments of `name(...)`.
fn function_args(input: &str, name: &str) -> Option<Vec<String>> {
    let rest = input.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    let args: Vec<String> = inner
        .split(|ch: char| ch == ',' || ch == '/' || ch.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect();
    Some(args)
}

fn parse_rgb_args(args: &[String]) -> Option<[f32; 3]> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let channel = |raw: &str| -> Option<f32> {
        let value = if let Some(percent) = raw.strip_suffix('%') {
            percent.parse::<f32>().ok()? / 100.0
        } else {
            raw.parse::<f32>().ok()? / 255.0
        };
        value.is_finite().then(|| value.clamp(0.0, 1.0))
    };
    Some([channel(&args[0])?, channel(&args[1])?, channel(&args[2])?])
}

fn parse_hsl_args(args: &[String]) -> Option<[f32; 3]> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let hue = args[0].trim_end_matches("deg").parse::<f32>().ok()?;
    let percent = |raw: &str| -> Option<f32> {
        let value = raw.strip_suffix('%')?.parse::<f32>().ok()? / 100.0;
        value.is_finite().then(|| value.clamp(0.0, 1.0))
    };
    let saturation = percent(&args[1])?;
    let lightness = percent(&args[2])?;
    if !hue.is_finite() {
        return None;
    }
    Some(hsl_to_rgb(hue.rem_euclid(360.0), saturation, lightness))
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    [r + m, g + m, b + m]
}

/// Background color resolved lazily from its string form.
///
/// The string is re-parsed only when it differs from the last one seen. A
/// malformed string keeps the previous color.
#[derive(Debug, Clone)]
pub(crate) struct BackgroundColor {
    source: Option<String>,
    rgb: [f32; 3],
    parses: u64,
}

impl BackgroundColor {
    pub fn new() -> Self {
        Self {
            source: None,
            rgb: [0.0; 3],
            parses: 0,
        }
    }

    pub fn resolve(&mut self, value: &str) -> [f32; 3] {
        if self.source.as_deref() == Some(value) {
            return self.rgb;
        }
        self.parses += 1;
        match parse_color(value) {
            Some(rgb) => self.rgb = rgb,
            None => tracing::warn!(
                color = value,
                "ignoring malformed background color; keeping previous value"
            ),
        }
        self.source = Some(value.to_owned());
        self.rgb
    }

    pub fn parses(&self) -> u64 {
        self.parses
    }
}
